//! The per-load pipeline: cache check, source provider, link.
//!
//! Each intercepted load runs `Received → CacheCheck → {CacheHit |
//! CacheMiss} → Delivered`. The source provider is either the cache (hit)
//! or the compiler (miss); linking hands the chosen text to the module
//! unit. Caching on the miss path is a side effect wrapped around the real
//! compilation and never alters its output: a failed cache write is logged
//! and the compiled text is delivered regardless.

use std::path::Path;
use std::rc::Rc;

use loam_cache::{CacheError, CacheMetadata, CacheStore};
use loam_common::mtime_iso;
use loam_imports::{diff_imports, extract_imports, Resolver, ScanOptions};
use tracing::{debug, warn};

use crate::compiler::Compiler;
use crate::error::LoaderError;
use crate::host::{Handler, ModuleUnit};

/// How a load was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Served from the cache; the compiler was not invoked.
    Hit,
    /// Compiled and written to the cache.
    Miss,
    /// The source could not be statted; delegated to the compiler handler
    /// with no cache bookkeeping.
    Bypass,
}

/// Knobs the pipeline needs from registration.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Whether compilation skips full type-checking; stored and validated
    /// with every entry.
    pub transpile_only: bool,
    /// Whether import extraction and diffing runs on the miss path.
    pub track_imports: bool,
    /// Extraction bounds and builtin exclusion.
    pub scan: ScanOptions,
    /// Declaration suffix for disappeared-import resolution.
    pub declaration_suffix: String,
}

/// The per-load decision engine.
///
/// Owns the hit/miss decision; it never writes cache files itself except by
/// delegating to the store.
pub struct LoadPipeline {
    store: CacheStore,
    compiler: Rc<dyn Compiler>,
    compiler_handler: Rc<Handler>,
    options: PipelineOptions,
}

impl LoadPipeline {
    /// Builds a pipeline over a store, a compiler, and the compiler's
    /// captured handler (the bypass target).
    pub fn new(
        store: CacheStore,
        compiler: Rc<dyn Compiler>,
        compiler_handler: Rc<Handler>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            store,
            compiler,
            compiler_handler,
            options,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Runs one load through the cache check.
    pub fn load(&self, unit: &mut ModuleUnit) -> Result<LoadOutcome, LoaderError> {
        let path = unit.path().to_path_buf();

        if mtime_iso(&path).is_err() {
            warn!(source = %path.display(), "cannot stat source, delegating without cache");
            self.compiler_handler.call(unit)?;
            return Ok(LoadOutcome::Bypass);
        }

        let fingerprint = self.compiler.fingerprint();
        if self
            .store
            .is_valid(&path, &fingerprint, self.options.transpile_only)
        {
            match self.store.read(&path) {
                Ok(text) => {
                    unit.deliver(text);
                    return Ok(LoadOutcome::Hit);
                }
                Err(CacheError::Corrupt { path: artifact }) => {
                    debug!(artifact = %artifact.display(), "corrupt artifact, recompiling");
                }
                Err(e) => {
                    debug!(source = %path.display(), error = %e, "cache read failed, recompiling");
                }
            }
        }

        self.compile_and_cache(unit)
    }

    /// The miss path: compile, then cache as a side effect, then deliver.
    fn compile_and_cache(&self, unit: &mut ModuleUnit) -> Result<LoadOutcome, LoaderError> {
        let path = unit.path().to_path_buf();
        let source = std::fs::read_to_string(&path).map_err(|e| LoaderError::Load {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let track = self.options.track_imports && self.options.scan.scan_limit > 0;
        let imports_before = if track {
            extract_imports(&source, &self.options.scan)
        } else {
            Vec::new()
        };

        let compiled = self.compiler.compile(&source, &path)?;

        // Re-stat after the compile; a file that changed or vanished
        // mid-compile is delivered but not cached.
        match mtime_iso(&path) {
            Ok(current_mtime) => {
                let metadata =
                    self.build_metadata(&path, current_mtime, track, imports_before, &compiled);
                if let Err(e) = self.store.write(&path, &compiled, &metadata) {
                    warn!(source = %path.display(), error = %e, "cache write failed, continuing uncached");
                }
            }
            Err(e) => {
                warn!(source = %path.display(), error = %e, "cannot re-stat source, skipping cache write");
            }
        }

        unit.deliver(compiled);
        Ok(LoadOutcome::Miss)
    }

    fn build_metadata(
        &self,
        path: &Path,
        mtime_iso: String,
        track: bool,
        imports_before: Vec<loam_imports::ImportRecord>,
        compiled: &str,
    ) -> CacheMetadata {
        let (imports_before, imports_after) = if track {
            let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
            let resolver = Resolver::new(base_dir)
                .with_declaration_suffix(self.options.declaration_suffix.clone());
            let diff = diff_imports(imports_before, compiled, &self.options.scan, &resolver);
            (diff.before, diff.after)
        } else {
            (Vec::new(), Vec::new())
        };

        CacheMetadata {
            source_path: path.to_path_buf(),
            mtime_iso,
            compiler: self.compiler.name().to_string(),
            compiler_version: self.compiler.version().to_string(),
            transpile_only: self.options.transpile_only,
            track_imports: track,
            scan_limit: if track { self.options.scan.scan_limit } else { 0 },
            imports_before,
            imports_after,
        }
    }
}
