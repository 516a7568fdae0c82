//! Explicit registration of the cache-aware loader on a host's extension
//! hooks.
//!
//! `register` claims the managed extensions, lets the compiler install its
//! own handlers, and then wraps them with the cache pipeline. The returned
//! [`Registration`] is the owner token: only its holder can restore the
//! hooks with [`unregister`], and every previously installed handler is put
//! back exactly as found.

use std::env;
use std::path::PathBuf;
use std::rc::Rc;

use loam_cache::CacheStore;
use loam_config::LoamConfig;
use loam_imports::ScanOptions;
use tracing::{info, warn};

use crate::compiler::{install_compiler, Compiler, CompilerKind};
use crate::error::LoaderError;
use crate::host::{ExtensionHooks, Handler, HandlerKind};
use crate::pipeline::{LoadPipeline, PipelineOptions};

/// Extensions managed when the caller does not override them.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".ts", ".cts", ".mts"];

/// Everything registration needs beyond the compiler itself.
#[derive(Debug, Clone)]
pub struct RegisterOptions {
    /// The cache directory; a relative path is resolved against the
    /// current working directory.
    pub cache_dir: PathBuf,
    /// The extensions whose hooks this loader claims.
    pub extensions: Vec<String>,
    /// The compiler the caller intends to install; the concrete compiler's
    /// name must match.
    pub compiler_kind: CompilerKind,
    /// Whether compilation skips full type-checking.
    pub transpile_only: bool,
    /// Whether import provenance is recorded on the miss path.
    pub track_imports: bool,
    /// Character bound on where an import statement may begin; zero
    /// disables extraction.
    pub scan_limit: usize,
    /// Suffix tried first when resolving a disappeared import.
    pub declaration_suffix: String,
    /// Specifier prefix marking host builtins, which are never recorded.
    pub builtin_prefix: String,
}

impl RegisterOptions {
    /// Options with the stock defaults and the given cache directory.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            compiler_kind: CompilerKind::Typescript,
            transpile_only: false,
            track_imports: true,
            scan_limit: 5000,
            declaration_suffix: ".d.ts".to_string(),
            builtin_prefix: "node:".to_string(),
        }
    }

    /// Options drawn from a loaded configuration file.
    pub fn from_config(config: &LoamConfig) -> Result<Self, LoaderError> {
        let compiler_kind = CompilerKind::parse(&config.compiler.name)?;
        Ok(Self {
            cache_dir: PathBuf::from(&config.cache.dir),
            compiler_kind,
            transpile_only: config.compiler.transpile_only,
            track_imports: config.imports.track,
            scan_limit: config.imports.scan_limit,
            declaration_suffix: config.imports.declaration_suffix.clone(),
            builtin_prefix: config.imports.builtin_prefix.clone(),
            ..Self::new("")
        })
    }

    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            scan_limit: self.scan_limit,
            builtin_prefix: self.builtin_prefix.clone(),
        }
    }
}

/// The owner token returned by a successful registration.
///
/// Holds whatever handlers the managed extensions carried beforehand so
/// unregistration can restore them.
#[derive(Debug)]
pub struct Registration {
    extensions: Vec<String>,
    previous: Vec<Option<Rc<Handler>>>,
    handler: Rc<Handler>,
}

impl Registration {
    /// The extensions this registration claimed.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// The cache-aware handler this registration installed.
    pub fn handler(&self) -> &Rc<Handler> {
        &self.handler
    }
}

/// Installs the cache-aware loader on the given hooks.
///
/// Returns `Ok(None)` when every managed extension already carries a
/// handler of ours — the cache layer itself, or the compiler handler it
/// wraps; registering twice is a no-op, not an error. A foreign handler
/// on any managed extension aborts registration before anything is
/// touched.
pub fn register(
    hooks: &mut ExtensionHooks,
    compiler: Rc<dyn Compiler>,
    options: RegisterOptions,
) -> Result<Option<Registration>, LoaderError> {
    if options.extensions.is_empty() {
        return Err(LoaderError::NoExtensions);
    }
    if compiler.name() != options.compiler_kind.as_str() {
        return Err(LoaderError::UnsupportedCompiler(compiler.name().to_string()));
    }

    let mut already_ours = true;
    for extension in &options.extensions {
        match hooks.current(extension).map(|h| h.kind()) {
            Some(HandlerKind::CacheOwned | HandlerKind::CompilerOwned) => {}
            Some(HandlerKind::Foreign) => {
                return Err(LoaderError::ExtensionOwned {
                    extension: extension.clone(),
                });
            }
            _ => already_ours = false,
        }
    }
    if already_ours {
        info!("loader already registered, skipping");
        return Ok(None);
    }

    let cache_dir = absolute_cache_dir(&options.cache_dir)?;
    let store = CacheStore::new(&cache_dir)?;

    // Claim the managed extensions, remembering what was there.
    let previous: Vec<Option<Rc<Handler>>> = options
        .extensions
        .iter()
        .map(|extension| hooks.take(extension))
        .collect();

    // The compiler claims the hooks first; its handler becomes the bypass
    // target of the pipeline wrapped over it.
    let compiler_handler = install_compiler(hooks, &compiler, &options.extensions);

    let pipeline = Rc::new(LoadPipeline::new(
        store,
        compiler,
        compiler_handler,
        PipelineOptions {
            transpile_only: options.transpile_only,
            track_imports: options.track_imports,
            scan: options.scan_options(),
            declaration_suffix: options.declaration_suffix.clone(),
        },
    ));

    let pipeline_ref = Rc::clone(&pipeline);
    let handler = Handler::new(HandlerKind::CacheOwned, move |unit| {
        pipeline_ref.load(unit).map(|_| ())
    });

    for extension in &options.extensions {
        hooks.install(extension, Rc::clone(&handler));
    }
    info!(
        cache_dir = %cache_dir.display(),
        extensions = ?options.extensions,
        "cache-aware loader registered"
    );

    Ok(Some(Registration {
        extensions: options.extensions,
        previous,
        handler,
    }))
}

/// Removes the registration's handlers and restores what preceded them.
///
/// All extensions are verified before any is touched, so the hook table is
/// restored completely or not at all. With `strict` set, an extension whose
/// current handler is not the one this registration installed fails the
/// whole call with the hooks unchanged; the token comes back in the error
/// so the caller can retry (for example leniently). In lenient mode
/// mismatched extensions are logged and left in place while the rest are
/// restored.
pub fn unregister(
    hooks: &mut ExtensionHooks,
    registration: Registration,
    strict: bool,
) -> Result<(), (Registration, LoaderError)> {
    let mismatched: Vec<String> = registration
        .extensions
        .iter()
        .filter(|extension| {
            !hooks
                .current(extension)
                .is_some_and(|current| Rc::ptr_eq(&current, &registration.handler))
        })
        .cloned()
        .collect();

    if strict {
        if let Some(extension) = mismatched.first() {
            let error = LoaderError::NotInstalled {
                extension: extension.clone(),
            };
            return Err((registration, error));
        }
    }

    for (extension, previous) in registration
        .extensions
        .iter()
        .zip(registration.previous.into_iter())
    {
        if mismatched.contains(extension) {
            warn!(extension = %extension, "handler replaced since registration, leaving it");
            continue;
        }
        hooks.take(extension);
        if let Some(previous) = previous {
            hooks.install(extension, previous);
        }
    }
    Ok(())
}

fn absolute_cache_dir(dir: &PathBuf) -> Result<PathBuf, LoaderError> {
    if dir.is_absolute() {
        return Ok(dir.clone());
    }
    let cwd = env::current_dir().map_err(|e| LoaderError::Load {
        path: dir.clone(),
        reason: format!("cannot resolve cache directory: {e}"),
    })?;
    Ok(cwd.join(dir))
}
