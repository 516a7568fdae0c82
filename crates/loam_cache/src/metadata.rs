//! The per-entry metadata record.

use std::path::{Path, PathBuf};

use loam_imports::ImportRecord;
use serde::{Deserialize, Serialize};

/// Metadata persisted beside every compiled artifact.
///
/// Created or overwritten on every cache miss; read-only on a hit. Entries
/// are never deleted by the cache itself, they accumulate until externally
/// pruned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Absolute path of the source file this entry caches.
    pub source_path: PathBuf,

    /// Modification timestamp of the source at compile time, ISO-8601 with
    /// millisecond precision. Validity requires exact equality with the
    /// source's current timestamp.
    pub mtime_iso: String,

    /// Compiler module identifier that produced the artifact.
    pub compiler: String,

    /// Version string of that compiler.
    pub compiler_version: String,

    /// Whether compilation skipped full type-checking.
    pub transpile_only: bool,

    /// Whether import tracking was enabled for this compilation.
    pub track_imports: bool,

    /// The scan limit in effect when imports were extracted.
    pub scan_limit: usize,

    /// Imports observed in the source before compilation.
    pub imports_before: Vec<ImportRecord>,

    /// Imports still observed in the compiled text.
    pub imports_after: Vec<ImportRecord>,
}

impl CacheMetadata {
    /// The compiler-identity fingerprint, `<name>@<version>`.
    pub fn fingerprint(&self) -> String {
        format!("{}@{}", self.compiler, self.compiler_version)
    }

    /// Loads a metadata record, returning `None` if the file doesn't exist
    /// or can't be parsed.
    ///
    /// Fail-safe: any problem is a cache miss, triggering recompilation.
    pub fn load(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }
}
