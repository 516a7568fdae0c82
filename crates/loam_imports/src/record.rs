//! The per-import record stored in cache metadata.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One statically declared import target.
///
/// Extraction fills in only the specifier. Records for imports that
/// disappear after compilation are enriched by the differ with resolution
/// results: either a resolved absolute path plus that file's modification
/// timestamp, or the error strings from each of the two resolution attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// The module specifier as written in the source.
    pub specifier: String,

    /// Absolute path the specifier resolved to, if resolution succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<PathBuf>,

    /// Modification timestamp of the resolved file, ISO-8601 milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime_iso: Option<String>,

    /// Whether the specifier resolved to a type-declaration file.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub declaration_only: bool,

    /// Error from the declaration-file resolution attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_error_declaration: Option<String>,

    /// Error from the plain module-path resolution attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_error_plain: Option<String>,

    /// Error from reading the resolved file's modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat_error: Option<String>,
}

impl ImportRecord {
    /// Creates a bare record for a specifier, with no resolution data.
    pub fn new(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            resolved_path: None,
            mtime_iso: None,
            declaration_only: false,
            resolve_error_declaration: None,
            resolve_error_plain: None,
            stat_error: None,
        }
    }
}
