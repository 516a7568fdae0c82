//! Configuration types deserialized from `loam.toml`.

use serde::Deserialize;

/// The compiler identifiers the loader knows how to register.
pub const SUPPORTED_COMPILERS: &[&str] = &["typescript", "ttypescript", "swc"];

/// The top-level loader configuration parsed from `loam.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct LoamConfig {
    /// Cache storage settings.
    #[serde(default)]
    pub cache: CacheSection,
    /// Compiler selection and mode.
    #[serde(default)]
    pub compiler: CompilerSection,
    /// Import-tracking settings for dependency diffing.
    #[serde(default)]
    pub imports: ImportSection,
}

/// Cache storage settings.
#[derive(Debug, Deserialize)]
pub struct CacheSection {
    /// Cache root directory. Absolute, or resolved against the current
    /// working directory at registration time.
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

/// Compiler selection and mode.
#[derive(Debug, Deserialize)]
pub struct CompilerSection {
    /// Compiler module identifier; must be one of [`SUPPORTED_COMPILERS`].
    #[serde(default = "default_compiler")]
    pub name: String,

    /// Whether compilation skips full type-checking. Stored with every
    /// cache entry; a mismatch invalidates the entry.
    #[serde(default)]
    pub transpile_only: bool,
}

impl Default for CompilerSection {
    fn default() -> Self {
        Self {
            name: default_compiler(),
            transpile_only: false,
        }
    }
}

/// Import-tracking settings for dependency diffing.
#[derive(Debug, Deserialize)]
pub struct ImportSection {
    /// Whether import extraction and diffing runs on the miss path.
    #[serde(default = "default_true")]
    pub track: bool,

    /// Maximum number of characters of source scanned for import
    /// declarations. Zero disables extraction.
    #[serde(default = "default_scan_limit")]
    pub scan_limit: usize,

    /// Suffix appended when resolving a disappeared import as a
    /// type-declaration file.
    #[serde(default = "default_declaration_suffix")]
    pub declaration_suffix: String,

    /// Specifier prefix marking host built-in modules, which are excluded
    /// from extraction.
    #[serde(default = "default_builtin_prefix")]
    pub builtin_prefix: String,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            track: true,
            scan_limit: default_scan_limit(),
            declaration_suffix: default_declaration_suffix(),
            builtin_prefix: default_builtin_prefix(),
        }
    }
}

fn default_cache_dir() -> String {
    "./build_cache/loam/".to_string()
}

fn default_compiler() -> String {
    "typescript".to_string()
}

fn default_scan_limit() -> usize {
    5000
}

fn default_declaration_suffix() -> String {
    ".d.ts".to_string()
}

fn default_builtin_prefix() -> String {
    "node:".to_string()
}

fn default_true() -> bool {
    true
}
