//! Two-stage resolution for imports that disappear after compilation.
//!
//! A disappeared import is resolved first as a type-declaration path (the
//! specifier with the declaration suffix appended), then as a plain module
//! path. Each attempt fails with a descriptive string rather than an error
//! type; the differ records both failures independently.

use std::path::{Path, PathBuf};

/// Resolves module specifiers relative to a source file's directory.
#[derive(Debug, Clone)]
pub struct Resolver {
    /// Directory of the importing source file.
    base_dir: PathBuf,
    /// Suffix for the declaration-file resolution attempt.
    declaration_suffix: String,
    /// Extensions tried, in order, for the plain resolution attempt.
    source_extensions: Vec<String>,
}

impl Resolver {
    /// Creates a resolver with the default declaration suffix (`.d.ts`) and
    /// plain-extension list (`.ts`, `.js`).
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            declaration_suffix: ".d.ts".to_string(),
            source_extensions: vec![".ts".to_string(), ".js".to_string()],
        }
    }

    /// Overrides the declaration suffix.
    pub fn with_declaration_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.declaration_suffix = suffix.into();
        self
    }

    /// Attempts resolution as a type-declaration file.
    pub fn resolve_declaration(&self, specifier: &str) -> Result<PathBuf, String> {
        let with_suffix = format!("{specifier}{}", self.declaration_suffix);
        self.resolve_exact(&with_suffix)
    }

    /// Attempts resolution as a plain module path: the exact path first,
    /// then each configured source extension.
    pub fn resolve_plain(&self, specifier: &str) -> Result<PathBuf, String> {
        if let Ok(path) = self.resolve_exact(specifier) {
            return Ok(path);
        }
        for ext in &self.source_extensions {
            let candidate = format!("{specifier}{ext}");
            if let Ok(path) = self.resolve_exact(&candidate) {
                return Ok(path);
            }
        }
        Err(format!(
            "cannot resolve '{specifier}' relative to {}",
            self.base_dir.display()
        ))
    }

    fn resolve_exact(&self, specifier: &str) -> Result<PathBuf, String> {
        if !is_relative_specifier(specifier) {
            return Err(format!("bare specifier '{specifier}' is not resolvable"));
        }
        let candidate = self.base_dir.join(specifier);
        if candidate.is_file() {
            // Canonical form when obtainable; the joined path otherwise.
            Ok(std::fs::canonicalize(&candidate).unwrap_or(candidate))
        } else {
            Err(format!("no file at {}", candidate.display()))
        }
    }
}

fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || Path::new(specifier).is_absolute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_resolution_finds_dts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("enums.d.ts"), "export const enum E {}").unwrap();

        let resolver = Resolver::new(dir.path());
        let resolved = resolver.resolve_declaration("./enums").unwrap();
        assert!(resolved.ends_with("enums.d.ts"));
    }

    #[test]
    fn declaration_resolution_fails_without_dts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mod.ts"), "export {}").unwrap();

        let resolver = Resolver::new(dir.path());
        let err = resolver.resolve_declaration("./mod").unwrap_err();
        assert!(err.contains("mod.d.ts"));
    }

    #[test]
    fn plain_resolution_tries_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("util.ts"), "export {}").unwrap();

        let resolver = Resolver::new(dir.path());
        let resolved = resolver.resolve_plain("./util").unwrap();
        assert!(resolved.ends_with("util.ts"));
    }

    #[test]
    fn plain_resolution_exact_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.json"), "{}").unwrap();

        let resolver = Resolver::new(dir.path());
        let resolved = resolver.resolve_plain("./data.json").unwrap();
        assert!(resolved.ends_with("data.json"));
    }

    #[test]
    fn bare_specifier_fails_both_stages() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = Resolver::new(dir.path());
        assert!(resolver.resolve_declaration("lodash").is_err());
        assert!(resolver.resolve_plain("lodash").is_err());
    }

    #[test]
    fn custom_declaration_suffix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("api.d.mts"), "export {}").unwrap();

        let resolver = Resolver::new(dir.path()).with_declaration_suffix(".d.mts");
        assert!(resolver.resolve_declaration("./api").is_ok());
    }
}
