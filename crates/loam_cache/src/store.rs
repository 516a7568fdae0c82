//! The artifact-pair store.
//!
//! Maps each source file to two sibling files inside the cache root:
//! `<hash8>_<stem>.js__cache` (compiled text plus trailing sentinel) and
//! `<hash8>_<stem>.js__info.json` (serialized [`CacheMetadata`]). The hash
//! comes from the source's path, the stem from its sanitized base name.
//! Writes go through a temp file and rename while holding the advisory
//! lock, so a reader never observes a torn pair.

use std::path::{Path, PathBuf};

use loam_common::{hash_path, mtime_iso};
use tracing::debug;

use crate::error::CacheError;
use crate::lock::LockFile;
use crate::metadata::CacheMetadata;
use crate::sentinel::{append_sentinel, strip_sentinel};

/// The two on-disk files caching one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPair {
    /// Path of the compiled-text artifact.
    pub compiled: PathBuf,
    /// Path of the metadata artifact.
    pub metadata: PathBuf,
}

/// On-disk store for compiled artifacts keyed by source path.
///
/// The store exclusively owns the files under its root; callers interact
/// only through [`is_valid`](CacheStore::is_valid),
/// [`read`](CacheStore::read), and [`write`](CacheStore::write).
pub struct CacheStore {
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Opens a store rooted at the given directory, creating it recursively
    /// on first use.
    pub fn new(cache_dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(cache_dir).map_err(|e| CacheError::Io {
            path: cache_dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            cache_dir: cache_dir.to_path_buf(),
        })
    }

    /// The cache root directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Computes the artifact pair for a source path.
    ///
    /// The same absolute path always yields the same pair; different paths
    /// yield different pairs with overwhelming probability (the hash is not
    /// collision-free, the stem disambiguates in practice).
    pub fn artifact_pair(&self, source: &Path) -> ArtifactPair {
        let key = hash_path(source);
        let stem = sanitized_stem(source);
        ArtifactPair {
            compiled: self.cache_dir.join(format!("{key}_{stem}.js__cache")),
            metadata: self.cache_dir.join(format!("{key}_{stem}.js__info.json")),
        }
    }

    /// Whether a valid cached compilation exists for the source.
    ///
    /// Valid means: the metadata artifact exists and parses, its stored
    /// modification timestamp exactly equals the source's current one, its
    /// transpile-only flag and compiler fingerprint match the current
    /// settings, and the compiled artifact file exists. Any error statting
    /// the source means the entry cannot be validated; this never errors.
    pub fn is_valid(&self, source: &Path, fingerprint: &str, transpile_only: bool) -> bool {
        let current_mtime = match mtime_iso(source) {
            Ok(iso) => iso,
            Err(e) => {
                debug!(source = %source.display(), error = %e, "cannot stat source, skipping cache");
                return false;
            }
        };

        let pair = self.artifact_pair(source);
        let Some(meta) = CacheMetadata::load(&pair.metadata) else {
            return false;
        };

        meta.mtime_iso == current_mtime
            && meta.transpile_only == transpile_only
            && meta.fingerprint() == fingerprint
            && pair.compiled.is_file()
    }

    /// Reads the cached compiled text for a source, stripping the sentinel.
    ///
    /// A missing sentinel means the writing process was interrupted; the
    /// artifact is surfaced as [`CacheError::Corrupt`] rather than served.
    pub fn read(&self, source: &Path) -> Result<String, CacheError> {
        let pair = self.artifact_pair(source);
        let stored = std::fs::read_to_string(&pair.compiled).map_err(|e| CacheError::Io {
            path: pair.compiled.clone(),
            source: e,
        })?;
        match strip_sentinel(&stored) {
            Some(text) => Ok(text.to_string()),
            None => Err(CacheError::Corrupt {
                path: pair.compiled,
            }),
        }
    }

    /// Writes a new cache entry: compiled text (sentinel appended) and its
    /// metadata record.
    ///
    /// Both files are written via temp-and-rename while the artifact pair's
    /// advisory lock is held, serializing concurrent writers.
    pub fn write(
        &self,
        source: &Path,
        compiled_text: &str,
        metadata: &CacheMetadata,
    ) -> Result<(), CacheError> {
        let pair = self.artifact_pair(source);
        let _lock = LockFile::acquire(&pair.metadata, true)?;

        atomic_write(&pair.compiled, append_sentinel(compiled_text).as_bytes())?;

        let json =
            serde_json::to_string_pretty(metadata).map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;
        atomic_write(&pair.metadata, json.as_bytes())?;

        debug!(source = %source.display(), artifact = %pair.compiled.display(), "cache entry written");
        Ok(())
    }
}

/// The source's base name without extension, restricted to filename-safe
/// characters.
fn sanitized_stem(source: &Path) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module");
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Writes through a sibling temp file and renames into place, so readers
/// see either the old content or the new, never a partial write.
fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, bytes).map_err(|e| CacheError::Io {
        path: tmp.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp, path).map_err(|e| CacheError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_imports::ImportRecord;

    fn make_store() -> (tempfile::TempDir, CacheStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(&dir.path().join("cache")).unwrap();
        (dir, store)
    }

    fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn metadata_for(source: &Path) -> CacheMetadata {
        CacheMetadata {
            source_path: source.to_path_buf(),
            mtime_iso: mtime_iso(source).unwrap(),
            compiler: "typescript".to_string(),
            compiler_version: "5.5.4".to_string(),
            transpile_only: false,
            track_imports: true,
            scan_limit: 5000,
            imports_before: vec![ImportRecord::new("./x")],
            imports_after: vec![],
        }
    }

    const FINGERPRINT: &str = "typescript@5.5.4";

    #[test]
    fn new_creates_cache_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("deeply").join("nested").join("cache");
        CacheStore::new(&root).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn artifact_pair_is_stable_and_distinct() {
        let (_dir, store) = make_store();
        let a1 = store.artifact_pair(Path::new("/src/main.ts"));
        let a2 = store.artifact_pair(Path::new("/src/main.ts"));
        let b = store.artifact_pair(Path::new("/lib/main.ts"));
        assert_eq!(a1, a2);
        assert_ne!(a1, b, "same stem, different path, different key");
    }

    #[test]
    fn artifact_pair_naming() {
        let (_dir, store) = make_store();
        let pair = store.artifact_pair(Path::new("/src/my module.ts"));
        let name = pair.compiled.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with("_my_module.js__cache"), "got {name}");
        let info = pair.metadata.file_name().unwrap().to_str().unwrap();
        assert!(info.ends_with("_my_module.js__info.json"), "got {info}");
    }

    #[test]
    fn write_then_read_roundtrip() {
        let (dir, store) = make_store();
        let source = write_source(dir.path(), "a.ts", "let x: number = 1;");

        store
            .write(&source, "var x = 1;", &metadata_for(&source))
            .unwrap();

        assert!(store.is_valid(&source, FINGERPRINT, false));
        assert_eq!(store.read(&source).unwrap(), "var x = 1;");
    }

    #[test]
    fn invalid_when_metadata_missing() {
        let (dir, store) = make_store();
        let source = write_source(dir.path(), "a.ts", "let x = 1;");
        assert!(!store.is_valid(&source, FINGERPRINT, false));
    }

    #[test]
    fn invalid_when_metadata_unparsable() {
        let (dir, store) = make_store();
        let source = write_source(dir.path(), "a.ts", "let x = 1;");
        let pair = store.artifact_pair(&source);
        std::fs::write(&pair.metadata, "garbage {{{").unwrap();
        std::fs::write(&pair.compiled, append_sentinel("var x = 1;")).unwrap();
        assert!(!store.is_valid(&source, FINGERPRINT, false));
    }

    #[test]
    fn invalid_when_mtime_differs() {
        let (dir, store) = make_store();
        let source = write_source(dir.path(), "a.ts", "let x = 1;");
        store
            .write(&source, "var x = 1;", &metadata_for(&source))
            .unwrap();

        // Bump the source's modification time by any amount.
        let later = std::time::SystemTime::now() + std::time::Duration::from_secs(7);
        let file = std::fs::OpenOptions::new().write(true).open(&source).unwrap();
        file.set_modified(later).unwrap();
        drop(file);

        assert!(!store.is_valid(&source, FINGERPRINT, false));
    }

    #[test]
    fn invalid_when_transpile_only_flag_differs() {
        let (dir, store) = make_store();
        let source = write_source(dir.path(), "a.ts", "let x = 1;");
        store
            .write(&source, "var x = 1;", &metadata_for(&source))
            .unwrap();
        assert!(!store.is_valid(&source, FINGERPRINT, true));
    }

    #[test]
    fn invalid_when_fingerprint_differs() {
        let (dir, store) = make_store();
        let source = write_source(dir.path(), "a.ts", "let x = 1;");
        store
            .write(&source, "var x = 1;", &metadata_for(&source))
            .unwrap();
        assert!(!store.is_valid(&source, "swc@1.2.143", false));
    }

    #[test]
    fn invalid_when_compiled_artifact_missing() {
        let (dir, store) = make_store();
        let source = write_source(dir.path(), "a.ts", "let x = 1;");
        store
            .write(&source, "var x = 1;", &metadata_for(&source))
            .unwrap();
        std::fs::remove_file(store.artifact_pair(&source).compiled).unwrap();
        assert!(!store.is_valid(&source, FINGERPRINT, false));
    }

    #[test]
    fn invalid_when_source_unstattable() {
        let (_dir, store) = make_store();
        assert!(!store.is_valid(Path::new("/nonexistent/a.ts"), FINGERPRINT, false));
    }

    #[test]
    fn read_torn_artifact_is_corrupt() {
        let (dir, store) = make_store();
        let source = write_source(dir.path(), "a.ts", "let x = 1;");
        let pair = store.artifact_pair(&source);
        // Simulate an interrupted writer: no sentinel.
        std::fs::write(&pair.compiled, "var x = 1;").unwrap();

        let err = store.read(&source).unwrap_err();
        assert!(matches!(err, CacheError::Corrupt { .. }));
    }

    #[test]
    fn read_missing_artifact_is_io_error() {
        let (dir, store) = make_store();
        let source = write_source(dir.path(), "a.ts", "let x = 1;");
        let err = store.read(&source).unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }

    #[test]
    fn overwrite_replaces_entry() {
        let (dir, store) = make_store();
        let source = write_source(dir.path(), "a.ts", "let x = 1;");
        store
            .write(&source, "var x = 1;", &metadata_for(&source))
            .unwrap();
        store
            .write(&source, "var x = 2;", &metadata_for(&source))
            .unwrap();
        assert_eq!(store.read(&source).unwrap(), "var x = 2;");
    }

    #[test]
    fn write_blocked_by_held_lock() {
        let (dir, store) = make_store();
        let source = write_source(dir.path(), "a.ts", "let x = 1;");
        let pair = store.artifact_pair(&source);

        // A concurrent writer holds the pair's lock; our write waits, then
        // gives up. Holding it for longer than the full retry window is
        // impractical in a test, so assert exclusion via the fast path.
        let held = LockFile::acquire(&pair.metadata, false).unwrap();
        let second = LockFile::acquire(&pair.metadata, false);
        assert!(matches!(second, Err(CacheError::Locked { .. })));
        drop(held);

        store
            .write(&source, "var x = 1;", &metadata_for(&source))
            .unwrap();
    }

    #[test]
    fn no_temp_files_left_behind() {
        let (dir, store) = make_store();
        let source = write_source(dir.path(), "a.ts", "let x = 1;");
        store
            .write(&source, "var x = 1;", &metadata_for(&source))
            .unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(store.cache_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
