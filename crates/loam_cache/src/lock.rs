//! Advisory lock files for artifact-pair writes.
//!
//! A writer acquires the lock before writing an artifact pair and releases
//! it when the [`LockFile`] drops, so the two files of a pair always come
//! from a single compiler run. Acquisition uses create-exclusive semantics;
//! a lock whose file is older than the stale threshold is assumed to belong
//! to a dead process and is broken.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::CacheError;

/// Time after which a held lock is considered abandoned.
const STALE_AFTER: Duration = Duration::from_secs(10);

/// Interval between acquisition retries when waiting.
const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Maximum number of acquisition attempts when waiting.
const MAX_ATTEMPTS: u32 = 200;

/// An acquired advisory lock, released (unlinked) on drop.
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
}

impl LockFile {
    /// Acquires the lock guarding the given artifact path.
    ///
    /// The lock file is the artifact path with `.lock` appended. With `wait`
    /// set, acquisition retries briefly before giving up; otherwise a held
    /// lock fails fast with [`CacheError::Locked`]. Stale locks are broken.
    pub fn acquire(target: &Path, wait: bool) -> Result<Self, CacheError> {
        let path = lock_path(target);
        let attempts = if wait { MAX_ATTEMPTS } else { 1 };
        let mut attempt = 0;
        let mut broke_stale = false;

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => {
                    debug!(lock = %path.display(), "lock acquired");
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if !broke_stale && is_stale(&path) {
                        warn!(lock = %path.display(), "breaking stale lock");
                        let _ = std::fs::remove_file(&path);
                        broke_stale = true;
                        continue;
                    }
                    attempt += 1;
                    if attempt >= attempts {
                        return Err(CacheError::Locked { path });
                    }
                    std::thread::sleep(RETRY_INTERVAL);
                }
                Err(e) => return Err(CacheError::Io { path, source: e }),
            }
        }
    }

    /// The lock file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// The lock file path guarding an artifact path.
pub fn lock_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

fn is_stale(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        // Lock vanished between the failed create and the stat; the next
        // attempt settles it.
        return false;
    };
    match metadata.modified().map(|m| m.elapsed()) {
        Ok(Ok(age)) => age > STALE_AFTER,
        _ => false,
    }
}
