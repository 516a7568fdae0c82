//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Validation is fail-safe and never produces these; they surface only from
/// explicit reads and writes, where the caller decides whether to recover
/// (a corrupt artifact becomes a recompile) or propagate.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A compiled artifact is missing its trailing sentinel: the process
    /// that wrote it was interrupted mid-write.
    #[error("corrupt cache artifact at {path}: missing integrity sentinel")]
    Corrupt {
        /// The artifact file path.
        path: PathBuf,
    },

    /// Another writer holds the advisory lock for this artifact pair.
    #[error("cache artifact locked at {path}")]
    Locked {
        /// The lock file path.
        path: PathBuf,
    },

    /// Metadata serialization failed.
    #[error("cache serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/tmp/cache/a.js__cache"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("a.js__cache"));
    }

    #[test]
    fn corrupt_display() {
        let err = CacheError::Corrupt {
            path: PathBuf::from("torn.js__cache"),
        };
        let msg = err.to_string();
        assert!(msg.contains("corrupt cache artifact"));
        assert!(msg.contains("missing integrity sentinel"));
    }

    #[test]
    fn locked_display() {
        let err = CacheError::Locked {
            path: PathBuf::from("a.js__info.json.lock"),
        };
        assert!(err.to_string().contains("locked"));
    }

    #[test]
    fn serialization_display() {
        let err = CacheError::Serialization {
            reason: "invalid utf-8".to_string(),
        };
        assert!(err.to_string().contains("invalid utf-8"));
    }
}
