//! On-disk storage for cached compilations.
//!
//! Every cached source file owns an artifact pair inside the cache root: the
//! compiled text (terminated with an integrity sentinel) and a JSON metadata
//! record carrying the source's modification timestamp, the compiler
//! fingerprint, and the import lists surrounding the compilation. Reads are
//! fail-safe: missing or unparsable metadata is a cache miss, and a missing
//! sentinel is surfaced as corruption so the caller can recompile.

#![warn(missing_docs)]

mod error;
mod lock;
mod metadata;
mod sentinel;
mod store;

pub use error::CacheError;
pub use lock::LockFile;
pub use metadata::CacheMetadata;
pub use sentinel::{append_sentinel, has_sentinel, strip_sentinel, SENTINEL};
pub use store::{ArtifactPair, CacheStore};
