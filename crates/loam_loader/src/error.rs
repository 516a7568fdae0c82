//! Error types for registration and module loading.

use std::path::PathBuf;

use crate::compiler::CompileError;

/// Errors raised by registration, unregistration, and module loading.
///
/// Transient cache problems never surface here; the pipeline recovers from
/// them by recompiling. These are configuration errors and genuine load
/// failures.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The extension hook is already owned by an unrecognized handler.
    #[error("handler for extension '{extension}' is already defined")]
    ExtensionOwned {
        /// The contested extension, e.g. `.ts`.
        extension: String,
    },

    /// Unregistration was requested while this loader is not installed.
    #[error("cannot unregister: current handler for '{extension}' is not the loam loader")]
    NotInstalled {
        /// The extension whose handler is foreign.
        extension: String,
    },

    /// Registration was given an empty managed-extension list.
    #[error("no managed extensions configured")]
    NoExtensions,

    /// The configured compiler name is outside the supported set.
    #[error("unsupported compiler '{0}'")]
    UnsupportedCompiler(String),

    /// The external compiler failed; propagated verbatim.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Opening the cache store failed at registration.
    #[error(transparent)]
    Cache(#[from] loam_cache::CacheError),

    /// A module could not be loaded.
    #[error("failed to load {path}: {reason}")]
    Load {
        /// The module path.
        path: PathBuf,
        /// Why loading failed.
        reason: String,
    },
}
