//! The extension-interception entry point of the loam cache.
//!
//! Intercepts module loads for a managed source extension, decides cache-hit
//! versus recompile against [`loam_cache`], and wires the resulting text
//! back into the host module system. The host's extension table is modelled
//! explicitly ([`host::ExtensionHooks`]); registration hands back an owner
//! token so independent registrations cannot corrupt each other's
//! previous-handler chain.

#![warn(missing_docs)]

mod compiler;
mod error;
mod host;
mod pipeline;
mod registry;

pub use compiler::{install_compiler, CompileError, Compiler, CompilerKind};
pub use error::LoaderError;
pub use host::{ExtensionHooks, Handler, HandlerKind, ModuleUnit};
pub use pipeline::{LoadOutcome, LoadPipeline, PipelineOptions};
pub use registry::{register, unregister, RegisterOptions, Registration, DEFAULT_EXTENSIONS};
