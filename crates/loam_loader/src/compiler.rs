//! The compiler seam.
//!
//! The actual transpiler is a black box behind the [`Compiler`] trait; this
//! loader only invokes it and fingerprints it. [`install_compiler`] models
//! the external compiler's own registration, which claims the managed
//! extension hooks for itself — the registry reclaims them afterward to
//! interpose the cache check.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::LoaderError;
use crate::host::{ExtensionHooks, Handler, HandlerKind};

/// The closed set of compiler module identifiers the loader supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerKind {
    /// The reference TypeScript compiler.
    Typescript,
    /// The transformer-plugin fork of the TypeScript compiler.
    Ttypescript,
    /// The SWC transpiler.
    Swc,
}

impl CompilerKind {
    /// Parses a configured compiler name.
    pub fn parse(name: &str) -> Result<Self, LoaderError> {
        match name {
            "typescript" => Ok(Self::Typescript),
            "ttypescript" => Ok(Self::Ttypescript),
            "swc" => Ok(Self::Swc),
            other => Err(LoaderError::UnsupportedCompiler(other.to_string())),
        }
    }

    /// The canonical configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Typescript => "typescript",
            Self::Ttypescript => "ttypescript",
            Self::Swc => "swc",
        }
    }
}

impl std::fmt::Display for CompilerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed compilation, propagated verbatim to the load caller.
#[derive(Debug, thiserror::Error)]
#[error("compilation of {path} failed: {message}")]
pub struct CompileError {
    /// The source file being compiled.
    pub path: PathBuf,
    /// The compiler's failure message.
    pub message: String,
}

/// The external source-to-source compiler.
pub trait Compiler {
    /// The compiler module identifier, e.g. `typescript`.
    fn name(&self) -> &str;

    /// The compiler's version string.
    fn version(&self) -> &str;

    /// Compiles source text for the given file path.
    fn compile(&self, source: &str, path: &Path) -> Result<String, CompileError>;

    /// The compiler-identity fingerprint stored with every cache entry,
    /// `<name>@<version>`.
    fn fingerprint(&self) -> String {
        format!("{}@{}", self.name(), self.version())
    }
}

/// Performs the compiler's own hook-claiming registration.
///
/// Installs, for every managed extension, a handler that reads the module
/// source, compiles it, and links the result. Returns the installed handler
/// so the caller can capture it before overwriting the hooks.
pub fn install_compiler(
    hooks: &mut ExtensionHooks,
    compiler: &Rc<dyn Compiler>,
    extensions: &[String],
) -> Rc<Handler> {
    let compiler = Rc::clone(compiler);
    let handler = Handler::new(HandlerKind::CompilerOwned, move |unit| {
        let path = unit.path().to_path_buf();
        let source = std::fs::read_to_string(&path).map_err(|e| LoaderError::Load {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let compiled = compiler.compile(&source, &path)?;
        unit.deliver(compiled);
        Ok(())
    });

    for extension in extensions {
        hooks.install(extension, Rc::clone(&handler));
    }
    handler
}
