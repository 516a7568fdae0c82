//! An explicit model of the host loader's extension table.
//!
//! A handler receives the module object and either fully loads it
//! (terminal) or delegates to a handler captured at install time
//! (non-terminal) — the same two-shape contract the host module system
//! gives every extension interceptor, so this loader composes with others.
//! Handlers carry a kind marker so ownership checks can work by reference
//! or by marker.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::LoaderError;

/// The module object a handler fills in during a load.
#[derive(Debug)]
pub struct ModuleUnit {
    path: PathBuf,
    loaded_source: Option<String>,
}

impl ModuleUnit {
    /// Creates an unloaded unit for the given module path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded_source: None,
        }
    }

    /// The module's file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Marks the module loaded with the given (compiled) source text.
    pub fn deliver(&mut self, text: impl Into<String>) {
        self.loaded_source = Some(text.into());
    }

    /// Whether a handler has loaded this module.
    pub fn is_loaded(&self) -> bool {
        self.loaded_source.is_some()
    }

    /// The loaded source text, if any.
    pub fn loaded_source(&self) -> Option<&str> {
        self.loaded_source.as_deref()
    }
}

/// Marker identifying who installed a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// The host's own base loader for already-compiled text.
    Base,
    /// Installed by the external compiler's registration.
    CompilerOwned,
    /// Installed by this crate's caching loader.
    CacheOwned,
    /// Installed by some other interceptor.
    Foreign,
}

type HookFn = dyn Fn(&mut ModuleUnit) -> Result<(), LoaderError>;

/// An installed extension handler.
pub struct Handler {
    kind: HandlerKind,
    hook: Box<HookFn>,
}

impl Handler {
    /// Creates a handler with the given ownership marker.
    pub fn new(
        kind: HandlerKind,
        hook: impl Fn(&mut ModuleUnit) -> Result<(), LoaderError> + 'static,
    ) -> Rc<Self> {
        Rc::new(Self {
            kind,
            hook: Box::new(hook),
        })
    }

    /// The ownership marker.
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// Invokes the handler on a module unit.
    pub fn call(&self, unit: &mut ModuleUnit) -> Result<(), LoaderError> {
        (self.hook)(unit)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler").field("kind", &self.kind).finish()
    }
}

/// The host loader's per-extension handler table.
///
/// Extensions are keyed with their leading dot (`.ts`). Paths whose
/// extension has no installed handler fall through to the base loader,
/// which links the file's on-disk text as-is.
pub struct ExtensionHooks {
    handlers: HashMap<String, Rc<Handler>>,
    base: Rc<Handler>,
}

impl ExtensionHooks {
    /// Creates an empty table with the default base loader.
    pub fn new() -> Self {
        let base = Handler::new(HandlerKind::Base, |unit| {
            let path = unit.path().to_path_buf();
            let text = std::fs::read_to_string(&path).map_err(|e| LoaderError::Load {
                path,
                reason: e.to_string(),
            })?;
            unit.deliver(text);
            Ok(())
        });
        Self {
            handlers: HashMap::new(),
            base,
        }
    }

    /// Installs a handler for an extension, returning the displaced one.
    pub fn install(&mut self, extension: &str, handler: Rc<Handler>) -> Option<Rc<Handler>> {
        self.handlers.insert(extension.to_string(), handler)
    }

    /// Removes and returns the handler for an extension.
    pub fn take(&mut self, extension: &str) -> Option<Rc<Handler>> {
        self.handlers.remove(extension)
    }

    /// The currently installed handler for an extension, if any.
    pub fn current(&self, extension: &str) -> Option<Rc<Handler>> {
        self.handlers.get(extension).cloned()
    }

    /// The base loader for already-compiled text.
    pub fn base_loader(&self) -> Rc<Handler> {
        Rc::clone(&self.base)
    }

    /// Loads a module by dispatching on its path extension.
    ///
    /// An installed handler must either load the unit or fail; a handler
    /// that returns without loading is a load error.
    pub fn load(&self, path: &Path) -> Result<ModuleUnit, LoaderError> {
        let mut unit = ModuleUnit::new(path);
        let handler = extension_of(path)
            .and_then(|ext| self.current(&ext))
            .unwrap_or_else(|| self.base_loader());

        handler.call(&mut unit)?;

        if unit.is_loaded() {
            Ok(unit)
        } else {
            Err(LoaderError::Load {
                path: path.to_path_buf(),
                reason: "handler did not load the module".to_string(),
            })
        }
    }
}

impl Default for ExtensionHooks {
    fn default() -> Self {
        Self::new()
    }
}

/// The path's extension with its leading dot, e.g. `.ts`.
fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_loader_links_on_disk_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.js");
        std::fs::write(&path, "var x = 1;").unwrap();

        let hooks = ExtensionHooks::new();
        let unit = hooks.load(&path).unwrap();
        assert_eq!(unit.loaded_source(), Some("var x = 1;"));
    }

    #[test]
    fn installed_handler_intercepts_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mod.ts");
        std::fs::write(&path, "let x = 1;").unwrap();

        let mut hooks = ExtensionHooks::new();
        hooks.install(
            ".ts",
            Handler::new(HandlerKind::Foreign, |unit| {
                unit.deliver("intercepted");
                Ok(())
            }),
        );

        let unit = hooks.load(&path).unwrap();
        assert_eq!(unit.loaded_source(), Some("intercepted"));
    }

    #[test]
    fn handler_that_does_not_load_is_an_error() {
        let mut hooks = ExtensionHooks::new();
        hooks.install(".ts", Handler::new(HandlerKind::Foreign, |_| Ok(())));

        let err = hooks.load(Path::new("whatever.ts")).unwrap_err();
        assert!(matches!(err, LoaderError::Load { .. }));
    }

    #[test]
    fn install_returns_displaced_handler() {
        let mut hooks = ExtensionHooks::new();
        let first = Handler::new(HandlerKind::Foreign, |_| Ok(()));
        assert!(hooks.install(".ts", Rc::clone(&first)).is_none());

        let second = Handler::new(HandlerKind::CacheOwned, |_| Ok(()));
        let displaced = hooks.install(".ts", second).unwrap();
        assert!(Rc::ptr_eq(&displaced, &first));
    }

    #[test]
    fn take_clears_the_hook() {
        let mut hooks = ExtensionHooks::new();
        hooks.install(".ts", Handler::new(HandlerKind::Foreign, |_| Ok(())));
        assert!(hooks.take(".ts").is_some());
        assert!(hooks.current(".ts").is_none());
    }

    #[test]
    fn base_loader_missing_file_errors() {
        let hooks = ExtensionHooks::new();
        let err = hooks.load(Path::new("/nonexistent/plain.js")).unwrap_err();
        assert!(matches!(err, LoaderError::Load { .. }));
    }

    #[test]
    fn handler_kind_markers() {
        let handler = Handler::new(HandlerKind::CacheOwned, |_| Ok(()));
        assert_eq!(handler.kind(), HandlerKind::CacheOwned);
    }
}
