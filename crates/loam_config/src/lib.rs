//! Registration configuration for the loam loader.
//!
//! Parses `loam.toml` into typed configuration: the cache directory, the
//! compiler selection, and the import-tracking knobs. Every field has a
//! default so registration works without a configuration file at all.

#![warn(missing_docs)]

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::{CacheSection, CompilerSection, ImportSection, LoamConfig};
