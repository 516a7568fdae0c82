//! Configuration file loading and validation.

use std::path::Path;

use crate::error::ConfigError;
use crate::types::{LoamConfig, SUPPORTED_COMPILERS};

/// Loads and validates a `loam.toml` configuration from a project directory.
///
/// Reads `<project_dir>/loam.toml`, parses it, and validates the compiler
/// selection and import settings.
pub fn load_config(project_dir: &Path) -> Result<LoamConfig, ConfigError> {
    let config_path = project_dir.join("loam.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `loam.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<LoamConfig, ConfigError> {
    let config: LoamConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &LoamConfig) -> Result<(), ConfigError> {
    if !SUPPORTED_COMPILERS.contains(&config.compiler.name.as_str()) {
        return Err(ConfigError::UnsupportedCompiler(
            config.compiler.name.clone(),
        ));
    }
    if config.cache.dir.is_empty() {
        return Err(ConfigError::Validation("cache.dir is empty".to_string()));
    }
    Ok(())
}
