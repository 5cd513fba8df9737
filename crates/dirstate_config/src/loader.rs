//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::DirstateConfig;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE: &str = "dirstate.toml";

/// Loads and validates `<project_dir>/dirstate.toml`.
pub fn load_config(project_dir: &Path) -> Result<DirstateConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<DirstateConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Loads `<project_dir>/dirstate.toml`, or returns defaults if the file is absent.
///
/// A file that exists but fails to read, parse, or validate is still an error.
pub fn load_config_or_default(project_dir: &Path) -> Result<DirstateConfig, ConfigError> {
    let path = project_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(DirstateConfig::default());
    }
    load_config_file(&path)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<DirstateConfig, ConfigError> {
    let config: DirstateConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configured paths and filters are usable.
fn validate_config(config: &DirstateConfig) -> Result<(), ConfigError> {
    if config.state.file.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "state.file".to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if let Some(ext) = &config.latest.extension {
        validate_extension("latest.extension", ext)?;
    }
    for (name, path) in &config.directories {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("directories.{name}"),
                reason: "must not be empty".to_string(),
            });
        }
    }
    Ok(())
}

/// Checks that an extension filter is a non-empty suffix starting with `.`.
pub(crate) fn validate_extension(field: &str, ext: &str) -> Result<(), ConfigError> {
    if ext.len() < 2 || !ext.starts_with('.') {
        return Err(ConfigError::ValidationError {
            field: field.to_string(),
            reason: format!("'{ext}' must start with '.' and name a suffix"),
        });
    }
    Ok(())
}
