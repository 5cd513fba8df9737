//! Query resolution: merging configured defaults with per-invocation overrides.

use crate::error::ConfigError;
use crate::loader::validate_extension;
use crate::types::DirstateConfig;
use std::path::PathBuf;

/// Values supplied for a single query, each taking precedence over the
/// configuration when present.
#[derive(Debug, Default, Clone)]
pub struct QueryOverrides {
    /// Overrides `latest.max_count`.
    pub max_count: Option<usize>,
    /// Overrides `latest.extension`.
    pub extension: Option<String>,
    /// Overrides `state.file`.
    pub state_file: Option<PathBuf>,
}

/// A fully resolved latest-files query with configuration and overrides merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    /// Maximum number of files to return; `0` means no limit.
    pub max_count: usize,
    /// Optional case-insensitive suffix filter.
    pub extension: Option<String>,
    /// State file recording the snapshot for the queried directory.
    pub state_file: PathBuf,
}

/// Resolves query parameters by overlaying `overrides` on top of `config`.
///
/// An overriding extension goes through the same validation as a configured one.
pub fn resolve_query(
    config: &DirstateConfig,
    overrides: &QueryOverrides,
) -> Result<ResolvedQuery, ConfigError> {
    let extension = match &overrides.extension {
        Some(ext) => {
            validate_extension("extension", ext)?;
            Some(ext.clone())
        }
        None => config.latest.extension.clone(),
    };

    let state_file = overrides
        .state_file
        .clone()
        .unwrap_or_else(|| config.state.file.clone());
    if state_file.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "state file".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    Ok(ResolvedQuery {
        max_count: overrides.max_count.unwrap_or(config.latest.max_count),
        extension,
        state_file,
    })
}
