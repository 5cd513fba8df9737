//! Configuration types deserialized from `dirstate.toml`.

use dirstate_common::DEFAULT_STATE_FILE;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The top-level configuration parsed from `dirstate.toml`.
///
/// Every section is optional; an empty file yields the same values as
/// [`DirstateConfig::default`].
#[derive(Debug, Default, Deserialize)]
pub struct DirstateConfig {
    /// Where snapshots are persisted.
    #[serde(default)]
    pub state: StateConfig,
    /// Defaults for latest-files queries.
    #[serde(default)]
    pub latest: LatestConfig,
    /// Named directories ensured by `dirstate setup`.
    #[serde(default)]
    pub directories: BTreeMap<String, PathBuf>,
}

/// State file settings.
#[derive(Debug, Deserialize)]
pub struct StateConfig {
    /// Path of the state file holding the last recorded snapshot.
    #[serde(default = "default_state_file")]
    pub file: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            file: default_state_file(),
        }
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

/// Default parameters for latest-files queries.
#[derive(Debug, Default, Deserialize)]
pub struct LatestConfig {
    /// Maximum number of files to return; `0` means no limit.
    #[serde(default)]
    pub max_count: usize,
    /// Only return files whose name ends with this suffix (case-insensitive).
    #[serde(default)]
    pub extension: Option<String>,
}
