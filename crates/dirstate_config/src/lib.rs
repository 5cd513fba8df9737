//! Parsing and validation of `dirstate.toml` configuration files.
//!
//! This crate reads the optional configuration file and produces a strongly-typed
//! [`DirstateConfig`], and merges it with per-invocation overrides into a
//! [`ResolvedQuery`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, load_config_or_default};
pub use resolve::{resolve_query, QueryOverrides, ResolvedQuery};
pub use types::*;
