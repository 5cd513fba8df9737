//! Shared foundational types used across the dirstate workspace.
//!
//! This crate provides the modification-time representation shared by the
//! snapshot walk, the latest-files listing, and the persisted state file.

#![warn(missing_docs)]

pub mod mtime;

pub use mtime::Mtime;

/// State file used when neither the caller nor the configuration names one.
pub const DEFAULT_STATE_FILE: &str = "directory_state.json";
