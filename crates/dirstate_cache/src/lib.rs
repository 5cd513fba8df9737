//! Directory change detection and a cache of most-recently-modified listings.
//!
//! A [`SnapshotStore`] records a recursive path-to-mtime [`Snapshot`] of a
//! directory in a state file and reports whether the directory has changed
//! since. A [`LatestFilesCache`] builds on it to serve "newest files in D"
//! queries from memory until the next detected change.

#![warn(missing_docs)]

pub mod error;
pub mod fsops;
pub mod latest;
pub mod snapshot;
pub mod store;

pub use error::CacheError;
pub use fsops::{ensure_dir, list_files, setup_directories};
pub use latest::{CacheStats, LatestFilesCache, LatestQuery};
pub use snapshot::{Snapshot, SnapshotDiff};
pub use store::{Refresh, SnapshotStore};
