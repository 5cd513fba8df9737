//! Error types for snapshot and cache operations.

use std::path::PathBuf;

/// Errors that can occur during snapshot and cache operations.
///
/// Every failure is surfaced to the caller: an unreadable directory, an
/// unparseable state file, or an inconsistent cache never degrades into a
/// silent "changed" or an empty listing.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading a directory or a state file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A recursive directory walk failed.
    #[error("failed to walk {path}: {source}")]
    Walk {
        /// The root of the walk.
        path: PathBuf,
        /// The underlying walk error.
        source: walkdir::Error,
    },

    /// The state file exists but does not hold a valid snapshot.
    #[error("failed to parse state file {path}: {reason}")]
    StateParse {
        /// The state file path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A snapshot could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// A glob pattern could not be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Description of the pattern error.
        reason: String,
    },

    /// The state file reports no change but no listing is cached for the directory.
    ///
    /// Reachable when a state file was written by another process or a
    /// previous run of this one.
    #[error("cache miss on clean state for {directory}")]
    CacheMissOnCleanState {
        /// The directory that was queried.
        directory: PathBuf,
    },
}

impl CacheError {
    /// Wraps an I/O error with the path it occurred at.
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| CacheError::Io { path, source }
    }
}
