//! File modification times for snapshot comparison and recency ordering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::fs::Metadata;
use std::time::{SystemTime, UNIX_EPOCH};

/// A file modification time in seconds since the Unix epoch.
///
/// Stored as a float at the platform's stat resolution so that it serializes
/// to a plain JSON number. Every mtime in the workspace goes through
/// [`Mtime::from_system_time`], which keeps the change-detection snapshot and
/// the sorted listing on the same representation. Equality is exact; there is
/// no tolerance for clock jitter.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mtime(f64);

impl Mtime {
    /// Creates an mtime from raw seconds since the epoch.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self(secs)
    }

    /// Converts a [`SystemTime`]. Times before the epoch become negative.
    pub fn from_system_time(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self(after.as_secs_f64()),
            Err(before) => Self(-before.duration().as_secs_f64()),
        }
    }

    /// Reads the modification time out of file metadata.
    pub fn from_metadata(metadata: &Metadata) -> std::io::Result<Self> {
        metadata.modified().map(Self::from_system_time)
    }

    /// Returns the raw seconds since the epoch.
    pub fn as_secs_f64(self) -> f64 {
        self.0
    }

    /// Orders newest first. Uses a total order so NaN cannot break sorting.
    pub fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.0.total_cmp(&a.0)
    }
}

impl fmt::Debug for Mtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mtime({})", self.0)
    }
}
