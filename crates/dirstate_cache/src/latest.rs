//! Cache of "most recently modified files" listings.
//!
//! The `LatestFilesCache` type answers "the N newest files directly inside
//! directory D" and keeps each sorted listing in memory. A listing is reused
//! for as long as the recursive snapshot of D matches its state file. Any
//! change anywhere under D, even in a subdirectory, triggers a fresh top-level
//! listing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use dirstate_common::{Mtime, DEFAULT_STATE_FILE};

use crate::error::CacheError;
use crate::snapshot::regular_file_mtime;
use crate::store::{Refresh, SnapshotStore};

/// Parameters for [`LatestFilesCache::get_latest_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestQuery {
    /// Maximum number of paths to return; `0` means no limit.
    pub max_count: usize,

    /// Only keep files whose name ends with this suffix, compared case-insensitively.
    pub extension: Option<String>,

    /// State file recording the snapshot for the queried directory.
    pub state_file: PathBuf,
}

impl Default for LatestQuery {
    fn default() -> Self {
        Self {
            max_count: 0,
            extension: None,
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}

impl LatestQuery {
    /// Limits the result to the `max_count` newest files.
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    /// Filters by file-name suffix.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Uses `state_file` for change detection.
    pub fn with_state_file(mut self, state_file: impl Into<PathBuf>) -> Self {
        self.state_file = state_file.into();
        self
    }
}

/// Counters describing how queries were served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total calls to `get_latest_files`.
    pub queries: usize,

    /// Queries answered from a cached listing.
    pub hits: usize,

    /// Top-level directory enumerations performed.
    pub listings: usize,

    /// Queries where the state file was (re)written.
    pub refreshes: usize,
}

#[derive(Debug, Clone)]
struct ListedFile {
    path: PathBuf,
    mtime: Mtime,
}

/// Sorted listing of a directory's immediate files, newest first.
#[derive(Debug)]
struct CacheEntry {
    files: Vec<ListedFile>,

    /// Lower-cased filter the listing was built with.
    extension: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<PathBuf, CacheEntry>,
    stats: CacheStats,
}

/// Process-lifetime cache of sorted file listings, keyed by directory.
///
/// Each query runs detect, list, and store under one lock, so a shared
/// instance is safe to use from several threads. Separate instances or
/// processes writing the same state file still race, and the last writer
/// wins. Entries are never evicted.
#[derive(Debug, Default)]
pub struct LatestFilesCache {
    store: SnapshotStore,
    inner: Mutex<Inner>,
    rebuild_on_miss: bool,
}

impl LatestFilesCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists the directory instead of failing with
    /// [`CacheError::CacheMissOnCleanState`] when a state file written
    /// elsewhere reports no change but nothing is cached yet.
    pub fn with_rebuild_on_miss(mut self, rebuild: bool) -> Self {
        self.rebuild_on_miss = rebuild;
        self
    }

    /// The snapshot store used for change detection.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Current query counters.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// Number of directories with a cached listing.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the immediate regular files of `directory`, newest first.
    ///
    /// The listing is recomputed when the recursive snapshot of `directory`
    /// differs from `query.state_file` (or no state file exists), and the new
    /// snapshot is persisted. Otherwise the cached listing is returned without
    /// touching the directory's top level. A cached listing built with a
    /// different extension filter is rebuilt for the requested one.
    ///
    /// Ties in mtime are broken by path, ascending. Returned paths are
    /// `directory` joined with each file name.
    pub fn get_latest_files(
        &self,
        directory: &Path,
        query: &LatestQuery,
    ) -> Result<Vec<PathBuf>, CacheError> {
        let mut guard = self.lock();
        let Inner { entries, stats } = &mut *guard;
        stats.queries += 1;

        let filter = query.extension.as_deref().map(str::to_lowercase);
        let refresh = self.store.refresh_if_changed(directory, &query.state_file)?;
        if refresh.is_changed() {
            stats.refreshes += 1;
        }

        let rebuild = match (&refresh, entries.get(directory)) {
            (Refresh::Unchanged, Some(entry)) if entry.extension == filter => {
                tracing::debug!("using cached listing for {}", directory.display());
                stats.hits += 1;
                false
            }
            (Refresh::Unchanged, Some(_)) => {
                tracing::debug!(
                    "extension filter changed for {}, relisting",
                    directory.display()
                );
                true
            }
            (Refresh::Unchanged, None) if self.rebuild_on_miss => {
                tracing::debug!(
                    "no cached listing for clean {}, relisting",
                    directory.display()
                );
                true
            }
            (Refresh::Unchanged, None) => {
                return Err(CacheError::CacheMissOnCleanState {
                    directory: directory.to_path_buf(),
                });
            }
            (_, _) => {
                tracing::info!("{} has changed, updating cache", directory.display());
                true
            }
        };

        if rebuild {
            let listed = list_newest_first(directory, filter.as_deref());
            store_listing(entries, directory, filter, listed)?;
            stats.listings += 1;
        }

        let entry = entries
            .get(directory)
            .ok_or_else(|| CacheError::CacheMissOnCleanState {
                directory: directory.to_path_buf(),
            })?;
        let limit = match query.max_count {
            0 => usize::MAX,
            n => n,
        };
        Ok(entry
            .files
            .iter()
            .take(limit)
            .map(|f| f.path.clone())
            .collect())
    }
}

/// Replaces the cached listing for `directory` with `listed`.
///
/// The state file has already been rewritten by the time a listing runs, so
/// a failed listing must not leave the previous entry behind: the next query
/// would see a clean state and serve it.
fn store_listing(
    entries: &mut HashMap<PathBuf, CacheEntry>,
    directory: &Path,
    extension: Option<String>,
    listed: Result<Vec<ListedFile>, CacheError>,
) -> Result<(), CacheError> {
    match listed {
        Ok(files) => {
            entries.insert(directory.to_path_buf(), CacheEntry { files, extension });
            Ok(())
        }
        Err(e) => {
            if entries.remove(directory).is_some() {
                tracing::warn!(
                    "listing {} failed, dropped cached entry",
                    directory.display()
                );
            }
            Err(e)
        }
    }
}

/// Enumerates the immediate regular files of `directory`, optionally keeping
/// only names ending in the lower-cased `filter`, sorted newest first.
fn list_newest_first(
    directory: &Path,
    filter: Option<&str>,
) -> Result<Vec<ListedFile>, CacheError> {
    let mut files = Vec::new();
    let entries = std::fs::read_dir(directory).map_err(CacheError::io(directory))?;
    for entry in entries {
        let entry = entry.map_err(CacheError::io(directory))?;
        if let Some(suffix) = filter {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if !name.ends_with(suffix) {
                continue;
            }
        }
        let path = entry.path();
        if let Some(mtime) = regular_file_mtime(&path)? {
            files.push(ListedFile { path, mtime });
        }
    }
    files.sort_by(|a, b| {
        Mtime::newest_first(&a.mtime, &b.mtime).then_with(|| a.path.cmp(&b.path))
    });
    Ok(files)
}
