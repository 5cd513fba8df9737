//! Change detection against a persisted snapshot.
//!
//! The [`SnapshotStore`] compares a fresh recursive [`Snapshot`] of a
//! directory with the one recorded in a caller-chosen state file, and rewrites
//! the state file when they differ.
//!
//! The store holds no locks. Two callers sharing a state file can both observe
//! a change and both write it; the last write wins.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::CacheError;
use crate::snapshot::{Snapshot, SnapshotDiff};

/// Outcome of [`SnapshotStore::refresh_if_changed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    /// No state file existed; one was written from the current snapshot.
    Initialized,
    /// The directory differed from the recorded state, which was overwritten.
    Changed(SnapshotDiff),
    /// The directory matches the recorded state.
    Unchanged,
}

impl Refresh {
    /// Returns `true` for [`Refresh::Initialized`] and [`Refresh::Changed`].
    pub fn is_changed(&self) -> bool {
        !matches!(self, Refresh::Unchanged)
    }
}

/// Detects directory changes by snapshot comparison and persists new snapshots.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    walks: AtomicUsize,
}

impl SnapshotStore {
    /// Creates a new store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recursive directory walks performed so far.
    pub fn walks(&self) -> usize {
        self.walks.load(Ordering::Relaxed)
    }

    /// Captures `directory`, leaving out `state_file` when it lives inside
    /// the tree so that writing it doesn't register as a change.
    ///
    /// Snapshot keys keep the directory's spelling (`..`, symlinks), so the
    /// state file is matched by canonical location rather than by string.
    fn capture(&self, directory: &Path, state_file: &Path) -> Result<Snapshot, CacheError> {
        self.walks.fetch_add(1, Ordering::Relaxed);
        let mut snapshot = Snapshot::capture(directory)?;
        let Some(target) = canonical_location(state_file) else {
            return Ok(snapshot);
        };
        let matches: Vec<String> = snapshot
            .iter()
            .map(|(path, _)| path)
            .filter(|path| Path::new(path).file_name() == target.file_name())
            .filter(|path| canonical_location(Path::new(path)).as_deref() == Some(&*target))
            .map(str::to_string)
            .collect();
        for path in matches {
            tracing::debug!("excluding state file {path} from snapshot");
            snapshot.remove(&path);
        }
        Ok(snapshot)
    }

    /// Reports whether `directory` differs from the snapshot in `state_file`.
    ///
    /// A missing state file counts as changed, and nothing is written in that
    /// case. Otherwise, if the fresh snapshot differs, it overwrites
    /// `state_file`.
    pub fn has_changed(&self, directory: &Path, state_file: &Path) -> Result<bool, CacheError> {
        let Some(previous) = Snapshot::load(state_file)? else {
            tracing::debug!("no state file at {}", state_file.display());
            return Ok(true);
        };
        let current = self.capture(directory, state_file)?;
        if current == previous {
            return Ok(false);
        }
        log_diff(directory, &current.diff(&previous));
        current.save(state_file)?;
        Ok(true)
    }

    /// Compares `directory` with `state_file` and persists the fresh snapshot
    /// whenever it differs, including when no state file exists yet.
    ///
    /// This is the detect-and-write step used by the latest-files cache, so a
    /// first query leaves behind a state file the next query can match.
    pub fn refresh_if_changed(
        &self,
        directory: &Path,
        state_file: &Path,
    ) -> Result<Refresh, CacheError> {
        let previous = Snapshot::load(state_file)?;
        let current = self.capture(directory, state_file)?;
        match previous {
            None => {
                current.save(state_file)?;
                tracing::info!(
                    "recorded initial state of {} in {}",
                    directory.display(),
                    state_file.display()
                );
                Ok(Refresh::Initialized)
            }
            Some(previous) if previous == current => Ok(Refresh::Unchanged),
            Some(previous) => {
                let diff = current.diff(&previous);
                log_diff(directory, &diff);
                current.save(state_file)?;
                Ok(Refresh::Changed(diff))
            }
        }
    }

    /// Compares `directory` with `state_file` without writing anything.
    ///
    /// With no state file, every current file is reported as added.
    pub fn diff(&self, directory: &Path, state_file: &Path) -> Result<SnapshotDiff, CacheError> {
        let previous = Snapshot::load(state_file)?.unwrap_or_default();
        let current = self.capture(directory, state_file)?;
        Ok(current.diff(&previous))
    }
}

/// Resolves the parent directory of `path` and rejoins the file name, so two
/// spellings of the same file compare equal even if the file doesn't exist.
fn canonical_location(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let parent = std::fs::canonicalize(parent).ok()?;
    Some(parent.join(name))
}

fn log_diff(directory: &Path, diff: &SnapshotDiff) {
    tracing::info!(
        "{} changed: {} added, {} removed, {} modified",
        directory.display(),
        diff.added.len(),
        diff.removed.len(),
        diff.modified.len()
    );
}
