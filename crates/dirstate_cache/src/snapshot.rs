//! Directory snapshots: recursive path-to-mtime maps and their state files.
//!
//! A [`Snapshot`] records the modification time of every regular file under a
//! directory, keyed by absolute path. It is persisted as a flat JSON object so
//! a later run can tell whether anything under the directory has changed.

use std::collections::BTreeMap;
use std::path::Path;

use dirstate_common::Mtime;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::CacheError;

/// Point-in-time mapping of absolute file path to modification time.
///
/// Equality is exact mapping equality: same paths, same mtimes. Paths that are
/// not valid UTF-8 are stored lossily.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    files: BTreeMap<String, Mtime>,
}

/// Paths that differ between two snapshots, each list sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// Paths present now but not in the previous snapshot.
    pub added: Vec<String>,

    /// Paths present in the previous snapshot but gone now.
    pub removed: Vec<String>,

    /// Paths present in both with a different mtime.
    pub modified: Vec<String>,
}

impl SnapshotDiff {
    /// Returns `true` if the two snapshots were equal.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Total number of differing paths.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks `directory` recursively and records every regular file found.
    ///
    /// Symlinked files are followed for their mtime; symlinked directories are
    /// not descended into. Broken links are skipped. A missing or unreadable
    /// directory is an error.
    pub fn capture(directory: &Path) -> Result<Self, CacheError> {
        let root = std::path::absolute(directory).map_err(CacheError::io(directory))?;
        let meta = std::fs::metadata(&root).map_err(CacheError::io(&root))?;
        if !meta.is_dir() {
            return Err(CacheError::Io {
                path: root,
                source: std::io::Error::other("not a directory"),
            });
        }

        let mut files = BTreeMap::new();
        for entry in WalkDir::new(&root) {
            let entry = entry.map_err(|source| CacheError::Walk {
                path: root.clone(),
                source,
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            if let Some(mtime) = regular_file_mtime(entry.path())? {
                files.insert(entry.path().to_string_lossy().into_owned(), mtime);
            }
        }

        tracing::debug!(
            "captured snapshot of {} ({} files)",
            root.display(),
            files.len()
        );
        Ok(Self { files })
    }

    /// Loads a snapshot from a state file, returning `None` if the file doesn't exist.
    ///
    /// A state file that exists but can't be read or parsed is an error.
    pub fn load(state_file: &Path) -> Result<Option<Self>, CacheError> {
        let content = match std::fs::read_to_string(state_file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(state_file)(e)),
        };
        let snapshot = serde_json::from_str(&content).map_err(|e| CacheError::StateParse {
            path: state_file.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Some(snapshot))
    }

    /// Writes the snapshot to a state file, overwriting it.
    ///
    /// Creates the parent directory if it doesn't exist. The write is not atomic.
    pub fn save(&self, state_file: &Path) -> Result<(), CacheError> {
        if let Some(parent) = state_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(CacheError::io(parent))?;
        }
        let json = serde_json::to_string(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(state_file, json).map_err(CacheError::io(state_file))
    }

    /// Records `mtime` for `path`, replacing any previous value.
    pub fn insert(&mut self, path: impl Into<String>, mtime: Mtime) {
        self.files.insert(path.into(), mtime);
    }

    /// Drops `path` from the snapshot, returning its mtime if it was recorded.
    pub fn remove(&mut self, path: &str) -> Option<Mtime> {
        self.files.remove(path)
    }

    /// Returns the recorded mtime for `path`.
    pub fn get(&self, path: &str) -> Option<Mtime> {
        self.files.get(path).copied()
    }

    /// Number of files in the snapshot.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no files were recorded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates over `(path, mtime)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Mtime)> {
        self.files.iter().map(|(p, m)| (p.as_str(), *m))
    }

    /// Compares this snapshot against a `previous` one.
    pub fn diff(&self, previous: &Snapshot) -> SnapshotDiff {
        let mut diff = SnapshotDiff::default();
        for (path, mtime) in &self.files {
            match previous.files.get(path) {
                Some(old) if old == mtime => {}
                Some(_) => diff.modified.push(path.clone()),
                None => diff.added.push(path.clone()),
            }
        }
        diff.removed = previous
            .files
            .keys()
            .filter(|p| !self.files.contains_key(*p))
            .cloned()
            .collect();
        diff
    }
}

/// Stats `path`, following symlinks, and returns its mtime if it is a regular file.
///
/// `None` for directories, other non-file types, and entries that vanished or
/// are dangling links. Any other stat failure is an error.
pub(crate) fn regular_file_mtime(path: &Path) -> Result<Option<Mtime>, CacheError> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("skipping {}: not found", path.display());
            return Ok(None);
        }
        Err(e) => return Err(CacheError::io(path)(e)),
    };
    if !meta.is_file() {
        return Ok(None);
    }
    Mtime::from_metadata(&meta)
        .map(Some)
        .map_err(CacheError::io(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn touch(path: &Path, secs: u64) {
        std::fs::write(path, b"x").unwrap();
        let t = std::time::UNIX_EPOCH + std::time::Duration::from_secs(secs);
        std::fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(t)
            .unwrap();
    }

    fn key(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn capture_is_recursive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub").join("deeper")).unwrap();
        touch(&dir.path().join("a.txt"), 100);
        touch(&dir.path().join("sub").join("b.txt"), 200);
        touch(&dir.path().join("sub").join("deeper").join("c.txt"), 300);

        let snap = Snapshot::capture(dir.path()).unwrap();
        assert_eq!(snap.len(), 3);
        let c = dir.path().join("sub").join("deeper").join("c.txt");
        assert_eq!(snap.get(&key(&c)), Some(Mtime::from_secs_f64(300.0)));
    }

    #[test]
    fn capture_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();
        let snap = Snapshot::capture(dir.path()).unwrap();
        assert!(snap.is_empty());
    }

    #[test]
    fn capture_keys_are_absolute() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.txt"), 100);
        let snap = Snapshot::capture(dir.path()).unwrap();
        let (path, _) = snap.iter().next().unwrap();
        assert!(Path::new(path).is_absolute());
    }

    #[test]
    fn capture_missing_directory_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = Snapshot::capture(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }

    #[test]
    fn capture_file_root_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        touch(&file, 100);
        assert!(Snapshot::capture(&file).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn capture_skips_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("real.txt"), 100);
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("link")).unwrap();
        let snap = Snapshot::capture(dir.path()).unwrap();
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        let mut snap = Snapshot::new();
        snap.insert("/data/x.jpg", Mtime::from_secs_f64(1712345678.123456));
        snap.insert("/data/sub/z.jpg", Mtime::from_secs_f64(50.0));
        snap.save(&state).unwrap();

        let loaded = Snapshot::load(&state).unwrap().unwrap();
        assert_eq!(loaded, snap);
    }

    #[test]
    fn state_file_is_flat_json_object() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        let mut snap = Snapshot::new();
        snap.insert("/data/x.jpg", Mtime::from_secs_f64(100.0));
        snap.save(&state).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&state).unwrap()).unwrap();
        assert_eq!(raw["/data/x.jpg"], serde_json::json!(100.0));
    }

    #[test]
    fn load_nonexistent_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Snapshot::load(&dir.path().join("state.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn load_unreachable_state_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let err = Snapshot::load(&blocker.join("state.json")).unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }

    #[test]
    fn load_directory_as_state_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Snapshot::load(dir.path()).is_err());
    }

    #[test]
    fn load_corrupt_json_errors() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        std::fs::write(&state, "not valid json {{{").unwrap();
        let err = Snapshot::load(&state).unwrap_err();
        assert!(matches!(err, CacheError::StateParse { .. }));
    }

    #[test]
    fn load_wrong_shape_errors() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        std::fs::write(&state, r#"{"/a": "yesterday"}"#).unwrap();
        assert!(Snapshot::load(&state).is_err());
    }

    #[test]
    fn save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let state: PathBuf = dir.path().join("nested").join("state.json");
        Snapshot::new().save(&state).unwrap();
        assert!(state.exists());
    }

    #[test]
    fn diff_categorizes_paths() {
        let mut old = Snapshot::new();
        old.insert("/d/keep", Mtime::from_secs_f64(1.0));
        old.insert("/d/gone", Mtime::from_secs_f64(1.0));
        old.insert("/d/edit", Mtime::from_secs_f64(1.0));

        let mut new = Snapshot::new();
        new.insert("/d/keep", Mtime::from_secs_f64(1.0));
        new.insert("/d/edit", Mtime::from_secs_f64(2.0));
        new.insert("/d/new", Mtime::from_secs_f64(1.0));

        let diff = new.diff(&old);
        assert_eq!(diff.added, vec!["/d/new"]);
        assert_eq!(diff.removed, vec!["/d/gone"]);
        assert_eq!(diff.modified, vec!["/d/edit"]);
        assert_eq!(diff.len(), 3);
        assert!(!diff.is_empty());
    }

    #[test]
    fn diff_of_equal_snapshots_is_empty() {
        let mut snap = Snapshot::new();
        snap.insert("/d/a", Mtime::from_secs_f64(1.0));
        assert!(snap.diff(&snap.clone()).is_empty());
    }
}
