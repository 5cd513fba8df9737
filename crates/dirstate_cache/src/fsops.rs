//! Directory setup and glob listing helpers.
//!
//! These helpers log failures and carry on rather than returning errors:
//! [`ensure_dir`] and [`setup_directories`] swallow creation failures, and
//! [`list_files`] returns an empty list when the pattern or the walk fails.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::CacheError;

/// Creates `directory` and any missing parents, logging the outcome.
pub fn ensure_dir(directory: &Path) {
    match std::fs::create_dir_all(directory) {
        Ok(()) => tracing::info!("directory '{}' ensured", directory.display()),
        Err(e) => tracing::error!(
            "failed to ensure directory {}: {}",
            directory.display(),
            e
        ),
    }
}

/// Ensures every configured directory exists.
///
/// Stops at the first failure and logs it. Returns `true` if all directories
/// were created or already existed.
pub fn setup_directories(directories: &BTreeMap<String, PathBuf>) -> bool {
    for (name, path) in directories {
        if let Err(e) = std::fs::create_dir_all(path) {
            tracing::error!(
                "failed to set up directory {name} ({}): {e}",
                path.display()
            );
            return false;
        }
    }
    tracing::info!("all directories set up successfully");
    true
}

/// Lists entries of `directory` matching a glob `pattern`, relative to `directory`.
///
/// With `recursive`, the pattern is matched at every depth including the top
/// level. Matches may be files or directories. Errors are logged and yield
/// an empty list.
pub fn list_files(directory: &Path, pattern: &str, recursive: bool) -> Vec<PathBuf> {
    match glob_relative(directory, pattern, recursive) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::error!("error listing files in {}: {}", directory.display(), e);
            Vec::new()
        }
    }
}

fn glob_relative(
    directory: &Path,
    pattern: &str,
    recursive: bool,
) -> Result<Vec<PathBuf>, CacheError> {
    let base = PathBuf::from(glob::Pattern::escape(&directory.to_string_lossy()));
    let full = if recursive {
        base.join("**").join(pattern)
    } else {
        base.join(pattern)
    };
    let full = full.to_string_lossy().into_owned();

    let matches = glob::glob(&full).map_err(|e| CacheError::Pattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in matches {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            CacheError::Io {
                path,
                source: e.into_error(),
            }
        })?;
        let relative = path
            .strip_prefix(directory)
            .map(Path::to_path_buf)
            .unwrap_or(path);
        paths.push(relative);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub").join("deeper")).unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("b.log"), "b").unwrap();
        std::fs::write(dir.path().join("sub").join("c.txt"), "c").unwrap();
        std::fs::write(dir.path().join("sub").join("deeper").join("d.txt"), "d").unwrap();
        dir
    }

    #[test]
    fn ensure_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("one").join("two");
        ensure_dir(&nested);
        assert!(nested.is_dir());
        ensure_dir(&nested);
        assert!(nested.is_dir());
    }

    #[test]
    fn ensure_dir_swallows_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, "x").unwrap();
        ensure_dir(&file.join("child"));
        assert!(!file.join("child").exists());
    }

    #[test]
    fn setup_creates_all() {
        let dir = tempfile::tempdir().unwrap();
        let mut dirs = BTreeMap::new();
        dirs.insert("raw".to_string(), dir.path().join("data").join("raw"));
        dirs.insert("out".to_string(), dir.path().join("out"));
        assert!(setup_directories(&dirs));
        assert!(dir.path().join("data").join("raw").is_dir());
        assert!(dir.path().join("out").is_dir());
    }

    #[test]
    fn setup_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, "x").unwrap();
        let mut dirs = BTreeMap::new();
        dirs.insert("bad".to_string(), file.join("child"));
        assert!(!setup_directories(&dirs));
    }

    #[test]
    fn list_top_level_pattern() {
        let dir = layout();
        let files = list_files(dir.path(), "*.txt", false);
        assert_eq!(files, vec![PathBuf::from("a.txt")]);
    }

    #[test]
    fn list_star_includes_directories() {
        let dir = layout();
        let mut files = list_files(dir.path(), "*", false);
        files.sort();
        assert_eq!(
            files,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b.log"),
                PathBuf::from("sub")
            ]
        );
    }

    #[test]
    fn list_recursive_pattern() {
        let dir = layout();
        let mut files = list_files(dir.path(), "*.txt", true);
        files.sort();
        assert_eq!(
            files,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("sub").join("c.txt"),
                PathBuf::from("sub").join("deeper").join("d.txt"),
            ]
        );
    }

    #[test]
    fn list_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files(&dir.path().join("missing"), "*", false).is_empty());
    }

    #[test]
    fn list_invalid_pattern_is_empty() {
        let dir = layout();
        assert!(list_files(dir.path(), "[", false).is_empty());
    }

    #[test]
    fn list_escapes_directory_metacharacters() {
        let dir = tempfile::tempdir().unwrap();
        let odd = dir.path().join("photos [2024]");
        std::fs::create_dir(&odd).unwrap();
        std::fs::write(odd.join("x.jpg"), "x").unwrap();
        assert_eq!(list_files(&odd, "*.jpg", false), vec![PathBuf::from("x.jpg")]);
    }
}
