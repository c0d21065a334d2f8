//! File system operations
//!
//! Thin wrappers over `std::fs` used by the storage operations.

use std::fs;
use std::io::{self, Result};
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Create a directory and any missing ancestors
pub fn create_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
}

/// Check if file exists
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Check if directory exists
pub fn directory_exists(path: &Path) -> bool {
    path.is_dir()
}

/// Remove a directory tree in post-order without recursion.
///
/// Children are removed before their parent. Symbolic links are removed as
/// links and never followed. The first failed removal stops the walk; entries
/// already removed stay removed.
pub fn remove_tree(root: &Path) -> std::result::Result<(), StorageError> {
    remove_tree_with(root, |path| fs::remove_file(path))
}

fn remove_tree_with<F>(root: &Path, mut remove_file: F) -> std::result::Result<(), StorageError>
where
    F: FnMut(&Path) -> io::Result<()>,
{
    // (directory, children already scheduled)
    let mut pending: Vec<(PathBuf, bool)> = vec![(root.to_path_buf(), false)];

    while let Some((dir, expanded)) = pending.pop() {
        if expanded {
            fs::remove_dir(&dir).map_err(|source| StorageError::RemoveFailed {
                path: dir.clone(),
                source,
            })?;
            continue;
        }

        pending.push((dir.clone(), true));

        let entries = fs::read_dir(&dir).map_err(|source| StorageError::RemoveFailed {
            path: dir.clone(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| StorageError::RemoveFailed {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|source| StorageError::RemoveFailed {
                path: path.clone(),
                source,
            })?;

            if file_type.is_dir() {
                pending.push((path, false));
            } else {
                remove_file(&path)
                    .map_err(|source| StorageError::RemoveFailed { path, source })?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn removes_nested_tree() {
        let tmp = TempDir::new().unwrap();
        let top = tmp.path().join("top");
        fs::create_dir_all(top.join("a/b/c")).unwrap();
        fs::create_dir_all(top.join("d")).unwrap();
        fs::write(top.join("a/one.txt"), b"1").unwrap();
        fs::write(top.join("a/b/c/two.txt"), b"2").unwrap();
        fs::write(top.join("three.txt"), b"3").unwrap();

        remove_tree(&top).unwrap();

        assert!(!top.exists());
        assert!(tmp.path().exists());
    }

    #[test]
    fn handles_deep_nesting() {
        let tmp = TempDir::new().unwrap();
        let top = tmp.path().join("deep");
        let mut leaf = top.clone();
        for i in 0..200 {
            leaf.push(format!("{}", i % 10));
        }
        fs::create_dir_all(&leaf).unwrap();
        fs::write(leaf.join("bottom.txt"), b"x").unwrap();

        remove_tree(&top).unwrap();

        assert!(!top.exists());
    }

    #[test]
    fn missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let result = remove_tree(&tmp.path().join("nope"));
        assert!(matches!(result, Err(StorageError::RemoveFailed { .. })));
    }

    #[test]
    fn failure_mid_walk_stops_and_keeps_earlier_removals() {
        let tmp = TempDir::new().unwrap();
        let top = tmp.path().join("top");
        fs::create_dir_all(top.join("a")).unwrap();
        fs::create_dir_all(top.join("b")).unwrap();
        fs::write(top.join("a/one.txt"), b"1").unwrap();
        fs::write(top.join("b/locked.txt"), b"2").unwrap();
        fs::write(top.join("three.txt"), b"3").unwrap();
        let locked = top.join("b/locked.txt");

        let mut removed = Vec::new();
        let result = remove_tree_with(&top, |path| {
            if path == locked {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"));
            }
            removed.push(path.to_path_buf());
            fs::remove_file(path)
        });

        match result {
            Err(StorageError::RemoveFailed { path, source }) => {
                assert_eq!(path, locked);
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected RemoveFailed, got {other:?}"),
        }

        // Files directly under the top are removed before any subfolder is entered
        assert!(removed.contains(&top.join("three.txt")));
        for path in &removed {
            assert!(!path.exists(), "{} came back", path.display());
        }
        assert!(locked.exists());
        assert!(top.join("b").is_dir());
        assert!(top.is_dir());

        // A later pass finishes the job
        remove_tree(&top).unwrap();
        assert!(!top.exists());
    }

    #[cfg(unix)]
    #[test]
    fn links_are_removed_not_followed() {
        let tmp = TempDir::new().unwrap();
        let outside = tmp.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("keep.txt"), b"keep").unwrap();

        let top = tmp.path().join("top");
        fs::create_dir_all(&top).unwrap();
        std::os::unix::fs::symlink(&outside, top.join("link")).unwrap();

        remove_tree(&top).unwrap();

        assert!(!top.exists());
        assert!(outside.join("keep.txt").exists());
    }
}
