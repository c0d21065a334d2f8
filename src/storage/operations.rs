//! Storage operations
//!
//! Local filesystem backend: upload, download, list, delete and folder
//! management under a single storage root. The filesystem is the only source
//! of truth; nothing is cached between calls.

use log::{error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::error::StorageError;
use crate::storage::filesystem::{create_directory, directory_exists, file_exists, remove_tree};
use crate::storage::metadata::{FileEntry, describe, relative_to_root};
use crate::storage::store::FileStore;
use crate::storage::validation::{join_relative, resolve_path, sanitize_filename, to_real_path};

const MAX_RETRIES: u64 = 3;

/// File store rooted at one directory on local disk
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Open the store, creating the root directory if it is absent.
    ///
    /// The root is canonicalised so listed paths can be made relative to it.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        create_directory(root)?;
        let root = root.canonicalize()?;

        if !directory_exists(&root) {
            return Err(StorageError::NotADirectory(root.display().to_string()));
        }

        info!("Storage root: {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn try_upload(&self, folder: &str, filename: &str, data: &[u8]) -> Result<String, StorageError> {
        let folder = resolve_path(folder);
        let filename = sanitize_filename(filename);
        let dir = to_real_path(&self.root, &folder);

        if !folder.is_empty() && !dir.exists() {
            create_directory(&dir)?;
        }

        let target = dir.join(&filename);
        if directory_exists(&target) {
            return Err(StorageError::NotAFile(join_relative(&folder, &filename)));
        }

        fs::write(&target, data)?;
        Ok(join_relative(&folder, &filename))
    }

    fn try_download(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let resolved = resolve_path(path);
        let real = to_real_path(&self.root, &resolved);

        if !real.exists() {
            return Err(StorageError::NotFound(resolved));
        }
        if !file_exists(&real) {
            return Err(StorageError::NotAFile(resolved));
        }

        Ok(fs::read(&real)?)
    }

    fn try_list(&self, folder: &str) -> Result<Vec<FileEntry>, StorageError> {
        let resolved = resolve_path(folder);
        let real = to_real_path(&self.root, &resolved);

        if !real.exists() {
            return Err(StorageError::NotFound(resolved));
        }
        if !directory_exists(&real) {
            return Err(StorageError::NotADirectory(resolved));
        }

        let entries = retry_on_permission_denied(|| fs::read_dir(&real))?;
        let mut listing = Vec::new();

        for entry in entries {
            match entry {
                Ok(entry) => listing.push(describe(&entry.path(), &self.root)),
                Err(e) => warn!("Skipping unreadable entry in {}: {}", real.display(), e),
            }
        }

        listing.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }

    fn try_delete(&self, path: &str) -> Result<String, StorageError> {
        let resolved = resolve_path(path);
        let real = to_real_path(&self.root, &resolved);

        if fs::symlink_metadata(&real).is_err() {
            return Err(StorageError::NotFound(resolved));
        }
        if directory_exists(&real) {
            return Err(StorageError::NotAFile(resolved));
        }

        retry_on_permission_denied(|| fs::remove_file(&real))?;
        Ok(resolved)
    }

    fn try_create_folder(&self, path: &str) -> Result<String, StorageError> {
        let resolved = resolve_path(path);
        let real = to_real_path(&self.root, &resolved);

        if real.exists() {
            if directory_exists(&real) {
                return Ok(resolved);
            }
            return Err(StorageError::AlreadyExistsAsFile(resolved));
        }

        create_directory(&real)?;
        Ok(resolved)
    }

    fn try_delete_folder(&self, path: &str) -> Result<String, StorageError> {
        let resolved = resolve_path(path);
        if resolved.is_empty() {
            return Err(StorageError::RootRemoval);
        }

        let real = to_real_path(&self.root, &resolved);
        if !real.exists() {
            return Err(StorageError::NotFound(resolved));
        }
        if !directory_exists(&real) {
            return Err(StorageError::NotADirectory(resolved));
        }

        remove_tree(&real)?;
        Ok(resolved)
    }

    fn try_list_folders(&self) -> Result<Vec<String>, StorageError> {
        let mut folders = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let relative = relative_to_root(&entry.path(), &self.root);
                if !relative.is_empty() {
                    folders.push(relative);
                }
            }
        }

        folders.sort();
        Ok(folders)
    }
}

impl FileStore for LocalFileStore {
    fn upload_to_folder(&self, folder: &str, filename: &str, data: &[u8]) -> bool {
        match self.try_upload(folder, filename, data) {
            Ok(stored) => {
                info!("Uploaded {} ({} bytes)", stored, data.len());
                true
            }
            Err(e) => {
                error!("Upload of {:?} to {:?} failed: {}", filename, folder, e);
                false
            }
        }
    }

    fn download(&self, path: &str) -> Option<Vec<u8>> {
        match self.try_download(path) {
            Ok(data) => {
                info!("Downloaded {} ({} bytes)", path, data.len());
                Some(data)
            }
            Err(StorageError::NotFound(p)) => {
                warn!("File not found: {}", p);
                None
            }
            Err(e) => {
                error!("Download of {:?} failed: {}", path, e);
                None
            }
        }
    }

    fn list_folder_contents(&self, folder: &str) -> Vec<FileEntry> {
        match self.try_list(folder) {
            Ok(listing) => {
                let shown = resolve_path(folder);
                info!(
                    "Listed {} items from {}",
                    listing.len(),
                    if shown.is_empty() { "root" } else { shown.as_str() }
                );
                listing
            }
            Err(StorageError::NotFound(p)) | Err(StorageError::NotADirectory(p)) => {
                warn!("Folder doesn't exist: {}", p);
                Vec::new()
            }
            Err(e) => {
                error!("Listing {:?} failed: {}", folder, e);
                Vec::new()
            }
        }
    }

    fn delete(&self, path: &str) -> bool {
        match self.try_delete(path) {
            Ok(deleted) => {
                info!("Deleted {}", deleted);
                true
            }
            Err(StorageError::NotFound(p)) => {
                warn!("File not found for deletion: {}", p);
                false
            }
            Err(e) => {
                error!("Delete of {:?} failed: {}", path, e);
                false
            }
        }
    }

    fn create_folder(&self, path: &str) -> bool {
        match self.try_create_folder(path) {
            Ok(created) => {
                info!("Created folder {}", created);
                true
            }
            Err(e) => {
                error!("Create folder {:?} failed: {}", path, e);
                false
            }
        }
    }

    fn delete_folder(&self, path: &str) -> bool {
        match self.try_delete_folder(path) {
            Ok(deleted) => {
                info!("Deleted folder {}", deleted);
                true
            }
            Err(e @ StorageError::RemoveFailed { .. }) => {
                error!("Folder {:?} possibly partially deleted: {}", path, e);
                false
            }
            Err(e) => {
                warn!("Delete folder {:?} refused: {}", path, e);
                false
            }
        }
    }

    fn list_folders(&self) -> Vec<String> {
        match self.try_list_folders() {
            Ok(folders) => folders,
            Err(e) => {
                error!("Error listing folders: {}", e);
                Vec::new()
            }
        }
    }

    fn folder_exists(&self, path: &str) -> bool {
        directory_exists(&to_real_path(&self.root, &resolve_path(path)))
    }
}

/// Retry an operation that failed with `PermissionDenied`, backing off between attempts
fn retry_on_permission_denied<T>(mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut attempt = 1;
    loop {
        match op() {
            Err(e) if attempt < MAX_RETRIES && e.kind() == io::ErrorKind::PermissionDenied => {
                thread::sleep(Duration::from_millis(100 * attempt));
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_store() -> (LocalFileStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = LocalFileStore::open(tmp.path().join("storage")).unwrap();
        (store, tmp)
    }

    #[test]
    fn open_creates_missing_root_and_reuses_existing() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("storage");

        let store = LocalFileStore::open(&root).unwrap();
        assert!(root.is_dir());
        assert!(store.upload("keep.txt", b"k"));

        let reopened = LocalFileStore::open(&root).unwrap();
        assert_eq!(reopened.download("keep.txt").unwrap(), b"k");
    }

    #[test]
    fn open_fails_when_root_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("storage");
        fs::write(&root, b"not a dir").unwrap();

        assert!(LocalFileStore::open(&root).is_err());
    }

    #[test]
    fn upload_then_download_round_trips() {
        let (store, _tmp) = create_store();
        let data: Vec<u8> = (0..=255).collect();

        assert!(store.upload_to_folder("bin", "bytes.dat", &data));
        assert_eq!(store.download("bin/bytes.dat").unwrap(), data);
    }

    #[test]
    fn upload_overwrites_existing_file() {
        let (store, _tmp) = create_store();

        assert!(store.upload("a.txt", b"first"));
        assert!(store.upload("a.txt", b"second"));
        assert_eq!(store.download("a.txt").unwrap(), b"second");
    }

    #[test]
    fn upload_creates_folder_ancestors() {
        let (store, _tmp) = create_store();
        let data = vec![7u8; 1024];

        assert!(store.upload_to_folder("docs/2024", "report.pdf", &data));
        assert!(store.folder_exists("docs"));
        assert!(store.folder_exists("docs/2024"));

        let listing = store.list_folder_contents("docs/2024");
        assert_eq!(
            listing,
            vec![FileEntry {
                name: "report.pdf".into(),
                relative_path: "docs/2024/report.pdf".into(),
                size: 1024,
                last_modified: listing[0].last_modified,
                is_directory: false,
            }]
        );
    }

    #[test]
    fn upload_with_traversal_filename_stays_inside_root() {
        let (store, tmp) = create_store();

        assert!(store.upload_to_folder("", "../../etc/passwd", b"owned"));

        assert_eq!(store.download("passwd").unwrap(), b"owned");
        assert!(!tmp.path().join("etc").exists());
        assert!(!tmp.path().join("passwd").exists());
    }

    #[test]
    fn upload_with_traversal_folder_stays_inside_root() {
        let (store, tmp) = create_store();

        assert!(store.upload_to_folder("../../outside", "x.txt", b"x"));

        assert!(store.root().join("outside/x.txt").is_file());
        assert!(!tmp.path().join("outside").exists());
    }

    #[test]
    fn upload_onto_a_folder_fails() {
        let (store, _tmp) = create_store();
        assert!(store.create_folder("taken"));

        assert!(!store.upload("taken", b"data"));
        assert!(store.folder_exists("taken"));
    }

    #[test]
    fn download_missing_or_folder_returns_none() {
        let (store, _tmp) = create_store();
        assert!(store.create_folder("dir"));

        assert!(store.download("nope.txt").is_none());
        assert!(store.download("dir").is_none());
        assert!(store.download("").is_none());
    }

    #[test]
    fn empty_store_lists_nothing() {
        let (store, _tmp) = create_store();

        assert!(store.list_folder_contents("").is_empty());
        assert!(store.list_files().is_empty());
        assert!(store.list_folders().is_empty());
    }

    #[test]
    fn listing_missing_folder_or_file_is_empty() {
        let (store, _tmp) = create_store();
        assert!(store.upload("file.txt", b"x"));

        assert!(store.list_folder_contents("missing").is_empty());
        assert!(store.list_folder_contents("file.txt").is_empty());
    }

    #[test]
    fn listing_is_not_recursive() {
        let (store, _tmp) = create_store();
        assert!(store.upload_to_folder("a/b", "deep.txt", b"deep"));
        assert!(store.upload("top.txt", b"top"));

        let listing = store.list_files();
        let names: Vec<_> = listing.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "top.txt"]);

        let folder = &listing[0];
        assert!(folder.is_directory);
        assert_eq!(folder.size, 0);
        assert_eq!(folder.relative_path, "a");
    }

    #[test]
    fn delete_removes_file_once() {
        let (store, _tmp) = create_store();
        assert!(store.upload_to_folder("docs/2024", "report.pdf", b"pdf"));

        assert!(store.delete("docs/2024/report.pdf"));
        assert!(!store.delete("docs/2024/report.pdf"));
        assert!(store.folder_exists("docs/2024"));
    }

    #[test]
    fn delete_refuses_folders() {
        let (store, _tmp) = create_store();
        assert!(store.create_folder("keep"));

        assert!(!store.delete("keep"));
        assert!(!store.delete(""));
        assert!(store.folder_exists("keep"));
    }

    #[test]
    fn create_folder_is_idempotent() {
        let (store, _tmp) = create_store();

        assert!(store.create_folder("x/y"));
        assert!(store.create_folder("x/y"));
        assert!(store.folder_exists("x/y"));
        assert_eq!(store.list_folders(), vec!["x".to_string()]);
    }

    #[test]
    fn create_folder_over_file_fails() {
        let (store, _tmp) = create_store();
        assert!(store.upload("clash", b"file"));

        assert!(!store.create_folder("clash"));
        assert!(!store.folder_exists("clash"));
    }

    #[test]
    fn delete_folder_removes_everything_below() {
        let (store, _tmp) = create_store();
        assert!(store.upload_to_folder("p", "a.txt", b"a"));
        assert!(store.upload_to_folder("p/q", "b.txt", b"b"));
        assert!(store.upload_to_folder("p/q/r", "c.txt", b"c"));
        assert!(store.create_folder("p/empty"));

        assert!(store.delete_folder("p"));

        assert!(!store.folder_exists("p"));
        assert!(store.download("p/q/r/c.txt").is_none());
        assert!(store.list_folders().is_empty());
    }

    #[test]
    fn delete_folder_rejects_missing_file_and_root() {
        let (store, _tmp) = create_store();
        assert!(store.upload("file.txt", b"f"));

        assert!(!store.delete_folder("missing"));
        assert!(!store.delete_folder("file.txt"));
        assert!(!store.delete_folder(""));
        assert!(!store.delete_folder("/../"));
        assert!(store.download("file.txt").is_some());
    }

    #[test]
    fn list_folders_returns_only_top_level_directories() {
        let (store, _tmp) = create_store();
        assert!(store.create_folder("b/nested"));
        assert!(store.create_folder("a"));
        assert!(store.upload("loose.txt", b"l"));

        assert_eq!(store.list_folders(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn folder_exists_checks_kind() {
        let (store, _tmp) = create_store();
        assert!(store.upload("f.txt", b"f"));
        assert!(store.create_folder("d"));

        assert!(store.folder_exists("d"));
        assert!(store.folder_exists(""));
        assert!(!store.folder_exists("f.txt"));
        assert!(!store.folder_exists("missing"));
    }
}
