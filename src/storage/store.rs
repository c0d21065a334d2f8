//! Storage capability
//!
//! The operation surface every storage backend exposes to the endpoint.

use crate::storage::metadata::FileEntry;

/// A single-root file store.
///
/// Methods never fail with an error: I/O faults are logged by the backend and
/// reported as `false`, `None` or an empty listing. Every path argument is
/// relative to the store's root and is resolved by the backend.
pub trait FileStore: Send + Sync {
    /// Write `data` to `folder/filename`, creating the folder if needed and
    /// overwriting an existing file.
    fn upload_to_folder(&self, folder: &str, filename: &str, data: &[u8]) -> bool;

    /// Full contents of a file, `None` if it does not exist or cannot be read.
    fn download(&self, path: &str) -> Option<Vec<u8>>;

    /// Immediate children of a folder, empty if the folder is missing.
    fn list_folder_contents(&self, folder: &str) -> Vec<FileEntry>;

    /// Delete exactly one file. `false` if it was absent or not removed.
    fn delete(&self, path: &str) -> bool;

    /// Create a folder and its ancestors. Succeeds if it already is a folder.
    fn create_folder(&self, path: &str) -> bool;

    /// Remove a folder and everything below it.
    fn delete_folder(&self, path: &str) -> bool;

    /// Relative paths of the folders directly below the root.
    fn list_folders(&self) -> Vec<String>;

    fn folder_exists(&self, path: &str) -> bool;

    /// Upload into the root folder
    fn upload(&self, filename: &str, data: &[u8]) -> bool {
        self.upload_to_folder("", filename, data)
    }

    /// List the root folder
    fn list_files(&self) -> Vec<FileEntry> {
        self.list_folder_contents("")
    }
}
