//! Listing helpers
//!
//! Browsing conveniences built on top of a folder listing: the synthetic
//! parent-navigation entry and aggregate counts.

use std::time::SystemTime;

use crate::storage::metadata::{FileEntry, to_millis};
use crate::storage::validation::resolve_path;

/// Name of the synthetic parent-navigation entry
pub const PARENT_ENTRY_NAME: &str = "..";

/// Aggregate counts over one folder listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub file_count: u64,
    pub folder_count: u64,
    pub total_bytes: u64,
}

impl FolderSummary {
    /// Sum a listing, ignoring the parent-navigation entry
    pub fn from_entries(entries: &[FileEntry]) -> Self {
        entries
            .iter()
            .filter(|e| e.name != PARENT_ENTRY_NAME)
            .fold(Self::default(), |mut summary, entry| {
                if entry.is_directory {
                    summary.folder_count += 1;
                } else {
                    summary.file_count += 1;
                    summary.total_bytes += entry.size;
                }
                summary
            })
    }
}

/// Parent of a folder path, `""` for top-level folders and the root
pub fn parent_path(folder: &str) -> String {
    let resolved = resolve_path(folder);
    match resolved.rfind('/') {
        Some(idx) => resolved[..idx].to_string(),
        None => String::new(),
    }
}

/// Synthetic `..` entry pointing at the parent of `folder`
pub fn parent_entry(folder: &str) -> FileEntry {
    FileEntry::new(
        PARENT_ENTRY_NAME,
        parent_path(folder),
        0,
        to_millis(SystemTime::now()),
        true,
    )
}

/// Prepend the parent entry when browsing anywhere but the root
pub fn with_parent_entry(folder: &str, mut entries: Vec<FileEntry>) -> Vec<FileEntry> {
    if !resolve_path(folder).is_empty() {
        entries.insert(0, parent_entry(folder));
    }
    entries
}
