//! Entry metadata
//!
//! Builds the portable descriptor for one file or folder from live filesystem
//! attributes. No metadata is ever persisted next to the stored files.

use log::warn;
use std::fs::{self, Metadata};
use std::path::{Component, Path};
use std::time::{SystemTime, UNIX_EPOCH};

/// Descriptor for one file or folder at the moment it was listed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Leaf name; `..` only for the synthetic parent-navigation entry
    pub name: String,
    /// Forward-slash path from the storage root, no leading or trailing slash
    pub relative_path: String,
    /// Byte length, 0 for directories
    pub size: u64,
    /// Modification time in epoch milliseconds
    pub last_modified: u64,
    pub is_directory: bool,
}

impl FileEntry {
    pub fn new(
        name: impl Into<String>,
        relative_path: impl Into<String>,
        size: u64,
        last_modified: u64,
        is_directory: bool,
    ) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            size,
            last_modified,
            is_directory,
        }
    }
}

/// Outcome of reading an entry's attributes
enum Attributes {
    Precise(Metadata),
    Degraded {
        modified: u64,
        size: u64,
        is_directory: bool,
    },
}

impl Attributes {
    fn into_entry(self, name: String, relative_path: String) -> FileEntry {
        match self {
            Attributes::Precise(meta) => {
                let is_directory = meta.is_dir();
                FileEntry {
                    name,
                    relative_path,
                    size: if is_directory { 0 } else { meta.len() },
                    last_modified: meta.modified().map(to_millis).unwrap_or(0),
                    is_directory,
                }
            }
            Attributes::Degraded {
                modified,
                size,
                is_directory,
            } => FileEntry {
                name,
                relative_path,
                size: if is_directory { 0 } else { size },
                last_modified: modified,
                is_directory,
            },
        }
    }
}

/// Describe a filesystem entry relative to the storage root.
///
/// An entry whose attributes cannot be read is still described, with a coarser
/// timestamp, so one bad entry never aborts a whole listing.
pub fn describe(path: &Path, storage_root: &Path) -> FileEntry {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let relative_path = relative_to_root(path, storage_root);

    read_attributes(path).into_entry(name, relative_path)
}

fn read_attributes(path: &Path) -> Attributes {
    match fs::metadata(path) {
        Ok(meta) if meta.modified().is_ok() => Attributes::Precise(meta),
        Ok(meta) => {
            warn!("Modification time unavailable for {}", path.display());
            Attributes::Degraded {
                modified: 0,
                size: meta.len(),
                is_directory: meta.is_dir(),
            }
        }
        Err(e) => {
            warn!(
                "Failed to read attributes of {}: {}; using link attributes",
                path.display(),
                e
            );
            // Dangling links and racing deletes still have (or had) a link entry
            let modified = fs::symlink_metadata(path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() * 1000)
                .unwrap_or(0);
            Attributes::Degraded {
                modified,
                size: 0,
                is_directory: false,
            }
        }
    }
}

/// Forward-slash path of `path` below `storage_root`
pub fn relative_to_root(path: &Path, storage_root: &Path) -> String {
    let relative = path.strip_prefix(storage_root).unwrap_or(path);

    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Milliseconds since the epoch, 0 for times before it
pub fn to_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
