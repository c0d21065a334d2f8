//! File system storage management
//!
//! Handles file operations, metadata and path validation under one storage root.

pub mod filesystem;
pub mod metadata;
pub mod operations;
pub mod results;
pub mod store;
pub mod validation;

// Re-export commonly used types and functions
pub use metadata::FileEntry;
pub use operations::LocalFileStore;
pub use results::{FolderSummary, with_parent_entry};
pub use store::FileStore;
pub use validation::{resolve_path, sanitize_filename};
