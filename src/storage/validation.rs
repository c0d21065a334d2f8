//! Path validation
//!
//! Turns caller-supplied paths and filenames into values that are safe to join
//! under the storage root. These two functions are the only traversal defence
//! in the server, so every path-shaped input goes through one of them.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Characters that are never allowed inside a stored filename
const FORBIDDEN_FILENAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

static GENERATED_NAME_SEQ: AtomicU64 = AtomicU64::new(0);

/// Resolve a caller-supplied path into a forward-slash path relative to the root.
///
/// Every literal `..` is removed, not just `../` segments, so a file named
/// `a..b` resolves to `ab`. Empty and `.` segments are dropped, which also
/// strips leading, trailing and repeated slashes. Never fails; the worst case
/// is `""`, the root itself.
pub fn resolve_path(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let normalized = raw.replace('\\', "/").replace("..", "");

    normalized
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Sanitize a caller-supplied filename into a single, non-empty path segment.
///
/// Only the text after the last slash survives, so the filename field cannot
/// redirect a write into another folder.
pub fn sanitize_filename(raw: &str) -> String {
    if raw.trim().is_empty() {
        return generated_name();
    }

    let normalized = raw.replace('\\', "/");
    let leaf = normalized.rsplit('/').next().unwrap_or_default();

    let cleaned: String = leaf
        .chars()
        .map(|c| if FORBIDDEN_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return generated_name();
    }

    cleaned
}

/// Join an already resolved relative path under the storage root.
///
/// Only plain name components are appended. Drive prefixes (`C:`), root
/// separators and dot components are skipped, since `PathBuf::push` would let
/// any of the first two replace the root.
pub fn to_real_path(storage_root: &Path, resolved: &str) -> PathBuf {
    let mut real = storage_root.to_path_buf();
    for component in Path::new(resolved).components() {
        if let Component::Normal(part) = component {
            real.push(part);
        }
    }
    real
}

/// Join a resolved folder and a sanitized filename into a relative path
pub fn join_relative(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

fn generated_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = GENERATED_NAME_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("unnamed_{}_{}", millis, seq)
}
