//! Response handling
//!
//! Defines response codes and formatting for the storage protocol.

use crate::storage::FileEntry;

/// Response codes
pub const OPENING_DATA: u16 = 150;
pub const OK: u16 = 200;
pub const STATUS: u16 = 213;
pub const READY: u16 = 220;
pub const CLOSING: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const ACTION_OK: u16 = 250;
pub const PATH_CREATED: u16 = 257;
pub const SERVICE_UNAVAILABLE: u16 = 421;
pub const CONNECTION_CLOSED: u16 = 426;
pub const LOCAL_ERROR: u16 = 451;
pub const SYNTAX_ERROR: u16 = 500;
pub const ARGUMENT_ERROR: u16 = 501;
pub const ACTION_NOT_TAKEN: u16 = 550;
pub const EXCEEDED_STORAGE: u16 = 552;

/// Format a response line
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

/// Format one listing line: `<d|f>\t<size>\t<modified_ms>\t<name>\t<relative_path>`
pub fn format_entry(entry: &FileEntry) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\r\n",
        if entry.is_directory { 'd' } else { 'f' },
        entry.size,
        entry.last_modified,
        entry.name,
        entry.relative_path
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_line_is_crlf_terminated() {
        assert_eq!(format_response(OK, "NOOP ok"), "200 NOOP ok\r\n");
    }

    #[test]
    fn entry_line_layout() {
        let file = FileEntry::new("r.pdf", "docs/r.pdf", 1024, 1700000000000, false);
        assert_eq!(format_entry(&file), "f\t1024\t1700000000000\tr.pdf\tdocs/r.pdf\r\n");

        let dir = FileEntry::new("..", "", 0, 5, true);
        assert_eq!(format_entry(&dir), "d\t0\t5\t..\t\r\n");
    }
}
