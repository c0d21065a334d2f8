//! Module `commands`
//!
//! Defines the command set of the storage protocol and the parsing of raw
//! command lines into those commands.

/// Separates the folder from the filename in an `UPLOAD` target
pub const TARGET_SEPARATOR: char = '\t';

/// Represents a command parsed from one client line.
///
/// Each variant maps onto one store operation, apart from the session
/// commands `NOOP` and `QUIT`.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// `UPLOAD <size> <folder>\t<filename>`, followed by `size` raw bytes
    Upload {
        size: u64,
        folder: String,
        filename: String,
    },
    Download(String),
    List(String),
    Delete(String),
    CreateFolder(String),
    DeleteFolder(String),
    ListFolders,
    FolderExists(String),
    /// Aggregate counts for a folder
    Stat(String),
    Noop,
    Quit,
    /// Known command with missing or unusable arguments
    Malformed(String),
    Unknown,
}

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Struct encapsulating the full result of a command execution.
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
    /// Raw bytes written after the message, e.g. a downloaded file
    pub data: Option<Vec<u8>>,
}

/// Parses a raw command line received from a client into a `Command`.
///
/// The keyword is case-insensitive. Arguments keep their inner whitespace, so
/// paths containing spaces survive; only the line terminator is stripped.
pub fn parse_command(raw: &str) -> Command {
    let line = raw.trim_end_matches(['\r', '\n']).trim_start();
    let (keyword, arg) = match line.split_once(' ') {
        Some((keyword, arg)) => (keyword, arg),
        None => (line, ""),
    };

    match keyword.to_ascii_uppercase().as_str() {
        "UPLOAD" => parse_upload(arg),
        "DOWNLOAD" if !arg.trim().is_empty() => Command::Download(arg.to_string()),
        "LIST" => Command::List(arg.to_string()),
        "DELETE" if !arg.trim().is_empty() => Command::Delete(arg.to_string()),
        "CREATE_FOLDER" => Command::CreateFolder(arg.to_string()),
        "DELETE_FOLDER" if !arg.trim().is_empty() => Command::DeleteFolder(arg.to_string()),
        "LIST_FOLDERS" => Command::ListFolders,
        "FOLDER_EXISTS" => Command::FolderExists(arg.to_string()),
        "STAT" => Command::Stat(arg.to_string()),
        "NOOP" => Command::Noop,
        "QUIT" => Command::Quit,
        "DOWNLOAD" | "DELETE" | "DELETE_FOLDER" => {
            Command::Malformed(format!("{} requires a path", keyword.to_ascii_uppercase()))
        }
        _ => Command::Unknown,
    }
}

fn parse_upload(arg: &str) -> Command {
    let (size, target) = match arg.split_once(' ') {
        Some((size, target)) => (size, target),
        None => (arg, ""),
    };

    let size = match size.trim().parse::<u64>() {
        Ok(size) => size,
        Err(_) => return Command::Malformed(format!("invalid upload size {:?}", size)),
    };

    let (folder, filename) = match target.split_once(TARGET_SEPARATOR) {
        Some((folder, filename)) => (folder, filename),
        None => ("", target),
    };

    Command::Upload {
        size,
        folder: folder.to_string(),
        filename: filename.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(parse_command("noop\r\n"), Command::Noop);
        assert_eq!(parse_command("Quit"), Command::Quit);
        assert_eq!(parse_command("list_folders\n"), Command::ListFolders);
    }

    #[test]
    fn path_arguments_keep_spaces() {
        assert_eq!(
            parse_command("DOWNLOAD my docs/annual report.pdf\r\n"),
            Command::Download("my docs/annual report.pdf".into())
        );
        assert_eq!(
            parse_command("DELETE_FOLDER old stuff"),
            Command::DeleteFolder("old stuff".into())
        );
    }

    #[test]
    fn optional_folder_arguments_default_to_root() {
        assert_eq!(parse_command("LIST"), Command::List(String::new()));
        assert_eq!(parse_command("STAT\r\n"), Command::Stat(String::new()));
        assert_eq!(parse_command("LIST docs/2024"), Command::List("docs/2024".into()));
    }

    #[test]
    fn upload_splits_folder_and_filename() {
        assert_eq!(
            parse_command("UPLOAD 1024 docs/2024\treport.pdf\r\n"),
            Command::Upload {
                size: 1024,
                folder: "docs/2024".into(),
                filename: "report.pdf".into(),
            }
        );
        assert_eq!(
            parse_command("UPLOAD 5 notes.txt"),
            Command::Upload {
                size: 5,
                folder: String::new(),
                filename: "notes.txt".into(),
            }
        );
        assert_eq!(
            parse_command("UPLOAD 5 \tnotes.txt"),
            Command::Upload {
                size: 5,
                folder: String::new(),
                filename: "notes.txt".into(),
            }
        );
    }

    #[test]
    fn malformed_arguments_are_reported() {
        assert!(matches!(parse_command("UPLOAD abc x.txt"), Command::Malformed(_)));
        assert!(matches!(parse_command("UPLOAD"), Command::Malformed(_)));
        assert!(matches!(parse_command("DOWNLOAD"), Command::Malformed(_)));
        assert!(matches!(parse_command("DELETE   "), Command::Malformed(_)));
    }

    #[test]
    fn unknown_keywords() {
        assert_eq!(parse_command("RETR x"), Command::Unknown);
        assert_eq!(parse_command(""), Command::Unknown);
    }
}
