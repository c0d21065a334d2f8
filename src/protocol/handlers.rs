//! Command handlers module for the RAX file server.
//!
//! This module defines one handler per protocol command. Handlers run the
//! matching store operation and turn its boolean/optional result into a
//! response. They are synchronous; the session runs them on a blocking thread.

use crate::protocol::responses::{self, format_entry, format_response};
use crate::protocol::{Command, CommandResult, CommandStatus};
use crate::storage::{FileStore, FolderSummary, resolve_path, with_parent_entry};
use log::info;

/// Dispatches a parsed command to its corresponding handler.
///
/// # Arguments
///
/// * `store` - The store the command operates on.
/// * `command` - The parsed command.
/// * `payload` - Upload bytes already read from the connection; empty for
///   every other command.
pub fn handle_command(store: &dyn FileStore, command: Command, payload: Vec<u8>) -> CommandResult {
    match command {
        Command::Upload {
            folder, filename, ..
        } => handle_cmd_upload(store, &folder, &filename, &payload),
        Command::Download(path) => handle_cmd_download(store, &path),
        Command::List(folder) => handle_cmd_list(store, &folder),
        Command::Delete(path) => handle_cmd_delete(store, &path),
        Command::CreateFolder(path) => handle_cmd_create_folder(store, &path),
        Command::DeleteFolder(path) => handle_cmd_delete_folder(store, &path),
        Command::ListFolders => handle_cmd_list_folders(store),
        Command::FolderExists(path) => handle_cmd_folder_exists(store, &path),
        Command::Stat(folder) => handle_cmd_stat(store, &folder),
        Command::Noop => success(format_response(responses::OK, "NOOP ok")),
        Command::Quit => CommandResult {
            status: CommandStatus::CloseConnection,
            message: Some(format_response(responses::CLOSING, "Goodbye")),
            data: None,
        },
        Command::Malformed(reason) => failure(responses::ARGUMENT_ERROR, &reason),
        Command::Unknown => failure(responses::SYNTAX_ERROR, "Unknown command"),
    }
}

/// Handles UPLOAD: rejects empty payloads before touching the disk.
fn handle_cmd_upload(
    store: &dyn FileStore,
    folder: &str,
    filename: &str,
    payload: &[u8],
) -> CommandResult {
    if payload.is_empty() {
        return failure(responses::ARGUMENT_ERROR, "File is empty");
    }

    if store.upload_to_folder(folder, filename, payload) {
        success(format_response(
            responses::TRANSFER_COMPLETE,
            &format!("Upload complete ({} bytes)", payload.len()),
        ))
    } else {
        failure(responses::LOCAL_ERROR, "Failed to upload file")
    }
}

/// Handles DOWNLOAD: announces the byte count, then sends the file as data.
fn handle_cmd_download(store: &dyn FileStore, path: &str) -> CommandResult {
    match store.download(path) {
        Some(data) => CommandResult {
            status: CommandStatus::Success,
            message: Some(format_response(
                responses::OPENING_DATA,
                &data.len().to_string(),
            )),
            data: Some(data),
        },
        None => failure(responses::ACTION_NOT_TAKEN, "File not found"),
    }
}

/// Handles LIST: one line per entry, with `..` first below the root.
fn handle_cmd_list(store: &dyn FileStore, folder: &str) -> CommandResult {
    let entries = with_parent_entry(folder, store.list_folder_contents(folder));

    let mut message = format_response(
        responses::OPENING_DATA,
        &format!("{} entries", entries.len()),
    );
    for entry in &entries {
        message.push_str(&format_entry(entry));
    }

    success(message)
}

fn handle_cmd_delete(store: &dyn FileStore, path: &str) -> CommandResult {
    if store.delete(path) {
        success(format_response(responses::ACTION_OK, "File deleted"))
    } else {
        failure(responses::ACTION_NOT_TAKEN, "Failed to delete file")
    }
}

/// Handles CREATE_FOLDER: a blank name is a client error, not a no-op on the root.
fn handle_cmd_create_folder(store: &dyn FileStore, path: &str) -> CommandResult {
    let resolved = resolve_path(path);
    if resolved.is_empty() {
        return failure(responses::ARGUMENT_ERROR, "Folder name cannot be empty");
    }

    if store.create_folder(path) {
        success(format_response(
            responses::PATH_CREATED,
            &format!("\"{}\" created", resolved),
        ))
    } else {
        failure(
            responses::ACTION_NOT_TAKEN,
            "Failed to create folder (a file may already exist there)",
        )
    }
}

fn handle_cmd_delete_folder(store: &dyn FileStore, path: &str) -> CommandResult {
    if store.delete_folder(path) {
        success(format_response(responses::ACTION_OK, "Folder deleted"))
    } else {
        failure(responses::ACTION_NOT_TAKEN, "Failed to delete folder")
    }
}

fn handle_cmd_list_folders(store: &dyn FileStore) -> CommandResult {
    let folders = store.list_folders();

    let mut message = format_response(
        responses::OPENING_DATA,
        &format!("{} folders", folders.len()),
    );
    for folder in &folders {
        message.push_str(folder);
        message.push_str("\r\n");
    }

    success(message)
}

fn handle_cmd_folder_exists(store: &dyn FileStore, path: &str) -> CommandResult {
    let exists = store.folder_exists(path);
    success(format_response(responses::STATUS, &exists.to_string()))
}

/// Handles STAT: file count, folder count and total bytes of one folder.
fn handle_cmd_stat(store: &dyn FileStore, folder: &str) -> CommandResult {
    let summary = FolderSummary::from_entries(&store.list_folder_contents(folder));
    info!(
        "Storage info: {} files, {} folders, {} bytes",
        summary.file_count, summary.folder_count, summary.total_bytes
    );

    success(format_response(
        responses::STATUS,
        &format!(
            "files={} folders={} bytes={}",
            summary.file_count, summary.folder_count, summary.total_bytes
        ),
    ))
}

fn success(message: String) -> CommandResult {
    CommandResult {
        status: CommandStatus::Success,
        message: Some(message),
        data: None,
    }
}

fn failure(code: u16, reason: &str) -> CommandResult {
    CommandResult {
        status: CommandStatus::Failure(reason.to_string()),
        message: Some(format_response(code, reason)),
        data: None,
    }
}
