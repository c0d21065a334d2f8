//! Storage protocol implementation
//!
//! Handles command parsing, dispatch to the store and response generation.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{Command, CommandResult, CommandStatus, parse_command};
pub use handlers::handle_command;
