//! Error types
//!
//! Defines domain-specific error types for the storage, protocol and server layers.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    NotFound(String),
    NotADirectory(String),
    NotAFile(String),
    AlreadyExistsAsFile(String),
    RootRemoval,
    RemoveFailed { path: PathBuf, source: io::Error },
    Io(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(p) => write!(f, "Not found: {}", p),
            StorageError::NotADirectory(p) => write!(f, "Not a directory: {}", p),
            StorageError::NotAFile(p) => write!(f, "Not a file: {}", p),
            StorageError::AlreadyExistsAsFile(p) => {
                write!(f, "Path already exists as a file: {}", p)
            }
            StorageError::RootRemoval => write!(f, "Refusing to remove the storage root"),
            StorageError::RemoveFailed { path, source } => {
                write!(f, "Failed to remove {}: {}", path.display(), source)
            }
            StorageError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::RemoveFailed { source, .. } => Some(source),
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::Io(error)
    }
}

/// Wire protocol errors raised while reading a client request
#[derive(Debug)]
pub enum ProtocolError {
    CommandTooLong(usize),
    PayloadTooLarge { size: u64, max: u64 },
    Timeout,
    Io(io::Error),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::CommandTooLong(max) => {
                write!(f, "Command line exceeds limit of {} bytes", max)
            }
            ProtocolError::PayloadTooLarge { size, max } => {
                write!(f, "Payload of {} bytes exceeds limit of {} bytes", size, max)
            }
            ProtocolError::Timeout => write!(f, "Timed out waiting for client"),
            ProtocolError::Io(e) => write!(f, "Connection error: {}", e),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<io::Error> for ProtocolError {
    fn from(error: io::Error) -> Self {
        ProtocolError::Io(error)
    }
}

/// General server error that encompasses all error types
#[derive(Debug)]
pub enum ServerError {
    Config(config::ConfigError),
    Storage(StorageError),
    Protocol(ProtocolError),
    Io(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::Storage(e) => write!(f, "Storage error: {}", e),
            ServerError::Protocol(e) => write!(f, "Protocol error: {}", e),
            ServerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<StorageError> for ServerError {
    fn from(error: StorageError) -> Self {
        ServerError::Storage(error)
    }
}

impl From<ProtocolError> for ServerError {
    fn from(error: ProtocolError) -> Self {
        ServerError::Protocol(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::Io(error)
    }
}
