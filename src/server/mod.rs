//! Server core functionality
//!
//! This module contains the listener and the per-connection bootstrap that
//! binds the file store to the network.

pub mod core;

pub use self::core::Server;
