//! Module `state`
//!
//! Defines the `Client` struct tracking one connected session.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Represents the state of a connected client.
///
/// Tracks the peer address and transfer counters for the lifetime of the
/// connection; the counters are reported when the session ends.
#[derive(Debug, Clone)]
pub struct Client {
    client_addr: SocketAddr,
    connected_at: Instant,
    commands_handled: u64,
    bytes_received: u64,
    bytes_sent: u64,
}

impl Client {
    pub fn new(client_addr: SocketAddr) -> Self {
        Self {
            client_addr,
            connected_at: Instant::now(),
            commands_handled: 0,
            bytes_received: 0,
            bytes_sent: 0,
        }
    }

    /// Records one handled command and the payload bytes moved by it.
    pub fn record_command(&mut self, received: u64, sent: u64) {
        self.commands_handled += 1;
        self.bytes_received += received;
        self.bytes_sent += sent;
    }

    pub fn client_addr(&self) -> SocketAddr {
        self.client_addr
    }

    pub fn commands_handled(&self) -> u64 {
        self.commands_handled
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// Time since the connection was accepted
    pub fn session_duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
