//! Client registry
//!
//! Tracks connected clients and enforces the connection limit.

use crate::client::Client;
use std::collections::HashMap;
use std::net::SocketAddr;

/// Registry for tracking active clients
pub struct ClientRegistry {
    clients: HashMap<SocketAddr, Client>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Registers a client unless `max_clients` are already connected.
    pub fn try_register(&mut self, client: Client, max_clients: usize) -> bool {
        if self.clients.len() >= max_clients {
            return false;
        }
        self.clients.insert(client.client_addr(), client);
        true
    }

    pub fn remove(&mut self, addr: &SocketAddr) -> Option<Client> {
        self.clients.remove(addr)
    }

    pub fn get_mut(&mut self, addr: &SocketAddr) -> Option<&mut Client> {
        self.clients.get_mut(addr)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
