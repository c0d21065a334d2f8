use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::client::{Client, ClientRegistry, handle_client};
use crate::config::{ServerConfig, SharedRuntimeConfig, StartupConfig};
use crate::error::ServerError;
use crate::protocol::responses::{self, format_response};
use crate::storage::{FileStore, LocalFileStore};

pub struct Server {
    client_registry: Arc<Mutex<ClientRegistry>>,
    store: Arc<dyn FileStore>,
    listener: TcpListener,
    startup: Arc<StartupConfig>,
    runtime: SharedRuntimeConfig,
}

impl Server {
    /// Opens the storage root and binds the listener.
    ///
    /// Failures here are fatal: an unusable storage root or socket stops
    /// the server before it accepts anything.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let (startup, runtime) = config.split();

        let store = LocalFileStore::open(startup.storage_root_path())?;
        info!("Storage directory: {}", store.root().display());

        let socket = startup.listen_socket();
        let listener = TcpListener::bind(&socket).await.map_err(|e| {
            error!("Failed to bind to {}: {}", socket, e);
            ServerError::Io(e)
        })?;
        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self::with_store(listener, Arc::new(store), startup, runtime))
    }

    /// Builds a server around an already bound listener and any store backend.
    pub fn with_store(
        listener: TcpListener,
        store: Arc<dyn FileStore>,
        startup: StartupConfig,
        runtime: SharedRuntimeConfig,
    ) -> Self {
        Self {
            client_registry: Arc::new(Mutex::new(ClientRegistry::new())),
            store,
            listener,
            startup: Arc::new(startup),
            runtime,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn start(&self) {
        info!(
            "Starting RAX file server on {} (max {} clients)",
            self.startup.listen_socket(),
            self.runtime.read().await.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let client_registry = Arc::clone(&self.client_registry);
                    let store = Arc::clone(&self.store);
                    let startup = Arc::clone(&self.startup);
                    let runtime = Arc::clone(&self.runtime);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_new_client(stream, addr, client_registry, store, startup, runtime)
                                .await
                        {
                            warn!("Failed to handle client {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Handles a new client: enforces the client limit, greets, registers, and runs the session.
async fn handle_new_client(
    mut stream: TcpStream,
    client_addr: SocketAddr,
    client_registry: Arc<Mutex<ClientRegistry>>,
    store: Arc<dyn FileStore>,
    startup: Arc<StartupConfig>,
    runtime: SharedRuntimeConfig,
) -> Result<(), std::io::Error> {
    let max_clients = runtime.read().await.max_clients;

    {
        let mut clients = client_registry.lock().await;
        if !clients.try_register(Client::new(client_addr), max_clients) {
            drop(clients);
            warn!("Rejecting {}: client limit of {} reached", client_addr, max_clients);
            stream
                .write_all(
                    format_response(
                        responses::SERVICE_UNAVAILABLE,
                        "Too many connections. Try again later.",
                    )
                    .as_bytes(),
                )
                .await?;
            return Ok(());
        }

        info!(
            "Client connected: {} ({}/{} clients)",
            client_addr,
            clients.len(),
            max_clients
        );
    }

    if let Err(e) = greet(&mut stream).await {
        client_registry.lock().await.remove(&client_addr);
        return Err(e);
    }

    handle_client(stream, client_addr, client_registry, store, startup, runtime).await;
    Ok(())
}

async fn greet(stream: &mut TcpStream) -> Result<(), std::io::Error> {
    stream
        .write_all(format_response(responses::READY, "RAX file server ready").as_bytes())
        .await?;
    stream.flush().await
}
