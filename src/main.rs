//! RAX File Server - Entry Point
//!
//! A remote file store serving one storage root over a line-based TCP protocol.

use log::info;
use std::process;

use rax_file_server::Server;
use rax_file_server::config::ServerConfig;
use rax_file_server::error::ServerError;
use rax_file_server::error::handlers::handle_error;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG, defaulting to info)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Launching file server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            handle_error(&ServerError::from(e));
            process::exit(1);
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            handle_error(&e);
            process::exit(1);
        }
    };

    server.start().await;
}
