//! Configuration management for the RAX file server
//!
//! Separates startup configuration (requires restart) from runtime configuration
//! (shared behind a lock so it can be adjusted while the server runs).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Default config file name, looked up in the working directory
const CONFIG_FILE: &str = "config";

/// Prefix for environment overrides, e.g. `RAX_STORE_PORT`
const ENV_PREFIX: &str = "RAX_STORE";

/// Complete server configuration as loaded from all sources
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub storage_root: String,
    pub max_command_length: usize,
    pub connection_timeout_secs: u64,
    pub max_clients: usize,
    pub max_upload_size_mb: u64,
}

/// Configuration that requires a server restart to take effect
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// IP address to bind the listener to
    pub bind_address: String,
    /// Listener port, 0 picks an ephemeral port
    pub port: u16,
    /// Directory holding every stored file and folder
    pub storage_root: String,
    /// Longest accepted command line in bytes
    pub max_command_length: usize,
    /// Idle time before a connection is dropped
    pub connection_timeout_secs: u64,
}

/// Configuration that can be changed while the server is running
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Environment: RAX_STORE_MAX_CLIENTS
    pub max_clients: usize,
    /// Environment: RAX_STORE_MAX_UPLOAD_SIZE_MB
    pub max_upload_size_mb: u64,
}

/// Thread-safe runtime configuration wrapper
pub type SharedRuntimeConfig = Arc<RwLock<RuntimeConfig>>;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 1099,
            storage_root: "server_storage".to_string(),
            max_command_length: 4096,
            connection_timeout_secs: 300,
            max_clients: 10,
            max_upload_size_mb: 100,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config.toml` with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from the given file (optional) with environment overrides
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("storage_root", defaults.storage_root)?
            .set_default("max_command_length", defaults.max_command_length as i64)?
            .set_default(
                "connection_timeout_secs",
                defaults.connection_timeout_secs as i64,
            )?
            .set_default("max_clients", defaults.max_clients as i64)?
            .set_default("max_upload_size_mb", defaults.max_upload_size_mb as i64)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Split into startup (immutable) and runtime (mutable) parts
    pub fn split(self) -> (StartupConfig, SharedRuntimeConfig) {
        let startup = StartupConfig {
            bind_address: self.bind_address,
            port: self.port,
            storage_root: self.storage_root,
            max_command_length: self.max_command_length,
            connection_timeout_secs: self.connection_timeout_secs,
        };
        let runtime = RuntimeConfig {
            max_clients: self.max_clients,
            max_upload_size_mb: self.max_upload_size_mb,
        };
        (startup, Arc::new(RwLock::new(runtime)))
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Message("bind_address cannot be empty".into()));
        }

        if self.storage_root.trim().is_empty() {
            return Err(ConfigError::Message("storage_root cannot be empty".into()));
        }

        if self.max_command_length < 64 {
            return Err(ConfigError::Message(
                "max_command_length must be at least 64".into(),
            ));
        }

        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "connection_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_upload_size_mb == 0 {
            return Err(ConfigError::Message(
                "max_upload_size_mb must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

impl StartupConfig {
    /// Bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Storage root as PathBuf
    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }

    /// Idle timeout as Duration
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

impl RuntimeConfig {
    /// Maximum upload size in bytes
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}
