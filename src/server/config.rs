//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;
use crate::store::sqlite::DEFAULT_OP_TIMEOUT;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Path of the SQLite message store
    pub db_path: PathBuf,

    /// Deadline for each message store operation
    pub store_op_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3001".parse().expect("valid default bind addr"),
            db_path: PathBuf::from("relay.db"),
            store_op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Create a new config with a custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the message store path
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    /// Set the message store operation deadline
    pub fn store_op_timeout(mut self, timeout: Duration) -> Self {
        self.store_op_timeout = timeout;
        self
    }

    /// Load configuration from the environment
    ///
    /// Reads `RELAY_BIND_ADDR`, `RELAY_DB_PATH` and
    /// `RELAY_STORE_TIMEOUT_SECS`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("RELAY_BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .map_err(|e| Error::Config(format!("invalid RELAY_BIND_ADDR {:?}: {}", addr, e)))?;
        }

        if let Ok(path) = std::env::var("RELAY_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Ok(secs) = std::env::var("RELAY_STORE_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|e| {
                Error::Config(format!("invalid RELAY_STORE_TIMEOUT_SECS {:?}: {}", secs, e))
            })?;
            config.store_op_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 3001);
        assert_eq!(config.db_path, PathBuf::from("relay.db"));
        assert_eq!(config.store_op_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr, addr);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .db_path("/tmp/chat.db")
            .store_op_timeout(Duration::from_secs(3));

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.db_path, PathBuf::from("/tmp/chat.db"));
        assert_eq!(config.store_op_timeout, Duration::from_secs(3));
    }
}
