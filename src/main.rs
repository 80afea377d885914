//! Chat relay server binary
//!
//! Loads configuration from the environment, opens the SQLite message
//! store, and serves until ctrl-c. Failing to open the store is the only
//! process-fatal condition.

use std::sync::Arc;

use relay_rs::server::{RelayServer, ServerConfig};
use relay_rs::store::SqliteStore;

#[tokio::main]
async fn main() -> relay_rs::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay_rs=info".parse().expect("valid default filter")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let store = Arc::new(SqliteStore::open_with_timeout(
        &config.db_path,
        config.store_op_timeout,
    )?);

    let server = RelayServer::new(config, store);
    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
