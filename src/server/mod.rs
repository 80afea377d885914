//! HTTP/WebSocket server surface
//!
//! Thin exterior around the relay core: a WebSocket upgrade endpoint that
//! registers connections and runs their ingress loops, and a JSON history
//! endpoint over the message store.

pub mod config;
pub mod routes;
pub mod ws;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::error::Result;
use crate::registry::ConnectionRegistry;
use crate::relay::RelayEngine;
use crate::store::MessageStore;

pub use config::ServerConfig;
pub use routes::build_router;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// Live connection set
    pub registry: Arc<ConnectionRegistry>,
    /// Persist-then-fan-out engine
    pub engine: Arc<RelayEngine>,
    /// Durable message log
    pub store: Arc<dyn MessageStore>,
    /// Allocator for connection ids
    pub next_conn_id: Arc<AtomicU64>,
}

impl AppState {
    /// Build the shared state over a message store
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let engine = Arc::new(RelayEngine::new(Arc::clone(&registry), Arc::clone(&store)));

        Self {
            registry,
            engine,
            store,
            next_conn_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

/// Chat relay server
pub struct RelayServer {
    config: ServerConfig,
    state: AppState,
}

impl RelayServer {
    /// Create a server over the given configuration and message store
    pub fn new(config: ServerConfig, store: Arc<dyn MessageStore>) -> Self {
        Self {
            config,
            state: AppState::new(store),
        }
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Chat relay listening");

        let app = routes::build_router(self.state.clone());
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;

        Ok(())
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Chat relay listening");

        let app = routes::build_router(self.state.clone());
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        tracing::info!("Shutdown complete");
        Ok(())
    }
}
