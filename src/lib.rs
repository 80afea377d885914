//! WebSocket chat relay server
//!
//! Clients connect over a persistent WebSocket, send text messages, and
//! receive every message sent by any connected client. Each message is
//! durably appended to a log before any delivery, and the full history is
//! served over a JSON endpoint.
//!
//! # Architecture
//!
//! ```text
//!   [client] ──ws──► ingress loop ──► RelayEngine ──► MessageStore (append)
//!                                         │
//!                                         ▼
//!                                 ConnectionRegistry.snapshot()
//!                                         │
//!                        one detached writer task per live connection
//!                                         │
//!   [client] ◄──ws── WsOutbound ◄─────────┘
//! ```
//!
//! Durability comes first: a message that cannot be appended is never
//! delivered to anyone. Delivery is best effort: writer tasks are not
//! awaited, and a failed write is the signal that prunes a dead peer from
//! the registry.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use relay_rs::server::{RelayServer, ServerConfig};
//! use relay_rs::store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> relay_rs::error::Result<()> {
//!     let config = ServerConfig::with_addr("127.0.0.1:3001".parse().expect("valid addr"));
//!     let server = RelayServer::new(config, Arc::new(MemoryStore::new()));
//!     server.run().await
//! }
//! ```

pub mod error;
pub mod registry;
pub mod relay;
pub mod server;
pub mod store;

pub use error::{Error, Result};
pub use registry::ConnectionRegistry;
pub use relay::RelayEngine;
pub use server::{RelayServer, ServerConfig};
pub use store::{MessageRecord, MessageStore};
