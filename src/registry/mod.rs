//! Connection registry
//!
//! The registry is the authoritative set of live client connections. The
//! WebSocket handler adds a connection after the handshake, and the relay
//! engine takes a snapshot of the set for every broadcast pass.
//!
//! # Architecture
//!
//! ```text
//!                      Arc<ConnectionRegistry>
//!                 ┌───────────────────────────────┐
//!                 │ conns: RwLock<HashMap<u64,    │
//!                 │   Arc<Connection {            │
//!                 │     identity,                 │
//!                 │     outbound: Arc<dyn ...>,   │
//!                 │   }>                          │
//!                 │ >>                            │
//!                 └──────────────┬────────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            │                   │                   │
//!            ▼                   ▼                   ▼
//!       [ws handler]        [RelayEngine]       [writer task]
//!       add()               snapshot()          send() / remove()
//! ```
//!
//! Membership equals liveness: a connection is a member until one of its
//! broadcast writes fails, at which point the failing writer task removes it
//! and closes its handle. Removing an already-absent connection is a benign
//! no-op so that concurrent prunes of the same peer cannot conflict.

pub mod conn;
pub mod error;
pub mod store;

pub use conn::{Connection, Outbound};
pub use error::RegistryError;
pub use store::ConnectionRegistry;
