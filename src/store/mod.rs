//! Durable message store
//!
//! The relay's persistence collaborator: an ordered, appendable, listable
//! log of chat messages. Every message is appended here before any delivery
//! is attempted, so the store is the source of truth for history replay.
//!
//! Two implementations are provided: [`SqliteStore`] for the server binary
//! and [`MemoryStore`] for tests and ephemeral deployments.

pub mod error;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// One persisted chat message
///
/// `text` is the sender-tagged body produced at ingress time and is
/// immutable once appended. `id` is assigned by the store on insert and
/// orders the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Store-assigned identifier, monotonic in insertion order
    pub id: i64,
    /// Sender-tagged message body
    pub text: String,
}

/// Ordered, appendable, listable log of chat messages
///
/// Implementations must be safe for concurrent append/list calls and must
/// bound each operation with a deadline rather than block indefinitely.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append one message, returning its assigned id
    async fn append(&self, text: &str) -> Result<i64, StoreError>;

    /// List every message in insertion order
    async fn list_all(&self) -> Result<Vec<MessageRecord>, StoreError>;
}
