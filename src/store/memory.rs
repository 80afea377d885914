//! In-memory message store
//!
//! Keeps the full history in a `Vec`. Used by tests and useful for
//! ephemeral deployments where history need not survive a restart.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::StoreError;
use super::{MessageRecord, MessageStore};

/// Volatile message store backed by a vector
pub struct MemoryStore {
    msgs: RwLock<Vec<MessageRecord>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            msgs: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn append(&self, text: &str) -> Result<i64, StoreError> {
        let mut msgs = self.msgs.write().await;
        let id = msgs.len() as i64 + 1;
        msgs.push(MessageRecord {
            id,
            text: text.to_owned(),
        });
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<MessageRecord>, StoreError> {
        Ok(self.msgs.read().await.clone())
    }
}
