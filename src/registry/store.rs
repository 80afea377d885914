//! Connection registry implementation
//!
//! The central set of live connections. Add and remove mutate the set;
//! broadcast passes work from a point-in-time snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::conn::Connection;
use super::error::RegistryError;

/// Authoritative set of live connections
///
/// Thread-safe via `RwLock`. The broadcast path only reads the map, so
/// fan-out to many peers never contends with other broadcasts; writers are
/// the handshake (add) and pruning writer tasks (remove).
pub struct ConnectionRegistry {
    conns: RwLock<HashMap<u64, Arc<Connection>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            conns: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection, making it broadcast-eligible
    ///
    /// Fails if a connection with the same id is already present. Ids are
    /// allocated from a process-wide counter, so this indicates a bug in the
    /// caller rather than a peer-visible condition.
    pub async fn add(&self, conn: Arc<Connection>) -> Result<(), RegistryError> {
        let mut conns = self.conns.write().await;

        if conns.contains_key(&conn.id()) {
            return Err(RegistryError::DuplicateConnection(conn.id()));
        }

        tracing::debug!(conn_id = conn.id(), peer = %conn.identity(), "Connection registered");
        conns.insert(conn.id(), conn);
        Ok(())
    }

    /// Remove a connection if present
    ///
    /// Returns whether anything was removed. An absent id is a no-op, not an
    /// error: deregistration can race with a concurrent broadcast failure on
    /// the same connection, both attempting removal.
    pub async fn remove(&self, id: u64) -> bool {
        let removed = self.conns.write().await.remove(&id);

        if let Some(conn) = &removed {
            tracing::debug!(conn_id = id, peer = %conn.identity(), "Connection removed");
        }

        removed.is_some()
    }

    /// Point-in-time copy of the live connection set
    ///
    /// The result may be stale relative to subsequent add/remove calls;
    /// callers must tolerate writes to connections that have since been
    /// removed.
    pub async fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.conns.read().await.values().cloned().collect()
    }

    /// Whether a connection id is currently registered
    pub async fn contains(&self, id: u64) -> bool {
        self.conns.read().await.contains_key(&id)
    }

    /// Number of live connections
    pub async fn len(&self) -> usize {
        self.conns.read().await.len()
    }

    /// Whether the registry is empty
    pub async fn is_empty(&self) -> bool {
        self.conns.read().await.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use async_trait::async_trait;

    use super::*;
    use crate::registry::Outbound;

    struct NullOutbound;

    #[async_trait]
    impl Outbound for NullOutbound {
        async fn send(&self, _text: String) -> io::Result<()> {
            Ok(())
        }

        async fn close(&self) {}
    }

    fn conn(id: u64) -> Arc<Connection> {
        Arc::new(Connection::new(
            id,
            format!("127.0.0.1:{}", 50000 + id),
            Arc::new(NullOutbound),
        ))
    }

    #[tokio::test]
    async fn test_add_and_snapshot() {
        let registry = ConnectionRegistry::new();

        registry.add(conn(1)).await.unwrap();
        registry.add(conn(2)).await.unwrap();

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert!(registry.contains(1).await);
        assert!(registry.contains(2).await);
    }

    #[tokio::test]
    async fn test_duplicate_add_rejected() {
        let registry = ConnectionRegistry::new();

        registry.add(conn(7)).await.unwrap();
        let result = registry.add(conn(7)).await;

        assert_eq!(result, Err(RegistryError::DuplicateConnection(7)));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let registry = ConnectionRegistry::new();

        registry.add(conn(1)).await.unwrap();
        assert!(registry.remove(1).await);

        // Second removal races are expected; not an error.
        assert!(!registry.remove(1).await);
        assert!(!registry.remove(42).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_snapshot_is_stale_copy() {
        let registry = ConnectionRegistry::new();

        registry.add(conn(1)).await.unwrap();
        registry.add(conn(2)).await.unwrap();

        let snapshot = registry.snapshot().await;
        registry.remove(2).await;

        // The snapshot still holds the removed connection; the registry
        // doesn't.
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len().await, 1);
    }
}
