//! Broadcast engine
//!
//! Persists a tagged message and fans it out to the current registry
//! snapshot. Append happens first and is the only failure surfaced to the
//! caller: a message that cannot be made durable is never delivered.

use std::sync::Arc;

use crate::registry::ConnectionRegistry;
use crate::store::{MessageStore, StoreError};

/// Persist-then-fan-out engine
///
/// Cheap to share; the server keeps one instance behind an `Arc` and every
/// ingress loop calls into it.
pub struct RelayEngine {
    registry: Arc<ConnectionRegistry>,
    store: Arc<dyn MessageStore>,
}

impl RelayEngine {
    /// Create an engine over the given registry and store
    pub fn new(registry: Arc<ConnectionRegistry>, store: Arc<dyn MessageStore>) -> Self {
        Self { registry, store }
    }

    /// Durably append a tagged message, then deliver it to every live
    /// connection
    ///
    /// Returns the store-assigned id once the append has succeeded. Writes
    /// are issued on detached tasks, one per snapshot member, and are not
    /// awaited: completion here guarantees durability, not delivery. A
    /// failed write removes that connection from the registry and closes
    /// its handle; no retry is attempted.
    pub async fn broadcast(&self, text: String) -> Result<i64, StoreError> {
        let id = self.store.append(&text).await?;

        let conns = self.registry.snapshot().await;
        tracing::debug!(msg_id = id, peers = conns.len(), "Fanning out message");

        for conn in conns {
            let registry = Arc::clone(&self.registry);
            let text = text.clone();

            tokio::spawn(async move {
                if let Err(e) = conn.send(text).await {
                    tracing::warn!(
                        conn_id = conn.id(),
                        peer = %conn.identity(),
                        error = %e,
                        "Write failed, pruning connection"
                    );
                    registry.remove(conn.id()).await;
                    conn.close().await;
                }
            });
        }

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use super::*;
    use crate::registry::{Connection, Outbound};
    use crate::store::{MemoryStore, MessageRecord};

    /// Outbound that reports every delivery on a channel and can be made to
    /// fail.
    struct MockOutbound {
        delivered: mpsc::UnboundedSender<(u64, String)>,
        id: u64,
        fail: bool,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl Outbound for MockOutbound {
        async fn send(&self, text: String) -> io::Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
            }
            let _ = self.delivered.send((self.id, text));
            Ok(())
        }

        async fn close(&self) {}
    }

    struct FailingStore;

    #[async_trait]
    impl MessageStore for FailingStore {
        async fn append(&self, _text: &str) -> Result<i64, StoreError> {
            Err(StoreError::Timeout)
        }

        async fn list_all(&self) -> Result<Vec<MessageRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn mock_conn(
        id: u64,
        fail: bool,
        delivered: &mpsc::UnboundedSender<(u64, String)>,
    ) -> (Arc<Connection>, Arc<MockOutbound>) {
        let outbound = Arc::new(MockOutbound {
            delivered: delivered.clone(),
            id,
            fail,
            attempts: AtomicUsize::new(0),
        });
        let conn = Arc::new(Connection::new(
            id,
            format!("peer-{}", id),
            Arc::clone(&outbound) as Arc<dyn Outbound>,
        ));
        (conn, outbound)
    }

    async fn recv_delivery(rx: &mut mpsc::UnboundedReceiver<(u64, String)>) -> (u64, String) {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("delivery timed out")
            .expect("delivery channel closed")
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_peer() {
        let registry = Arc::new(ConnectionRegistry::new());
        let engine = RelayEngine::new(Arc::clone(&registry), Arc::new(MemoryStore::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        for id in 1..=3 {
            let (conn, _) = mock_conn(id, false, &tx);
            registry.add(conn).await.unwrap();
        }

        engine.broadcast("a: hello".to_string()).await.unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            let (id, text) = recv_delivery(&mut rx).await;
            assert_eq!(text, "a: hello");
            seen.push(id);
        }
        seen.sort_unstable();
        assert_eq!(seen, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_failed_append_delivers_nothing() {
        let registry = Arc::new(ConnectionRegistry::new());
        let engine = RelayEngine::new(Arc::clone(&registry), Arc::new(FailingStore));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let (conn, outbound) = mock_conn(1, false, &tx);
        registry.add(conn).await.unwrap();

        let result = engine.broadcast("a: lost".to_string()).await;
        assert!(matches!(result, Err(StoreError::Timeout)));

        // No write may be attempted for a message that was never durable.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(outbound.attempts.load(Ordering::SeqCst), 0);

        // The peer is still registered; append failure says nothing about it.
        assert!(registry.contains(1).await);
    }

    #[tokio::test]
    async fn test_failed_write_prunes_peer() {
        let registry = Arc::new(ConnectionRegistry::new());
        let engine = RelayEngine::new(Arc::clone(&registry), Arc::new(MemoryStore::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let (good, _) = mock_conn(1, false, &tx);
        let (bad, bad_outbound) = mock_conn(2, true, &tx);
        registry.add(good).await.unwrap();
        registry.add(bad).await.unwrap();

        engine.broadcast("a: ping".to_string()).await.unwrap();

        // The healthy peer still gets the message.
        let (id, text) = recv_delivery(&mut rx).await;
        assert_eq!(id, 1);
        assert_eq!(text, "a: ping");

        // The failing peer is removed once its writer task observes the
        // error.
        timeout(Duration::from_secs(1), async {
            while registry.contains(2).await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("failing peer was not pruned");

        // Subsequent broadcasts never attempt the pruned peer again.
        let attempts_after_prune = bad_outbound.attempts.load(Ordering::SeqCst);
        engine.broadcast("a: again".to_string()).await.unwrap();
        let (id, _) = recv_delivery(&mut rx).await;
        assert_eq!(id, 1);
        assert_eq!(
            bad_outbound.attempts.load(Ordering::SeqCst),
            attempts_after_prune
        );
    }

    #[tokio::test]
    async fn test_empty_registry_still_appends() {
        let registry = Arc::new(ConnectionRegistry::new());
        let store = Arc::new(MemoryStore::new());
        let engine = RelayEngine::new(registry, Arc::clone(&store) as Arc<dyn MessageStore>);

        let id = engine.broadcast("a: alone".to_string()).await.unwrap();

        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].text, "a: alone");
    }

    #[tokio::test]
    async fn test_write_attempts_match_snapshot_size() {
        let registry = Arc::new(ConnectionRegistry::new());
        let engine = RelayEngine::new(Arc::clone(&registry), Arc::new(MemoryStore::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut outbounds = Vec::new();
        for id in 1..=5 {
            let (conn, outbound) = mock_conn(id, false, &tx);
            registry.add(conn).await.unwrap();
            outbounds.push(outbound);
        }

        engine.broadcast("a: count".to_string()).await.unwrap();

        for _ in 0..5 {
            recv_delivery(&mut rx).await;
        }
        for outbound in &outbounds {
            assert_eq!(outbound.attempts.load(Ordering::SeqCst), 1);
        }
    }
}
