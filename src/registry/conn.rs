//! Connection handle types
//!
//! A [`Connection`] pairs a peer identity with the write half of its channel.
//! The read half stays with the ingress loop that owns the connection; the
//! write half is shared so that broadcast writer tasks can deliver to the
//! peer concurrently with everything else.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;

/// Write half of a client channel.
///
/// Implementations must serialize concurrent `send` calls internally; the
/// relay spawns one writer task per recipient per broadcast and several may
/// target the same peer at once.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Deliver one text message to the peer.
    async fn send(&self, text: String) -> io::Result<()>;

    /// Close the channel. Errors are ignored; the peer is already gone.
    async fn close(&self);
}

/// One live client connection.
pub struct Connection {
    id: u64,
    identity: String,
    outbound: Arc<dyn Outbound>,
}

impl Connection {
    /// Create a connection from a process-unique id, the peer's remote
    /// address string, and its write handle.
    pub fn new(id: u64, identity: impl Into<String>, outbound: Arc<dyn Outbound>) -> Self {
        Self {
            id,
            identity: identity.into(),
            outbound,
        }
    }

    /// Process-unique connection id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remote address string, used only to tag messages.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Write one text message to the peer.
    pub async fn send(&self, text: String) -> io::Result<()> {
        self.outbound.send(text).await
    }

    /// Close the peer channel.
    pub async fn close(&self) {
        self.outbound.close().await;
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .finish()
    }
}
