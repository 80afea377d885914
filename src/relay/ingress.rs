//! Per-connection ingress loop
//!
//! Reads frames from one connection, tags each payload with the sender's
//! identity, and hands it to the broadcast engine. The loop is generic over
//! the inbound frame stream so the state machine can be exercised without a
//! real socket.

use std::sync::Arc;

use axum::extract::ws::Message;
use futures_util::{Stream, StreamExt};

use super::broadcast::RelayEngine;
use crate::registry::Connection;

/// Prefix a raw payload with the sender's identity
fn tag(identity: &str, body: &str) -> String {
    format!("{}: {}", identity, body)
}

/// Read frames from `inbound` until the peer goes away
///
/// Each non-empty text or binary payload is tagged and broadcast. A clean
/// end of stream (or a Close frame) ends the loop without touching the
/// registry: pruning is driven solely by broadcast write failures, so a
/// peer that stops reading without closing is cleaned up by its next failed
/// write. Transient read errors are logged and the read retried; under
/// tungstenite a fatal transport error is followed by end of stream, so the
/// retry cannot spin.
pub async fn run_ingress<S>(conn: Arc<Connection>, mut inbound: S, engine: Arc<RelayEngine>)
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let body = match inbound.next().await {
            None => break,
            Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
            Some(Ok(Message::Binary(data))) => String::from_utf8_lossy(&data).into_owned(),
            Some(Ok(Message::Close(_))) => break,
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                tracing::warn!(
                    conn_id = conn.id(),
                    peer = %conn.identity(),
                    error = %e,
                    "Read error, retrying"
                );
                continue;
            }
        };

        if body.is_empty() {
            continue;
        }

        let tagged = tag(conn.identity(), &body);
        if let Err(e) = engine.broadcast(tagged).await {
            // Fatal for this message only: never deliver what wasn't
            // durably recorded.
            tracing::error!(
                conn_id = conn.id(),
                error = %e,
                "Failed to persist message, dropping"
            );
        }
    }

    tracing::debug!(conn_id = conn.id(), peer = %conn.identity(), "Ingress loop ended");
}
