//! WebSocket upgrade endpoint and connection glue
//!
//! On upgrade the socket splits: the sink goes into the registry behind the
//! connection's write handle, the stream stays with the ingress loop that
//! runs on the upgrade task until the peer goes away.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::connect_info::ConnectInfo;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;

use super::AppState;
use crate::registry::{Connection, Outbound};
use crate::relay::run_ingress;

/// Write half of a chat WebSocket
///
/// The mutex serializes concurrent broadcast writers targeting the same
/// peer, so interleaved fan-out never tears a frame.
struct WsOutbound {
    sink: Mutex<SplitSink<WebSocket, Message>>,
}

#[async_trait]
impl Outbound for WsOutbound {
    async fn send(&self, text: String) -> io::Result<()> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(text.into()))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))
    }

    async fn close(&self) {
        let mut sink = self.sink.lock().await;
        let _ = sink.close().await;
    }
}

/// GET /ws: WebSocket upgrade endpoint
///
/// No subprotocol negotiation; the peer's socket address becomes its
/// identity for message tagging.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, peer_addr))
}

async fn handle_socket(socket: WebSocket, state: AppState, peer_addr: SocketAddr) {
    let (sink, stream) = socket.split();

    let conn_id = state.next_conn_id.fetch_add(1, Ordering::Relaxed);
    let conn = Arc::new(Connection::new(
        conn_id,
        peer_addr.to_string(),
        Arc::new(WsOutbound {
            sink: Mutex::new(sink),
        }),
    ));

    if let Err(e) = state.registry.add(Arc::clone(&conn)).await {
        tracing::error!(conn_id, peer = %peer_addr, error = %e, "Failed to register connection");
        conn.close().await;
        return;
    }

    tracing::info!(conn_id, peer = %peer_addr, "New chat connection");

    run_ingress(conn, stream, Arc::clone(&state.engine)).await;
}
