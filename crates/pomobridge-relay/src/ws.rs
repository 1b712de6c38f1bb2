//! `WebSocket` handler driving one [`Session`] per connection.
//!
//! Clients connect to `GET /` (i.e. `ws://127.0.0.1:8787`). The socket is
//! split: a writer task drains the connection's outbound queue into the
//! sink while this task reads inbound frames and routes them. When the
//! inbound stream ends, for any reason, the session is closed and the
//! connection is purged from the registry.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt as _, StreamExt as _};
use futures::stream::SplitSink;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::connection::{ClientConnection, Outbound};
use crate::session::Session;
use crate::state::RelayState;

/// Upgrade an HTTP request to a `WebSocket` relay connection.
///
/// # Route
///
/// `GET /`
pub async fn ws_relay(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RelayState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle for one client.
async fn handle_ws(socket: WebSocket, state: Arc<RelayState>) {
    let (sink, mut stream) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let connection = Arc::new(ClientConnection::new(tx));
    let writer = tokio::spawn(write_loop(sink, rx));

    let mut session = Session::open(Arc::clone(&connection), state).await;

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let outcome = session.handle_text(text.as_str()).await;
                debug!(conn_id = %session.id(), ?outcome, "message handled");
                if connection.is_closed() {
                    debug!(conn_id = %session.id(), "writer gone, ending session");
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                debug!(conn_id = %session.id(), "close frame received");
                break;
            }
            Ok(_) => {
                // Binary frames carry nothing in this protocol; pings are
                // answered by the transport.
            }
            Err(e) => {
                warn!(conn_id = %session.id(), error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Queues a close frame behind anything still pending.
    session.close().await;
    drop(connection);
    if let Err(e) = writer.await {
        warn!(error = %e, "writer task failed");
    }
}

/// Forward queued frames to the socket until the queue closes, a close is
/// requested, or the socket rejects a write.
async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
) {
    while let Some(outbound) = rx.recv().await {
        match outbound {
            Outbound::Text(text) => {
                if sink.send(Message::Text(String::from(&*text).into())).await.is_err() {
                    debug!("WebSocket client disconnected (send failed)");
                    return;
                }
            }
            Outbound::Close => {
                let _ = sink.send(Message::Close(None)).await;
                return;
            }
        }
    }
    let _ = sink.close().await;
}
