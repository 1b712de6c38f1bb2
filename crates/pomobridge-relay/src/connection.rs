//! `WebSocket` client connection handle.
//!
//! A [`ClientConnection`] is the relay's view of one duplex channel. The
//! socket itself is owned by a writer task that drains an unbounded queue
//! of [`Outbound`] frames; the handle only enqueues. Sending therefore
//! never blocks, and fails only once the writer task has gone away.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pomobridge_types::{ConnectionId, ServerMessage};
use tokio::sync::mpsc;
use tracing::warn;

use crate::error::SendError;

/// A frame queued for a client's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A UTF-8 text frame.
    Text(Arc<str>),
    /// Close the socket after flushing everything queued before it.
    Close,
}

/// Represents a connected `WebSocket` client.
#[derive(Debug)]
pub struct ClientConnection {
    /// Unique connection ID.
    id: ConnectionId,
    /// Send channel to the client's `WebSocket` write task.
    tx: mpsc::UnboundedSender<Outbound>,
    /// When this connection was established.
    connected_at: Instant,
}

impl ClientConnection {
    /// Create a new connection with a fresh identifier.
    pub fn new(tx: mpsc::UnboundedSender<Outbound>) -> Self {
        Self {
            id: ConnectionId::new(),
            tx,
            connected_at: Instant::now(),
        }
    }

    /// The connection's identity.
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a text frame for the client.
    ///
    /// # Errors
    ///
    /// Returns [`SendError`] if the writer task has exited.
    pub fn send(&self, text: Arc<str>) -> Result<(), SendError> {
        self.tx
            .send(Outbound::Text(text))
            .map_err(|_closed| SendError { connection: self.id })
    }

    /// Serialize a [`ServerMessage`] and queue it for the client.
    ///
    /// # Errors
    ///
    /// Returns [`SendError`] if the writer task has exited. A message that
    /// fails to serialize is logged and dropped.
    pub fn send_message(&self, message: &ServerMessage) -> Result<(), SendError> {
        match message.to_json() {
            Ok(json) => self.send(Arc::from(json)),
            Err(e) => {
                warn!(conn_id = %self.id, error = %e, "failed to serialize message");
                Ok(())
            }
        }
    }

    /// Ask the writer task to close the socket.
    ///
    /// Frames queued before the close are still delivered. Closing an
    /// already-closed connection is a no-op.
    pub fn close(&self) {
        let _ = self.tx.send(Outbound::Close);
    }

    /// Whether the writer task has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pomobridge_types::PomodoroState;

    use super::*;

    fn make_connection() -> (ClientConnection, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ClientConnection::new(tx), rx)
    }

    #[tokio::test]
    async fn send_text_is_queued() {
        let (conn, mut rx) = make_connection();
        assert!(conn.send(Arc::from("hello")).is_ok());
        assert_eq!(rx.recv().await, Some(Outbound::Text(Arc::from("hello"))));
    }

    #[test]
    fn send_to_dropped_writer_fails() {
        let (conn, rx) = make_connection();
        drop(rx);
        assert!(conn.is_closed());
        let err = conn.send(Arc::from("hello")).unwrap_err();
        assert_eq!(err.connection, conn.id());
    }

    #[tokio::test]
    async fn send_message_serializes_snapshot() {
        let (conn, mut rx) = make_connection();
        conn.send_message(&ServerMessage::State(PomodoroState::default()))
            .unwrap();
        let text = match rx.recv().await {
            Some(Outbound::Text(text)) => Some(text),
            _ => None,
        }
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.get("type"), Some(&serde_json::json!("state")));
        assert_eq!(value.get("timer"), Some(&serde_json::json!("--:--")));
    }

    #[tokio::test]
    async fn close_is_queued_after_pending_frames() {
        let (conn, mut rx) = make_connection();
        conn.send(Arc::from("first")).unwrap();
        conn.close();
        assert_eq!(rx.recv().await, Some(Outbound::Text(Arc::from("first"))));
        assert_eq!(rx.recv().await, Some(Outbound::Close));
    }

    #[test]
    fn close_on_dropped_writer_does_not_panic() {
        let (conn, rx) = make_connection();
        drop(rx);
        conn.close();
    }

    #[test]
    fn connections_get_distinct_ids() {
        let (a, _rx_a) = make_connection();
        let (b, _rx_b) = make_connection();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn connection_age_increases() {
        let (conn, _rx) = make_connection();
        let age1 = conn.age();
        std::thread::sleep(Duration::from_millis(10));
        assert!(conn.age() > age1);
    }
}
