//! Error types shared across the relay.

use pomobridge_types::ConnectionId;

/// A message could not be handed to a client's writer task.
///
/// Raised when the remote end is gone: the writer task has exited and
/// dropped its half of the outbound channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("connection {connection} is closed")]
pub struct SendError {
    /// The connection the send was addressed to.
    pub connection: ConnectionId,
}
