//! Shared application state for the relay server.
//!
//! [`RelayState`] holds the connection [`Registry`] and the process-wide
//! [`PomodoroState`] behind a single [`Mutex`]. Every operation that reads
//! or writes either of them takes the lock once and holds it for the whole
//! read-modify-fanout sequence, so:
//!
//! - a `state` merge and the snapshot it broadcasts are never interleaved
//!   with another merge,
//! - a joining client's snapshot is always a complete, consistent record,
//! - a broadcast never observes a connection mid-removal.
//!
//! Fan-out only enqueues onto per-connection channels, so holding the lock
//! across it never waits on the network.

use std::sync::Arc;

use pomobridge_types::{ConnectionId, PomodoroState, Role, ServerMessage, StateUpdate};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::connection::ClientConnection;
use crate::error::SendError;
use crate::registry::Registry;

/// Everything guarded by the relay's single lock.
#[derive(Debug, Default)]
struct Shared {
    registry: Registry,
    pomodoro: PomodoroState,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. Each
/// session holds a clone of the `Arc`.
#[derive(Debug, Default)]
pub struct RelayState {
    shared: Mutex<Shared>,
}

impl RelayState {
    /// Create relay state with the default pomodoro record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create relay state seeded with a given pomodoro record.
    #[cfg(test)]
    fn with_state(pomodoro: PomodoroState) -> Self {
        Self {
            shared: Mutex::new(Shared {
                registry: Registry::new(),
                pomodoro,
            }),
        }
    }

    /// Register a freshly accepted connection under [`Role::Unknown`].
    pub async fn connect(&self, connection: Arc<ClientConnection>) {
        let mut shared = self.shared.lock().await;
        shared.registry.register(connection, Role::Unknown);
    }

    /// Move a connection to its declared role and send it a snapshot.
    ///
    /// The snapshot is queued while the lock is held, so it is the very
    /// next message the connection receives and reflects the state at the
    /// moment of registration.
    ///
    /// # Errors
    ///
    /// Returns [`SendError`] if the connection's writer has already gone.
    /// The connection stays registered until its session ends.
    pub async fn identify(
        &self,
        connection: &Arc<ClientConnection>,
        role: Role,
    ) -> Result<Option<Role>, SendError> {
        let mut shared = self.shared.lock().await;
        let previous = shared.registry.register(Arc::clone(connection), role);
        connection.send_message(&ServerMessage::State(shared.pomodoro.clone()))?;
        Ok(previous)
    }

    /// Merge a partial update and fan the full snapshot out to every
    /// `gnome` connection except `sender`.
    ///
    /// The sender's role is not checked. Returns the number of recipients.
    pub async fn update_state(&self, sender: ConnectionId, update: &StateUpdate) -> usize {
        let mut shared = self.shared.lock().await;
        let changed = shared.pomodoro.apply(update);
        let snapshot = ServerMessage::State(shared.pomodoro.clone());
        let recipients = shared.registry.broadcast(Role::Gnome, &snapshot, Some(sender));
        debug!(%sender, changed, recipients, "state merged");
        recipients
    }

    /// Relay a command verbatim to every `browser` connection.
    ///
    /// The sender is not excluded and its role is not checked. Returns the
    /// number of recipients.
    pub async fn relay_command(&self, cmd: Value) -> usize {
        let shared = self.shared.lock().await;
        shared
            .registry
            .broadcast(Role::Browser, &ServerMessage::Command { cmd }, None)
    }

    /// Remove a connection from every role.
    ///
    /// Returns `true` if it was registered anywhere.
    pub async fn disconnect(&self, id: ConnectionId) -> bool {
        let mut shared = self.shared.lock().await;
        let removed = shared.registry.unregister(id);
        if removed && shared.registry.is_empty() {
            debug!("last client left, registry empty");
        }
        removed
    }

    /// A consistent copy of the current pomodoro state.
    pub async fn snapshot(&self) -> PomodoroState {
        self.shared.lock().await.pomodoro.clone()
    }

    /// The role a connection is currently registered under.
    pub async fn role_of(&self, id: ConnectionId) -> Option<Role> {
        self.shared.lock().await.registry.role_of(id)
    }

    /// Number of connections registered under `role`.
    pub async fn count(&self, role: Role) -> usize {
        self.shared.lock().await.registry.count(role)
    }

    /// Total number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.shared.lock().await.registry.len()
    }
}
