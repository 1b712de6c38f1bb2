//! Per-connection message router.
//!
//! A [`Session`] is created when a connection is accepted and lives until
//! the inbound stream ends. It starts [`SessionPhase::Unidentified`] and
//! becomes [`SessionPhase::Identified`] on the first `hello`.
//!
//! | inbound        | effect                                                   |
//! |----------------|----------------------------------------------------------|
//! | malformed      | discarded                                                |
//! | `hello`        | move to declared role, snapshot to sender                |
//! | `state`        | merge, full snapshot to every `gnome` except the sender  |
//! | `command`      | relay `cmd` verbatim to every `browser`                  |
//! | other `type`   | discarded                                                |
//!
//! `state` and `command` are accepted in either phase and from any role;
//! routing is decided by message type alone.

use std::sync::Arc;

use pomobridge_types::{ClientMessage, ConnectionId, Role};
use tracing::{debug, info};

use crate::connection::ClientConnection;
use crate::state::RelayState;

/// Identification state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No `hello` received yet.
    Unidentified,
    /// A `hello` declared this role.
    Identified(Role),
}

/// What handling one inbound frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A `hello` moved the connection to this role and a snapshot was queued.
    Identified(Role),
    /// A `state` update was merged and fanned out.
    StateApplied {
        /// Number of `gnome` connections the snapshot was queued for.
        recipients: usize,
    },
    /// A `command` was relayed.
    CommandRelayed {
        /// Number of `browser` connections the command was queued for.
        recipients: usize,
    },
    /// A well-formed message with an unrecognized `type`.
    Ignored,
    /// A frame that could not be decoded.
    Malformed,
}

/// One connection's routing loop state.
#[derive(Debug)]
pub struct Session {
    connection: Arc<ClientConnection>,
    state: Arc<RelayState>,
    phase: SessionPhase,
}

impl Session {
    /// Start a session: register the connection under [`Role::Unknown`].
    pub async fn open(connection: Arc<ClientConnection>, state: Arc<RelayState>) -> Self {
        state.connect(Arc::clone(&connection)).await;
        info!(conn_id = %connection.id(), "client connected");
        Self {
            connection,
            state,
            phase: SessionPhase::Unidentified,
        }
    }

    /// The connection this session routes for.
    pub fn id(&self) -> ConnectionId {
        self.connection.id()
    }

    /// Current identification state.
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Decode and dispatch one inbound text frame.
    ///
    /// Never fails: malformed and unrecognized frames are discarded
    /// without any reply.
    pub async fn handle_text(&mut self, text: &str) -> Dispatch {
        let message = match ClientMessage::decode(text) {
            Ok(m) => m,
            Err(e) => {
                debug!(conn_id = %self.id(), error = %e, "discarding malformed message");
                return Dispatch::Malformed;
            }
        };
        debug!(conn_id = %self.id(), kind = message.kind(), "dispatching message");

        match message {
            ClientMessage::Hello { client } => self.identify(client).await,
            ClientMessage::State(update) => {
                let recipients = self.state.update_state(self.id(), &update).await;
                Dispatch::StateApplied { recipients }
            }
            ClientMessage::Command { cmd } => {
                let recipients = self.state.relay_command(cmd).await;
                Dispatch::CommandRelayed { recipients }
            }
            ClientMessage::Unrecognized => Dispatch::Ignored,
        }
    }

    /// Handle a `hello`. A repeated `hello` migrates to the new role.
    async fn identify(&mut self, role: Role) -> Dispatch {
        match self.state.identify(&self.connection, role).await {
            Ok(previous) => {
                info!(conn_id = %self.id(), %role, ?previous, "client identified");
            }
            Err(e) => {
                debug!(conn_id = %self.id(), error = %e, "snapshot not delivered");
            }
        }
        self.phase = SessionPhase::Identified(role);
        Dispatch::Identified(role)
    }

    /// End the session: remove the connection from every role, then ask
    /// its writer to close the socket.
    ///
    /// Must run on every exit path, including sessions that never sent a
    /// `hello` and sessions that ended on a socket error.
    pub async fn close(self) {
        let removed = self.state.disconnect(self.id()).await;
        self.connection.close();
        info!(
            conn_id = %self.id(),
            removed,
            age_ms = self.connection.age().as_millis(),
            "client disconnected"
        );
    }
}
