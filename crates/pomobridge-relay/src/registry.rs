//! Live index of connections grouped by role.
//!
//! The registry is plain data with no interior locking; [`RelayState`]
//! owns it behind the same mutex as the shared pomodoro state.
//!
//! Invariant: a connection appears under at most one role. Registering an
//! already-registered connection under a new role moves it.
//!
//! [`RelayState`]: crate::state::RelayState

use std::collections::HashMap;
use std::sync::Arc;

use pomobridge_types::{ConnectionId, Role, ServerMessage};
use tracing::{debug, warn};

use crate::connection::ClientConnection;

/// Connections indexed by role, then by connection ID.
#[derive(Debug, Default)]
pub struct Registry {
    roles: HashMap<Role, HashMap<ConnectionId, Arc<ClientConnection>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection under `role`.
    ///
    /// The connection is first removed from any other role it was under.
    /// Re-registering under the same role is a no-op. Returns the role the
    /// connection was previously registered under, if any.
    pub fn register(&mut self, connection: Arc<ClientConnection>, role: Role) -> Option<Role> {
        let id = connection.id();
        let previous = self.role_of(id);
        if previous == Some(role) {
            return previous;
        }
        if let Some(set) = previous.and_then(|old| self.roles.get_mut(&old)) {
            set.remove(&id);
        }
        self.roles.entry(role).or_default().insert(id, connection);
        previous
    }

    /// Remove a connection from every role.
    ///
    /// Returns `true` if the connection was registered anywhere.
    pub fn unregister(&mut self, id: ConnectionId) -> bool {
        let mut removed = false;
        for set in self.roles.values_mut() {
            removed |= set.remove(&id).is_some();
        }
        self.roles.retain(|_, set| !set.is_empty());
        removed
    }

    /// Send `message` to every connection registered under `role`, except
    /// `exclude` if given.
    ///
    /// Each delivery is independent: a closed recipient is skipped and the
    /// remaining recipients are still attempted. Returns the number of
    /// connections the message was queued for.
    pub fn broadcast(
        &self,
        role: Role,
        message: &ServerMessage,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let Some(set) = self.roles.get(&role) else {
            return 0;
        };
        let json: Arc<str> = match message.to_json() {
            Ok(j) => Arc::from(j),
            Err(e) => {
                warn!(%role, error = %e, "failed to serialize broadcast");
                return 0;
            }
        };
        let mut delivered: usize = 0;
        for (id, conn) in set {
            if Some(*id) == exclude {
                continue;
            }
            match conn.send(Arc::clone(&json)) {
                Ok(()) => delivered = delivered.saturating_add(1),
                Err(e) => debug!(%role, error = %e, "skipping closed recipient"),
            }
        }
        delivered
    }

    /// The role a connection is registered under.
    pub fn role_of(&self, id: ConnectionId) -> Option<Role> {
        self.roles
            .iter()
            .find(|(_, set)| set.contains_key(&id))
            .map(|(role, _)| *role)
    }

    /// Number of connections registered under `role`.
    pub fn count(&self, role: Role) -> usize {
        self.roles.get(&role).map_or(0, HashMap::len)
    }

    /// Total number of registered connections.
    pub fn len(&self) -> usize {
        self.roles.values().map(HashMap::len).sum()
    }

    /// Whether no connections are registered.
    pub fn is_empty(&self) -> bool {
        self.roles.values().all(HashMap::is_empty)
    }
}
