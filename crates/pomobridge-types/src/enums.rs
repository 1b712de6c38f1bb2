//! Enumeration types for the relay protocol.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Client roles
// ---------------------------------------------------------------------------

/// The declared category of a connected client.
///
/// Every connection starts as [`Role::Unknown`] and moves to the role it
/// declares in its `hello` message. Routing is role-asymmetric: state
/// snapshots fan out to [`Role::Gnome`], commands fan out to
/// [`Role::Browser`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The GNOME Shell panel extension (command surface, state consumer).
    Gnome,
    /// The browser extension (authoritative state source, command consumer).
    Browser,
    /// Not yet identified, or identified with an unrecognized client name.
    #[default]
    Unknown,
}

impl Role {
    /// Map the `client` field of a `hello` message to a role.
    ///
    /// Unrecognized names fall back to [`Role::Unknown`].
    pub fn from_client(client: &str) -> Self {
        match client {
            "gnome" => Self::Gnome,
            "browser" => Self::Browser,
            _ => Self::Unknown,
        }
    }

    /// The wire name of this role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gnome => "gnome",
            Self::Browser => "browser",
            Self::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Pomodoro phases
// ---------------------------------------------------------------------------

/// Which part of the pomodoro cycle the timer is in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// A focused work interval.
    Work,
    /// A rest interval between work intervals.
    Break,
    /// The timer is stopped.
    #[default]
    Paused,
}
