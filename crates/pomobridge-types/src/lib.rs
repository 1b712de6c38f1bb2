//! Shared type definitions for the Pomobridge relay.
//!
//! This crate is the single source of truth for the wire protocol spoken
//! between the relay, the GNOME Shell extension and the browser extension,
//! and for the shared pomodoro state record the relay holds.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for connection identifiers
//! - [`enums`] -- Client roles and pomodoro phases
//! - [`state`] -- The shared pomodoro state and partial updates to it
//! - [`messages`] -- Inbound/outbound message shapes and the fallible decoder

pub mod enums;
pub mod ids;
pub mod messages;
pub mod state;

// Re-export all public types at crate root for convenience.
pub use enums::{Phase, Role};
pub use ids::ConnectionId;
pub use messages::{ClientMessage, DecodeError, ServerMessage};
pub use state::{PomodoroState, StateUpdate};
