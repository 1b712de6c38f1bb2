//! Real-time pomodoro state relay.
//!
//! This crate provides an Axum `WebSocket` server that bridges the GNOME
//! Shell panel extension and the browser extension, neither of which can
//! reach the other directly:
//!
//! - **State flows browser → GNOME.** A `state` message overwrites the
//!   fields it carries in the shared [`PomodoroState`] and the full
//!   updated snapshot is fanned out to every `gnome` client except the
//!   sender.
//! - **Commands flow GNOME → browser.** A `command` message is relayed
//!   verbatim to every `browser` client.
//! - **Snapshot on join.** A client that sends `hello` is moved to its
//!   declared role and immediately receives the full current state.
//!
//! # Architecture
//!
//! One [`Session`] runs per accepted connection. All sessions share a
//! single [`RelayState`], which guards the connection [`Registry`] and the
//! shared pomodoro state behind one mutex so that a merge and its fan-out
//! (or a join and its snapshot) are never interleaved with another update.
//!
//! [`PomodoroState`]: pomobridge_types::PomodoroState
//! [`Session`]: session::Session
//! [`RelayState`]: state::RelayState
//! [`Registry`]: registry::Registry

pub mod config;
pub mod connection;
pub mod error;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use config::{ConfigError, LogFormat, LoggingConfig, RelayConfig};
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use startup::{spawn_relay, RelayHandle, StartupError};
pub use state::RelayState;
