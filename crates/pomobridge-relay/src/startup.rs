//! Relay startup helper for embedding in another process or a test.
//!
//! Provides [`spawn_relay`] which binds eagerly and then serves on a
//! background Tokio task. The returned [`RelayHandle`] exposes the bound
//! address (useful with port `0`) and a way to stop the server.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pomobridge_relay::{spawn_relay, RelayState, ServerConfig};
//! use std::sync::Arc;
//!
//! let handle = spawn_relay(&ServerConfig::default(), Arc::new(RelayState::new())).await?;
//! println!("listening on {}", handle.addr());
//! handle.shutdown().await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::RelayState;

/// Errors that can occur when spawning or stopping the relay.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or serve.
    #[error("server error: {0}")]
    Server(#[from] ServerError),

    /// The background task panicked or was cancelled.
    #[error("relay task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A relay running on a background task.
#[derive(Debug)]
pub struct RelayHandle {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<(), ServerError>>,
}

impl RelayHandle {
    /// The address the relay is listening on.
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for the server to finish.
    ///
    /// # Errors
    ///
    /// Returns the server's own error, or [`StartupError::Join`] if the
    /// task did not complete normally.
    pub async fn shutdown(self) -> Result<(), StartupError> {
        let _ = self.shutdown.send(());
        self.task.await??;
        Ok(())
    }
}

/// Bind the relay and serve it on a background Tokio task.
///
/// Bind failures are reported here, before the task is spawned.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address is invalid or in use.
pub async fn spawn_relay(
    config: &ServerConfig,
    state: Arc<RelayState>,
) -> Result<RelayHandle, StartupError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("listener has no address: {e}")))?;

    let (shutdown, signal) = oneshot::channel::<()>();
    let task = tokio::spawn(server::serve(listener, state, async move {
        let _ = signal.await;
    }));

    tracing::info!(%addr, "relay spawned on background task");

    Ok(RelayHandle {
        addr,
        shutdown,
        task,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ephemeral() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
        }
    }

    #[tokio::test]
    async fn spawn_reports_bound_port() {
        let handle = spawn_relay(&ephemeral(), Arc::new(RelayState::new()))
            .await
            .unwrap();
        assert_ne!(handle.addr().port(), 0);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn spawn_on_taken_port_fails_eagerly() {
        let first = spawn_relay(&ephemeral(), Arc::new(RelayState::new()))
            .await
            .unwrap();
        let config = ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: first.addr().port(),
        };
        let second = spawn_relay(&config, Arc::new(RelayState::new())).await;
        assert!(matches!(second, Err(StartupError::Server(ServerError::Bind(_)))));
        first.shutdown().await.unwrap();
    }
}
