//! Relay binary for Pomobridge.
//!
//! Bridges the GNOME Shell panel extension and the browser extension over a
//! local `WebSocket` relay on `ws://127.0.0.1:8787`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `pomobridge.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Create the shared relay state
//! 4. Bind and serve until `Ctrl-C`

mod error;

use std::path::Path;
use std::sync::Arc;

use pomobridge_relay::{LogFormat, LoggingConfig, RelayConfig, RelayState};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Config file looked up in the working directory.
const CONFIG_FILE: &str = "pomobridge.yaml";

/// Application entry point for the relay.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the listener cannot be
/// bound.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        host = config.server.host,
        port = config.server.port,
        level = config.logging.level,
        "pomobridge starting"
    );

    // 3. Shared state lives for the whole process.
    let state = Arc::new(RelayState::new());

    // 4. Serve until Ctrl-C.
    pomobridge_relay::start_server(&config.server, state)
        .await
        .map_err(AppError::from)?;

    info!("pomobridge exited cleanly");
    Ok(())
}

/// Load relay configuration from [`CONFIG_FILE`].
///
/// If the file does not exist, defaults are used. Environment overrides
/// apply in both cases.
fn load_config() -> Result<RelayConfig, AppError> {
    let config = RelayConfig::load(Path::new(CONFIG_FILE))?;
    Ok(config)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
