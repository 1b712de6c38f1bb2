//! Error types for the relay binary.
//!
//! [`AppError`] is the top-level error type that wraps every failure mode
//! during startup. A bind failure is the only way the relay exits with an
//! error once configuration has loaded.

/// Top-level error for the relay binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: pomobridge_relay::ConfigError,
    },

    /// The listener could not be bound or the server failed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: pomobridge_relay::ServerError,
    },
}
