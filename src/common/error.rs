//! Error types for the application.

use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Rcon error: {0}")]
    Rcon(#[from] RconError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// UDP transport errors.
///
/// A query that simply gets no reply is not an error; the transport reports
/// that as `None` and callers render it as "server unreachable".
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to bind UDP socket on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Socket I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rcon command errors, surfaced to the command caller.
#[derive(Debug, Error)]
pub enum RconError {
    /// The server never sent any response datagram.
    #[error("No response from server")]
    Unreachable,

    /// The server sent data but stalled before the terminating sentinel.
    #[error("Response stalled before completion")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type alias using AppError.
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;
