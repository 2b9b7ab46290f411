//! Error types for wlsyncd

use thiserror::Error;
use wlsync_engine::{GatewayError, IngestError, ResolutionError, TransportError};
use wlsync_store::StoreError;

/// Daemon-level errors. Every variant ends the process with a non-zero status.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Chat error: {0}")]
    Chat(#[from] TransportError),

    #[error("RCON error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolutionError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl From<config::ConfigError> for DaemonError {
    fn from(err: config::ConfigError) -> Self {
        DaemonError::Config(err.to_string())
    }
}

/// Result type for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
