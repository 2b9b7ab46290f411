//! Engine errors
//!
//! Everything that reaches [`EngineError`] is fatal: a store write failed,
//! or a remote collaborator could not be reconnected. Recoverable failures
//! are turned into notices before they get here.

use crate::chat::TransportError;
use crate::gateway::GatewayError;
use thiserror::Error;
use wlsync_store::StoreError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Fatal engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("notification failed: {0}")]
    Notify(#[from] TransportError),
}
