use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness constraint on account or identity rejected a write
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored row could not be decoded
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Backend unreachable
    #[error("connection error: {0}")]
    Connection(String),

    /// Query rejected or failed mid-flight
    #[error("query error: {0}")]
    Query(String),
}
