//! Error types for session operations.

use sessio_store::StoreError;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session-specific errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backing-store connectivity or command failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Session values could not be serialized
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The request could not be read (e.g. a malformed form body)
    #[error("Request error: {0}")]
    Request(String),
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}
