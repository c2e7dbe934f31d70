//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Statement or ledger not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Snapshot encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored record cannot be used (e.g. unparseable `time`).
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
