//! Error types for ledger reads.

use notary_core::{ChainError, CoreError, StatementError, Token};
use notary_store::StoreError;
use thiserror::Error;

/// Request errors: the caller asked for something that cannot be served.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("missing identity token")]
    MissingIdentity,

    #[error("checkPrevious requires includeId")]
    CheckPreviousWithoutId,

    #[error("revokeAt and after cannot be combined")]
    RevokeAtWithAfter,

    #[error("invalid identity request: {0}")]
    InvalidIdentitySpec(String),

    #[error("statement {id} in ledger {identity}: {source}")]
    InvalidStatement {
        identity: Token,
        id: Token,
        #[source]
        source: StatementError,
    },
}

/// Errors that can occur while reading a ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Bad request or malformed statement.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// The verified window is not a valid chain.
    #[error("chain integrity violation in ledger {identity}: {source}")]
    ChainIntegrity {
        identity: Token,
        #[source]
        source: ChainError,
    },

    /// A value could not be encoded for hashing.
    #[error("encoding error in ledger {identity}: {source}")]
    Encoding {
        identity: Token,
        #[source]
        source: CoreError,
    },

    /// The read did not finish within the configured deadline.
    #[error("reading ledger {identity} timed out after {elapsed_ms} ms")]
    Timeout { identity: Token, elapsed_ms: u128 },

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for ledger reads.
pub type Result<T> = std::result::Result<T, LedgerError>;
