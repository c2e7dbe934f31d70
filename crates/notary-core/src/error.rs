//! Error types for notary core.

use thiserror::Error;

use crate::types::{Timestamp, Token};
use crate::verb::Verb;

/// Errors raised while building the key table or encoding values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("keys {first:?} and {second:?} share priority {rank}")]
    DuplicatePriority {
        first: String,
        second: String,
        rank: u32,
    },
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Encoding(e.to_string())
    }
}

/// Errors raised while parsing a raw record into a [`Statement`](crate::Statement).
#[derive(Debug, Error)]
pub enum StatementError {
    #[error("statement is not a JSON object")]
    NotAnObject,

    #[error("missing field {0:?}")]
    MissingField(&'static str),

    #[error("field {field:?} is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid time {value:?}: {reason}")]
    InvalidTime { value: String, reason: String },

    #[error("statement has no verb")]
    MissingVerb,

    #[error("statement has more than one verb: {first} and {second}")]
    AmbiguousVerb { first: Verb, second: Verb },
}

/// Chain integrity violations found while walking a ledger window.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("statement at {time} has no id; chain checks need ids")]
    MissingId { time: Timestamp },

    #[error("notarization violation: {newer} points to {expected:?}, next statement is {found}")]
    PreviousMismatch {
        newer: Token,
        expected: Option<Token>,
        found: Token,
    },

    #[error("not descending: {older} at {older_time} is not older than {newer} at {newer_time}")]
    NotDescending {
        newer: Token,
        newer_time: Timestamp,
        older: Token,
        older_time: Timestamp,
    },

    #[error("chain ends prematurely: oldest statement {oldest} points to {previous}")]
    MissingGenesis { oldest: Token, previous: Token },

    #[error("statement {claimed} hashes to {computed}")]
    IdMismatch { claimed: Token, computed: Token },

    #[error(transparent)]
    Encoding(#[from] CoreError),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
