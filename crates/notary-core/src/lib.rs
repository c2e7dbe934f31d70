//! # Notary Core
//!
//! Pure primitives for notary ledgers: canonical encoding, content
//! addressing, typed statements, chain verification, and distinctness.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Token`] - Content address (lowercase hex SHA-1 of canonical text)
//! - [`Statement`] - A parsed ledger record with its verb and subject
//! - [`Verb`] - The fixed verb vocabulary
//! - [`KeyOrder`] - The versioned key-priority table
//!
//! ## Canonicalization
//!
//! Tokens are SHA-1 over 2-space-indented JSON with keys in priority order.
//! See [`canonical`] module. The layout is a wire format shared with other
//! implementations; changing it changes every token.

pub mod address;
pub mod canonical;
pub mod chain;
pub mod crypto;
pub mod distinct;
pub mod error;
pub mod statement;
pub mod types;
pub mod verb;

pub use address::{token, token_of, ContentAddresser};
pub use canonical::{canonical_bytes, canonicalize, CanonicalEncoder, KeyOrder, KEY_ORDER_VERSION};
pub use chain::{verify_chain, verify_chain_from_genesis, verify_ids};
pub use crypto::Sha1Digest;
pub use distinct::{reduce_distinct, subject_key, DistinctReducer, SubjectKey};
pub use error::{ChainError, CoreError, StatementError};
pub use statement::{Statement, ID_FIELD};
pub use types::{Timestamp, Token};
pub use verb::Verb;
