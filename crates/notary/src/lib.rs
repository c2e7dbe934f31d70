//! # Notary
//!
//! Readers for notary ledgers: per-identity, append-only, hash-chained logs
//! of signed statements (trust assertions, ratings, relations).
//!
//! ## Overview
//!
//! - **Statements**: immutable, content-addressed by the SHA-1 of their
//!   canonical JSON text
//! - **Ledgers**: one per identity, each statement pointing at the token of
//!   the one before it (`previous`)
//! - **Reads**: a window of a ledger (full, as of a revoke-at marker, or
//!   after a time), optionally chain-verified and reduced to the latest
//!   effective statement per subject
//! - **Batches**: many identities read concurrently with per-identity results
//!
//! ## Usage
//!
//! ```rust,no_run
//! use notary::{IdentityRequest, LedgerReader, ReadOptions, ReaderConfig};
//! use notary::store::{LedgerSnapshot, MemoryStore, StatementStore};
//!
//! async fn example() -> notary::Result<()> {
//!     let store = MemoryStore::new();
//!     let identity = notary::Token::new("f4e45451dd663b6c9caf90276e366f57e573841b");
//!     store.restore(&identity, LedgerSnapshot::load("ledger.json")?).await?;
//!
//!     let reader = LedgerReader::new(store, ReaderConfig::default());
//!     let options = ReadOptions::default().include_id().check_previous().distinct();
//!     let statements = reader.read_ledger(&identity, &options).await?;
//!     println!("{}", serde_json::to_string_pretty(&statements).unwrap());
//!
//!     let requests = IdentityRequest::parse(r#"["f4e45451dd663b6c9caf90276e366f57e573841b"]"#)?;
//!     for entry in reader.read_batch(&requests, &options).await {
//!         println!("{}: {:?}", entry.identity, entry.result.map(|s| s.len()));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `notary::core` - Canonical encoding, tokens, statements, chain checks
//! - `notary::store` - The storage collaborator and in-memory store

pub mod batch;
pub mod config;
pub mod error;
pub mod identity;
pub mod options;
pub mod reader;

// Re-export component crates
pub use notary_core as core;
pub use notary_store as store;

// Re-export main types for convenience
pub use batch::BatchEntry;
pub use config::ReaderConfig;
pub use error::{InputError, LedgerError, Result};
pub use identity::IdentityRequest;
pub use options::ReadOptions;
pub use reader::LedgerReader;

// Re-export commonly used core types
pub use notary_core::{
    canonicalize, reduce_distinct, token, token_of, verify_chain, KeyOrder, Statement, Timestamp,
    Token, Verb,
};
