//! # Notary Testkit
//!
//! Testing utilities for notary ledgers.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Inputs with tokens recorded from the deployed implementation
//! - **Generators**: Proptest strategies for JSON values and statements
//! - **Fixtures**: Well-formed, correctly chained ledgers
//!
//! ## Golden Vectors
//!
//! ```rust
//! use notary_core::ContentAddresser;
//! use notary_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, token) in verify_all_vectors(&ContentAddresser::default()) {
//!     assert!(matches, "{}: {}", name, token);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use notary_testkit::generators::{json_object, permute_keys};
//!
//! proptest! {
//!     #[test]
//!     fn token_ignores_key_order(value in json_object(), seed in any::<u64>()) {
//!         let permuted = permute_keys(&value, seed);
//!         prop_assert_eq!(notary_core::token(&value)?, notary_core::token(&permuted)?);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use notary_testkit::fixtures::{book, LedgerFixture};
//!
//! let mut ledger = LedgerFixture::new("alice");
//! ledger.rate(book("Dune"));
//! ledger.clear(book("Dune"));
//! assert_eq!(ledger.len(), 2);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{book, rated_ledgers, LedgerFixture};
pub use generators::{json_object, json_value, permute_keys, statement_record};
pub use vectors::{all_vectors, verify_all_vectors, verify_canonical_texts, GoldenVector};
