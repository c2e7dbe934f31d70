//! # Notary Store
//!
//! The storage collaborator for notary ledgers. Readers only need
//! per-identity, time-ordered retrieval with a range filter and point lookup
//! by id; that is the [`StatementStore`] trait.
//!
//! ## Key Types
//!
//! - [`StatementStore`] - The async trait readers depend on
//! - [`MemoryStore`] - In-memory implementation
//! - [`LedgerSnapshot`] - A whole ledger as a JSON document, for import/export
//! - [`TimeRange`] - `time <= t` / `time > t` filters
//!
//! ## Usage
//!
//! ```rust,no_run
//! use notary_store::{LedgerSnapshot, MemoryStore, StatementStore, TimeRange};
//! use notary_core::Token;
//!
//! async fn example() -> notary_store::Result<()> {
//!     let store = MemoryStore::new();
//!     let identity = Token::new("e84d475f463ca70c869337587b81d73f35d556d9");
//!
//!     store.restore(&identity, LedgerSnapshot::load("ledger.json")?).await?;
//!     let newest_first = store.query(&identity, TimeRange::All).await?;
//!     println!("{} statements", newest_first.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent appends**: appending the same id twice returns `AlreadyExists`
//! - **Immutable statements**: no update or partial delete
//! - **Destroy and replace**: `restore` swaps a whole ledger atomically

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use snapshot::LedgerSnapshot;
pub use traits::{InsertResult, StatementStore, StoredStatement, TimeRange};
