//! Reader configuration.

use std::sync::Arc;
use std::time::Duration;

use notary_core::KeyOrder;

/// Configuration for the [`LedgerReader`](crate::LedgerReader).
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// With `checkPrevious`, full and `revokeAt` windows must end at the
    /// genesis statement. `after` windows never do.
    pub require_genesis: bool,
    /// Recompute every statement's token and compare it with its stored id.
    pub verify_ids: bool,
    /// Key-priority table for hashing and output ordering.
    pub key_order: Arc<KeyOrder>,
    /// Ledgers read at once in a batch.
    pub batch_concurrency: usize,
    /// Deadline for each ledger read in a batch.
    pub read_timeout: Option<Duration>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            require_genesis: true,
            verify_ids: false,
            key_order: KeyOrder::v1(),
            batch_concurrency: 8,
            read_timeout: None,
        }
    }
}
