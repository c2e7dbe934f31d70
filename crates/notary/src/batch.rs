//! Multi-identity reads.
//!
//! Each identity runs its own pipeline; nothing is shared between them, and
//! one identity's failure only fills its own slot. Results stream out as
//! they complete. Dropping the stream cancels the reads still in flight.

use std::time::Instant;

use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;

use notary_core::Token;
use notary_store::StatementStore;

use crate::error::{LedgerError, Result};
use crate::identity::IdentityRequest;
use crate::options::ReadOptions;
use crate::reader::LedgerReader;

/// The outcome of one identity in a batch.
#[derive(Debug)]
pub struct BatchEntry {
    /// Position of the request in the batch.
    pub index: usize,
    pub identity: Token,
    pub result: Result<Vec<Value>>,
}

impl<S: StatementStore> LedgerReader<S> {
    /// Read many ledgers concurrently, yielding each as it completes.
    pub fn read_batch_stream<'a>(
        &'a self,
        requests: &'a [IdentityRequest],
        options: &'a ReadOptions,
    ) -> impl Stream<Item = BatchEntry> + 'a {
        let concurrency = self.config().batch_concurrency.max(1);
        stream::iter(requests.iter().enumerate())
            .map(move |(index, request)| async move {
                let result = self.read_with_deadline(request, options).await;
                if let Err(e) = &result {
                    tracing::warn!(identity = %request.token, index, error = %e, "ledger read failed");
                }
                BatchEntry {
                    index,
                    identity: request.token.clone(),
                    result,
                }
            })
            .buffer_unordered(concurrency)
    }

    /// Read many ledgers concurrently; entries come back in request order.
    pub async fn read_batch(
        &self,
        requests: &[IdentityRequest],
        options: &ReadOptions,
    ) -> Vec<BatchEntry> {
        let mut entries: Vec<BatchEntry> = self.read_batch_stream(requests, options).collect().await;
        entries.sort_by_key(|entry| entry.index);
        entries
    }

    async fn read_with_deadline(
        &self,
        request: &IdentityRequest,
        options: &ReadOptions,
    ) -> Result<Vec<Value>> {
        let read = self.read_request(request, options);
        match self.config().read_timeout {
            None => read.await,
            Some(deadline) => {
                let started = Instant::now();
                tokio::time::timeout(deadline, read)
                    .await
                    .unwrap_or_else(|_| {
                        Err(LedgerError::Timeout {
                            identity: request.token.clone(),
                            elapsed_ms: started.elapsed().as_millis(),
                        })
                    })
            }
        }
    }
}
