//! The LedgerReader: windowed, verified, shaped views of one ledger.
//!
//! A read runs a fixed pipeline over one identity's ledger:
//!
//! 1. validate the options,
//! 2. select a window (full, as of a revoke-at marker, or after a time),
//! 3. parse each record once into a typed [`Statement`],
//! 4. verify the chain if asked,
//! 5. drop omitted fields,
//! 6. reduce to distinct subjects if asked,
//! 7. emit records, canonically ordered unless disabled.

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::Value;

use notary_core::{
    verify_chain, verify_chain_from_genesis, verify_ids, CanonicalEncoder, ContentAddresser,
    DistinctReducer, Statement, Token,
};
use notary_store::{StatementStore, TimeRange};

use crate::config::ReaderConfig;
use crate::error::{InputError, LedgerError, Result};
use crate::identity::IdentityRequest;
use crate::options::ReadOptions;

/// Which part of the ledger a read covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    /// The whole ledger.
    Full,
    /// Everything at or before a marker statement.
    RevokeAt,
    /// Everything strictly after a time; the oldest link is outside.
    After,
}

/// Reads ledgers from a [`StatementStore`].
pub struct LedgerReader<S: StatementStore> {
    store: Arc<S>,
    config: ReaderConfig,
    addresser: ContentAddresser,
    reducer: DistinctReducer,
}

impl<S: StatementStore> LedgerReader<S> {
    /// Create a reader over a store.
    pub fn new(store: S, config: ReaderConfig) -> Self {
        Self::with_shared_store(Arc::new(store), config)
    }

    /// Create a reader over a store shared with other owners.
    pub fn with_shared_store(store: Arc<S>, config: ReaderConfig) -> Self {
        let addresser =
            ContentAddresser::new(CanonicalEncoder::new(Arc::clone(&config.key_order)));
        Self {
            store,
            reducer: DistinctReducer::new(addresser.clone()),
            addresser,
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn encoder(&self) -> &CanonicalEncoder {
        self.addresser.encoder()
    }

    /// Read one request; its `revoke_at`, if any, replaces the options' one.
    pub async fn read_request(
        &self,
        request: &IdentityRequest,
        options: &ReadOptions,
    ) -> Result<Vec<Value>> {
        let options = match &request.revoke_at {
            Some(marker) => {
                let mut overridden = options.clone();
                overridden.revoke_at = Some(marker.clone());
                Cow::Owned(overridden)
            }
            None => Cow::Borrowed(options),
        };
        self.read_ledger(&request.token, &options).await
    }

    /// Read one identity's ledger.
    ///
    /// An unknown revoke-at marker is not an error: nothing is visible as of
    /// a statement the ledger does not contain, so the result is empty.
    pub async fn read_ledger(&self, identity: &Token, options: &ReadOptions) -> Result<Vec<Value>> {
        if identity.is_empty() {
            return Err(InputError::MissingIdentity.into());
        }
        options.validate()?;

        let (window, range) = match self.select_window(identity, options).await? {
            Some(selected) => selected,
            None => return Ok(Vec::new()),
        };
        tracing::debug!(identity = %identity, ?window, ?range, "reading ledger");

        let stored = self.store.query(identity, range).await?;
        let mut statements = stored
            .into_iter()
            .map(|s| {
                let id = s.id.clone();
                s.into_statement().map_err(|source| InputError::InvalidStatement {
                    identity: identity.clone(),
                    id,
                    source,
                })
            })
            .collect::<std::result::Result<Vec<Statement>, _>>()?;

        self.verify(identity, window, &statements, options)?;

        for statement in &mut statements {
            if !options.include_id {
                statement.set_id(None);
            }
            if !options.omit.is_empty() {
                statement.omit(&options.omit);
            }
        }

        if options.distinct {
            statements = self
                .reducer
                .reduce(statements)
                .map_err(|source| LedgerError::Encoding {
                    identity: identity.clone(),
                    source,
                })?;
        }

        let encoder = self.addresser.encoder();
        Ok(statements
            .iter()
            .map(|statement| {
                let record = statement.to_record();
                if options.order_statements {
                    encoder.order(&record)
                } else {
                    record
                }
            })
            .collect())
    }

    /// Resolve the options to a window, or `None` when the revoke-at marker
    /// is not in the ledger.
    async fn select_window(
        &self,
        identity: &Token,
        options: &ReadOptions,
    ) -> Result<Option<(Window, TimeRange)>> {
        if let Some(marker) = options.revoke_marker() {
            return match self.store.get(identity, marker).await? {
                Some(found) => Ok(Some((Window::RevokeAt, TimeRange::AtOrBefore(found.time()?)))),
                None => {
                    tracing::debug!(identity = %identity, marker = %marker, "revokeAt marker not in ledger");
                    Ok(None)
                }
            };
        }

        if let Some(after) = options.after {
            return Ok(Some((Window::After, TimeRange::After(after))));
        }

        Ok(Some((Window::Full, TimeRange::All)))
    }

    fn verify(
        &self,
        identity: &Token,
        window: Window,
        statements: &[Statement],
        options: &ReadOptions,
    ) -> Result<()> {
        let mut outcome = Ok(());
        if self.config.verify_ids {
            outcome = verify_ids(&self.addresser, statements);
        }
        if outcome.is_ok() && options.check_previous {
            outcome = if window != Window::After && self.config.require_genesis {
                verify_chain_from_genesis(statements)
            } else {
                verify_chain(statements)
            };
        }

        outcome.map_err(|source| {
            tracing::error!(identity = %identity, error = %source, "chain integrity violation");
            LedgerError::ChainIntegrity {
                identity: identity.clone(),
                source,
            }
        })
    }
}
