//! In-memory implementation of the StatementStore trait.
//!
//! Each identity's ledger is a vector kept newest-first. Nothing is
//! persisted; snapshots are the way in and out.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use notary_core::{Timestamp, Token};

use crate::error::{Result, StoreError};
use crate::snapshot::LedgerSnapshot;
use crate::traits::{InsertResult, StatementStore, StoredStatement, TimeRange};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<HashMap<Token, Vec<Entry>>>,
}

#[derive(Clone)]
struct Entry {
    time: Timestamp,
    statement: StoredStatement,
}

impl Entry {
    fn new(statement: StoredStatement) -> Result<Self> {
        Ok(Self {
            time: statement.time()?,
            statement,
        })
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Token, Vec<Entry>>>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Token, Vec<Entry>>>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert keeping newest-first order; equal times keep arrival order.
fn insert_ordered(ledger: &mut Vec<Entry>, entry: Entry) {
    let at = ledger.partition_point(|e| e.time >= entry.time);
    ledger.insert(at, entry);
}

#[async_trait]
impl StatementStore for MemoryStore {
    async fn get(&self, identity: &Token, id: &Token) -> Result<Option<StoredStatement>> {
        let inner = self.read()?;
        Ok(inner.get(identity).and_then(|ledger| {
            ledger
                .iter()
                .find(|e| &e.statement.id == id)
                .map(|e| e.statement.clone())
        }))
    }

    async fn query(&self, identity: &Token, range: TimeRange) -> Result<Vec<StoredStatement>> {
        let inner = self.read()?;
        Ok(inner
            .get(identity)
            .map(|ledger| {
                ledger
                    .iter()
                    .filter(|e| range.contains(e.time))
                    .map(|e| e.statement.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn append(&self, identity: &Token, statement: StoredStatement) -> Result<InsertResult> {
        let entry = Entry::new(statement)?;
        let mut inner = self.write()?;
        let ledger = inner.entry(identity.clone()).or_default();

        if ledger.iter().any(|e| e.statement.id == entry.statement.id) {
            return Ok(InsertResult::AlreadyExists);
        }

        insert_ordered(ledger, entry);
        Ok(InsertResult::Inserted)
    }

    async fn snapshot(&self, identity: &Token) -> Result<LedgerSnapshot> {
        let inner = self.read()?;
        let ledger = inner
            .get(identity)
            .ok_or_else(|| StoreError::NotFound(format!("ledger {}", identity)))?;
        Ok(LedgerSnapshot::new(
            ledger.iter().map(|e| e.statement.clone()).collect(),
        ))
    }

    async fn restore(&self, identity: &Token, snapshot: LedgerSnapshot) -> Result<usize> {
        // Validate everything before touching the existing ledger.
        // Repeated ids keep their first occurrence, as `append` would.
        let mut ledger = Vec::with_capacity(snapshot.len());
        let mut seen = HashSet::with_capacity(snapshot.len());
        for statement in snapshot.into_statements() {
            let entry = Entry::new(statement)?;
            if seen.insert(entry.statement.id.clone()) {
                insert_ordered(&mut ledger, entry);
            }
        }
        let count = ledger.len();

        let mut inner = self.write()?;
        inner.insert(identity.clone(), ledger);
        tracing::debug!(identity = %identity, count, "ledger restored");
        Ok(count)
    }

    async fn identities(&self) -> Result<Vec<Token>> {
        let inner = self.read()?;
        let mut identities: Vec<Token> = inner.keys().cloned().collect();
        identities.sort();
        Ok(identities)
    }
}
