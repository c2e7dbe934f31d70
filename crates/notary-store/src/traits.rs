//! StatementStore trait: the interface ledgers are read through.
//!
//! A store keeps one collection per identity, each a newest-first sequence
//! of `(id, fields)` pairs. Statements are immutable once appended; the only
//! destructive operation replaces a whole collection from a snapshot.

use async_trait::async_trait;
use serde_json::{Map, Value};

use notary_core::{Statement, StatementError, Timestamp, Token};

use crate::error::{Result, StoreError};
use crate::snapshot::LedgerSnapshot;

/// Result of appending a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Statement was appended.
    Inserted,
    /// A statement with this id already exists (idempotent, not an error).
    AlreadyExists,
}

/// Time filter for [`StatementStore::query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    /// The whole ledger.
    All,
    /// `time <= t`.
    AtOrBefore(Timestamp),
    /// `time > t`.
    After(Timestamp),
}

impl TimeRange {
    pub fn contains(&self, time: Timestamp) -> bool {
        match self {
            TimeRange::All => true,
            TimeRange::AtOrBefore(t) => time <= *t,
            TimeRange::After(t) => time > *t,
        }
    }
}

/// A statement as the store holds it: its id and raw fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredStatement {
    pub id: Token,
    pub fields: Map<String, Value>,
}

impl StoredStatement {
    pub fn new(id: Token, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    /// The statement's `time` field.
    pub fn time(&self) -> Result<Timestamp> {
        let raw = self
            .fields
            .get("time")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::InvalidData(format!("{}: missing time", self.id)))?;
        Timestamp::parse(raw)
            .map_err(|e| StoreError::InvalidData(format!("{}: time {:?}: {}", self.id, raw, e)))
    }

    /// Parse into a typed statement carrying its id.
    pub fn into_statement(self) -> std::result::Result<Statement, StatementError> {
        Statement::from_fields(Some(self.id), self.fields)
    }
}

/// The storage collaborator: async, per-identity, time-ordered retrieval.
#[async_trait]
pub trait StatementStore: Send + Sync {
    /// Point lookup of a statement by id within one identity's ledger.
    async fn get(&self, identity: &Token, id: &Token) -> Result<Option<StoredStatement>>;

    /// Statements within `range`, newest-first.
    ///
    /// An identity with no ledger yields an empty list.
    async fn query(&self, identity: &Token, range: TimeRange) -> Result<Vec<StoredStatement>>;

    /// Append a statement. Idempotent by id.
    async fn append(&self, identity: &Token, statement: StoredStatement) -> Result<InsertResult>;

    /// Export one identity's ledger.
    async fn snapshot(&self, identity: &Token) -> Result<LedgerSnapshot>;

    /// Destroy the identity's ledger and replace it with the snapshot.
    ///
    /// Returns the number of statements restored.
    async fn restore(&self, identity: &Token, snapshot: LedgerSnapshot) -> Result<usize>;

    /// Identities with a ledger.
    async fn identities(&self) -> Result<Vec<Token>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn test_time_range_bounds() {
        let t = ts("2024-06-01T00:00:00Z");
        assert!(TimeRange::All.contains(t));
        assert!(TimeRange::AtOrBefore(t).contains(t));
        assert!(!TimeRange::After(t).contains(t));
        assert!(TimeRange::After(t).contains(ts("2024-06-01T00:00:00.001Z")));
        assert!(!TimeRange::AtOrBefore(t).contains(ts("2024-06-01T00:00:00.001Z")));
    }

    #[test]
    fn test_stored_statement_time() {
        let fields = json!({"time": "2024-06-01T00:00:00Z", "rate": "x"});
        let stored = StoredStatement::new(Token::new("a"), fields.as_object().unwrap().clone());
        assert_eq!(stored.time().unwrap(), ts("2024-06-01T00:00:00Z"));

        let bad = StoredStatement::new(Token::new("b"), Map::new());
        assert!(matches!(bad.time(), Err(StoreError::InvalidData(_))));
    }
}
