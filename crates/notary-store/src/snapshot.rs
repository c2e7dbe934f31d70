//! Ledger snapshots: a whole identity ledger as one JSON document.
//!
//! The document is an object keyed by statement id, newest first:
//!
//! ```json
//! {
//!   "79dc9283...": { "statement": "org.nerdster", "time": "...", ... },
//!   "0fb1c2e4...": { ... }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use notary_core::Token;

use crate::error::Result;
use crate::traits::StoredStatement;

/// All statements of one ledger, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSnapshot {
    statements: Vec<StoredStatement>,
}

impl LedgerSnapshot {
    pub fn new(statements: Vec<StoredStatement>) -> Self {
        Self { statements }
    }

    pub fn statements(&self) -> &[StoredStatement] {
        &self.statements
    }

    pub fn into_statements(self) -> Vec<StoredStatement> {
        self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Parse a snapshot document.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl Serialize for LedgerSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.statements.len()))?;
        for statement in &self.statements {
            map.serialize_entry(statement.id.as_str(), &statement.fields)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LedgerSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SnapshotVisitor;

        impl<'de> Visitor<'de> for SnapshotVisitor {
            type Value = LedgerSnapshot;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("an object mapping statement ids to statements")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut statements = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((id, value)) = access.next_entry::<String, Value>()? {
                    let fields: Map<String, Value> = match value {
                        Value::Object(fields) => fields,
                        other => {
                            return Err(de::Error::custom(format!(
                                "statement {} is not an object: {}",
                                id, other
                            )))
                        }
                    };
                    statements.push(StoredStatement::new(Token::new(id), fields));
                }
                Ok(LedgerSnapshot { statements })
            }
        }

        deserializer.deserialize_map(SnapshotVisitor)
    }
}
