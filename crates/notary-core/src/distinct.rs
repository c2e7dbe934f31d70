//! Distinctness: the latest effective statement per subject.
//!
//! Walking newest to oldest, the first statement seen for a subject key wins
//! the key. If that statement is a `clear`, the key is taken but nothing is
//! emitted, so every older statement about that subject is suppressed.
//!
//! Subject keys are tokens of the subject value as written. A `clear` that
//! names its subject by bare token while the statement it targets used the
//! full object (or the reverse) gets a different key and does not suppress
//! it. Existing ledgers were reduced this way, so the behavior is kept.

use std::collections::HashSet;
use std::fmt;

use crate::address::ContentAddresser;
use crate::error::Result;
use crate::statement::Statement;

/// Key identifying the logical subject of a statement.
///
/// For paired statements (`with.otherSubject`) the two subject tokens are
/// concatenated in lexicographic order, so A-relates-B and B-relates-A share
/// a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectKey(String);

impl SubjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the subject key of a statement.
pub fn subject_key(addresser: &ContentAddresser, statement: &Statement) -> Result<SubjectKey> {
    let subject = addresser.token(statement.subject())?;
    let key = match statement.other_subject() {
        None => subject.into_string(),
        Some(other) => {
            let other = addresser.token(other)?;
            let (first, second) = if subject <= other {
                (subject, other)
            } else {
                (other, subject)
            };
            let mut key = first.into_string();
            key.push_str(second.as_str());
            key
        }
    };
    Ok(SubjectKey(key))
}

/// Reduces newest-first statements to the latest non-revoked one per subject.
#[derive(Debug, Clone, Default)]
pub struct DistinctReducer {
    addresser: ContentAddresser,
}

impl DistinctReducer {
    pub fn new(addresser: ContentAddresser) -> Self {
        Self { addresser }
    }

    /// Reduce a newest-first sequence, preserving order.
    pub fn reduce(&self, statements: Vec<Statement>) -> Result<Vec<Statement>> {
        let mut seen = HashSet::with_capacity(statements.len());
        let mut distinct = Vec::new();

        for statement in statements {
            let key = subject_key(&self.addresser, &statement)?;
            if !seen.insert(key) {
                continue;
            }
            if statement.verb().is_revocation() {
                continue;
            }
            distinct.push(statement);
        }

        Ok(distinct)
    }
}

/// Reduce with the v1 key table.
pub fn reduce_distinct(statements: Vec<Statement>) -> Result<Vec<Statement>> {
    DistinctReducer::default().reduce(statements)
}
