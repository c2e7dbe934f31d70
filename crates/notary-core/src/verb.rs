//! The fixed verb vocabulary of statements.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The field naming what a statement does to its subject.
///
/// Exactly one verb key is present in a well-formed statement; its value is
/// the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Verb {
    Trust,
    Delegate,
    Clear,
    Rate,
    Follow,
    Censor,
    Relate,
    DontRelate,
    Equate,
    DontEquate,
    Replace,
    Block,
}

impl Verb {
    /// Every verb, in the order records are scanned.
    pub const ALL: [Verb; 12] = [
        Verb::Trust,
        Verb::Delegate,
        Verb::Clear,
        Verb::Rate,
        Verb::Follow,
        Verb::Censor,
        Verb::Relate,
        Verb::DontRelate,
        Verb::Equate,
        Verb::DontEquate,
        Verb::Replace,
        Verb::Block,
    ];

    /// The field name of this verb.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Verb::Trust => "trust",
            Verb::Delegate => "delegate",
            Verb::Clear => "clear",
            Verb::Rate => "rate",
            Verb::Follow => "follow",
            Verb::Censor => "censor",
            Verb::Relate => "relate",
            Verb::DontRelate => "dontRelate",
            Verb::Equate => "equate",
            Verb::DontEquate => "dontEquate",
            Verb::Replace => "replace",
            Verb::Block => "block",
        }
    }

    /// Look up a verb by field name.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == key)
    }

    /// `clear` revokes whatever the ledger said earlier about its subject.
    pub const fn is_revocation(&self) -> bool {
        matches!(self, Verb::Clear)
    }

    /// Verbs used in identity (key-trust) ledgers.
    pub const fn is_identity_verb(&self) -> bool {
        matches!(
            self,
            Verb::Trust | Verb::Delegate | Verb::Clear | Verb::Block | Verb::Replace
        )
    }

    /// Verbs used in content ledgers.
    pub const fn is_content_verb(&self) -> bool {
        matches!(
            self,
            Verb::Rate
                | Verb::Clear
                | Verb::Follow
                | Verb::Censor
                | Verb::Relate
                | Verb::DontRelate
                | Verb::Equate
                | Verb::DontEquate
        )
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
