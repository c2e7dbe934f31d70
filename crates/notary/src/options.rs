//! Per-read options.

use serde::{Deserialize, Deserializer, Serialize};

use notary_core::{Timestamp, Token};

use crate::error::InputError;

/// What to read from a ledger and how to shape the output.
///
/// Field names follow the JSON request surface (`revokeAt`, `checkPrevious`,
/// `includeId`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadOptions {
    /// Read the ledger as of this statement (inclusive). An empty marker
    /// means no marker.
    #[serde(deserialize_with = "non_empty_marker")]
    pub revoke_at: Option<Token>,
    /// Read only statements strictly newer than this time.
    pub after: Option<Timestamp>,
    /// Verify the `previous` chain of the selected window.
    pub check_previous: bool,
    /// Reduce to the latest non-revoked statement per subject.
    pub distinct: bool,
    /// Emit each statement's id as its first field.
    pub include_id: bool,
    /// Fields removed from every output statement.
    pub omit: Vec<String>,
    /// Emit statements in canonical key order.
    pub order_statements: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            revoke_at: None,
            after: None,
            check_previous: false,
            distinct: false,
            include_id: false,
            omit: Vec::new(),
            order_statements: true,
        }
    }
}

impl ReadOptions {
    pub fn revoke_at(mut self, marker: impl Into<Token>) -> Self {
        self.revoke_at = Some(marker.into());
        self
    }

    pub fn after(mut self, time: Timestamp) -> Self {
        self.after = Some(time);
        self
    }

    pub fn check_previous(mut self) -> Self {
        self.check_previous = true;
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn include_id(mut self) -> Self {
        self.include_id = true;
        self
    }

    pub fn omit<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omit.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn unordered(mut self) -> Self {
        self.order_statements = false;
        self
    }

    /// The revoke-at marker in effect, if any.
    pub fn revoke_marker(&self) -> Option<&Token> {
        self.revoke_at.as_ref().filter(|marker| !marker.is_empty())
    }

    /// Reject option combinations that cannot be served.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.check_previous && !self.include_id {
            return Err(InputError::CheckPreviousWithoutId);
        }
        if self.revoke_marker().is_some() && self.after.is_some() {
            return Err(InputError::RevokeAtWithAfter);
        }
        Ok(())
    }
}

fn non_empty_marker<'de, D>(deserializer: D) -> Result<Option<Token>, D::Error>
where
    D: Deserializer<'de>,
{
    let marker = Option::<Token>::deserialize(deserializer)?;
    Ok(marker.filter(|marker| !marker.is_empty()))
}
