//! Identity requests: which ledgers to read, and as of when.
//!
//! A request is written one of three ways:
//!
//! - a bare token: `f4e45451dd663b6c9caf90276e366f57e573841b` (or the same
//!   as a JSON string),
//! - an object mapping token to revoke-at marker:
//!   `{"f4e4...": "c2dc..."}`, with `null` for no marker,
//! - an array mixing both forms, for multi-identity reads.

use serde_json::{Map, Value};

use notary_core::Token;

use crate::error::InputError;

/// One ledger to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRequest {
    pub token: Token,
    /// Overrides the read options' `revoke_at` when set.
    pub revoke_at: Option<Token>,
}

impl IdentityRequest {
    pub fn new(token: impl Into<Token>) -> Self {
        Self {
            token: token.into(),
            revoke_at: None,
        }
    }

    pub fn revoked_at(token: impl Into<Token>, marker: impl Into<Token>) -> Self {
        Self {
            token: token.into(),
            revoke_at: Some(marker.into()),
        }
    }

    /// Parse request text: a bare token, or JSON in any of the forms above.
    pub fn parse(text: &str) -> Result<Vec<Self>, InputError> {
        let text = text.trim();
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Ok(vec![Self::from_token(text)?]),
        }
    }

    /// Requests from a parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Vec<Self>, InputError> {
        match value {
            Value::Array(items) => {
                let mut requests = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Array(_) => {
                            return Err(InputError::InvalidIdentitySpec(format!(
                                "nested array: {}",
                                item
                            )))
                        }
                        other => requests.extend(Self::from_value(other)?),
                    }
                }
                Ok(requests)
            }
            other => Self::from_single(other),
        }
    }

    fn from_single(value: &Value) -> Result<Vec<Self>, InputError> {
        match value {
            Value::String(token) => Ok(vec![Self::from_token(token)?]),
            Value::Object(map) => Self::from_map(map),
            other => Err(InputError::InvalidIdentitySpec(format!(
                "expected a token or an object, got {}",
                other
            ))),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Result<Vec<Self>, InputError> {
        if map.is_empty() {
            return Err(InputError::MissingIdentity);
        }
        map.iter()
            .map(|(token, marker)| {
                let mut request = Self::from_token(token)?;
                request.revoke_at = match marker {
                    Value::Null => None,
                    Value::String(s) if s.is_empty() => None,
                    Value::String(s) => Some(Token::new(s.as_str())),
                    other => {
                        return Err(InputError::InvalidIdentitySpec(format!(
                            "revokeAt for {} must be a token or null, got {}",
                            token, other
                        )))
                    }
                };
                Ok(request)
            })
            .collect()
    }

    fn from_token(token: &str) -> Result<Self, InputError> {
        if token.is_empty() {
            return Err(InputError::MissingIdentity);
        }
        Ok(Self::new(token))
    }
}
