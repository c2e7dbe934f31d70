//! Content addressing: tokens computed over canonical text.

use serde::Serialize;
use serde_json::Value;

use crate::canonical::CanonicalEncoder;
use crate::crypto::Sha1Digest;
use crate::error::Result;
use crate::types::Token;

/// Computes tokens for values.
#[derive(Debug, Clone, Default)]
pub struct ContentAddresser {
    encoder: CanonicalEncoder,
}

impl ContentAddresser {
    pub fn new(encoder: CanonicalEncoder) -> Self {
        Self { encoder }
    }

    pub fn encoder(&self) -> &CanonicalEncoder {
        &self.encoder
    }

    /// Token of a value.
    ///
    /// A string is already a token (a reference to something hashed
    /// elsewhere) and is returned unchanged. Anything else is hashed over its
    /// canonical bytes.
    pub fn token(&self, value: &Value) -> Result<Token> {
        match value {
            Value::String(s) => Ok(Token::new(s.as_str())),
            other => {
                let bytes = self.encoder.canonical_bytes(other)?;
                Ok(Token::from_digest(&Sha1Digest::hash(&bytes)))
            }
        }
    }

    /// Token of any serializable value.
    ///
    /// Fails with an encoding error when the value has no JSON form, e.g. a
    /// map with non-string keys.
    pub fn token_of<T: Serialize + ?Sized>(&self, value: &T) -> Result<Token> {
        let value = serde_json::to_value(value)?;
        self.token(&value)
    }
}

/// Token of a value with the v1 key table.
pub fn token(value: &Value) -> Result<Token> {
    ContentAddresser::default().token(value)
}

/// Token of any serializable value with the v1 key table.
pub fn token_of<T: Serialize + ?Sized>(value: &T) -> Result<Token> {
    ContentAddresser::default().token_of(value)
}
