//! Hashing primitive used for content addressing.
//!
//! Ledgers address statements by SHA-1. This is a wire-format choice shared
//! with existing deployments, not a security claim: tamper evidence comes
//! from the signed `previous` chain.

use sha1::{Digest, Sha1};
use std::fmt;

/// A 20-byte SHA-1 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha1Digest(pub [u8; 20]);

impl Sha1Digest {
    /// Compute the SHA-1 digest of the given bytes.
    pub fn hash(data: &[u8]) -> Self {
        Self(Sha1::digest(data).into())
    }

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex, 40 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Sha1Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha1({})", self.to_hex())
    }
}

impl AsRef<[u8]> for Sha1Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
