//! # Content Digest
//!
//! `ContentDigest` is the identity under which compiled validators are
//! memoized. Two schema documents that are structurally identical (same
//! keywords, same values, any key order) share one digest.
//!
//! A digest can only be computed from [`CanonicalBytes`], so no caller can
//! fingerprint a non-canonical serialization by accident.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// SHA-256 over canonical bytes. Displays as `sha256:<hex>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> String {
        self.0[..6].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Fingerprint canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    ContentDigest(Sha256::digest(data.as_bytes()).into())
}
