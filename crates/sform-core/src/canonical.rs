//! # Canonical Serialization
//!
//! RFC 8785 (JCS) bytes for schema fingerprinting. Object keys are sorted by
//! `serde_jcs` itself, so the workspace-wide `serde_json/preserve_order`
//! feature (needed to render properties in document order) never leaks into
//! a digest.

use serde::Serialize;

use crate::error::CanonicalizationError;

/// JCS serialization of a value; the only input [`crate::sha256_digest`]
/// accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be serialized (for example a map with non-string keys).
    pub fn new(value: &impl Serialize) -> Result<Self, CanonicalizationError> {
        Ok(Self(serde_jcs::to_vec(value)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
