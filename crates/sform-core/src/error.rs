//! # Error Types
//!
//! Errors raised by the foundational layer. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! Path addressing itself is infallible: a missing location reads as `None`
//! and a write creates whatever containers it needs. The only fallible
//! operation in this crate is canonical serialization.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
