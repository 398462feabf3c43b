//! # sform-core — Foundational Types for sform
//!
//! This crate is the leaf of the sform workspace. It defines how a location
//! in a form's value tree is named, how such a location is read and written,
//! and how a schema document is reduced to a stable content digest.
//!
//! ## Key Design Principles
//!
//! 1. **Paths are segment vectors.** A [`FieldPath`] is an ordered list of
//!    property names. The dotted string form (`a.b.c`) exists only at the
//!    external boundary; nothing in the hot path splits strings.
//!
//! 2. **Writes never discard siblings.** [`tree::set`] creates intermediate
//!    objects on demand and leaves every other key in place.
//!
//! 3. **Digests flow through `CanonicalBytes`.** [`sha256_digest()`] accepts
//!    only `&CanonicalBytes`, so two structurally identical schemas always
//!    hash to the same [`ContentDigest`] regardless of key order.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sform-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod path;
pub mod tree;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest};
pub use error::CanonicalizationError;
pub use path::{FieldPath, PATH_SEPARATOR};
