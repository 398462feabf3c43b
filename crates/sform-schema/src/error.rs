//! # Schema Errors

use thiserror::Error;

use sform_core::CanonicalizationError;

/// Error while loading, fingerprinting, or compiling a form schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema document is not a JSON object.
    #[error("schema root must be a JSON object, found {found}")]
    NotAnObject {
        /// JSON type name of the value that was supplied.
        found: &'static str,
    },

    /// The schema could not be reduced to canonical bytes for digesting.
    #[error("schema digest failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The validation engine rejected the schema.
    #[error("validator build error for schema {digest}: {reason}")]
    Compile {
        /// Content digest of the schema that failed to compile.
        digest: String,
        /// Reason reported by the validation engine.
        reason: String,
    },

    /// A schema or values document could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },
}

/// JSON type name, for error messages.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
