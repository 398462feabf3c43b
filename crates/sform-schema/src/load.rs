//! # Document Loading
//!
//! Reads schema and values documents from disk. The format is chosen by file
//! extension: `.yaml`/`.yml` are parsed as YAML, everything else as JSON.
//! YAML is deserialized straight into `serde_json::Value`, keeping mapping
//! order, so the rest of the workspace only ever sees JSON.

use std::path::Path;

use serde_json::Value;

use crate::error::SchemaError;
use crate::node::Schema;

/// Load a JSON or YAML document into a JSON value.
///
/// # Errors
///
/// Returns `SchemaError::DocumentLoad` if the file cannot be read or parsed.
pub fn load_document(path: &Path) -> Result<Value, SchemaError> {
    let load_err = |reason: String| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    };

    let content =
        std::fs::read_to_string(path).map_err(|e| load_err(format!("cannot read file: {e}")))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        "yaml" | "yml" => {
            serde_yaml::from_str(&content).map_err(|e| load_err(format!("invalid YAML: {e}")))
        }
        _ => serde_json::from_str(&content).map_err(|e| load_err(format!("invalid JSON: {e}"))),
    }
}

/// Load and fingerprint a schema document.
pub fn load_schema(path: &Path) -> Result<Schema, SchemaError> {
    Schema::from_value(load_document(path)?)
}
