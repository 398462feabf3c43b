//! # Schema Model
//!
//! A typed, read-only view of the JSON-Schema subset that drives field
//! derivation, plus the [`Schema`] handle that pairs it with the raw document
//! and its content digest.
//!
//! ## Lenient Parsing
//!
//! [`SchemaNode::from_value`] never fails. Keywords with an unexpected JSON
//! type are treated as absent, and a `type` that is not exactly `"string"` or
//! `"object"` (including array forms such as `["string", "null"]`) becomes
//! [`SchemaType::Unsupported`]. Unsupported shapes are later skipped by the
//! walker instead of aborting the form.
//!
//! Property order follows the source document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use sform_core::{sha256_digest, CanonicalBytes, ContentDigest};

use crate::error::{json_type_name, SchemaError};

/// The `type` keyword of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    /// `"type": "string"`.
    String,
    /// `"type": "object"`.
    Object,
    /// Any other `type` value.
    Unsupported,
}

impl SchemaType {
    fn from_value(value: &Value) -> Self {
        match value.as_str() {
            Some("string") => Self::String,
            Some("object") => Self::Object,
            _ => Self::Unsupported,
        }
    }
}

/// One node of a form schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    /// The `type` keyword, if present.
    pub node_type: Option<SchemaType>,
    /// `properties`, in document order.
    pub properties: Vec<(String, SchemaNode)>,
    /// `required` property names.
    pub required: Vec<String>,
    /// `enum` literals, if present.
    pub enum_values: Option<Vec<Value>>,
    /// `oneOf` alternatives.
    pub one_of: Vec<SchemaNode>,
    /// `title`.
    pub title: Option<String>,
    /// `description`.
    pub description: Option<String>,
    /// `examples`.
    pub examples: Vec<Value>,
}

impl SchemaNode {
    /// Build a node from raw JSON. Never fails; see the module docs.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let properties = obj
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_value(v)))
                    .collect()
            })
            .unwrap_or_default();

        let required = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let one_of = obj
            .get("oneOf")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Self::from_value).collect())
            .unwrap_or_default();

        Self {
            node_type: obj.get("type").map(SchemaType::from_value),
            properties,
            required,
            enum_values: obj.get("enum").and_then(Value::as_array).cloned(),
            one_of,
            title: string_keyword(obj, "title"),
            description: string_keyword(obj, "description"),
            examples: obj
                .get("examples")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Look up a declared property by name.
    pub fn property(&self, key: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, node)| node)
    }

    /// Whether the node declares at least one property.
    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }

    /// Whether `key` appears in this node's `required` list.
    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|r| r == key)
    }

    /// Whether the node's `type` is `string`.
    pub fn is_string(&self) -> bool {
        self.node_type == Some(SchemaType::String)
    }

    /// Whether the node's `type` is `object`.
    pub fn is_object(&self) -> bool {
        self.node_type == Some(SchemaType::Object)
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

fn string_keyword(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// A form schema: the raw document, its parsed root, and its content digest.
///
/// The digest is computed over RFC 8785 canonical bytes, so two schemas that
/// differ only in key order are interchangeable for validator reuse.
#[derive(Debug, Clone)]
pub struct Schema {
    raw: Value,
    root: SchemaNode,
    digest: ContentDigest,
}

impl Schema {
    /// Parse and fingerprint a schema document.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotAnObject` if `raw` is not a JSON object.
    pub fn from_value(raw: Value) -> Result<Self, SchemaError> {
        if !raw.is_object() {
            return Err(SchemaError::NotAnObject {
                found: json_type_name(&raw),
            });
        }
        let digest = sha256_digest(&CanonicalBytes::new(&raw)?);
        let root = SchemaNode::from_value(&raw);
        Ok(Self { raw, root, digest })
    }

    /// The schema exactly as supplied.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The parsed root node.
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// Content digest of the canonical schema bytes.
    pub fn digest(&self) -> &ContentDigest {
        &self.digest
    }
}
