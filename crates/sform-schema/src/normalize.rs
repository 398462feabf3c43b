//! # Normalization & Payload Projection
//!
//! Two explicit passes over the combined value object, both driven by the
//! same traversal the walker uses (root node plus every active union branch).
//!
//! - [`normalize`] gives property-less nodes an empty object at their path,
//!   so a validator expecting `type: object` there is satisfied. It runs
//!   before the first walk and before every validation; walking itself never
//!   writes.
//! - [`project_payload`] derives the value handed to validation and to the
//!   submit sink: MetaState removed, emptied text inputs removed, and
//!   (optionally) keys of deactivated union branches pruned.

use serde_json::{Map, Value};

use sform_core::{tree, FieldPath};

use crate::node::{Schema, SchemaNode};
use crate::union::{self, META_KEY};
use crate::walker::{classify, FieldKind};

/// Options for [`project_payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionOptions {
    /// Keep only the active branch's declared keys inside each union value.
    pub prune_inactive_branches: bool,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            prune_inactive_branches: true,
        }
    }
}

/// Ensure every property-less node reachable through the walk holds an
/// object. Idempotent.
///
/// An existing object is left untouched, so values belonging to a dormant
/// branch survive while a property-less branch is selected.
pub fn normalize(schema: &Schema, combined: &mut Value) {
    normalize_node(schema.root(), &FieldPath::root(), combined);
}

fn normalize_node(node: &SchemaNode, path: &FieldPath, combined: &mut Value) {
    if !node.has_properties() {
        let is_object = tree::get(combined, path).is_some_and(Value::is_object);
        if !is_object {
            tracing::debug!(path = %path, "filling property-less node with empty object");
            tree::set(combined, path, Value::Object(Map::new()));
        }
        return;
    }
    for (key, property) in &node.properties {
        let child = path.child(key.as_str());
        if classify(&child, property) != FieldKind::UnionGroup {
            continue;
        }
        let Some((_, branch)) = union::active_branch(property, &child, combined) else {
            continue;
        };
        normalize_node(branch, &child, combined);
    }
}

/// Derive the submission payload from the combined value object.
///
/// The result never contains MetaState. Text fields holding an empty string
/// are dropped, so a cleared input reads as absent and `required` applies to
/// it. Keys outside the schema at the root (such as the identifying `name`)
/// are kept.
pub fn project_payload(schema: &Schema, combined: &Value, options: ProjectionOptions) -> Value {
    let mut payload = combined.clone();
    if let Some(obj) = payload.as_object_mut() {
        obj.shift_remove(META_KEY);
    }
    project_node(schema.root(), &FieldPath::root(), combined, &mut payload, options);
    payload
}

fn project_node(
    node: &SchemaNode,
    path: &FieldPath,
    combined: &Value,
    payload: &mut Value,
    options: ProjectionOptions,
) {
    for (key, property) in &node.properties {
        let child = path.child(key.as_str());
        match classify(&child, property) {
            FieldKind::Text => {
                if tree::get_str(payload, &child) == Some("") {
                    tree::remove(payload, &child);
                }
            }
            FieldKind::UnionGroup => {
                let Some((_, branch)) = union::active_branch(property, &child, combined) else {
                    continue;
                };
                if options.prune_inactive_branches {
                    if let Some(obj) = tree::get_mut(payload, &child).and_then(Value::as_object_mut) {
                        obj.retain(|k, _| branch.property(k).is_some());
                    }
                }
                project_node(branch, &child, combined, payload, options);
            }
            FieldKind::Choice | FieldKind::Skipped => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> Schema {
        Schema::from_value(value).unwrap()
    }

    fn auth_schema() -> Schema {
        schema(json!({
            "properties": {
                "host": {"type": "string"},
                "auth": {
                    "type": "object",
                    "oneOf": [
                        {"title": "None"},
                        {"title": "Token", "properties": {"token": {"type": "string"}}}
                    ]
                }
            }
        }))
    }

    #[test]
    fn test_root_without_properties_is_empty_object() {
        let s = schema(json!({"type": "object"}));
        let mut combined = Value::Null;
        normalize(&s, &mut combined);
        assert_eq!(combined, json!({}));
    }

    #[test]
    fn test_normalize_fills_propertyless_branch() {
        let s = auth_schema();
        let mut combined = json!({"host": "h"});
        normalize(&s, &mut combined);
        assert_eq!(combined, json!({"host": "h", "auth": {}}));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let s = auth_schema();
        let mut combined = json!({});
        normalize(&s, &mut combined);
        let once = combined.clone();
        for _ in 0..3 {
            normalize(&s, &mut combined);
        }
        assert_eq!(combined, once);
    }

    #[test]
    fn test_normalize_keeps_dormant_values() {
        let s = auth_schema();
        let mut combined = json!({"auth": {"token": "abc"}});
        normalize(&s, &mut combined);
        assert_eq!(combined["auth"], json!({"token": "abc"}));
    }

    #[test]
    fn test_normalize_replaces_scalar_with_object() {
        let s = auth_schema();
        let mut combined = json!({"auth": "garbage"});
        normalize(&s, &mut combined);
        assert_eq!(combined["auth"], json!({}));
    }

    #[test]
    fn test_normalize_skips_branch_with_properties() {
        let s = auth_schema();
        let mut combined = json!({"$meta": {"auth": {"type": "Token"}}});
        normalize(&s, &mut combined);
        assert_eq!(combined.get("auth"), None);
    }

    #[test]
    fn test_projection_strips_meta_and_empty_text() {
        let s = auth_schema();
        let combined = json!({
            "name": "c1",
            "host": "",
            "auth": {},
            "$meta": {"auth": {"type": "None"}}
        });
        let payload = project_payload(&s, &combined, ProjectionOptions::default());
        assert_eq!(payload, json!({"name": "c1", "auth": {}}));
    }

    #[test]
    fn test_projection_prunes_dormant_branch() {
        let s = auth_schema();
        let combined = json!({
            "auth": {"token": "abc"},
            "$meta": {"auth": {"type": "None"}}
        });
        let payload = project_payload(&s, &combined, ProjectionOptions::default());
        assert_eq!(payload["auth"], json!({}));
    }

    #[test]
    fn test_projection_can_keep_dormant_branch() {
        let s = auth_schema();
        let combined = json!({
            "auth": {"token": "abc"},
            "$meta": {"auth": {"type": "None"}}
        });
        let options = ProjectionOptions {
            prune_inactive_branches: false,
        };
        let payload = project_payload(&s, &combined, options);
        assert_eq!(payload["auth"], json!({"token": "abc"}));
    }

    #[test]
    fn test_projection_drops_empty_text_in_active_branch() {
        let s = auth_schema();
        let combined = json!({
            "auth": {"token": ""},
            "$meta": {"auth": {"type": "Token"}}
        });
        let payload = project_payload(&s, &combined, ProjectionOptions::default());
        assert_eq!(payload["auth"], json!({}));
    }

    #[test]
    fn test_projection_does_not_mutate_session_values() {
        let s = auth_schema();
        let combined = json!({"host": "", "$meta": {}});
        let before = combined.clone();
        let _ = project_payload(&s, &combined, ProjectionOptions::default());
        assert_eq!(combined, before);
    }
}
