//! # Schema Walker
//!
//! Recursive descent over a schema node's properties, producing one bound
//! field descriptor per supported property.
//!
//! ## Classification
//!
//! [`classify`] is a pure function over a single property:
//!
//! | Property shape                      | Kind                     |
//! |-------------------------------------|--------------------------|
//! | `type: string` with `enum`          | [`FieldKind::Choice`]    |
//! | `type: string` without `enum`       | [`FieldKind::Text`]      |
//! | `type: object` with non-empty oneOf | [`FieldKind::UnionGroup`]|
//! | anything else                       | [`FieldKind::Skipped`]   |
//!
//! The root-level MetaState key is always skipped.
//!
//! Skipping is silent: schemas may carry shapes this engine does not render,
//! and a form must still come up.
//!
//! ## Path Contract
//!
//! Each recursion level receives only its own subtree as local values, while
//! error lookups always use the absolute root-to-leaf path. A field nested
//! under `auth` reads its value from `values["token"]` but its error from
//! `errors["auth.token"]`.

use serde_json::Value;

use sform_core::FieldPath;

use crate::error_map::ErrorMap;
use crate::node::{Schema, SchemaNode};
use crate::union::{self, META_KEY};

/// The closed set of field shapes a property can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Free-text input.
    Text,
    /// Fixed set of options.
    Choice,
    /// Discriminated union over `oneOf` branches.
    UnionGroup,
    /// Not rendered.
    Skipped,
}

/// Classify the property at absolute path `path`.
///
/// Only the root-level [`META_KEY`] is reserved; a property of that name
/// deeper in the tree is classified like any other.
pub fn classify(path: &FieldPath, property: &SchemaNode) -> FieldKind {
    if path.segments() == [META_KEY] {
        return FieldKind::Skipped;
    }
    if property.is_string() {
        return if property.enum_values.is_some() {
            FieldKind::Choice
        } else {
            FieldKind::Text
        };
    }
    if property.is_object() && !property.one_of.is_empty() {
        return FieldKind::UnionGroup;
    }
    FieldKind::Skipped
}

/// One selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    /// Value written on selection.
    pub value: String,
    /// Displayed label.
    pub label: String,
}

/// A free-text field.
#[derive(Debug, Clone, PartialEq)]
pub struct TextField {
    /// Property name.
    pub key: String,
    /// Absolute path of the value.
    pub path: FieldPath,
    /// `title`, falling back to the key.
    pub label: String,
    /// `description`.
    pub help: Option<String>,
    /// Whether the key is in the parent's `required` list.
    pub required: bool,
    /// First entry of `examples`.
    pub placeholder: Option<String>,
    /// Current value.
    pub value: Option<String>,
    /// Validation message at `path`.
    pub error: Option<String>,
}

/// A fixed-option field.
///
/// Used both for `enum` properties and for union discriminants.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceField {
    /// Property name (the union key for discriminants).
    pub key: String,
    /// Absolute path the selection is written to.
    pub path: FieldPath,
    /// `title` or key for enum fields; `None` for discriminants.
    pub label: Option<String>,
    /// `description`.
    pub help: Option<String>,
    /// Options in schema order.
    pub options: Vec<ChoiceOption>,
    /// Current selection.
    pub value: Option<String>,
}

/// A `oneOf` property: a discriminant selector plus the active branch's fields.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionGroup {
    /// Property name.
    pub key: String,
    /// Absolute path of the union's value object.
    pub path: FieldPath,
    /// `title`, falling back to the key.
    pub legend: String,
    /// `description`.
    pub help: Option<String>,
    /// Branch selector bound to the MetaState discriminant path.
    pub discriminant: ChoiceField,
    /// Index of the active `oneOf` entry.
    pub active_index: usize,
    /// Fields of the active branch.
    pub fields: Vec<Field>,
    /// Validation message reported for the union value itself.
    pub error: Option<String>,
}

/// A rendered-ready field descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// See [`TextField`].
    Text(TextField),
    /// See [`ChoiceField`].
    Choice(ChoiceField),
    /// See [`UnionGroup`].
    UnionGroup(UnionGroup),
}

impl Field {
    /// Absolute path of the field's value.
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::Text(f) => &f.path,
            Self::Choice(f) => &f.path,
            Self::UnionGroup(g) => &g.path,
        }
    }

    /// Property name.
    pub fn key(&self) -> &str {
        match self {
            Self::Text(f) => &f.key,
            Self::Choice(f) => &f.key,
            Self::UnionGroup(g) => &g.key,
        }
    }

    /// The field's kind.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Choice(_) => FieldKind::Choice,
            Self::UnionGroup(_) => FieldKind::UnionGroup,
        }
    }
}

/// State visible to one recursion level of the walk.
#[derive(Debug, Clone, Copy)]
pub struct WalkContext<'a> {
    /// Absolute path of the node being walked.
    pub path: &'a FieldPath,
    /// Values local to this level (the node's own subtree).
    pub values: Option<&'a Value>,
    /// The whole combined value object, for MetaState lookups.
    pub root: &'a Value,
    /// Errors keyed by absolute path.
    pub errors: &'a ErrorMap,
}

/// Walk a whole form: root node, root values, MetaState from the same tree.
pub fn walk_form(schema: &Schema, combined: &Value, errors: &ErrorMap) -> Vec<Field> {
    let root_path = FieldPath::root();
    let ctx = WalkContext {
        path: &root_path,
        values: Some(combined),
        root: combined,
        errors,
    };
    walk(schema.root(), &ctx)
}

/// Walk one node, producing descriptors for its supported properties.
pub fn walk(node: &SchemaNode, ctx: &WalkContext<'_>) -> Vec<Field> {
    let mut fields = Vec::with_capacity(node.properties.len());
    for (key, property) in &node.properties {
        let path = ctx.path.child(key.as_str());
        let local = ctx.values.and_then(|v| v.get(key.as_str()));
        let field = match classify(&path, property) {
            FieldKind::Text => Field::Text(TextField {
                key: key.clone(),
                label: label_for(key, property),
                help: property.description.clone(),
                required: node.is_required(key),
                placeholder: property.examples.first().map(display_literal),
                value: local.and_then(scalar_text),
                error: ctx.errors.get(&path).map(str::to_string),
                path,
            }),
            FieldKind::Choice => Field::Choice(ChoiceField {
                key: key.clone(),
                label: Some(label_for(key, property)),
                help: property.description.clone(),
                options: property
                    .enum_values
                    .iter()
                    .flatten()
                    .map(|literal| {
                        let text = display_literal(literal);
                        ChoiceOption {
                            value: text.clone(),
                            label: text,
                        }
                    })
                    .collect(),
                value: local.and_then(scalar_text),
                path,
            }),
            FieldKind::UnionGroup => {
                match union::build_group(key, property, &path, local, ctx) {
                    Some(group) => Field::UnionGroup(group),
                    None => continue,
                }
            }
            FieldKind::Skipped => {
                tracing::trace!(path = %path, "skipping unsupported schema property");
                continue;
            }
        };
        fields.push(field);
    }
    fields
}

/// Field label: `title`, falling back to the property key.
pub(crate) fn label_for(key: &str, property: &SchemaNode) -> String {
    property.title.clone().unwrap_or_else(|| key.to_string())
}

/// Text of a JSON literal as shown to the user: strings unquoted, other
/// literals in their JSON form.
fn display_literal(literal: &Value) -> String {
    match literal {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Current text of a scalar value; `None` for absent, null, or containers.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Collect every field path in a walked tree, depth first, including
/// discriminant paths.
pub fn field_paths(fields: &[Field]) -> Vec<FieldPath> {
    let mut out = Vec::new();
    for field in fields {
        match field {
            Field::UnionGroup(group) => {
                out.push(group.discriminant.path.clone());
                out.extend(field_paths(&group.fields));
            }
            other => out.push(other.path().clone()),
        }
    }
    out
}

/// Find a field by absolute path anywhere in a walked tree.
pub fn find_field<'a>(fields: &'a [Field], path: &FieldPath) -> Option<&'a Field> {
    fields.iter().find_map(|field| {
        if field.path() == path {
            return Some(field);
        }
        match field {
            Field::UnionGroup(group) if path.starts_with(&group.path) => {
                find_field(&group.fields, path)
            }
            _ => None,
        }
    })
}
