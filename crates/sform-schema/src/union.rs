//! # Union Resolver
//!
//! Handles `type: object` properties carrying `oneOf`. The selected branch
//! (the discriminant) lives in MetaState, a namespace under the reserved
//! root key [`META_KEY`] that no schema property can occupy.
//!
//! ## Discriminant Location
//!
//! For a union whose value lives at path `p`, the selected branch title is
//! stored at segments `[META_KEY, p.to_escaped_dotted(), DISCRIMINANT_KEY]`.
//! For a top-level union `auth` this reads as `$meta.auth.type`. Keying
//! MetaState by the whole escaped union path keeps nested unions apart
//! without their discriminants ever landing inside each other, and a
//! top-level key `a.b` (stored as `a~1b`) never shares a discriminant with
//! the union at `a` → `b`.
//!
//! ## Selection Policy
//!
//! The active branch is the `oneOf` entry whose title equals the stored
//! discriminant. With no discriminant, or one matching no entry, the first
//! entry is active.
//!
//! Changing the discriminant never touches the union's value object. Values
//! typed under a deactivated branch stay where they are and reappear when
//! that branch is selected again.
//!
//! ## Pinning
//!
//! A form shows one branch at a time, so validation checks only that branch.
//! [`pin_active_branches`] rewrites each rendered union's `oneOf` into an
//! `allOf` holding just the active entry. Violations inside the branch then
//! carry their real instance paths instead of collapsing into a single
//! "no branch matched" report at the union.

use serde_json::{Map, Value};

use sform_core::{tree, FieldPath};

use crate::node::{Schema, SchemaNode};
use crate::walker::{
    self, classify, label_for, ChoiceField, ChoiceOption, FieldKind, UnionGroup, WalkContext,
};

/// Reserved root key holding MetaState.
pub const META_KEY: &str = "$meta";

/// Leaf key under which a union's selected branch title is stored.
pub const DISCRIMINANT_KEY: &str = "type";

/// MetaState path of the discriminant for the union at `union_path`.
pub fn discriminant_path(union_path: &FieldPath) -> FieldPath {
    FieldPath::from_segments([
        META_KEY.to_string(),
        union_path.to_escaped_dotted(),
        DISCRIMINANT_KEY.to_string(),
    ])
}

/// Display title of a branch. Untitled branches are named by position.
pub fn branch_title(index: usize, branch: &SchemaNode) -> String {
    branch
        .title
        .clone()
        .unwrap_or_else(|| format!("Option {}", index + 1))
}

/// Pick the active branch for `discriminant`, defaulting to the first entry.
///
/// Returns `None` only when `one_of` is empty.
pub fn resolve<'a>(
    one_of: &'a [SchemaNode],
    discriminant: Option<&str>,
) -> Option<(usize, &'a SchemaNode)> {
    let matched = discriminant.and_then(|wanted| {
        one_of
            .iter()
            .enumerate()
            .find(|(i, branch)| branch_title(*i, branch) == wanted)
    });
    matched.or_else(|| one_of.first().map(|branch| (0, branch)))
}

/// Resolve the active branch of the union at `union_path`, reading its
/// discriminant from the combined value object.
pub fn active_branch<'a>(
    property: &'a SchemaNode,
    union_path: &FieldPath,
    combined: &Value,
) -> Option<(usize, &'a SchemaNode)> {
    let discriminant = tree::get_str(combined, &discriminant_path(union_path));
    resolve(&property.one_of, discriminant)
}

/// Copy of the raw schema with every reachable union pinned to its active
/// branch, as selected by the MetaState in `combined`.
pub fn pin_active_branches(schema: &Schema, combined: &Value) -> Value {
    let mut raw = schema.raw().clone();
    pin_node(schema.root(), &FieldPath::root(), combined, &mut raw);
    raw
}

fn pin_node(node: &SchemaNode, path: &FieldPath, combined: &Value, raw: &mut Value) {
    for (key, property) in &node.properties {
        let child = path.child(key.as_str());
        if classify(&child, property) != FieldKind::UnionGroup {
            continue;
        }
        let Some((index, branch)) = active_branch(property, &child, combined) else {
            continue;
        };
        let Some(raw_property) = raw
            .get_mut("properties")
            .and_then(|props| props.get_mut(key.as_str()))
            .and_then(Value::as_object_mut)
        else {
            continue;
        };
        let Some(mut pinned) = take_branch(raw_property, index) else {
            continue;
        };
        pin_node(branch, &child, combined, &mut pinned);
        match raw_property.get_mut("allOf").and_then(Value::as_array_mut) {
            Some(all_of) => all_of.push(pinned),
            None => {
                raw_property.insert("allOf".to_string(), Value::Array(vec![pinned]));
            }
        }
    }
}

/// Remove `oneOf` from a raw property, returning its entry at `index`.
fn take_branch(raw_property: &mut Map<String, Value>, index: usize) -> Option<Value> {
    let in_range = raw_property
        .get("oneOf")
        .and_then(Value::as_array)
        .is_some_and(|branches| index < branches.len());
    if !in_range {
        return None;
    }
    match raw_property.shift_remove("oneOf") {
        Some(Value::Array(mut branches)) => Some(branches.swap_remove(index)),
        _ => None,
    }
}

/// Build the bound descriptor for a union property.
///
/// The nested walk runs with the union's own path and with the values found
/// under the union key as its local values.
pub(crate) fn build_group(
    key: &str,
    property: &SchemaNode,
    path: &FieldPath,
    local: Option<&Value>,
    ctx: &WalkContext<'_>,
) -> Option<UnionGroup> {
    let (active_index, branch) = active_branch(property, path, ctx.root)?;
    let active_title = branch_title(active_index, branch);

    let discriminant = ChoiceField {
        key: key.to_string(),
        path: discriminant_path(path),
        label: None,
        help: None,
        options: property
            .one_of
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let title = branch_title(i, b);
                ChoiceOption {
                    value: title.clone(),
                    label: title,
                }
            })
            .collect(),
        value: Some(active_title),
    };

    let nested = WalkContext {
        path,
        values: local,
        root: ctx.root,
        errors: ctx.errors,
    };

    Some(UnionGroup {
        key: key.to_string(),
        path: path.clone(),
        legend: label_for(key, property),
        help: property.description.clone(),
        discriminant,
        active_index,
        fields: walker::walk(branch, &nested),
        error: ctx.errors.get(path).map(str::to_string),
    })
}
