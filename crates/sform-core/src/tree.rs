//! # Value-Tree Addressing
//!
//! Read and write nested `serde_json::Value` objects by [`FieldPath`].
//!
//! ## Invariants
//!
//! - [`set`] never discards sibling keys. Missing intermediate containers are
//!   created as empty objects; an intermediate that exists but is not an
//!   object is replaced by one (the write wins).
//! - Writing at the root path replaces the whole tree.
//! - Reads never allocate and never fail: any missing or non-object step
//!   yields `None`.

use serde_json::{Map, Value};

use crate::path::FieldPath;

/// Read the value at `path`, or `None` if any step is missing.
pub fn get<'a>(tree: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(tree, |node, segment| node.as_object()?.get(segment))
}

/// Mutable variant of [`get`].
pub fn get_mut<'a>(tree: &'a mut Value, path: &FieldPath) -> Option<&'a mut Value> {
    path.segments()
        .iter()
        .try_fold(tree, |node, segment| node.as_object_mut()?.get_mut(segment))
}

/// Read the string at `path`, or `None` if absent or not a string.
pub fn get_str<'a>(tree: &'a Value, path: &FieldPath) -> Option<&'a str> {
    get(tree, path).and_then(Value::as_str)
}

/// Write `value` at `path`, creating intermediate objects as needed.
pub fn set(tree: &mut Value, path: &FieldPath, value: Value) {
    let Some((leaf, parents)) = path.segments().split_last() else {
        *tree = value;
        return;
    };
    let mut node = tree;
    for segment in parents {
        node = ensure_object(node)
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(node).insert(leaf.clone(), value);
}

/// Remove and return the value at `path`.
///
/// Removing the root path is a no-op and returns `None`: the tree itself is
/// never detached.
pub fn remove(tree: &mut Value, path: &FieldPath) -> Option<Value> {
    let (leaf, parents) = path.segments().split_last()?;
    let parent = get_mut(tree, &FieldPath::from_segments(parents.iter().cloned()))?;
    parent.as_object_mut()?.shift_remove(leaf)
}

/// Coerce `node` into an object, replacing any non-object value.
fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    match node {
        Value::Object(map) => map,
        other => {
            *other = Value::Object(Map::new());
            ensure_object(other)
        }
    }
}
