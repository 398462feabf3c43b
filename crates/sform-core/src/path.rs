//! # Field Paths
//!
//! A [`FieldPath`] names exactly one location in a form's value tree as an
//! ordered sequence of property-name segments.
//!
//! ## Representations
//!
//! - **Segments**: the canonical form. Segment contents are opaque, so a
//!   property name containing `.` or `/` is still addressed unambiguously.
//! - **Dotted**: segments joined by [`PATH_SEPARATOR`]. Used for display,
//!   error-map keys on the wire, and CLI arguments. Lossy when a segment
//!   itself contains the separator.
//! - **Escaped dotted**: the dotted form with `~` written as `~0` and `.` as
//!   `~1` inside each segment. Injective over non-root paths, so it can key
//!   a flat map by path. Ordinary keys render exactly as in dotted form.
//! - **JSON Pointer** (RFC 6901): the instance location reported by the
//!   validation engine. [`FieldPath::from_json_pointer`] is the only bridge
//!   from validator output back to segments.
//!
//! The root path has zero segments and renders as the empty string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Separator used by the dotted representation.
pub const PATH_SEPARATOR: char = '.';

/// An ordered sequence of property-name segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from any sequence of segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse the dotted representation. The empty string is the root path.
    pub fn parse_dotted(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::root();
        }
        Self(dotted.split(PATH_SEPARATOR).map(str::to_string).collect())
    }

    /// Convert an RFC 6901 JSON Pointer into a path.
    ///
    /// The leading `/` is stripped, the remainder is split on `/`, and each
    /// segment is unescaped (`~1` → `/`, then `~0` → `~`). The empty pointer
    /// addresses the root.
    pub fn from_json_pointer(pointer: &str) -> Self {
        let Some(rest) = pointer.strip_prefix('/') else {
            return Self::root();
        };
        Self(
            rest.split('/')
                .map(|s| s.replace("~1", "/").replace("~0", "~"))
                .collect(),
        )
    }

    /// Render as an RFC 6901 JSON Pointer.
    pub fn to_json_pointer(&self) -> String {
        self.0
            .iter()
            .map(|s| format!("/{}", s.replace('~', "~0").replace('/', "~1")))
            .collect()
    }

    /// Render as segments joined by [`PATH_SEPARATOR`].
    pub fn to_dotted(&self) -> String {
        self.0.join(&PATH_SEPARATOR.to_string())
    }

    /// Render as the escaped dotted form (`~` → `~0`, `.` → `~1`).
    pub fn to_escaped_dotted(&self) -> String {
        self.0
            .iter()
            .map(|s| s.replace('~', "~0").replace(PATH_SEPARATOR, "~1"))
            .collect::<Vec<_>>()
            .join(&PATH_SEPARATOR.to_string())
    }

    /// Parse the escaped dotted form. The empty string is the root path.
    pub fn parse_escaped_dotted(escaped: &str) -> Self {
        if escaped.is_empty() {
            return Self::root();
        }
        Self(
            escaped
                .split(PATH_SEPARATOR)
                .map(|s| s.replace("~1", ".").replace("~0", "~"))
                .collect(),
        )
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// The path's segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The final segment, or `None` for the root.
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The path with its final segment removed, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Alias for [`is_root`](Self::is_root).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `prefix` is an ancestor of (or equal to) this path.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_dotted(s))
    }
}

impl<S: Into<String>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_segments(iter)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_dotted())
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dotted = String::deserialize(deserializer)?;
        Ok(Self::parse_dotted(&dotted))
    }
}
