//! # Form Validation
//!
//! Compiles form schemas with the `jsonschema` crate (Draft 2020-12) and maps
//! violations onto field paths.
//!
//! ## Compilation Cache
//!
//! Compiled validators are memoized in a [`ValidatorCache`] keyed by the
//! content digest of the compiled document. A freshly parsed schema that is
//! structurally identical to one seen before reuses the same compiled
//! validator. Each branch selection of a union-bearing schema pins to a
//! different document and is compiled once.
//!
//! ## Error Mapping
//!
//! - The identifying field (`name` by default) is checked first, outside the
//!   schema: it must be a string that is non-empty after trimming.
//! - Each engine violation is keyed by its instance location converted from
//!   JSON Pointer to a [`FieldPath`]. A `required` violation is reported by
//!   the engine at the parent object; the missing property is appended so the
//!   message lands on the field that is actually missing.
//! - When several violations share a path the last one wins.
//!
//! A constructed validator never fails; it always yields an [`ErrorMap`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Retrieve, Uri, Validator};
use parking_lot::RwLock;
use serde_json::Value;

use sform_core::{sha256_digest, CanonicalBytes, ContentDigest, FieldPath};

use crate::error::SchemaError;
use crate::error_map::ErrorMap;
use crate::node::Schema;
use crate::normalize::{project_payload, ProjectionOptions};
use crate::union::pin_active_branches;

/// Default name of the identifying top-level field.
pub const DEFAULT_NAME_FIELD: &str = "name";

/// Refuses every external `$ref`.
///
/// Form schemas are self-contained; resolving a remote reference would put a
/// network fetch inside validator compilation.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external $ref not supported: {}", uri.as_str()).into())
    }
}

/// Thread-safe memo of compiled validators keyed by document content digest.
///
/// Cloning yields another handle to the same entries.
#[derive(Clone, Default)]
pub struct ValidatorCache {
    compiled: Arc<RwLock<HashMap<ContentDigest, Arc<Validator>>>>,
}

impl ValidatorCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> &'static ValidatorCache {
        static GLOBAL: OnceLock<ValidatorCache> = OnceLock::new();
        GLOBAL.get_or_init(ValidatorCache::new)
    }

    /// Return the compiled validator for `schema`, compiling on first use.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Compile` if the engine rejects the schema.
    /// Failures are not cached.
    pub fn get_or_compile(&self, schema: &Schema) -> Result<Arc<Validator>, SchemaError> {
        self.get_or_compile_document(schema.digest(), schema.raw())
    }

    fn get_or_compile_document(
        &self,
        digest: &ContentDigest,
        document: &Value,
    ) -> Result<Arc<Validator>, SchemaError> {
        if let Some(hit) = self.compiled.read().get(digest) {
            tracing::trace!(schema = %digest.short(), "validator cache hit");
            return Ok(Arc::clone(hit));
        }

        let compiled = Arc::new(compile(digest, document)?);
        let mut entries = self.compiled.write();
        let cached = entries.len();
        let entry = entries
            .entry(*digest)
            .or_insert_with(|| Arc::clone(&compiled));
        tracing::debug!(schema = %digest.short(), cached, "validator compiled");
        Ok(Arc::clone(entry))
    }

    /// Number of cached validators.
    pub fn len(&self) -> usize {
        self.compiled.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.compiled.read().is_empty()
    }

    /// Drop every cached validator.
    pub fn clear(&self) {
        self.compiled.write().clear();
    }
}

impl fmt::Debug for ValidatorCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorCache")
            .field("entries", &self.len())
            .finish()
    }
}

fn compile(digest: &ContentDigest, document: &Value) -> Result<Validator, SchemaError> {
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    opts.with_retriever(OfflineRetriever);
    opts.build(document).map_err(|e| SchemaError::Compile {
        digest: digest.to_string(),
        reason: e.to_string(),
    })
}

/// A form schema bound to its compiled validators, the identifying-field
/// rule, and the payload projection policy.
#[derive(Clone)]
pub struct FormValidator {
    schema: Schema,
    cache: ValidatorCache,
    unpinned: Arc<Validator>,
    name_field: String,
    projection: ProjectionOptions,
}

impl FormValidator {
    /// Compile (or fetch from `cache`) the validator for `schema`.
    ///
    /// The unpinned document is compiled eagerly. Pinning only moves
    /// subschemas, so every branch selection compiles whenever this does.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Compile` if the engine rejects the schema.
    pub fn new(
        schema: &Schema,
        cache: &ValidatorCache,
        name_field: impl Into<String>,
    ) -> Result<Self, SchemaError> {
        Ok(Self {
            schema: schema.clone(),
            cache: cache.clone(),
            unpinned: cache.get_or_compile(schema)?,
            name_field: name_field.into(),
            projection: ProjectionOptions::default(),
        })
    }

    /// Replace the payload projection policy.
    pub fn with_projection(mut self, projection: ProjectionOptions) -> Self {
        self.projection = projection;
        self
    }

    /// The schema this validator checks against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Content digest of the schema this validator was compiled from.
    pub fn digest(&self) -> &ContentDigest {
        self.schema.digest()
    }

    /// Name of the identifying top-level field.
    pub fn name_field(&self) -> &str {
        &self.name_field
    }

    /// The payload projection policy.
    pub fn projection(&self) -> ProjectionOptions {
        self.projection
    }

    /// The payload validation and submission see for `combined`.
    pub fn payload(&self, combined: &Value) -> Value {
        project_payload(&self.schema, combined, self.projection)
    }

    /// Validate the combined value object, producing a fresh error map.
    ///
    /// Unions are checked against the branch selected in `combined`.
    pub fn validate(&self, combined: &Value) -> ErrorMap {
        let payload = self.payload(combined);
        let mut errors = ErrorMap::new();

        let has_name = payload
            .get(self.name_field.as_str())
            .and_then(Value::as_str)
            .is_some_and(|name| !name.trim().is_empty());
        if !has_name {
            errors.insert(
                FieldPath::root().child(self.name_field.as_str()),
                format!("{} is required", self.name_field),
            );
        }

        let compiled = self.pinned(combined);
        for violation in compiled.iter_errors(&payload) {
            let mut path = FieldPath::from_json_pointer(&violation.instance_path.to_string());
            if let ValidationErrorKind::Required { property } = &violation.kind {
                if let Some(missing) = property.as_str() {
                    path.push(missing);
                }
            }
            errors.insert(path, violation.to_string());
        }

        tracing::debug!(
            schema = %self.schema.digest().short(),
            errors = errors.len(),
            "form validated"
        );
        errors
    }

    /// Validator for the current branch selection, falling back to the
    /// unpinned schema if the pinned document cannot be compiled.
    fn pinned(&self, combined: &Value) -> Arc<Validator> {
        let document = pin_active_branches(&self.schema, combined);
        let compiled = CanonicalBytes::new(&document)
            .map_err(SchemaError::from)
            .and_then(|bytes| {
                self.cache
                    .get_or_compile_document(&sha256_digest(&bytes), &document)
            });
        match compiled {
            Ok(validator) => validator,
            Err(err) => {
                tracing::warn!(
                    schema = %self.schema.digest().short(),
                    error = %err,
                    "pinned schema unavailable, validating unpinned"
                );
                Arc::clone(&self.unpinned)
            }
        }
    }
}

impl fmt::Debug for FormValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormValidator")
            .field("digest", &self.schema.digest().to_string())
            .field("name_field", &self.name_field)
            .field("projection", &self.projection)
            .finish_non_exhaustive()
    }
}
