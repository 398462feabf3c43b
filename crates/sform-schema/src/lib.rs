//! # sform-schema — Schema-Driven Field Derivation
//!
//! Turns a JSON Schema document plus a combined value object into a list of
//! bound field descriptors, and validates the submission payload derived
//! from those values.
//!
//! ## Pipeline
//!
//! 1. [`Schema::from_value`] parses the lenient node model and fingerprints
//!    the raw document.
//! 2. [`normalize`] fills property-less nodes with empty objects.
//! 3. [`walk_form`] classifies properties and binds values and errors by
//!    absolute path, resolving `oneOf` unions through MetaState.
//! 4. [`project_payload`] strips MetaState and cleared inputs.
//! 5. [`FormValidator::validate`] produces a fresh [`ErrorMap`] keyed by the
//!    same paths the walker uses.
//! 6. [`render_form`] hands the descriptors to a [`FieldRenderer`].
//!
//! ## Crate Policy
//!
//! - Depends only on `sform-core` internally.
//! - Walking and rendering never write to the value object; only
//!   [`normalize`] does.
//! - Validators are compiled once per schema content digest.

pub mod error;
pub mod error_map;
pub mod load;
pub mod node;
pub mod normalize;
pub mod render;
pub mod union;
pub mod validate;
pub mod walker;

pub use error::{json_type_name, SchemaError};
pub use error_map::ErrorMap;
pub use load::{load_document, load_schema};
pub use node::{Schema, SchemaNode, SchemaType};
pub use normalize::{normalize, project_payload, ProjectionOptions};
pub use render::{render_field, render_fields, render_form, FieldRenderer};
pub use union::{discriminant_path, DISCRIMINANT_KEY, META_KEY};
pub use validate::{FormValidator, ValidatorCache, DEFAULT_NAME_FIELD};
pub use walker::{
    classify, field_paths, find_field, walk_form, ChoiceField, ChoiceOption, Field, FieldKind,
    TextField, UnionGroup,
};
