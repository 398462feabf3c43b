//! # Session Configuration
//!
//! Tunables for a [`FormSession`](crate::FormSession), loadable from a YAML
//! or JSON document. Every key is optional.
//!
//! ```yaml
//! name_field: name
//! prune_inactive_branches: true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sform_schema::{load_document, ProjectionOptions, SchemaError, DEFAULT_NAME_FIELD};

/// Error loading a [`SessionConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document could not be read or parsed.
    #[error(transparent)]
    Load(#[from] SchemaError),

    /// The document parsed but does not describe a session config.
    #[error("invalid session config '{path}': {reason}")]
    Invalid {
        /// Path to the config document.
        path: String,
        /// Deserialization failure.
        reason: String,
    },
}

/// Per-session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Top-level field that must hold a non-blank string before submission.
    pub name_field: String,
    /// Drop keys of deactivated union branches from the validated and
    /// submitted payload. Dormant values always stay in the session.
    pub prune_inactive_branches: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name_field: DEFAULT_NAME_FIELD.to_string(),
            prune_inactive_branches: true,
        }
    }
}

impl SessionConfig {
    /// Load from a YAML (`.yaml`/`.yml`) or JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if the file cannot be read or parsed and
    /// `ConfigError::Invalid` for unknown keys or mistyped values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let document = load_document(path)?;
        let config: Self = serde_json::from_value(document).map_err(|e| ConfigError::Invalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), ?config, "session config loaded");
        Ok(config)
    }

    /// Payload projection policy implied by this config.
    pub fn projection(&self) -> ProjectionOptions {
        ProjectionOptions {
            prune_inactive_branches: self.prune_inactive_branches,
        }
    }
}
