//! # Form Inputs
//!
//! Arguments shared by every subcommand and the code that turns them into a
//! [`FormSession`]. Dotted paths are split here and nowhere else.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde_json::Value;

use sform_core::FieldPath;
use sform_schema::{discriminant_path, load_document, load_schema, ValidatorCache};
use sform_state::{FormSession, SessionConfig};

/// Schema, values, config, and inline edits.
#[derive(Args, Debug, Clone)]
pub struct FormArgs {
    /// Form schema (JSON, or YAML by .yaml/.yml extension).
    #[arg(long)]
    pub schema: PathBuf,

    /// Initial values document. Omit for an empty form.
    #[arg(long)]
    pub values: Option<PathBuf>,

    /// Session config (YAML or JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Set a field before running, as `dotted.path=value`. Repeatable.
    #[arg(long = "set", value_name = "PATH=VALUE")]
    pub sets: Vec<String>,

    /// Select a union branch, as `dotted.union.path=Branch Title`. Repeatable.
    #[arg(long = "select", value_name = "UNION=TITLE")]
    pub selects: Vec<String>,
}

impl FormArgs {
    /// Load everything and apply edits in order: selections, then sets.
    pub fn open(&self) -> anyhow::Result<FormSession> {
        let schema = load_schema(&self.schema)?;
        let initial = match &self.values {
            Some(path) => load_document(path)?,
            None => Value::Null,
        };
        let config = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };

        let mut session = FormSession::new(schema, initial, ValidatorCache::global(), config)
            .with_context(|| format!("cannot start form for '{}'", self.schema.display()))?;

        for select in &self.selects {
            let (union, title) = split_assignment(select)?;
            session.on_change(&discriminant_path(&union), Value::String(title.to_string()));
        }
        for set in &self.sets {
            let (path, value) = split_assignment(set)?;
            session.on_change(&path, Value::String(value.to_string()));
        }
        tracing::debug!(
            schema = %self.schema.display(),
            selects = self.selects.len(),
            sets = self.sets.len(),
            "form opened"
        );
        Ok(session)
    }
}

/// Split `a.b=value` into its path and value. The value may contain `=`.
pub fn split_assignment(raw: &str) -> anyhow::Result<(FieldPath, &str)> {
    let (path, value) = raw
        .split_once('=')
        .with_context(|| format!("expected PATH=VALUE, got '{raw}'"))?;
    anyhow::ensure!(!path.is_empty(), "empty path in '{raw}'");
    Ok((FieldPath::parse_dotted(path), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_assignment() {
        let (path, value) = split_assignment("auth.token=a=b").unwrap();
        assert_eq!(path.segments(), ["auth", "token"]);
        assert_eq!(value, "a=b");
    }

    #[test]
    fn test_split_assignment_rejects_malformed() {
        assert!(split_assignment("no-equals").is_err());
        assert!(split_assignment("=value").is_err());
    }

    #[test]
    fn test_open_applies_edits() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("form.yaml");
        std::fs::write(
            &schema,
            "properties:\n  host: {type: string}\n  auth:\n    type: object\n    oneOf:\n      - {title: A}\n      - {title: B}\n",
        )
        .unwrap();
        let args = FormArgs {
            schema,
            values: None,
            config: None,
            sets: vec!["host=db".into()],
            selects: vec!["auth=B".into()],
        };
        let session = args.open().unwrap();
        assert_eq!(session.values()["host"], "db");
        assert_eq!(session.values()["$meta"]["auth"]["type"], "B");
    }
}
