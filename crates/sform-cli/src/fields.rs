//! # Fields Subcommand
//!
//! Prints the field tree a schema derives for the given values, one line per
//! field with nested union groups indented.

use std::io::Write;

use clap::Args;

use sform_schema::{ChoiceField, FieldRenderer, TextField, UnionGroup};

use crate::input::FormArgs;

/// Arguments for the fields subcommand.
#[derive(Args, Debug)]
pub struct FieldsArgs {
    #[command(flatten)]
    pub form: FormArgs,

    /// Validate first so errors appear next to their fields.
    #[arg(long)]
    pub with_errors: bool,
}

/// Renders fields as indented plain-text lines.
#[derive(Debug, Default)]
pub struct OutlineRenderer;

impl FieldRenderer for OutlineRenderer {
    type Output = Vec<String>;

    fn render_text(&mut self, field: &TextField) -> Vec<String> {
        let marker = if field.required { "*" } else { "" };
        let shown = match (&field.value, &field.placeholder) {
            (Some(value), _) => format!("{value:?}"),
            (None, Some(example)) => format!("(e.g. {example})"),
            (None, None) => "-".to_string(),
        };
        let mut lines = vec![format!(
            "{}{marker} [{}] text = {shown}",
            field.label, field.path
        )];
        lines.extend(field.help.iter().map(|help| format!("  # {help}")));
        lines.extend(field.error.iter().map(|error| format!("  ! {error}")));
        lines
    }

    fn render_choice(&mut self, field: &ChoiceField) -> Vec<String> {
        let options: Vec<&str> = field.options.iter().map(|o| o.label.as_str()).collect();
        let label = field.label.as_deref().unwrap_or("branch");
        let mut lines = vec![format!(
            "{label} [{}] choice({}) = {}",
            field.path,
            options.join("|"),
            field.value.as_deref().unwrap_or("-")
        )];
        lines.extend(field.help.iter().map(|help| format!("  # {help}")));
        lines
    }

    fn render_group(&mut self, group: &UnionGroup, children: Vec<Vec<String>>) -> Vec<String> {
        let mut lines = vec![format!("{} [{}] group", group.legend, group.path)];
        lines.extend(group.help.iter().map(|help| format!("  # {help}")));
        lines.extend(group.error.iter().map(|error| format!("  ! {error}")));
        lines.extend(children.into_iter().flatten().map(|line| format!("  {line}")));
        lines
    }

    fn render_banner(&mut self, message: &str) -> Vec<String> {
        vec![format!("!! {message}")]
    }
}

/// Print the outline of the form described by `args`.
pub fn run_fields(args: &FieldsArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let mut session = args.form.open()?;
    if args.with_errors {
        session.validate();
    }
    for line in session.render(&mut OutlineRenderer).into_iter().flatten() {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
