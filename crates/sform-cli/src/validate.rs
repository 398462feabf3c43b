//! # Validate Subcommand
//!
//! Runs one validation pass and prints the error map as JSON keyed by
//! dotted field path. An empty object means the form would submit.

use std::io::Write;

use clap::Args;

use crate::input::FormArgs;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub form: FormArgs,
}

/// Validate and print the error map. Returns whether the form is clean.
pub fn run_validate(args: &ValidateArgs, out: &mut impl Write) -> anyhow::Result<bool> {
    let mut session = args.form.open()?;
    let errors = session.validate();
    writeln!(out, "{}", serde_json::to_string_pretty(errors)?)?;
    Ok(errors.is_empty())
}
