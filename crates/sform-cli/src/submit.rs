//! # Submit Subcommand
//!
//! Runs the full submit pipeline: validate, then hand the payload to a file
//! or HTTP sink. Validation errors are printed as JSON; a sink failure is
//! printed as the form banner.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use sform_state::{FileSink, HttpSink, SubmitError, SubmitSink};

use crate::input::FormArgs;

/// Arguments for the submit subcommand.
#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub form: FormArgs,

    /// Write the payload to this file.
    #[arg(long, conflicts_with = "endpoint", required_unless_present = "endpoint")]
    pub out: Option<PathBuf>,

    /// POST the payload to this URL.
    #[arg(long)]
    pub endpoint: Option<String>,
}

impl SubmitArgs {
    fn sink(&self) -> anyhow::Result<Box<dyn SubmitSink>> {
        match (&self.out, &self.endpoint) {
            (Some(path), _) => Ok(Box::new(FileSink::new(path))),
            (None, Some(endpoint)) => Ok(Box::new(HttpSink::new(endpoint))),
            (None, None) => anyhow::bail!("one of --out or --endpoint is required"),
        }
    }
}

/// Submit the form. Returns whether the sink accepted the payload.
pub async fn run_submit(args: &SubmitArgs, out: &mut impl Write) -> anyhow::Result<bool> {
    let sink = args.sink()?;
    let mut session = args.form.open()?;
    match session.submit(sink.as_ref()).await {
        Ok(()) => {
            writeln!(out, "submitted")?;
            Ok(true)
        }
        Err(SubmitError::Invalid { .. }) => {
            writeln!(out, "{}", serde_json::to_string_pretty(session.errors())?)?;
            Ok(false)
        }
        Err(SubmitError::Sink(_)) => {
            writeln!(out, "{}", session.banner().unwrap_or("submission failed"))?;
            Ok(false)
        }
        Err(err @ (SubmitError::Busy | SubmitError::UnknownTicket { .. })) => Err(err.into()),
    }
}
