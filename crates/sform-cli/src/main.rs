//! # sform CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::Parser;

/// sform: schema-driven form engine.
///
/// Derives editable fields from a JSON Schema, validates values against it,
/// and submits the resulting payload.
#[derive(Parser, Debug)]
#[command(name = "sform", version, about)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the field tree a schema derives.
    Fields(sform_cli::fields::FieldsArgs),
    /// Validate values and print the error map.
    Validate(sform_cli::validate::ValidateArgs),
    /// Validate and submit to a file or endpoint.
    Submit(sform_cli::submit::SubmitArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let mut stdout = std::io::stdout().lock();
    let ok = match &cli.command {
        Commands::Fields(args) => {
            sform_cli::fields::run_fields(args, &mut stdout)?;
            true
        }
        Commands::Validate(args) => sform_cli::validate::run_validate(args, &mut stdout)?,
        Commands::Submit(args) => sform_cli::submit::run_submit(args, &mut stdout).await?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
