//! Device Gate - validate client identity metadata for gRPC calls

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use device_gate::{
    check::{self, EXIT_ERROR},
    cli::{Cli, Command, OutputFormat},
    setup_tracing,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup tracing
    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::from(EXIT_ERROR);
    }

    match cli.command {
        Command::Check {
            headers,
            file,
            access_token,
            format,
        } => run_check(
            cli.config.as_deref(),
            headers,
            file.as_deref(),
            access_token,
            format,
        ),
        Command::Rules => run_rules(),
    }
}

/// Validate headers from the command line and/or a file
fn run_check(
    config_path: Option<&Path>,
    headers: Vec<(String, String)>,
    file: Option<&Path>,
    access_token: Option<String>,
    format: OutputFormat,
) -> ExitCode {
    let outcome = match check::evaluate(config_path, headers, file, access_token) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Check failed: {e}");
            eprintln!("❌ {e}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match format {
        OutputFormat::Json => match outcome.to_json() {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("❌ {e}");
                return ExitCode::from(EXIT_ERROR);
            }
        },
        OutputFormat::Text => println!("{}", outcome.to_text()),
    }

    ExitCode::from(outcome.exit_status())
}

/// Print the rule table
fn run_rules() -> ExitCode {
    println!("{}", check::rules_table());
    ExitCode::SUCCESS
}
