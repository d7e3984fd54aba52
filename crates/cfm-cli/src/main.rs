//! # cfm CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cfm_cli::check::{run_check, CheckArgs};
use cfm_cli::describe::{run_describe, run_fields, DescribeArgs, FieldsArgs};

/// cfm: declarative configuration schemas.
///
/// Describes schemas declared in a YAML or JSON manifest and checks
/// configuration documents against them.
#[derive(Parser, Debug)]
#[command(name = "cfm", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the generated description of a schema.
    Describe(DescribeArgs),

    /// List the fields of a schema with their type and flags.
    Fields(FieldsArgs),

    /// Validate a configuration document and print its resolved values.
    Check(CheckArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "cfm starting");

    let result = match cli.command {
        Commands::Describe(args) => run_describe(&args),
        Commands::Fields(args) => run_fields(&args),
        Commands::Check(args) => run_check(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
