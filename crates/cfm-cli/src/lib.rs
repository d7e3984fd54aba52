//! # cfm-cli: Schema Manifest Command-Line Interface
//!
//! Loads schemas declared in a YAML or JSON manifest and works with them
//! from the shell.
//!
//! ## Subcommands
//!
//! - `describe`: print a schema's generated description
//! - `fields`: list a schema's fields with their type and flags
//! - `check`: validate a configuration document against a schema and
//!   print the resolved values as JSON
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers live in their modules.
//! - Handlers return the process exit code: 0 on success, 1 when a document
//!   fails validation. Operational errors propagate as `anyhow::Error` and
//!   exit with 2.
//! - All schema semantics come from `cfm-schema`; nothing here re-implements
//!   validation.

pub mod check;
pub mod describe;
pub mod load;

use std::path::PathBuf;

use clap::Args;

/// Manifest location shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ManifestArg {
    /// Schema manifest (`.yaml`/`.yml` or `.json`).
    #[arg(short, long, value_name = "PATH")]
    pub manifest: PathBuf,
}
