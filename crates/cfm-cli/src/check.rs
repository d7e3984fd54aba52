//! # Check Subcommand
//!
//! Validates a configuration document against a schema. On success the
//! resolved value of every accessible field is printed as JSON; absent
//! values print as `null`. On failure the validation error is printed and
//! the exit code is 1.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde_json::{Map, Value};

use cfm_core::{ConfigError, RawData};
use cfm_schema::{Config, SchemaDef};

use crate::load::{load_document, load_registry, lookup};
use crate::ManifestArg;

/// Arguments for `cfm check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub manifest: ManifestArg,

    /// Schema to validate against.
    #[arg(value_name = "SCHEMA")]
    pub schema: String,

    /// Configuration document (`.yaml`/`.yml` or `.json`).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Validate in static mode: only static fields are checked and shown.
    #[arg(long = "static")]
    pub static_mode: bool,
}

/// Execute `cfm check`.
///
/// Returns exit code: 0 when the document is valid, 1 when it is not.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let registry = load_registry(&args.manifest.manifest)?;
    let schema = lookup(&registry, &args.schema)?;
    let raw = load_document(&args.path)?;

    match check_document(schema, raw, args.static_mode) {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {}: {e}", args.path.display());
            Ok(1)
        }
    }
}

/// Validate `raw` and render the resolved values as a JSON object.
pub fn check_document(
    schema: &Arc<SchemaDef>,
    raw: RawData,
    static_mode: bool,
) -> Result<Value, ConfigError> {
    let config = Config::with_mode(schema, raw, static_mode)?;
    tracing::info!(schema = %schema.name(), static_mode, "document valid");
    let mut report = Map::new();
    for (name, value) in config.resolved()? {
        report.insert(
            name.to_string(),
            value.map(|v| v.to_raw()).unwrap_or(Value::Null),
        );
    }
    Ok(Value::Object(report))
}
