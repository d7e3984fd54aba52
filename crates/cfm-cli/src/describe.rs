//! # Describe and Fields Subcommands
//!
//! `cfm describe` prints a schema's generated description. `cfm fields`
//! prints one row per field: name, type, and flags.

use anyhow::Result;
use clap::Args;

use cfm_schema::{Field, SchemaDef};

use crate::load::{load_registry, lookup};
use crate::ManifestArg;

/// Arguments for `cfm describe`.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub manifest: ManifestArg,

    /// Schema to describe.
    #[arg(value_name = "SCHEMA")]
    pub schema: String,
}

/// Arguments for `cfm fields`.
#[derive(Args, Debug)]
pub struct FieldsArgs {
    #[command(flatten)]
    pub manifest: ManifestArg,

    /// Schema whose fields to list.
    #[arg(value_name = "SCHEMA")]
    pub schema: String,
}

/// Execute `cfm describe`.
pub fn run_describe(args: &DescribeArgs) -> Result<u8> {
    let registry = load_registry(&args.manifest.manifest)?;
    let schema = lookup(&registry, &args.schema)?;
    println!("{}", schema.description());
    Ok(0)
}

/// Execute `cfm fields`.
pub fn run_fields(args: &FieldsArgs) -> Result<u8> {
    let registry = load_registry(&args.manifest.manifest)?;
    let schema = lookup(&registry, &args.schema)?;
    for row in field_rows(schema) {
        println!("{row}");
    }
    Ok(0)
}

/// One aligned row per field, inherited fields first.
pub fn field_rows(schema: &SchemaDef) -> Vec<String> {
    let fields = schema.fields();
    let name_width = fields.iter().map(|f| f.name().len()).max().unwrap_or(0);
    let type_width = fields
        .iter()
        .map(|f| f.type_name().unwrap_or("-").len())
        .max()
        .unwrap_or(0);

    fields
        .iter()
        .map(|field| {
            let row = format!(
                "{:<name_width$}  {:<type_width$}  {}",
                field.name(),
                field.type_name().unwrap_or("-"),
                field_flags(field).join(" ")
            );
            row.trim_end().to_string()
        })
        .collect()
}

/// Flags shown for a field, in a fixed order.
pub fn field_flags(field: &Field) -> Vec<String> {
    let mut flags = Vec::new();
    if field.is_required() {
        flags.push("required".to_string());
    }
    if field.is_static() {
        flags.push("static".to_string());
    }
    if let Some(default) = field.default_value() {
        flags.push(format!("default={default}"));
    }
    for fallback in field.fallbacks() {
        flags.push(format!("fallback={}", fallback.field_names().join("+")));
    }
    if !field.is_required_fallback() {
        flags.push("optional-fallback-source".to_string());
    }
    flags
}
