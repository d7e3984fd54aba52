//! # Field Fallbacks
//!
//! A fallback lets a field compute its value from other fields of the same
//! schema when its own raw key is absent. This is how schemas rename or merge
//! configuration keys without breaking existing data: the new field falls
//! back to the legacy one.
//!
//! Fallbacks refer to their source fields by name. Names are looked up in
//! the schema's field registry at resolution time, so a fallback can be
//! declared before the fields it reads.
//!
//! ## Kinds
//!
//! - [`FieldFallback`]: applies a resolution function to the present
//!   source values. The default function requires exactly one source.
//! - [`SingleFieldFallback`]: takes the value of one named field.
//! - [`FormatStringFieldFallback`]: renders a format string over required
//!   and optional source fields.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use cfm_core::ConfigError;
use serde_json::Value;

use crate::config::Config;
use crate::field::Field;
use crate::format::FormatString;

/// Resolution function mapping present source values to one value.
pub type BuildValue =
    Arc<dyn Fn(&BTreeMap<String, Value>) -> Result<Value, ConfigError> + Send + Sync>;

/// A secondary resolution path for a field.
pub trait Fallback: Send + Sync + fmt::Debug {
    /// Names of every field this fallback reads.
    fn field_names(&self) -> Vec<&str>;

    /// Whether this fallback can supply a value for the instance.
    fn present(&self, config: &Config) -> Result<bool, ConfigError>;

    /// Compute the unconverted value from the source fields.
    fn build_value(&self, config: &Config) -> Result<Value, ConfigError>;

    /// Check every source name is a field of the schema. Does not require
    /// any source to be present.
    fn validate(&self, config: &Config) -> Result<(), ConfigError> {
        for name in self.field_names() {
            get_field_descriptor(config, name)?;
        }
        Ok(())
    }
}

/// Look up a fallback source field on the instance's schema.
pub fn get_field_descriptor<'a>(config: &'a Config, name: &str) -> Result<&'a Field, ConfigError> {
    config
        .schema()
        .field(name)
        .map(Arc::as_ref)
        .ok_or_else(|| ConfigError::UndefinedFallbackField(name.to_string()))
}

/// Converted value of a source field, as a raw value (`null` when absent).
fn source_value(field: &Field, config: &Config) -> Result<Value, ConfigError> {
    Ok(field
        .resolve(config)?
        .map(|value| value.to_raw())
        .unwrap_or(Value::Null))
}

/// Default resolution: exactly one source value, returned as is.
pub fn passthrough(values: &BTreeMap<String, Value>) -> Result<Value, ConfigError> {
    let mut iter = values.values();
    match (iter.next(), iter.next()) {
        (Some(value), None) => Ok(value.clone()),
        _ => Err(ConfigError::FallbackResolution(format!(
            "Expected exactly one fallback field, got {:?}",
            values.keys().collect::<Vec<_>>()
        ))),
    }
}

/// Fallback over a set of sibling fields with a resolution function.
///
/// The fallback applies when at least one source is present and every
/// other source is marked `required_fallback(false)`. The resolution
/// function receives the values of the sources that are present.
#[derive(Clone)]
pub struct FieldFallback {
    field_names: Vec<String>,
    build: BuildValue,
}

impl FieldFallback {
    /// Fallback using the default passthrough resolution.
    pub fn new<I, S>(field_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_builder(field_names, passthrough)
    }

    /// Fallback using a custom resolution function.
    pub fn with_builder<I, S, F>(field_names: I, build: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&BTreeMap<String, Value>) -> Result<Value, ConfigError> + Send + Sync + 'static,
    {
        Self {
            field_names: field_names.into_iter().map(Into::into).collect(),
            build: Arc::new(build),
        }
    }

    /// Resolve the source names to their field descriptors.
    pub fn get_fields<'a>(&self, config: &'a Config) -> Result<BTreeMap<&'a str, &'a Field>, ConfigError> {
        self.field_names
            .iter()
            .map(|name| get_field_descriptor(config, name).map(|field| (field.name(), field)))
            .collect()
    }
}

impl Fallback for FieldFallback {
    fn field_names(&self) -> Vec<&str> {
        self.field_names.iter().map(String::as_str).collect()
    }

    fn present(&self, config: &Config) -> Result<bool, ConfigError> {
        let fields = self.get_fields(config)?;
        Ok(fields.values().all(|field| field.present_as_fallback(config))
            && fields.values().any(|field| field.present(config)))
    }

    fn build_value(&self, config: &Config) -> Result<Value, ConfigError> {
        let mut values = BTreeMap::new();
        for (name, field) in self.get_fields(config)? {
            if !field.present(config) {
                continue;
            }
            if let Some(value) = field.resolve(config)? {
                values.insert(name.to_string(), value.to_raw());
            }
        }
        (self.build)(&values)
    }

    fn validate(&self, config: &Config) -> Result<(), ConfigError> {
        self.get_fields(config).map(|_| ())
    }
}

impl fmt::Debug for FieldFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldFallback")
            .field("field_names", &self.field_names)
            .finish_non_exhaustive()
    }
}

/// Fallback to the value of one other field.
#[derive(Debug, Clone)]
pub struct SingleFieldFallback {
    field_name: String,
}

impl SingleFieldFallback {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
        }
    }
}

impl Fallback for SingleFieldFallback {
    fn field_names(&self) -> Vec<&str> {
        vec![self.field_name.as_str()]
    }

    fn present(&self, config: &Config) -> Result<bool, ConfigError> {
        Ok(get_field_descriptor(config, &self.field_name)?.present(config))
    }

    fn build_value(&self, config: &Config) -> Result<Value, ConfigError> {
        source_value(get_field_descriptor(config, &self.field_name)?, config)
    }
}

/// Fallback that renders a format string such as `"{host}:{port}"`.
///
/// Applies when every required field is present. Optional fields are
/// rendered when they have a value and as empty text otherwise.
#[derive(Debug, Clone)]
pub struct FormatStringFieldFallback {
    format: FormatString,
    required_fields: Vec<String>,
    optional_fields: Vec<String>,
}

impl FormatStringFieldFallback {
    /// Parse `format` and check its placeholders only name listed fields.
    pub fn new<R, O>(format: &str, required_fields: R, optional_fields: O) -> Result<Self, ConfigError>
    where
        R: IntoIterator,
        R::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        let format = FormatString::parse(format)?;
        let required_fields: Vec<String> = required_fields.into_iter().map(Into::into).collect();
        let optional_fields: Vec<String> = optional_fields.into_iter().map(Into::into).collect();
        for name in format.placeholder_names() {
            if !required_fields.iter().chain(&optional_fields).any(|f| f == name) {
                return Err(ConfigError::Schema(format!(
                    "format string placeholder '{name}' is not a listed fallback field"
                )));
            }
        }
        Ok(Self {
            format,
            required_fields,
            optional_fields,
        })
    }
}

impl Fallback for FormatStringFieldFallback {
    fn field_names(&self) -> Vec<&str> {
        self.required_fields
            .iter()
            .chain(&self.optional_fields)
            .map(String::as_str)
            .collect()
    }

    fn present(&self, config: &Config) -> Result<bool, ConfigError> {
        for name in &self.required_fields {
            if !get_field_descriptor(config, name)?.present(config) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn build_value(&self, config: &Config) -> Result<Value, ConfigError> {
        let mut values = BTreeMap::new();
        for name in self.field_names() {
            let field = get_field_descriptor(config, name)?;
            values.insert(name.to_string(), source_value(field, config)?);
        }
        self.format.render(&values).map(Value::String)
    }
}
