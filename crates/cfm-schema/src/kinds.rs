//! # Field Types: Conversion Rules
//!
//! Each [`FieldType`] turns a present, non-null raw value into a
//! [`FieldValue`] or rejects it with a [`ConfigError`] naming the field.
//! Absent and `null` values never reach these rules.
//!
//! | Type | Accepts | Rejects |
//! |---|---|---|
//! | `Text` | strings | everything else |
//! | `Int` | integers and strings holding an integer, within the signed 64-bit range | floats, booleans, out-of-range values, other text |
//! | `Float` | numbers, strings holding a number | booleans, other text |
//! | `Bool` | booleans, `"true"`/`"false"`/`"0"`/`""`, any truthiness source | nothing |
//! | `List` | arrays | everything else |
//! | `Dict` | objects | everything else |
//! | `Url` | strings | everything else |
//! | `Regex` | strings holding a valid pattern | invalid patterns, non-strings |

use std::fmt;
use std::sync::Arc;

use cfm_core::{ConfigError, FieldValue, ParsedUrl};
use regex::Regex;
use serde_json::Value;

/// A user-supplied conversion rule for [`FieldType::Custom`].
///
/// Closures of the shape `Fn(&str, &Value) -> Result<FieldValue, ConfigError>`
/// implement this trait; the first argument is the field name, for errors.
pub trait Clean: Send + Sync {
    fn clean(&self, field: &str, raw: &Value) -> Result<FieldValue, ConfigError>;
}

impl<F> Clean for F
where
    F: Fn(&str, &Value) -> Result<FieldValue, ConfigError> + Send + Sync,
{
    fn clean(&self, field: &str, raw: &Value) -> Result<FieldValue, ConfigError> {
        self(field, raw)
    }
}

/// The conversion rule a field applies to its raw value.
#[derive(Clone)]
pub enum FieldType {
    /// No conversion; the raw value is returned as is.
    Any,
    Text,
    Int,
    Float,
    Bool,
    List,
    Dict,
    Url,
    Regex,
    /// A conversion rule supplied by the schema author.
    Custom {
        /// Type annotation shown in generated descriptions.
        type_name: Option<String>,
        cleaner: Arc<dyn Clean>,
    },
}

impl FieldType {
    /// Look up a built-in type by the name used in manifests.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "any" | "raw" => Self::Any,
            "str" | "text" => Self::Text,
            "int" => Self::Int,
            "float" => Self::Float,
            "bool" => Self::Bool,
            "list" => Self::List,
            "dict" => Self::Dict,
            "url" | "URL" => Self::Url,
            "regex" => Self::Regex,
            _ => return None,
        };
        Some(kind)
    }

    /// Type annotation for generated descriptions. `Any` has none.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Text => Some("str"),
            Self::Int => Some("int"),
            Self::Float => Some("float"),
            Self::Bool => Some("bool"),
            Self::List => Some("list"),
            Self::Dict => Some("dict"),
            Self::Url => Some("URL"),
            Self::Regex => Some("regex"),
            Self::Custom { type_name, .. } => type_name.as_deref(),
        }
    }

    /// Convert a present raw value.
    pub fn clean(&self, field: &str, raw: &Value) -> Result<FieldValue, ConfigError> {
        match self {
            Self::Any => Ok(FieldValue::Raw(raw.clone())),
            Self::Text => clean_text(field, raw).map(FieldValue::Text),
            Self::Int => clean_int(field, raw).map(FieldValue::Int),
            Self::Float => clean_float(field, raw).map(FieldValue::Float),
            Self::Bool => Ok(FieldValue::Bool(clean_bool(raw))),
            Self::List => match raw {
                Value::Array(items) => Ok(FieldValue::List(items.clone())),
                _ => Err(ConfigError::field(field, "is not a list.")),
            },
            Self::Dict => match raw {
                Value::Object(map) => Ok(FieldValue::Dict(map.clone())),
                _ => Err(ConfigError::field(field, "is not a dict.")),
            },
            Self::Url => match raw {
                Value::String(s) => Ok(FieldValue::Url(ParsedUrl::parse(s))),
                _ => Err(ConfigError::field(field, "is not a URL string.")),
            },
            Self::Regex => {
                let pattern = clean_text(field, raw)?;
                compile_pattern(field, &pattern).map(FieldValue::Regex)
            }
            Self::Custom { cleaner, .. } => cleaner.clean(field, raw),
        }
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { type_name, .. } => f
                .debug_struct("Custom")
                .field("type_name", type_name)
                .finish_non_exhaustive(),
            other => f.write_str(other.type_name().unwrap_or("Any")),
        }
    }
}

fn clean_text(field: &str, raw: &Value) -> Result<String, ConfigError> {
    match raw {
        Value::String(s) => Ok(s.clone()),
        _ => Err(ConfigError::field(field, "is not a string.")),
    }
}

/// Integers pass; floats are rejected rather than truncated.
fn clean_int(field: &str, raw: &Value) -> Result<i64, ConfigError> {
    let parsed = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ConfigError::field(field, "could not be converted to int."))
}

fn clean_float(field: &str, raw: &Value) -> Result<f64, ConfigError> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ConfigError::field(field, "could not be converted to float."))
}

/// Text is false when it reads `false`, `0`, or nothing (case-insensitive,
/// surrounding whitespace ignored). Other values use their truthiness.
fn clean_bool(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            !matches!(s.as_str(), "false" | "0" | "")
        }
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn compile_pattern(field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::field(field, format!("is not a valid regex: {e}")))
}
