//! # Value Model
//!
//! Raw configuration data is a plain key→value mapping using the
//! `serde_json` value model. Typed fields convert raw values into
//! [`FieldValue`]s.
//!
//! ## Copy Semantics
//!
//! Every `FieldValue` owns its contents. List and mapping values are cloned
//! out of the raw data on each access, so mutating a returned value never
//! affects the stored raw data or later reads.

use std::fmt;

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::parsed_url::ParsedUrl;

/// The caller-supplied key→value mapping a schema instance validates against.
pub type RawData = Map<String, Value>;

/// A converted field value.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Unconverted value from an untyped field.
    Raw(Value),
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    Dict(Map<String, Value>),
    Url(ParsedUrl),
    Regex(Regex),
}

impl FieldValue {
    /// Short name of the value's kind, as used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Raw(_) => "raw",
            Self::Text(_) => "str",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Url(_) => "URL",
            Self::Regex(_) => "regex",
        }
    }

    /// Convert back into the raw value model.
    ///
    /// URLs and patterns become their source text. Non-finite floats have no
    /// JSON representation and become `null`.
    pub fn to_raw(&self) -> Value {
        match self {
            Self::Raw(v) => v.clone(),
            Self::Text(s) => Value::String(s.clone()),
            Self::Int(n) => Value::from(*n),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Bool(b) => Value::Bool(*b),
            Self::List(items) => Value::Array(items.clone()),
            Self::Dict(map) => Value::Object(map.clone()),
            Self::Url(url) => Value::String(url.as_str().to_string()),
            Self::Regex(re) => Value::String(re.as_str().to_string()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Dict(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&ParsedUrl> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }

    pub fn as_regex(&self) -> Option<&Regex> {
        match self {
            Self::Regex(re) => Some(re),
            _ => None,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Raw(a), Self::Raw(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            (Self::Url(a), Self::Url(b)) => a == b,
            // Compiled patterns compare by source.
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Url(url) => write!(f, "{url}"),
            Self::Regex(re) => f.write_str(re.as_str()),
            other => write!(f, "{}", other.to_raw()),
        }
    }
}

/// Serializes as the raw value [`FieldValue::to_raw`] returns.
impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_raw().serialize(serializer)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
