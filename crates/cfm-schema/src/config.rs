//! # Schema Instances
//!
//! A [`Config`] is one validated use of a schema: the raw data it was built
//! from, the schema it was validated against, and the static-mode flag.
//!
//! Construction validates every field in declaration order and fails on the
//! first violation, then runs the schema's post-validation hook. There is no
//! partially constructed instance. After construction a `Config` is never
//! mutated; field values are computed afresh from the stored raw data on
//! each access.
//!
//! ## Static Mode
//!
//! An instance built with [`Config::new_static`] validates and exposes only
//! the fields marked static. Required non-static fields are not enforced,
//! and reading a non-static field fails.

use std::sync::Arc;

use cfm_core::{ConfigError, FieldValue, ParsedUrl, RawData};
use regex::Regex;
use serde_json::{Map, Value};

use crate::schema::SchemaDef;

/// A validated configuration.
///
/// The instance owns its raw data. The caller's mapping is moved in, so the
/// engine never observes later changes to it and never changes it.
#[derive(Debug, Clone)]
pub struct Config {
    schema: Arc<SchemaDef>,
    raw: RawData,
    is_static: bool,
}

impl Config {
    /// Validate `raw` against `schema` with every field available.
    pub fn new(schema: &Arc<SchemaDef>, raw: RawData) -> Result<Self, ConfigError> {
        Self::with_mode(schema, raw, false)
    }

    /// Validate `raw` against `schema` in static mode.
    pub fn new_static(schema: &Arc<SchemaDef>, raw: RawData) -> Result<Self, ConfigError> {
        Self::with_mode(schema, raw, true)
    }

    pub fn with_mode(schema: &Arc<SchemaDef>, raw: RawData, is_static: bool) -> Result<Self, ConfigError> {
        let config = Self::unvalidated(schema, raw, is_static);
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn unvalidated(schema: &Arc<SchemaDef>, raw: RawData, is_static: bool) -> Self {
        Self {
            schema: Arc::clone(schema),
            raw,
            is_static,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for field in self.schema.fields() {
            if self.is_static && !field.is_static() {
                continue;
            }
            field.validate(self)?;
            tracing::trace!(schema = %self.schema.name(), field = %field.name(), "field valid");
        }
        if let Some(hook) = self.schema.post_validate_hook() {
            tracing::debug!(schema = %self.schema.name(), "running post-validation");
            hook(self)?;
        }
        tracing::debug!(
            schema = %self.schema.name(),
            is_static = self.is_static,
            "config validated"
        );
        Ok(())
    }

    pub fn schema(&self) -> &Arc<SchemaDef> {
        &self.schema
    }

    /// The raw data this instance was constructed with.
    pub fn raw_data(&self) -> &RawData {
        &self.raw
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Fail construction (or any check) with a custom message.
    ///
    /// Intended for post-validation hooks enforcing cross-field rules.
    pub fn raise_config_error<T>(&self, message: impl Into<String>) -> Result<T, ConfigError> {
        Err(ConfigError::Custom(message.into()))
    }

    /// The converted value of the named field, or `None` when it has none.
    pub fn get(&self, name: &str) -> Result<Option<FieldValue>, ConfigError> {
        self.schema
            .field(name)
            .ok_or_else(|| ConfigError::UndefinedField(name.to_string()))?
            .get_value(self)
    }

    /// Values of every field readable on this instance, in field order.
    pub fn resolved(&self) -> Result<Vec<(&str, Option<FieldValue>)>, ConfigError> {
        self.schema
            .fields()
            .iter()
            .filter(|field| !self.is_static || field.is_static())
            .map(|field| field.get_value(self).map(|value| (field.name(), value)))
            .collect()
    }

    pub fn text(&self, name: &str) -> Result<Option<String>, ConfigError> {
        self.typed(name, "str", |value| match value {
            FieldValue::Text(s) => Ok(s),
            other => Err(other),
        })
    }

    pub fn int(&self, name: &str) -> Result<Option<i64>, ConfigError> {
        self.typed(name, "int", |value| match value {
            FieldValue::Int(n) => Ok(n),
            other => Err(other),
        })
    }

    pub fn float(&self, name: &str) -> Result<Option<f64>, ConfigError> {
        self.typed(name, "float", |value| match value {
            FieldValue::Float(f) => Ok(f),
            other => Err(other),
        })
    }

    pub fn bool(&self, name: &str) -> Result<Option<bool>, ConfigError> {
        self.typed(name, "bool", |value| match value {
            FieldValue::Bool(b) => Ok(b),
            other => Err(other),
        })
    }

    pub fn list(&self, name: &str) -> Result<Option<Vec<Value>>, ConfigError> {
        self.typed(name, "list", |value| match value {
            FieldValue::List(items) => Ok(items),
            other => Err(other),
        })
    }

    pub fn dict(&self, name: &str) -> Result<Option<Map<String, Value>>, ConfigError> {
        self.typed(name, "dict", |value| match value {
            FieldValue::Dict(map) => Ok(map),
            other => Err(other),
        })
    }

    pub fn url(&self, name: &str) -> Result<Option<ParsedUrl>, ConfigError> {
        self.typed(name, "URL", |value| match value {
            FieldValue::Url(url) => Ok(url),
            other => Err(other),
        })
    }

    pub fn regex(&self, name: &str) -> Result<Option<Regex>, ConfigError> {
        self.typed(name, "regex", |value| match value {
            FieldValue::Regex(re) => Ok(re),
            other => Err(other),
        })
    }

    fn typed<T>(
        &self,
        name: &str,
        expected: &str,
        extract: impl FnOnce(FieldValue) -> Result<T, FieldValue>,
    ) -> Result<Option<T>, ConfigError> {
        match self.get(name)? {
            None => Ok(None),
            Some(value) => extract(value).map(Some).map_err(|other| {
                ConfigError::field(name, format!("holds a {} value, not {expected}.", other.kind()))
            }),
        }
    }
}
