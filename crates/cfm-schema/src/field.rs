//! # Field Descriptors
//!
//! A [`Field`] is a named, typed configuration declaration. One field object
//! is shared by its schema and every instance of that schema; it holds no
//! per-instance state and is immutable once the schema is built.
//!
//! ## Resolution Order
//!
//! A field's effective value on a [`Config`] is found by trying, in order:
//!
//! 1. the raw key in the instance's data (an explicit `null` yields no value),
//! 2. each fallback in declaration order whose sources are available,
//! 3. the declared default.
//!
//! The value found is converted by the field's [`FieldType`]. Nothing is
//! cached: every access recomputes from the stored raw data.

use std::fmt;
use std::sync::Arc;

use cfm_core::{ConfigError, FieldValue};
use serde_json::Value;

use crate::config::Config;
use crate::fallback::Fallback;
use crate::kinds::{Clean, FieldType};

/// A typed configuration field.
///
/// Built with one of the typed constructors and refined with the builder
/// methods; the name is bound by the schema builder through [`Field::setup`].
#[derive(Clone)]
pub struct Field {
    name: String,
    doc: String,
    kind: FieldType,
    required: bool,
    default: Option<Value>,
    is_static: bool,
    required_fallback: bool,
    fallbacks: Vec<Arc<dyn Fallback>>,
}

impl Field {
    /// Create an unbound field with the given conversion rule and description.
    pub fn new(kind: FieldType, doc: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            doc: doc.into(),
            kind,
            required: false,
            default: None,
            is_static: false,
            required_fallback: true,
            fallbacks: Vec::new(),
        }
    }

    /// A field that returns raw values unconverted.
    pub fn any(doc: impl Into<String>) -> Self {
        Self::new(FieldType::Any, doc)
    }

    pub fn text(doc: impl Into<String>) -> Self {
        Self::new(FieldType::Text, doc)
    }

    pub fn int(doc: impl Into<String>) -> Self {
        Self::new(FieldType::Int, doc)
    }

    pub fn float(doc: impl Into<String>) -> Self {
        Self::new(FieldType::Float, doc)
    }

    pub fn bool(doc: impl Into<String>) -> Self {
        Self::new(FieldType::Bool, doc)
    }

    pub fn list(doc: impl Into<String>) -> Self {
        Self::new(FieldType::List, doc)
    }

    pub fn dict(doc: impl Into<String>) -> Self {
        Self::new(FieldType::Dict, doc)
    }

    pub fn url(doc: impl Into<String>) -> Self {
        Self::new(FieldType::Url, doc)
    }

    pub fn regex(doc: impl Into<String>) -> Self {
        Self::new(FieldType::Regex, doc)
    }

    /// A field with an author-supplied conversion rule.
    pub fn custom(
        type_name: Option<&str>,
        cleaner: impl Clean + 'static,
        doc: impl Into<String>,
    ) -> Self {
        Self::new(
            FieldType::Custom {
                type_name: type_name.map(str::to_string),
                cleaner: Arc::new(cleaner),
            },
            doc,
        )
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value used when neither the raw key nor any fallback supplies one.
    /// Defaults pass through the field's conversion rule like raw values.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Mark the field as usable on statically constructed instances.
    pub fn static_field(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Whether another field's fallback needs this field to be present.
    ///
    /// Defaults to `true`. A fallback is applicable when at least one source
    /// is present and the absent ones are all marked
    /// `required_fallback(false)`.
    pub fn required_fallback(mut self, required: bool) -> Self {
        self.required_fallback = required;
        self
    }

    /// Append a fallback, tried after earlier ones.
    pub fn fallback(mut self, fallback: impl Fallback + 'static) -> Self {
        self.fallbacks.push(Arc::new(fallback));
        self
    }

    /// Bind the field to its name on the owning schema.
    pub fn setup(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn kind(&self) -> &FieldType {
        &self.kind
    }

    /// Type annotation for generated descriptions, if the field type has one.
    pub fn type_name(&self) -> Option<&str> {
        self.kind.type_name()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_required_fallback(&self) -> bool {
        self.required_fallback
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn fallbacks(&self) -> &[Arc<dyn Fallback>] {
        &self.fallbacks
    }

    /// Parameter marker used in generated descriptions,
    /// e.g. `:param str host:` or `:param host:`.
    pub fn doc_header(&self) -> String {
        match self.type_name() {
            Some(type_name) => format!(":param {type_name} {}:", self.name),
            None => format!(":param {}:", self.name),
        }
    }

    /// Whether the raw key itself is in the instance's data.
    pub fn present_directly(&self, config: &Config) -> bool {
        config.raw_data().contains_key(&self.name)
    }

    /// Whether an effective value is resolvable: directly, through an
    /// applicable fallback, or from the default. Never fails; a fallback
    /// that cannot be resolved counts as unavailable.
    pub fn present(&self, config: &Config) -> bool {
        self.present_directly(config)
            || self.applicable_fallback(config).is_some()
            || self.default.is_some()
    }

    /// Whether this field can act as a source for another field's fallback.
    pub fn present_as_fallback(&self, config: &Config) -> bool {
        self.present(config) || !self.required_fallback
    }

    /// Check the field's fallbacks are well-defined, that a required field
    /// has a value, and that a present value converts.
    pub fn validate(&self, config: &Config) -> Result<(), ConfigError> {
        for fallback in &self.fallbacks {
            fallback.validate(config)?;
        }
        if self.required && !self.present(config) {
            return Err(ConfigError::MissingRequired {
                field: self.name.clone(),
            });
        }
        if !self.present_directly(config) {
            if let Some(fallback) = self.applicable_fallback(config) {
                tracing::warn!(
                    field = %self.name,
                    sources = ?fallback.field_names(),
                    "config field resolved through fallback"
                );
            }
        }
        self.resolve(config).map(|_| ())
    }

    /// Build a field-level error with the given message suffix.
    pub fn raise_config_error<T>(&self, message_suffix: impl Into<String>) -> Result<T, ConfigError> {
        Err(ConfigError::field(&self.name, message_suffix))
    }

    /// Find the unconverted value from the raw data, fallbacks, or default.
    pub fn find_value(&self, config: &Config) -> Result<Option<Value>, ConfigError> {
        if let Some(raw) = config.raw_data().get(&self.name) {
            return Ok(Some(raw.clone()));
        }
        for fallback in &self.fallbacks {
            if fallback.present(config)? {
                tracing::debug!(field = %self.name, "using fallback value");
                return fallback.build_value(config).map(Some);
            }
        }
        Ok(self.default.clone())
    }

    /// The converted effective value, or `None` when there is none.
    ///
    /// Fails on statically constructed instances unless the field is static.
    pub fn get_value(&self, config: &Config) -> Result<Option<FieldValue>, ConfigError> {
        if config.is_static() && !self.is_static {
            return self.raise_config_error("is not marked as static.");
        }
        self.resolve(config)
    }

    /// The converted effective value, without the static-mode gate.
    pub(crate) fn resolve(&self, config: &Config) -> Result<Option<FieldValue>, ConfigError> {
        match self.find_value(config)? {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => self.kind.clean(&self.name, &raw).map(Some),
        }
    }

    fn applicable_fallback(&self, config: &Config) -> Option<&Arc<dyn Fallback>> {
        self.fallbacks
            .iter()
            .find(|fallback| fallback.present(config).unwrap_or(false))
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("static", &self.is_static)
            .field("required_fallback", &self.required_fallback)
            .field("fallbacks", &self.fallbacks)
            .finish()
    }
}
