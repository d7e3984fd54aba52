//! # Error Types
//!
//! `ConfigError` is the only error surfaced by schema construction, field
//! validation, fallback resolution, and value access. It uses `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every message names the field (or fallback source) at fault.
//! - Failures are final for one construction attempt: there is no partial
//!   instance and no retry inside the engine.

use thiserror::Error;

/// Error raised for every schema, field, and fallback failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required field has no direct value, no fallback value, and no default.
    #[error("Missing required config field '{field}'")]
    MissingRequired {
        /// Name of the missing field.
        field: String,
    },

    /// A field-level failure: conversion, static-mode access, or type mismatch.
    ///
    /// Renders as `Field '<field>' <reason>`.
    #[error("Field '{field}' {reason}")]
    Field {
        /// Name of the field at fault.
        field: String,
        /// Message suffix, e.g. `could not be converted to int.`
        reason: String,
    },

    /// A fallback refers to a name that is not a field of the schema.
    #[error("Undefined fallback field: '{0}'")]
    UndefinedFallbackField(String),

    /// A fallback could not pick a single value from its source fields.
    #[error("{0}")]
    FallbackResolution(String),

    /// A value was requested for a name the schema does not declare.
    #[error("Undefined config field: '{0}'")]
    UndefinedField(String),

    /// The schema declaration itself is malformed.
    #[error("invalid schema: {0}")]
    Schema(String),

    /// Raised by a schema's post-validation hook.
    #[error("{0}")]
    Custom(String),
}

impl ConfigError {
    /// Build a field-level error with the given message suffix.
    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The human-readable message, as shown to users.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Name of the field this error is about, when it concerns one field.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::MissingRequired { field } | Self::Field { field, .. } => Some(field),
            Self::UndefinedFallbackField(name) | Self::UndefinedField(name) => Some(name),
            Self::FallbackResolution(_) | Self::Schema(_) | Self::Custom(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_message_names_field() {
        let err = ConfigError::MissingRequired {
            field: "foo".to_string(),
        };
        assert_eq!(err.message(), "Missing required config field 'foo'");
        assert_eq!(err.field_name(), Some("foo"));
    }

    #[test]
    fn field_error_message() {
        let err = ConfigError::field("bar", "could not be converted to int.");
        assert_eq!(err.to_string(), "Field 'bar' could not be converted to int.");
    }

    #[test]
    fn undefined_fallback_message() {
        let err = ConfigError::UndefinedFallbackField("field3".to_string());
        assert_eq!(err.to_string(), "Undefined fallback field: 'field3'");
    }

    #[test]
    fn custom_message_is_verbatim() {
        let err = ConfigError::Custom("'foo' must be non-negative".to_string());
        assert_eq!(err.to_string(), "'foo' must be non-negative");
        assert_eq!(err.field_name(), None);
    }
}
