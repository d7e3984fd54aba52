//! # Schema Manifests
//!
//! Declarative YAML or JSON description of schemas, built into a
//! [`SchemaRegistry`]. A manifest lists schemas in order; a schema may only
//! extend schemas listed before it.
//!
//! ```yaml
//! schemas:
//!   - name: WorkerConfig
//!     doc: Worker settings.
//!     fields:
//!       - name: amqp_url
//!         type: URL
//!         doc: Broker connection URL.
//!         required: true
//!         fallbacks:
//!           - format: "amqp://{broker_host}:{broker_port}/"
//!             fields: [broker_host, broker_port]
//!       - name: broker_host
//!         type: str
//!         doc: Deprecated, use amqp_url.
//!       - name: broker_port
//!         type: int
//!         default: 5672
//!         required_fallback: false
//! ```
//!
//! Fallback entries take one of three shapes: `{field: name}` for a single
//! source, `{fields: [..]}` for the passthrough policy, and
//! `{format: "..", fields: [..], optional: [..]}` for a format string.
//! Post-validation hooks cannot be declared in a manifest; register them in
//! code with [`SchemaBuilder::post_validate`](crate::SchemaBuilder::post_validate).

use std::path::Path;

use cfm_core::ConfigError;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::fallback::{FieldFallback, FormatStringFieldFallback, SingleFieldFallback};
use crate::field::Field;
use crate::kinds::FieldType;
use crate::registry::SchemaRegistry;
use crate::schema::SchemaDef;

/// Error loading or building a schema manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("cannot read manifest '{path}': {source}")]
    Io {
        /// Path to the manifest.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid YAML or does not match the manifest shape.
    #[error("invalid YAML manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The manifest is not valid JSON or does not match the manifest shape.
    #[error("invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// A field names a type that does not exist.
    #[error("schema '{schema}' field '{field}': unknown type '{type_name}'")]
    UnknownType {
        schema: String,
        field: String,
        type_name: String,
    },

    /// A schema extends a schema not declared before it.
    #[error("schema '{schema}' extends '{parent}', which is not declared before it")]
    UnknownParent { schema: String, parent: String },

    /// A schema failed to build.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Top-level manifest document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaManifest {
    #[serde(default)]
    pub schemas: Vec<SchemaSpec>,
}

/// One declared schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaSpec {
    pub name: String,
    #[serde(default)]
    pub doc: String,
    /// Names of parent schemas, declared earlier in the manifest.
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// One declared field.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    /// Type name (`str`, `int`, `float`, `bool`, `list`, `dict`, `URL`,
    /// `regex`); omitted or `any` for unconverted values.
    #[serde(rename = "type", default = "default_type")]
    pub field_type: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    #[serde(default = "default_true")]
    pub required_fallback: bool,
    #[serde(default)]
    pub fallbacks: Vec<FallbackSpec>,
}

/// One declared fallback, distinguished by its keys.
///
/// Each shape rejects keys it does not declare, so a misspelt or misplaced
/// key fails to load instead of matching a looser shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FallbackSpec {
    Format(FormatFallbackSpec),
    Single(SingleFallbackSpec),
    Fields(FieldsFallbackSpec),
}

/// `{format, fields, optional}`: build the value from a format string.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatFallbackSpec {
    pub format: String,
    pub fields: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
}

/// `{field}`: take the value of one other field.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SingleFallbackSpec {
    pub field: String,
}

/// `{fields}`: pass through the one present source.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldsFallbackSpec {
    pub fields: Vec<String>,
}

fn default_type() -> String {
    "any".to_string()
}

fn default_true() -> bool {
    true
}

impl SchemaManifest {
    pub fn from_yaml_str(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a manifest, choosing the format from the file extension:
    /// `.yaml`/`.yml` for YAML, anything else for JSON.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Build every declared schema, in order, into a registry.
    pub fn build(&self) -> Result<SchemaRegistry, ManifestError> {
        let mut registry = SchemaRegistry::new();
        for spec in &self.schemas {
            let schema = spec.build(&registry)?;
            registry.register(schema)?;
        }
        tracing::debug!(schemas = registry.len(), "built schema manifest");
        Ok(registry)
    }
}

impl SchemaSpec {
    fn build(&self, registry: &SchemaRegistry) -> Result<std::sync::Arc<SchemaDef>, ManifestError> {
        let mut builder = SchemaDef::builder(&self.name).doc(&self.doc);
        for parent in &self.extends {
            let parent = registry.get(parent).ok_or_else(|| ManifestError::UnknownParent {
                schema: self.name.clone(),
                parent: parent.clone(),
            })?;
            builder = builder.extends(parent);
        }
        for field in &self.fields {
            builder = builder.field(&field.name, field.build(&self.name)?);
        }
        Ok(builder.build()?)
    }
}

impl FieldSpec {
    fn build(&self, schema: &str) -> Result<Field, ManifestError> {
        let kind = FieldType::from_name(&self.field_type).ok_or_else(|| ManifestError::UnknownType {
            schema: schema.to_string(),
            field: self.name.clone(),
            type_name: self.field_type.clone(),
        })?;

        let mut field = Field::new(kind, &self.doc).required_fallback(self.required_fallback);
        if self.required {
            field = field.required();
        }
        if self.is_static {
            field = field.static_field();
        }
        if let Some(default) = &self.default {
            field = field.default(default.clone());
        }
        for fallback in &self.fallbacks {
            field = match fallback {
                FallbackSpec::Format(spec) => field.fallback(FormatStringFieldFallback::new(
                    &spec.format,
                    spec.fields.iter().cloned(),
                    spec.optional.iter().cloned(),
                )?),
                FallbackSpec::Single(spec) => field.fallback(SingleFieldFallback::new(&spec.field)),
                FallbackSpec::Fields(spec) => field.fallback(FieldFallback::new(spec.fields.iter().cloned())),
            };
        }
        Ok(field)
    }
}
