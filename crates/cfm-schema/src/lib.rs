//! # cfm-schema: Declarative Configuration Schemas
//!
//! Application authors declare named, typed configuration fields on a
//! schema; callers instantiate the schema with a raw key→value mapping; the
//! engine validates and converts each field, applies defaults, and exposes
//! the results through read-only accessors.
//!
//! ```
//! use cfm_schema::{Config, Field, SchemaDef, SingleFieldFallback};
//! use serde_json::json;
//!
//! let schema = SchemaDef::builder("WorkerConfig")
//!     .doc("Worker settings.")
//!     .field("broker", Field::text("Deprecated, use broker_url."))
//!     .field(
//!         "broker_url",
//!         Field::url("Broker URL.")
//!             .required()
//!             .fallback(SingleFieldFallback::new("broker")),
//!     )
//!     .field("retries", Field::int("Retry count.").default(3))
//!     .post_validate(|cfg| match cfg.int("retries")? {
//!         Some(n) if n < 0 => cfg.raise_config_error("'retries' must be non-negative"),
//!         _ => Ok(()),
//!     })
//!     .build()
//!     .unwrap();
//!
//! let raw = json!({"broker": "amqp://mq.local/"});
//! let config = Config::new(&schema, raw.as_object().unwrap().clone()).unwrap();
//! assert_eq!(config.url("broker_url").unwrap().unwrap().netloc(), "mq.local");
//! assert_eq!(config.int("retries").unwrap(), Some(3));
//! ```
//!
//! ## Modules
//!
//! - [`field`]: field descriptors and their resolution order.
//! - [`kinds`]: conversion rules per field type.
//! - [`fallback`]: resolution from other fields when a key is absent.
//! - [`schema`]: schema definitions, inheritance, field registry.
//! - [`config`]: validated instances and typed accessors.
//! - [`describe`]: generated schema descriptions.
//! - [`registry`]: named schema collections.
//! - [`manifest`]: schemas declared in YAML or JSON.
//!
//! ## Crate Policy
//!
//! - Depends only on `cfm-core` internally.
//! - Schemas are immutable once built; instances are immutable once
//!   constructed. Both are `Send + Sync`.
//! - The caller's raw data is never mutated; composite values are returned
//!   as independent copies.

pub mod config;
pub mod describe;
pub mod fallback;
pub mod field;
mod format;
pub mod kinds;
pub mod manifest;
pub mod registry;
pub mod schema;

pub use cfm_core::{ConfigError, FieldValue, ParsedUrl, RawData};
pub use config::Config;
pub use describe::{generate_description, OPTIONS_HEADER};
pub use fallback::{
    passthrough, BuildValue, Fallback, FieldFallback, FormatStringFieldFallback,
    SingleFieldFallback,
};
pub use field::Field;
pub use kinds::{Clean, FieldType};
pub use manifest::{ManifestError, SchemaManifest};
pub use registry::SchemaRegistry;
pub use schema::{PostValidate, SchemaBuilder, SchemaDef};
