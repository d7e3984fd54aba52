//! # cfm-core: Foundational Types for cfm
//!
//! This crate defines the types every other cfm crate builds on. It depends
//! on nothing internal.
//!
//! ## Contents
//!
//! - [`ConfigError`]: the single error type for every schema and field
//!   failure. Each variant renders a message naming the offending field.
//! - [`RawData`]: the caller-supplied key→value mapping a schema instance
//!   validates against. Values use the `serde_json` value model so that any
//!   loader (YAML, JSON, environment collectors) can produce them.
//! - [`FieldValue`]: the converted value a typed field yields.
//! - [`ParsedUrl`]: the component split of a URL field.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cfm-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod parsed_url;
pub mod value;

pub use error::ConfigError;
pub use parsed_url::ParsedUrl;
pub use value::{FieldValue, RawData};
