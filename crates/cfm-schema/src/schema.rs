//! # Schema Definitions
//!
//! A [`SchemaDef`] is a declared configuration shape: a name, a description,
//! an ordered list of fields, and an optional post-validation hook. Schemas
//! are built once through [`SchemaBuilder`] and shared behind an `Arc` by
//! every instance.
//!
//! ## Field Order
//!
//! The builder walks the declared parents in order and concatenates their
//! field lists (each already ancestors-first), then appends the schema's own
//! fields in declaration order. A field inherited through two parents appears
//! once. A field declared under an inherited name replaces the inherited
//! field and takes its place at the end, after all inherited fields.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use cfm_core::{ConfigError, RawData};

use crate::config::Config;
use crate::describe::generate_description;
use crate::field::Field;

/// Cross-field check run after every field has validated.
pub type PostValidate = Arc<dyn Fn(&Config) -> Result<(), ConfigError> + Send + Sync>;

/// A built configuration schema.
pub struct SchemaDef {
    name: String,
    doc: String,
    parents: Vec<Arc<SchemaDef>>,
    fields: Vec<Arc<Field>>,
    index: HashMap<String, usize>,
    local_count: usize,
    post_validate: Option<PostValidate>,
    description: String,
}

impl SchemaDef {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            doc: String::new(),
            parents: Vec::new(),
            fields: Vec::new(),
            post_validate: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema's own documentation text.
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Generated description: the doc text followed by the rendered fields.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parents(&self) -> &[Arc<SchemaDef>] {
        &self.parents
    }

    /// All fields, inherited fields first, in declaration order.
    pub fn fields(&self) -> &[Arc<Field>] {
        &self.fields
    }

    /// Fields declared on this schema itself (including overrides).
    pub fn local_fields(&self) -> &[Arc<Field>] {
        &self.fields[self.fields.len() - self.local_count..]
    }

    pub fn field(&self, name: &str) -> Option<&Arc<Field>> {
        self.index.get(name).map(|&idx| &self.fields[idx])
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name())
    }

    pub fn post_validate_hook(&self) -> Option<&PostValidate> {
        self.post_validate.as_ref()
    }

    /// Validate `raw` against this schema. See [`Config::new`].
    pub fn instantiate(self: &Arc<Self>, raw: RawData) -> Result<Config, ConfigError> {
        Config::new(self, raw)
    }

    /// Validate `raw` against this schema in static mode.
    pub fn instantiate_static(self: &Arc<Self>, raw: RawData) -> Result<Config, ConfigError> {
        Config::new_static(self, raw)
    }
}

impl fmt::Debug for SchemaDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDef")
            .field("name", &self.name)
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("post_validate", &self.post_validate.is_some())
            .finish()
    }
}

/// Builder for [`SchemaDef`].
#[must_use]
pub struct SchemaBuilder {
    name: String,
    doc: String,
    parents: Vec<Arc<SchemaDef>>,
    fields: Vec<(String, Field)>,
    post_validate: Option<PostValidate>,
}

impl SchemaBuilder {
    /// Documentation text, used as the head of the generated description.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Inherit the fields of `parent`. May be called more than once.
    pub fn extends(mut self, parent: &Arc<SchemaDef>) -> Self {
        self.parents.push(Arc::clone(parent));
        self
    }

    /// Declare a field under `name`.
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    /// Cross-field validation run after all fields pass. When omitted, the
    /// hook of the first parent (in `extends` order) that has one is
    /// inherited.
    pub fn post_validate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Config) -> Result<(), ConfigError> + Send + Sync + 'static,
    {
        self.post_validate = Some(Arc::new(hook));
        self
    }

    /// Bind field names, collect inherited fields, and render the description.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Schema` if two local fields share a name or if
    /// fallbacks between the schema's fields form a cycle.
    pub fn build(self) -> Result<Arc<SchemaDef>, ConfigError> {
        let mut seen = HashSet::new();
        let mut local = Vec::with_capacity(self.fields.len());
        for (name, mut field) in self.fields {
            if !seen.insert(name.clone()) {
                return Err(ConfigError::Schema(format!(
                    "field '{name}' declared twice on schema '{}'",
                    self.name
                )));
            }
            field.setup(name);
            local.push(Arc::new(field));
        }

        let mut fields: Vec<Arc<Field>> = Vec::new();
        for parent in &self.parents {
            for field in parent.fields() {
                merge_field(&mut fields, field);
            }
        }
        for field in &local {
            merge_field(&mut fields, field);
        }

        let index: HashMap<String, usize> = fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.name().to_string(), idx))
            .collect();

        check_fallback_cycles(&self.name, &fields, &index)?;

        let post_validate = self.post_validate.or_else(|| {
            self.parents
                .iter()
                .find_map(|parent| parent.post_validate.clone())
        });

        let description = generate_description(&self.doc, &fields);

        tracing::debug!(
            schema = %self.name,
            fields = fields.len(),
            parents = self.parents.len(),
            "built schema"
        );

        Ok(Arc::new(SchemaDef {
            name: self.name,
            doc: self.doc,
            parents: self.parents,
            fields,
            index,
            local_count: local.len(),
            post_validate,
            description,
        }))
    }
}

/// Add `field`, replacing a different field of the same name.
fn merge_field(fields: &mut Vec<Arc<Field>>, field: &Arc<Field>) {
    if let Some(pos) = fields.iter().position(|f| f.name() == field.name()) {
        if Arc::ptr_eq(&fields[pos], field) {
            return;
        }
        fields.remove(pos);
    }
    fields.push(Arc::clone(field));
}

/// Reject fallback chains that lead back to the field they start from.
/// Names that are not fields are left for instance validation to report.
fn check_fallback_cycles(
    schema: &str,
    fields: &[Arc<Field>],
    index: &HashMap<String, usize>,
) -> Result<(), ConfigError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        Active,
        Done,
    }

    fn visit(
        idx: usize,
        fields: &[Arc<Field>],
        index: &HashMap<String, usize>,
        marks: &mut [Mark],
    ) -> Option<usize> {
        match marks[idx] {
            Mark::Done => return None,
            Mark::Active => return Some(idx),
            Mark::Unvisited => {}
        }
        marks[idx] = Mark::Active;
        for fallback in fields[idx].fallbacks() {
            for name in fallback.field_names() {
                if let Some(&next) = index.get(name) {
                    if let Some(cycle) = visit(next, fields, index, marks) {
                        return Some(cycle);
                    }
                }
            }
        }
        marks[idx] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::Unvisited; fields.len()];
    for idx in 0..fields.len() {
        if let Some(cycle) = visit(idx, fields, index, &mut marks) {
            return Err(ConfigError::Schema(format!(
                "fallbacks of schema '{schema}' form a cycle through field '{}'",
                fields[cycle].name()
            )));
        }
    }
    Ok(())
}
