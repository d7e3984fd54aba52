//! Named collection of built schemas.

use std::collections::HashMap;
use std::sync::Arc;

use cfm_core::ConfigError;

use crate::schema::SchemaDef;

/// Schemas indexed by name, listed in registration order.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: Vec<Arc<SchemaDef>>,
    by_name: HashMap<String, usize>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Schema` if a schema with the same name exists.
    pub fn register(&mut self, schema: Arc<SchemaDef>) -> Result<(), ConfigError> {
        if self.by_name.contains_key(schema.name()) {
            return Err(ConfigError::Schema(format!(
                "schema '{}' is already registered",
                schema.name()
            )));
        }
        self.by_name
            .insert(schema.name().to_string(), self.schemas.len());
        self.schemas.push(schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<SchemaDef>> {
        self.by_name.get(name).map(|&idx| &self.schemas[idx])
    }

    /// Schema names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SchemaDef>> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;

    fn schema(name: &str) -> Arc<SchemaDef> {
        SchemaDef::builder(name)
            .field("foo", Field::text("foo"))
            .build()
            .unwrap()
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = SchemaRegistry::new();
        registry.register(schema("B")).unwrap();
        registry.register(schema("A")).unwrap();
        assert_eq!(registry.names(), vec!["B", "A"]);
        assert_eq!(registry.get("A").unwrap().name(), "A");
        assert!(registry.get("C").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register(schema("A")).unwrap();
        let err = registry.register(schema("A")).unwrap_err();
        assert_eq!(err.to_string(), "invalid schema: schema 'A' is already registered");
    }
}
