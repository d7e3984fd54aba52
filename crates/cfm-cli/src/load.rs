//! # Document and Manifest Loading
//!
//! Reads schema manifests and configuration documents from disk. The format
//! is chosen by file extension: `.yaml`/`.yml` for YAML, anything else for
//! JSON. YAML documents are converted to the JSON value model the schema
//! engine works on.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use cfm_core::RawData;
use cfm_schema::{SchemaDef, SchemaManifest, SchemaRegistry};

/// Load and build every schema declared in the manifest at `path`.
pub fn load_registry(path: &Path) -> Result<SchemaRegistry> {
    let manifest = SchemaManifest::from_path(path)
        .with_context(|| format!("failed to load manifest {}", path.display()))?;
    let registry = manifest
        .build()
        .with_context(|| format!("failed to build schemas from {}", path.display()))?;
    tracing::info!(
        manifest = %path.display(),
        schemas = registry.len(),
        "loaded schema manifest"
    );
    Ok(registry)
}

/// Look up a schema by name, listing the known names when it is missing.
pub fn lookup<'a>(registry: &'a SchemaRegistry, name: &str) -> Result<&'a Arc<SchemaDef>> {
    registry.get(name).with_context(|| {
        format!(
            "schema '{name}' is not declared in the manifest (known: {})",
            registry.names().join(", ")
        )
    })
}

/// Load a configuration document. The top level must be a mapping.
pub fn load_document(path: &Path) -> Result<RawData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read document {}", path.display()))?;

    let value = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML in {}", path.display()))?;
            yaml_to_json_value(&yaml)
                .with_context(|| format!("YAML-to-JSON conversion failed for {}", path.display()))?
        }
        _ => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
    };

    match value {
        Value::Object(map) => Ok(map),
        // An empty YAML file parses as null.
        Value::Null => Ok(RawData::new()),
        other => bail!(
            "document {} must be a mapping, found {}",
            path.display(),
            kind_of(&other)
        ),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Convert a YAML value into the JSON value model.
///
/// Scalar map keys are stringified; tags are ignored.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value> {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .with_context(|| format!("cannot represent float {f} in JSON"))?
            } else {
                bail!("unsupported YAML number: {n:?}")
            }
        }
        serde_yaml::Value::String(s) => Value::String(s.clone()),
        serde_yaml::Value::Sequence(seq) => Value::Array(
            seq.iter()
                .map(yaml_to_json_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => bail!("unsupported YAML map key: {other:?}"),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Value::Object(json_map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_yaml_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "app.yaml", "host: example.com\nport: 8080\n1: one\n");
        let doc = load_document(&path).unwrap();
        assert_eq!(doc["host"], json!("example.com"));
        assert_eq!(doc["port"], json!(8080));
        assert_eq!(doc["1"], json!("one"));
    }

    #[test]
    fn loads_json_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "app.json", r#"{"debug": true, "ratio": 0.5}"#);
        let doc = load_document(&path).unwrap();
        assert_eq!(doc["debug"], json!(true));
        assert_eq!(doc["ratio"], json!(0.5));
    }

    #[test]
    fn empty_yaml_is_empty_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "empty.yml", "");
        assert!(load_document(&path).unwrap().is_empty());
    }

    #[test]
    fn non_mapping_document_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "list.json", "[1, 2]");
        let err = load_document(&path).unwrap_err();
        assert!(err.to_string().contains("must be a mapping, found a sequence"), "{err}");
    }

    #[test]
    fn missing_document_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = load_document(&path).unwrap_err();
        assert!(err.to_string().contains("nope.json"), "{err}");
    }

    #[test]
    fn tagged_yaml_values_unwrapped() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("value: !custom hello").unwrap();
        assert_eq!(yaml_to_json_value(&yaml).unwrap(), json!({"value": "hello"}));
    }

    #[test]
    fn lookup_lists_known_schemas() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "schemas.yaml", "schemas:\n  - name: A\n  - name: B\n");
        let registry = load_registry(&path).unwrap();
        assert_eq!(lookup(&registry, "A").unwrap().name(), "A");
        let err = lookup(&registry, "C").unwrap_err();
        assert!(err.to_string().contains("(known: A, B)"), "{err}");
    }
}
