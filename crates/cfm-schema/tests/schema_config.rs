//! Integration tests: schema declaration, inheritance, descriptions, and
//! validated instances.

use std::sync::Arc;

use cfm_schema::{Config, ConfigError, Field, FieldValue, RawData, SchemaDef};
use serde_json::{json, Value};

fn raw(value: Value) -> RawData {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[test]
fn test_simple_config() {
    let schema = SchemaDef::builder("FooConfig")
        .doc("Test config.")
        .field("foo", Field::any("foo"))
        .field("bar", Field::any("bar"))
        .build()
        .unwrap();

    let conf = Config::new(&schema, raw(json!({"foo": "blah"}))).unwrap();
    assert_eq!(conf.get("foo").unwrap(), Some(FieldValue::Raw(json!("blah"))));
    assert_eq!(conf.get("bar").unwrap(), None);

    let conf = Config::new(&schema, raw(json!({"bar": "blah"}))).unwrap();
    assert_eq!(conf.get("foo").unwrap(), None);
    assert_eq!(conf.get("bar").unwrap(), Some(FieldValue::Raw(json!("blah"))));
}

#[test]
fn test_required_field() {
    let schema = SchemaDef::builder("FooConfig")
        .field("foo", Field::text("foo").required())
        .field("bar", Field::text("bar"))
        .build()
        .unwrap();

    let conf = Config::new(&schema, raw(json!({"foo": "blah"}))).unwrap();
    assert_eq!(conf.text("foo").unwrap().as_deref(), Some("blah"));
    assert_eq!(conf.text("bar").unwrap(), None);

    let err = Config::new(&schema, raw(json!({"bar": "blah"}))).unwrap_err();
    assert_eq!(
        err,
        ConfigError::MissingRequired {
            field: "foo".to_string()
        }
    );
}

#[test]
fn test_static_field() {
    let schema = SchemaDef::builder("FooConfig")
        .field("foo", Field::text("foo").required().static_field())
        .field("bar", Field::text("bar"))
        .build()
        .unwrap();

    let conf = Config::new_static(&schema, raw(json!({"foo": "blah", "bar": "baz"}))).unwrap();
    assert!(conf.is_static());
    assert_eq!(conf.text("foo").unwrap().as_deref(), Some("blah"));
    let err = conf.text("bar").unwrap_err();
    assert_eq!(err.to_string(), "Field 'bar' is not marked as static.");
}

#[test]
fn test_default_field() {
    let schema = SchemaDef::builder("FooConfig")
        .field("foo", Field::text("what 'twas").default("brillig"))
        .field("bar", Field::text("tove status").default("slithy"))
        .build()
        .unwrap();

    let conf = Config::new(&schema, raw(json!({"foo": "blah"}))).unwrap();
    assert_eq!(conf.text("foo").unwrap().as_deref(), Some("blah"));
    assert_eq!(conf.text("bar").unwrap().as_deref(), Some("slithy"));

    let conf = Config::new(&schema, raw(json!({"bar": "blah"}))).unwrap();
    assert_eq!(conf.text("foo").unwrap().as_deref(), Some("brillig"));
    assert_eq!(conf.text("bar").unwrap().as_deref(), Some("blah"));
}

#[test]
fn test_description() {
    let schema = SchemaDef::builder("FooConfig")
        .doc("Test config.")
        .field("foo", Field::any("A foo field."))
        .field("bar", Field::text("A bar field."))
        .build()
        .unwrap();

    assert_eq!(
        schema.description(),
        [
            "Test config.",
            "",
            "Configuration options:",
            "",
            ":param foo:",
            "",
            "    A foo field.",
            "",
            ":param str bar:",
            "",
            "    A bar field.",
        ]
        .join("\n")
    );

    // Same fields declared in the other order are described in that order.
    let schema = SchemaDef::builder("BarConfig")
        .doc("Test config.")
        .field("bar", Field::any("A bar field."))
        .field("foo", Field::any("A foo field."))
        .build()
        .unwrap();

    assert_eq!(
        schema.description(),
        [
            "Test config.",
            "",
            "Configuration options:",
            "",
            ":param bar:",
            "",
            "    A bar field.",
            "",
            ":param foo:",
            "",
            "    A foo field.",
        ]
        .join("\n")
    );
}

#[test]
fn test_description_wraps_long_text() {
    let long = "This field has a rather long description that will certainly not fit \
                on a single line of generated output.";
    let schema = SchemaDef::builder("Wrapped")
        .doc("Doc.")
        .field("foo", Field::int(long))
        .build()
        .unwrap();
    let lines: Vec<&str> = schema.description().lines().collect();
    let body = &lines[6..];
    assert!(body.len() >= 2, "{body:?}");
    for line in body {
        assert!(line.starts_with("    "));
        assert!(line.chars().count() <= 70);
    }
}

#[test]
fn test_inheritance() {
    let foo = SchemaDef::builder("FooConfig")
        .doc("Test config.")
        .field("foo", Field::any("From base class."))
        .build()
        .unwrap();
    let bar = SchemaDef::builder("BarConfig")
        .doc("Another test config.")
        .extends(&foo)
        .field("bar", Field::any("New field."))
        .build()
        .unwrap();

    let conf = Config::new(&bar, raw(json!({"foo": "blah", "bar": "bleh"}))).unwrap();
    let fields = conf.schema().fields();
    assert_eq!(fields.len(), 2);
    assert!(Arc::ptr_eq(&fields[0], foo.field("foo").unwrap()));
    assert!(Arc::ptr_eq(&fields[1], bar.field("bar").unwrap()));
    assert_eq!(conf.get("foo").unwrap(), Some(FieldValue::Raw(json!("blah"))));
    assert_eq!(conf.get("bar").unwrap(), Some(FieldValue::Raw(json!("bleh"))));

    // Inherited fields are described before local fields.
    assert_eq!(
        bar.description(),
        [
            "Another test config.",
            "",
            "Configuration options:",
            "",
            ":param foo:",
            "",
            "    From base class.",
            "",
            ":param bar:",
            "",
            "    New field.",
        ]
        .join("\n")
    );
}

#[test]
fn test_double_inheritance() {
    let foo = SchemaDef::builder("FooConfig")
        .field("foo", Field::any("From base class."))
        .build()
        .unwrap();
    let bar = SchemaDef::builder("BarConfig")
        .extends(&foo)
        .field("bar", Field::any("From middle class."))
        .build()
        .unwrap();
    let baz = SchemaDef::builder("BazConfig")
        .extends(&bar)
        .field("baz", Field::any("From top class."))
        .build()
        .unwrap();

    let conf = Config::new(&baz, raw(json!({"foo": "blah", "bar": "bleh", "baz": "blerg"}))).unwrap();
    let fields = conf.schema().fields();
    assert!(Arc::ptr_eq(&fields[0], foo.field("foo").unwrap()));
    assert!(Arc::ptr_eq(&fields[1], bar.field("bar").unwrap()));
    assert!(Arc::ptr_eq(&fields[2], baz.field("baz").unwrap()));
    assert_eq!(conf.get("baz").unwrap(), Some(FieldValue::Raw(json!("blerg"))));
}

#[test]
fn test_shared_ancestor_listed_once() {
    let base = SchemaDef::builder("Base")
        .field("common", Field::any("common"))
        .build()
        .unwrap();
    let left = SchemaDef::builder("Left")
        .extends(&base)
        .field("left", Field::any("left"))
        .build()
        .unwrap();
    let right = SchemaDef::builder("Right")
        .extends(&base)
        .field("right", Field::any("right"))
        .build()
        .unwrap();
    let both = SchemaDef::builder("Both")
        .extends(&left)
        .extends(&right)
        .field("own", Field::any("own"))
        .build()
        .unwrap();
    assert_eq!(
        both.field_names().collect::<Vec<_>>(),
        vec!["common", "left", "right", "own"]
    );
}

#[test]
fn test_validation() {
    let schema = SchemaDef::builder("FooConfig")
        .field("foo", Field::any("foo").required().static_field())
        .field("bar", Field::int("bar").required())
        .build()
        .unwrap();

    let conf = Config::new(&schema, raw(json!({"foo": "blah", "bar": 1}))).unwrap();
    assert_eq!(conf.get("foo").unwrap(), Some(FieldValue::Raw(json!("blah"))));
    assert_eq!(conf.int("bar").unwrap(), Some(1));

    assert!(Config::new(&schema, raw(json!({}))).is_err());
    let err = Config::new(&schema, raw(json!({"foo": "blah", "baz": "hi"}))).unwrap_err();
    assert_eq!(err.to_string(), "Missing required config field 'bar'");
}

#[test]
fn test_first_failing_field_is_reported() {
    let schema = SchemaDef::builder("FooConfig")
        .field("a", Field::int("a"))
        .field("b", Field::int("b").required())
        .build()
        .unwrap();
    let err = Config::new(&schema, raw(json!({"a": "nope"}))).unwrap_err();
    assert_eq!(err.to_string(), "Field 'a' could not be converted to int.");
}

#[test]
fn test_static_validation() {
    let schema = SchemaDef::builder("FooConfig")
        .field("foo", Field::any("foo").required().static_field())
        .field("bar", Field::int("bar").required())
        .build()
        .unwrap();

    let conf = Config::new_static(&schema, raw(json!({"foo": "blah"}))).unwrap();
    assert_eq!(conf.get("foo").unwrap(), Some(FieldValue::Raw(json!("blah"))));
    assert!(conf.int("bar").is_err());

    // Non-static values are not validated in static mode.
    let conf = Config::new_static(&schema, raw(json!({"foo": "blah", "bar": "hi"}))).unwrap();
    assert_eq!(conf.get("foo").unwrap(), Some(FieldValue::Raw(json!("blah"))));

    assert!(Config::new_static(&schema, raw(json!({}))).is_err());
}

#[test]
fn test_post_validate() {
    let schema = SchemaDef::builder("FooConfig")
        .field("foo", Field::int("foo").required())
        .post_validate(|cfg| {
            if cfg.int("foo")?.unwrap_or(0) < 0 {
                return cfg.raise_config_error("'foo' must be non-negative");
            }
            Ok(())
        })
        .build()
        .unwrap();

    let conf = Config::new(&schema, raw(json!({"foo": 1}))).unwrap();
    assert_eq!(conf.int("foo").unwrap(), Some(1));

    let err = Config::new(&schema, raw(json!({"foo": -1}))).unwrap_err();
    assert_eq!(err, ConfigError::Custom("'foo' must be non-negative".to_string()));
}

#[test]
fn test_post_validate_inherited() {
    let base = SchemaDef::builder("Base")
        .field("foo", Field::int("foo"))
        .post_validate(|cfg| match cfg.int("foo")? {
            Some(n) if n > 10 => cfg.raise_config_error("'foo' too large"),
            _ => Ok(()),
        })
        .build()
        .unwrap();
    let derived = SchemaDef::builder("Derived")
        .extends(&base)
        .field("bar", Field::text("bar"))
        .build()
        .unwrap();
    assert!(Config::new(&derived, raw(json!({"foo": 11}))).is_err());
    assert!(Config::new(&derived, raw(json!({"foo": 3}))).is_ok());
}

#[test]
fn test_post_validate_inherited_from_first_parent() {
    let a = SchemaDef::builder("A")
        .field("a", Field::any("a"))
        .post_validate(|cfg| cfg.raise_config_error("hook A"))
        .build()
        .unwrap();
    let b = SchemaDef::builder("B")
        .field("b", Field::any("b"))
        .post_validate(|cfg| cfg.raise_config_error("hook B"))
        .build()
        .unwrap();
    let plain = SchemaDef::builder("Plain")
        .field("p", Field::any("p"))
        .build()
        .unwrap();

    let c = SchemaDef::builder("C").extends(&a).extends(&b).build().unwrap();
    let err = Config::new(&c, raw(json!({}))).unwrap_err();
    assert_eq!(err, ConfigError::Custom("hook A".to_string()));

    // Parents without a hook are skipped.
    let d = SchemaDef::builder("D").extends(&plain).extends(&b).build().unwrap();
    let err = Config::new(&d, raw(json!({}))).unwrap_err();
    assert_eq!(err, ConfigError::Custom("hook B".to_string()));
}

#[test]
fn test_post_validate_not_run_when_field_fails() {
    let schema = SchemaDef::builder("FooConfig")
        .field("foo", Field::int("foo"))
        .post_validate(|cfg| cfg.raise_config_error("hook ran"))
        .build()
        .unwrap();
    let err = Config::new(&schema, raw(json!({"foo": "x"}))).unwrap_err();
    assert!(matches!(err, ConfigError::Field { .. }));
}

#[test]
fn test_undefined_field_access() {
    let schema = SchemaDef::builder("FooConfig")
        .field("foo", Field::int("foo"))
        .build()
        .unwrap();
    let conf = Config::new(&schema, raw(json!({}))).unwrap();
    assert_eq!(
        conf.get("nope").unwrap_err(),
        ConfigError::UndefinedField("nope".to_string())
    );
}

#[test]
fn test_typed_accessor_mismatch() {
    let schema = SchemaDef::builder("FooConfig")
        .field("foo", Field::int("foo"))
        .build()
        .unwrap();
    let conf = Config::new(&schema, raw(json!({"foo": 5}))).unwrap();
    let err = conf.text("foo").unwrap_err();
    assert_eq!(err.to_string(), "Field 'foo' holds a int value, not str.");
}

#[test]
fn test_typed_accessors() {
    let schema = SchemaDef::builder("All")
        .field("t", Field::text("t"))
        .field("i", Field::int("i"))
        .field("f", Field::float("f"))
        .field("b", Field::bool("b"))
        .field("l", Field::list("l"))
        .field("d", Field::dict("d"))
        .field("u", Field::url("u"))
        .field("r", Field::regex("r"))
        .build()
        .unwrap();
    let conf = Config::new(
        &schema,
        raw(json!({
            "t": "text",
            "i": "42",
            "f": "0.5",
            "b": "TrUe",
            "l": [1, 2],
            "d": {"k": "v"},
            "u": "https://example.com/path?q=1",
            "r": "^v[a-z]m[a-z]$"
        })),
    )
    .unwrap();
    assert_eq!(conf.text("t").unwrap().as_deref(), Some("text"));
    assert_eq!(conf.int("i").unwrap(), Some(42));
    assert_eq!(conf.float("f").unwrap(), Some(0.5));
    assert_eq!(conf.bool("b").unwrap(), Some(true));
    assert_eq!(conf.list("l").unwrap(), Some(vec![json!(1), json!(2)]));
    assert_eq!(conf.dict("d").unwrap().unwrap()["k"], json!("v"));
    let url = conf.url("u").unwrap().unwrap();
    assert_eq!(url.scheme(), "https");
    assert_eq!(url.query(), "q=1");
    assert!(conf.regex("r").unwrap().unwrap().is_match("vumi"));
}

#[test]
fn test_list_independent_copies() {
    let schema = SchemaDef::builder("L")
        .field("foo", Field::list("foo"))
        .build()
        .unwrap();
    let conf = Config::new(&schema, raw(json!({"foo": ["fault", "mine"]}))).unwrap();
    let mut value = conf.list("foo").unwrap().unwrap();
    value[1] = json!("yours");
    assert_eq!(conf.list("foo").unwrap().unwrap(), vec![json!("fault"), json!("mine")]);
}

#[test]
fn test_resolved_lists_accessible_fields() {
    let schema = SchemaDef::builder("FooConfig")
        .field("foo", Field::text("foo").static_field())
        .field("bar", Field::int("bar").default(2))
        .build()
        .unwrap();
    let conf = Config::new(&schema, raw(json!({"foo": "x"}))).unwrap();
    let resolved = conf.resolved().unwrap();
    assert_eq!(
        resolved,
        vec![("foo", Some(FieldValue::from("x"))), ("bar", Some(FieldValue::Int(2)))]
    );

    let conf = Config::new_static(&schema, raw(json!({"foo": "x"}))).unwrap();
    assert_eq!(conf.resolved().unwrap().len(), 1);
}

#[test]
fn test_instances_share_schema_fields() {
    let schema = SchemaDef::builder("FooConfig")
        .field("foo", Field::text("foo"))
        .build()
        .unwrap();
    let a = schema.instantiate(raw(json!({"foo": "a"}))).unwrap();
    let b = schema.instantiate(raw(json!({"foo": "b"}))).unwrap();
    assert!(Arc::ptr_eq(a.schema(), b.schema()));
    assert_eq!(a.text("foo").unwrap().as_deref(), Some("a"));
    assert_eq!(b.text("foo").unwrap().as_deref(), Some("b"));
}

#[test]
fn test_config_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Config>();
    assert_send_sync::<Arc<SchemaDef>>();
}
