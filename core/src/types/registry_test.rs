//! Unit tests for the type registry.

use indexmap::IndexMap;

use super::*;
use crate::values::Value;

fn schema(required: &[&str], properties: &[(&str, PropKind)]) -> TypeSchema {
    TypeSchema {
        required: required.iter().map(|s| s.to_string()).collect(),
        properties: properties
            .iter()
            .map(|(name, kind)| (name.to_string(), kind.clone()))
            .collect(),
    }
}

fn obj(fields: &[(&str, Value)]) -> Value {
    let mut map = IndexMap::new();
    for (name, value) in fields {
        map.insert(name.to_string(), value.clone());
    }
    Value::object(map)
}

// ============================================================================
// Detection
// ============================================================================

#[test]
fn only_plain_objects_are_detected() {
    let mut reg = TypeRegistry::new();
    reg.register("Anything", TypeConfig::new(schema(&[], &[]), Strategy::Json));
    assert_eq!(reg.detect_type(&Value::Null), None);
    assert_eq!(reg.detect_type(&Value::str("x")), None);
    assert_eq!(reg.detect_type(&Value::array(vec![])), None);
    assert_eq!(reg.detect_type(&obj(&[])), Some("Anything"));
}

#[test]
fn required_is_a_presence_check() {
    let mut reg = TypeRegistry::new();
    reg.register(
        "File",
        TypeConfig::new(schema(&["file_id", "name"], &[]), Strategy::Json),
    );
    assert_eq!(
        reg.detect_type(&obj(&[("file_id", Value::Number(1.0))])),
        None
    );
    assert_eq!(
        reg.detect_type(&obj(&[
            ("file_id", Value::Number(1.0)),
            ("name", Value::Null), // present is enough
        ])),
        Some("File")
    );
}

#[test]
fn properties_are_typed_checks_on_present_keys() {
    let mut reg = TypeRegistry::new();
    reg.register(
        "Point",
        TypeConfig::new(
            schema(&[], &[("x", PropKind::Number), ("tags", PropKind::Array)]),
            Strategy::Json,
        ),
    );
    // absent properties pass
    assert_eq!(reg.detect_type(&obj(&[])), Some("Point"));
    // present with right kind passes
    assert_eq!(
        reg.detect_type(&obj(&[("x", Value::Number(1.0))])),
        Some("Point")
    );
    // wrong kind fails
    assert_eq!(reg.detect_type(&obj(&[("x", Value::str("1"))])), None);
    // NaN is not a number for schema purposes
    assert_eq!(reg.detect_type(&obj(&[("x", Value::Number(f64::NAN))])), None);
    // arrays must be real arrays, not objects
    assert_eq!(reg.detect_type(&obj(&[("tags", obj(&[]))])), None);
}

#[test]
fn unknown_kinds_pass() {
    let mut reg = TypeRegistry::new();
    reg.register(
        "Loose",
        TypeConfig::new(
            schema(&[], &[("blob", PropKind::Other("binary".to_string()))]),
            Strategy::Json,
        ),
    );
    assert_eq!(
        reg.detect_type(&obj(&[("blob", Value::Number(1.0))])),
        Some("Loose")
    );
}

#[test]
fn most_recently_registered_wins() {
    let mut reg = TypeRegistry::new();
    reg.register("A", TypeConfig::new(schema(&[], &[]), Strategy::Json));
    reg.register("B", TypeConfig::new(schema(&[], &[]), Strategy::Json));
    // both match an empty object; B registered later
    assert_eq!(reg.detect_type(&obj(&[])), Some("B"));

    // re-registering A moves it to the front
    reg.register("A", TypeConfig::new(schema(&[], &[]), Strategy::Json));
    assert_eq!(reg.detect_type(&obj(&[])), Some("A"));
    assert_eq!(reg.len(), 2);
}

#[test]
fn list_reflects_detection_order() {
    let mut reg = TypeRegistry::new();
    reg.register("A", TypeConfig::new(schema(&[], &[]), Strategy::Json));
    reg.register("B", TypeConfig::new(schema(&[], &[]), Strategy::Json));
    assert_eq!(reg.list(), ["B", "A"]);
    assert!(reg.has_type("A"));
    assert!(!reg.has_type("C"));
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn serialize_by_strategy() {
    let mut reg = TypeRegistry::new();
    reg.register("J", TypeConfig::new(schema(&[], &[]), Strategy::Json));
    reg.register("S", TypeConfig::new(schema(&[], &[]), Strategy::AsString));
    reg.register("O", TypeConfig::new(schema(&[], &[]), Strategy::Passthrough));

    let value = obj(&[("a", Value::Number(1.0))]);
    assert_eq!(
        reg.serialize(&value, "J"),
        Some(Serialized::Json(r#"{"a":1.0}"#.to_string()))
    );
    assert_eq!(
        reg.serialize(&value, "S"),
        Some(Serialized::Text("[object Object]".to_string()))
    );
    let Some(Serialized::Raw(raw)) = reg.serialize(&value, "O") else {
        panic!("expected raw serialization");
    };
    assert!(raw.strict_eq(&value));
    assert_eq!(reg.serialize(&value, "missing"), None);
}

// ============================================================================
// Config deserialization
// ============================================================================

#[test]
fn config_deserializes_from_json_schema_shape() {
    let config: TypeConfig = serde_json::from_str(
        r#"{
            "schema": {
                "type": "object",
                "properties": {
                    "file_id": {"type": "string"},
                    "size": {"type": "number"},
                    "weird": {"type": "binary"}
                },
                "required": ["file_id"]
            },
            "serialization": "json"
        }"#,
    )
    .unwrap();
    assert_eq!(config.serialization, Strategy::Json);
    assert_eq!(config.schema.required, ["file_id"]);
    assert_eq!(config.schema.properties["file_id"], PropKind::String);
    assert_eq!(
        config.schema.properties["weird"],
        PropKind::Other("binary".to_string())
    );
}

#[test]
fn strategy_names_follow_the_config_surface() {
    assert_eq!(
        serde_json::from_str::<Strategy>(r#""json""#).unwrap(),
        Strategy::Json
    );
    assert_eq!(
        serde_json::from_str::<Strategy>(r#""string""#).unwrap(),
        Strategy::AsString
    );
    assert_eq!(
        serde_json::from_str::<Strategy>(r#""object""#).unwrap(),
        Strategy::Passthrough
    );
}
