//! Unit tests for the function registry.

use super::*;
use crate::values::Value;

fn double() -> SafeFunction {
    SafeFunction::new("double", Category::Custom, 1, |args| {
        Ok(Value::Number(args[0].to_number() * 2.0))
    })
    .with_max(1)
    .with_checks(&[ArgKind::Number])
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn register_and_lookup() {
    let mut reg = FunctionRegistry::new();
    reg.register(double());
    assert!(reg.has("double"));
    assert!(!reg.has("Double")); // case-sensitive
    assert!(reg.get("double").is_some());
}

#[test]
fn register_overwrites_same_name() {
    let mut reg = FunctionRegistry::new();
    reg.register(double());
    reg.register(SafeFunction::new("double", Category::Custom, 1, |args| {
        Ok(Value::Number(args[0].to_number() * 3.0))
    }));
    assert_eq!(reg.len(), 1);
    let result = reg.call("double", &[Value::Number(2.0)], false).unwrap();
    assert_eq!(result, Value::Number(6.0));
}

#[test]
fn unregister_removes() {
    let mut reg = FunctionRegistry::new();
    reg.register(double());
    assert!(reg.unregister("double"));
    assert!(!reg.unregister("double"));
    assert!(!reg.has("double"));
}

#[test]
fn qualified_names_are_atomic_keys() {
    let mut reg = FunctionRegistry::new();
    reg.register(SafeFunction::new("Math.round", Category::Math, 1, |args| {
        Ok(Value::Number(args[0].to_number().round()))
    }));
    assert!(reg.has("Math.round"));
    assert!(!reg.has("round"));
}

// ============================================================================
// Calling convention
// ============================================================================

#[test]
fn arity_is_enforced() {
    let mut reg = FunctionRegistry::new();
    reg.register(double());
    let err = reg.call("double", &[], false).unwrap_err();
    assert!(matches!(err, FunctionError::Arity { .. }));
    let err = reg
        .call(
            "double",
            &[Value::Number(1.0), Value::Number(2.0)],
            false,
        )
        .unwrap_err();
    assert!(matches!(err, FunctionError::Arity { .. }));
}

#[test]
fn method_calls_relax_minimum_by_one() {
    let mut reg = FunctionRegistry::new();
    reg.register(
        SafeFunction::new("pair", Category::Custom, 2, |args| {
            Ok(Value::array(args.to_vec()))
        })
        .with_max(2),
    );
    // As a bare call, one argument is too few...
    assert!(reg.call("pair", &[Value::Null], false).is_err());
    // ...but as a method the receiver already fills the first slot, so
    // the effective minimum is one.
    assert!(reg.call("pair", &[Value::Null], true).is_ok());
}

#[test]
fn method_minimum_drops_to_zero_at_floor() {
    let mut reg = FunctionRegistry::new();
    reg.register(SafeFunction::new("zero", Category::Custom, 0, |_| {
        Ok(Value::Null)
    }));
    assert!(reg.call("zero", &[], true).is_ok());
}

#[test]
fn type_checks_are_positional() {
    let mut reg = FunctionRegistry::new();
    reg.register(double());
    let err = reg.call("double", &[Value::str("nope")], false).unwrap_err();
    let FunctionError::ArgType {
        index, expected, ..
    } = err
    else {
        panic!("expected ArgType, got {:?}", err);
    };
    assert_eq!(index, 0);
    assert_eq!(expected, ArgKind::Number);
}

#[test]
fn nullish_fails_typed_checks_but_passes_any() {
    assert!(!ArgKind::Number.matches(&Value::Null));
    assert!(!ArgKind::Str.matches(&Value::Undefined));
    assert!(ArgKind::Any.matches(&Value::Undefined));
}

#[test]
fn implementation_errors_are_rewrapped_with_the_name() {
    let mut reg = FunctionRegistry::new();
    reg.register(SafeFunction::new("boom", Category::Custom, 0, |_| {
        Err("it broke".to_string())
    }));
    let err = reg.call("boom", &[], false).unwrap_err();
    assert_eq!(err.to_string(), "Error in function 'boom': it broke");
}

#[test]
fn unknown_function_errors() {
    let reg = FunctionRegistry::new();
    let err = reg.call("nothing", &[], false).unwrap_err();
    assert!(matches!(err, FunctionError::Unknown { .. }));
}

// ============================================================================
// Listing, stats, export/import
// ============================================================================

#[test]
fn list_filters_by_category_and_sorts() {
    let mut reg = FunctionRegistry::new();
    reg.register(SafeFunction::new("zeta", Category::Custom, 0, |_| Ok(Value::Null)));
    reg.register(SafeFunction::new("alpha", Category::Custom, 0, |_| Ok(Value::Null)));
    reg.register(SafeFunction::new("mid", Category::Math, 0, |_| Ok(Value::Null)));

    let names: Vec<&str> = reg
        .list(Some(Category::Custom))
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, ["alpha", "zeta"]);
    assert_eq!(reg.list(None).len(), 3);
}

#[test]
fn stats_count_by_category() {
    let mut reg = FunctionRegistry::new();
    reg.register(SafeFunction::new("a", Category::Math, 0, |_| Ok(Value::Null)));
    reg.register(SafeFunction::new("b", Category::Math, 0, |_| Ok(Value::Null)));
    let stats = reg.stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.by_category, vec![(Category::Math, 2)]);
}

#[test]
fn export_import_round_trip() {
    let mut reg = FunctionRegistry::new();
    reg.register(double());
    let mut other = FunctionRegistry::new();
    other.import(reg.export());
    assert!(other.has("double"));
    let result = other.call("double", &[Value::Number(4.0)], false).unwrap();
    assert_eq!(result, Value::Number(8.0));
}
