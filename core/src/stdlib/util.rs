//! Utility Package
//!
//! Functions: isEmpty, hasField.

use crate::functions::{Category, FunctionRegistry, SafeFunction};
use crate::values::Value;

/// Nullish values, empty strings, empty arrays and empty objects are
/// empty; everything else (including 0 and false) is not.
fn util_is_empty(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Bool(match &args[0] {
        Value::Undefined | Value::Null => true,
        Value::Str(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(props) => props.is_empty(),
        _ => false,
    }))
}

fn util_has_field(args: &[Value]) -> Result<Value, String> {
    let name = args[1].to_string();
    Ok(Value::Bool(
        args[0]
            .as_object()
            .is_some_and(|obj| obj.contains_key(&name)),
    ))
}

pub fn install(registry: &mut FunctionRegistry) {
    registry.register(
        SafeFunction::new("isEmpty", Category::Utility, 1, util_is_empty)
            .with_max(1)
            .with_description("True for nullish values and empty strings/arrays/objects"),
    );
    registry.register(
        SafeFunction::new("hasField", Category::Utility, 2, util_has_field)
            .with_max(2)
            .with_description("True when an object has the named own property"),
    );
}
