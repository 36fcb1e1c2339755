//! Object Package
//!
//! Functions: keys, values, entries — registered both bare and as the
//! qualified `Object.*` forms so `Object.keys(x)` and `x.keys()` resolve
//! to the same implementations.

use crate::functions::{ArgKind, Category, FunctionRegistry, SafeFunction};
use crate::values::Value;

fn obj_keys(args: &[Value]) -> Result<Value, String> {
    let obj = args[0].as_object().unwrap();
    Ok(Value::array(obj.keys().map(Value::str).collect()))
}

fn obj_values(args: &[Value]) -> Result<Value, String> {
    let obj = args[0].as_object().unwrap();
    Ok(Value::array(obj.values().cloned().collect()))
}

fn obj_entries(args: &[Value]) -> Result<Value, String> {
    let obj = args[0].as_object().unwrap();
    Ok(Value::array(
        obj.iter()
            .map(|(k, v)| Value::array(vec![Value::str(k), v.clone()]))
            .collect(),
    ))
}

pub fn install(registry: &mut FunctionRegistry) {
    let table: [(&str, fn(&[Value]) -> Result<Value, String>, &str); 3] = [
        ("keys", obj_keys, "Own property names, in insertion order"),
        ("values", obj_values, "Own property values, in insertion order"),
        ("entries", obj_entries, "Own [key, value] pairs, in insertion order"),
    ];
    for (name, imp, description) in table {
        for key in [name.to_string(), format!("Object.{}", name)] {
            registry.register(
                SafeFunction::new(key, Category::Object, 1, imp)
                    .with_max(1)
                    .with_checks(&[ArgKind::Object])
                    .with_description(description),
            );
        }
    }
}
