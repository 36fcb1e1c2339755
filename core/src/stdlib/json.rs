//! JSON Package
//!
//! `JSON.parse` and `JSON.stringify` with local failure recovery: parse
//! failures produce `null`, stringify failures produce the literal string
//! `"null"`. Template callers embed the result in text and rely on both.

use crate::functions::{ArgKind, Category, FunctionRegistry, SafeFunction};
use crate::values::Value;

fn json_parse(args: &[Value]) -> Result<Value, String> {
    let text = args[0].as_str().unwrap();
    Ok(match serde_json::from_str::<serde_json::Value>(text) {
        Ok(parsed) => Value::from_json(parsed),
        Err(_) => Value::Null,
    })
}

/// `JSON.stringify(value, indent?)`. A numeric second argument selects
/// pretty printing, matching the host API loosely.
fn json_stringify(args: &[Value]) -> Result<Value, String> {
    let json = args[0].to_json();
    let indent = args.get(1).map(|v| v.to_number()).unwrap_or(0.0);
    let rendered = if indent >= 1.0 {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    };
    Ok(Value::str(rendered.unwrap_or_else(|_| "null".to_string())))
}

pub fn install(registry: &mut FunctionRegistry) {
    registry.register(
        SafeFunction::new("JSON.parse", Category::Json, 1, json_parse)
            .with_max(1)
            .with_checks(&[ArgKind::Str])
            .with_description("Parse JSON text; null on failure"),
    );
    registry.register(
        SafeFunction::new("JSON.stringify", Category::Json, 1, json_stringify)
            .with_max(2)
            .with_description("Encode as JSON text; the string \"null\" on failure"),
    );
}
