//! Array Package
//!
//! Functions: length, join, first, last, reverse, flatten, unique, chunk
//!
//! The higher-order operations (filter, map, reduce, ...) are not here:
//! their callbacks are node subtrees, so they live in the evaluator's
//! callback engine rather than the registry.

use crate::functions::{ArgKind, Category, FunctionRegistry, SafeFunction};
use crate::values::Value;

/// Length of an array or string; undefined for anything else.
fn arr_length(args: &[Value]) -> Result<Value, String> {
    Ok(match &args[0] {
        Value::Array(items) => Value::Number(items.len() as f64),
        Value::Str(s) => Value::Number(s.chars().count() as f64),
        _ => Value::Undefined,
    })
}

fn arr_join(args: &[Value]) -> Result<Value, String> {
    let items = args[0].as_array().unwrap();
    let sep = match args.get(1) {
        Some(v) => v.to_string(),
        None => ",".to_string(),
    };
    let parts: Vec<String> = items
        .iter()
        .map(|item| {
            if item.is_nullish() {
                String::new()
            } else {
                item.to_string()
            }
        })
        .collect();
    Ok(Value::str(parts.join(&sep)))
}

fn arr_first(args: &[Value]) -> Result<Value, String> {
    let items = args[0].as_array().unwrap();
    Ok(items.first().cloned().unwrap_or_default())
}

fn arr_last(args: &[Value]) -> Result<Value, String> {
    let items = args[0].as_array().unwrap();
    Ok(items.last().cloned().unwrap_or_default())
}

/// Returns a reversed copy; the receiver is never mutated.
fn arr_reverse(args: &[Value]) -> Result<Value, String> {
    let items = args[0].as_array().unwrap();
    let mut out = items.to_vec();
    out.reverse();
    Ok(Value::array(out))
}

fn flatten_into(out: &mut Vec<Value>, items: &[Value], depth: usize) {
    for item in items {
        match item {
            Value::Array(inner) if depth > 0 => flatten_into(out, inner, depth - 1),
            other => out.push(other.clone()),
        }
    }
}

/// `flatten(arr, depth = 1)`.
fn arr_flatten(args: &[Value]) -> Result<Value, String> {
    let items = args[0].as_array().unwrap();
    let depth = match args.get(1) {
        Some(v) => {
            let n = v.to_number();
            if n.is_nan() || n < 0.0 {
                0
            } else {
                n as usize
            }
        }
        None => 1,
    };
    let mut out = Vec::new();
    flatten_into(&mut out, items, depth);
    Ok(Value::array(out))
}

/// Deduplicate, keeping first occurrences. Primitives compare by value,
/// compound values by identity.
fn arr_unique(args: &[Value]) -> Result<Value, String> {
    let items = args[0].as_array().unwrap();
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.iter().any(|seen| seen.strict_eq(item)) {
            out.push(item.clone());
        }
    }
    Ok(Value::array(out))
}

fn arr_chunk(args: &[Value]) -> Result<Value, String> {
    let items = args[0].as_array().unwrap();
    let size = args[1].to_number();
    if size.is_nan() || size < 1.0 {
        return Err("chunk size must be a positive number".to_string());
    }
    let size = size as usize;
    let chunks: Vec<Value> = items
        .chunks(size)
        .map(|chunk| Value::array(chunk.to_vec()))
        .collect();
    Ok(Value::array(chunks))
}

pub fn install(registry: &mut FunctionRegistry) {
    registry.register(
        SafeFunction::new("length", Category::Array, 1, arr_length)
            .with_max(1)
            .with_description("Element count of an array or character count of a string"),
    );
    registry.register(
        SafeFunction::new("join", Category::Array, 1, arr_join)
            .with_max(2)
            .with_checks(&[ArgKind::Array])
            .with_description("Join elements into a string; default separator is ','"),
    );
    registry.register(
        SafeFunction::new("first", Category::Array, 1, arr_first)
            .with_max(1)
            .with_checks(&[ArgKind::Array])
            .with_description("First element, or undefined when empty"),
    );
    registry.register(
        SafeFunction::new("last", Category::Array, 1, arr_last)
            .with_max(1)
            .with_checks(&[ArgKind::Array])
            .with_description("Last element, or undefined when empty"),
    );
    registry.register(
        SafeFunction::new("reverse", Category::Array, 1, arr_reverse)
            .with_max(1)
            .with_checks(&[ArgKind::Array])
            .with_description("Reversed copy"),
    );
    registry.register(
        SafeFunction::new("flatten", Category::Array, 1, arr_flatten)
            .with_max(2)
            .with_checks(&[ArgKind::Array])
            .with_description("Flatten nested arrays to the given depth (default 1)"),
    );
    registry.register(
        SafeFunction::new("unique", Category::Array, 1, arr_unique)
            .with_max(1)
            .with_checks(&[ArgKind::Array])
            .with_description("Deduplicate, keeping first occurrences"),
    );
    registry.register(
        SafeFunction::new("chunk", Category::Array, 2, arr_chunk)
            .with_max(2)
            .with_checks(&[ArgKind::Array, ArgKind::Number])
            .with_description("Split into fixed-size chunks"),
    );
}
