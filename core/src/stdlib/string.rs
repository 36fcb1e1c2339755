//! String Package
//!
//! Functions: trim, toUpperCase, toLowerCase, slice, includes,
//!            startsWith, endsWith, replace, split
//!
//! All of these work both as bare calls (`trim(x)`) and as method calls
//! (`x.trim()`); the receiver arrives as the first argument either way.
//! `slice` and `includes` also accept array receivers and are registered
//! here because the string forms dominate in practice.

use crate::functions::{ArgKind, Category, FunctionRegistry, SafeFunction};
use crate::values::Value;

fn str_trim(args: &[Value]) -> Result<Value, String> {
    let s = args[0].as_str().unwrap();
    Ok(Value::str(s.trim()))
}

fn str_to_upper(args: &[Value]) -> Result<Value, String> {
    let s = args[0].as_str().unwrap();
    Ok(Value::str(s.to_uppercase()))
}

fn str_to_lower(args: &[Value]) -> Result<Value, String> {
    let s = args[0].as_str().unwrap();
    Ok(Value::str(s.to_lowercase()))
}

/// Resolve a possibly negative slice bound against a length.
fn slice_bound(raw: Option<&Value>, len: usize, default: usize) -> usize {
    match raw {
        None => default,
        Some(v) => {
            let n = v.to_number();
            if n.is_nan() {
                return 0;
            }
            if n < 0.0 {
                len.saturating_sub((-n) as usize)
            } else {
                (n as usize).min(len)
            }
        }
    }
}

/// `slice(value, start, end?)` over strings (by character) and arrays.
fn shared_slice(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let start = slice_bound(args.get(1), chars.len(), 0);
            let end = slice_bound(args.get(2), chars.len(), chars.len());
            let out: String = if start < end {
                chars[start..end].iter().collect()
            } else {
                String::new()
            };
            Ok(Value::str(out))
        }
        Value::Array(items) => {
            let start = slice_bound(args.get(1), items.len(), 0);
            let end = slice_bound(args.get(2), items.len(), items.len());
            let out = if start < end {
                items[start..end].to_vec()
            } else {
                Vec::new()
            };
            Ok(Value::array(out))
        }
        other => Err(format!("cannot slice a {}", other.kind_name())),
    }
}

/// `includes(value, needle)` over strings and arrays.
fn shared_includes(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::Str(s) => {
            let needle = args[1].to_string();
            Ok(Value::Bool(s.contains(&needle)))
        }
        Value::Array(items) => Ok(Value::Bool(
            items.iter().any(|item| item.strict_eq(&args[1])),
        )),
        other => Err(format!("cannot search a {}", other.kind_name())),
    }
}

fn str_starts_with(args: &[Value]) -> Result<Value, String> {
    let s = args[0].as_str().unwrap();
    let prefix = args[1].to_string();
    Ok(Value::Bool(s.starts_with(&prefix)))
}

fn str_ends_with(args: &[Value]) -> Result<Value, String> {
    let s = args[0].as_str().unwrap();
    let suffix = args[1].to_string();
    Ok(Value::Bool(s.ends_with(&suffix)))
}

/// First-occurrence replacement, like the host runtime's string form.
fn str_replace(args: &[Value]) -> Result<Value, String> {
    let s = args[0].as_str().unwrap();
    let from = args[1].to_string();
    let to = args[2].to_string();
    Ok(Value::str(s.replacen(&from, &to, 1)))
}

/// `split(s, sep)`; an empty separator splits into characters.
fn str_split(args: &[Value]) -> Result<Value, String> {
    let s = args[0].as_str().unwrap();
    let sep = args[1].to_string();
    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::str(c.to_string())).collect()
    } else {
        s.split(&sep as &str).map(Value::str).collect()
    };
    Ok(Value::array(parts))
}

pub fn install(registry: &mut FunctionRegistry) {
    registry.register(
        SafeFunction::new("trim", Category::String, 1, str_trim)
            .with_max(1)
            .with_checks(&[ArgKind::Str])
            .with_description("Remove leading and trailing whitespace"),
    );
    registry.register(
        SafeFunction::new("toUpperCase", Category::String, 1, str_to_upper)
            .with_max(1)
            .with_checks(&[ArgKind::Str])
            .with_description("Uppercase every character"),
    );
    registry.register(
        SafeFunction::new("toLowerCase", Category::String, 1, str_to_lower)
            .with_max(1)
            .with_checks(&[ArgKind::Str])
            .with_description("Lowercase every character"),
    );
    registry.register(
        SafeFunction::new("slice", Category::String, 1, shared_slice)
            .with_max(3)
            .with_description("Slice of a string or array; negative bounds count from the end"),
    );
    registry.register(
        SafeFunction::new("includes", Category::String, 2, shared_includes)
            .with_max(2)
            .with_description("Substring or element containment"),
    );
    registry.register(
        SafeFunction::new("startsWith", Category::String, 2, str_starts_with)
            .with_max(2)
            .with_checks(&[ArgKind::Str])
            .with_description("Prefix test"),
    );
    registry.register(
        SafeFunction::new("endsWith", Category::String, 2, str_ends_with)
            .with_max(2)
            .with_checks(&[ArgKind::Str])
            .with_description("Suffix test"),
    );
    registry.register(
        SafeFunction::new("replace", Category::String, 3, str_replace)
            .with_max(3)
            .with_checks(&[ArgKind::Str])
            .with_description("Replace the first occurrence of a substring"),
    );
    registry.register(
        SafeFunction::new("split", Category::String, 2, str_split)
            .with_max(2)
            .with_checks(&[ArgKind::Str])
            .with_description("Split on a separator; empty separator splits into characters"),
    );
}
