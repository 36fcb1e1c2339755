//! Conditional Package
//!
//! Functions: $if, $and, $or, $not. These exist for templates where the
//! `?:` operator reads poorly; semantics mirror the operators.

use crate::functions::{Category, FunctionRegistry, SafeFunction};
use crate::values::Value;

/// `$if(cond, then, else = null)`.
fn cond_if(args: &[Value]) -> Result<Value, String> {
    Ok(if args[0].is_truthy() {
        args[1].clone()
    } else {
        args.get(2).cloned().unwrap_or(Value::Null)
    })
}

fn cond_and(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Bool(args.iter().all(Value::is_truthy)))
}

fn cond_or(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Bool(args.iter().any(Value::is_truthy)))
}

fn cond_not(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Bool(!args[0].is_truthy()))
}

pub fn install(registry: &mut FunctionRegistry) {
    registry.register(
        SafeFunction::new("$if", Category::Conditional, 2, cond_if)
            .with_max(3)
            .with_description("Ternary as a function; else-branch defaults to null"),
    );
    registry.register(
        SafeFunction::new("$and", Category::Conditional, 0, cond_and)
            .with_description("True when every argument is truthy"),
    );
    registry.register(
        SafeFunction::new("$or", Category::Conditional, 0, cond_or)
            .with_description("True when any argument is truthy"),
    );
    registry.register(
        SafeFunction::new("$not", Category::Conditional, 1, cond_not)
            .with_max(1)
            .with_description("Boolean negation"),
    );
}
