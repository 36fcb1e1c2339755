//! Math Package
//!
//! The qualified `Math.*` operations over IEEE-754 doubles, plus PI and E
//! as zero-argument callables. Sandbox expressions have no ambient `Math`
//! object; the qualified names are ordinary registry keys.

use crate::functions::{ArgKind, Category, FunctionRegistry, SafeFunction};
use crate::values::Value;

// ============================================================================
// Basic operations
// ============================================================================

fn math_abs(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(args[0].to_number().abs()))
}

fn math_min(args: &[Value]) -> Result<Value, String> {
    let mut best = f64::INFINITY;
    for arg in args {
        let n = arg.to_number();
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        best = best.min(n);
    }
    Ok(Value::Number(best))
}

fn math_max(args: &[Value]) -> Result<Value, String> {
    let mut best = f64::NEG_INFINITY;
    for arg in args {
        let n = arg.to_number();
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        best = best.max(n);
    }
    Ok(Value::Number(best))
}

fn math_sign(args: &[Value]) -> Result<Value, String> {
    let n = args[0].to_number();
    Ok(Value::Number(if n.is_nan() || n == 0.0 {
        n
    } else if n > 0.0 {
        1.0
    } else {
        -1.0
    }))
}

// ============================================================================
// Rounding
// ============================================================================

fn math_floor(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(args[0].to_number().floor()))
}

fn math_ceil(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(args[0].to_number().ceil()))
}

/// Half-up rounding: exactly .5 rounds toward positive infinity, which
/// differs from `f64::round` for negative halves.
fn math_round(args: &[Value]) -> Result<Value, String> {
    let n = args[0].to_number();
    Ok(Value::Number(if n.is_finite() {
        (n + 0.5).floor()
    } else {
        n
    }))
}

fn math_trunc(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(args[0].to_number().trunc()))
}

// ============================================================================
// Exponentiation and logarithms
// ============================================================================

fn math_sqrt(args: &[Value]) -> Result<Value, String> {
    // sqrt of a negative is NaN, not an error
    Ok(Value::Number(args[0].to_number().sqrt()))
}

fn math_pow(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(args[0].to_number().powf(args[1].to_number())))
}

fn math_log(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(args[0].to_number().ln()))
}

fn math_exp(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(args[0].to_number().exp()))
}

// ============================================================================
// Constants
// ============================================================================

fn math_pi(_args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(std::f64::consts::PI))
}

fn math_e(_args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(std::f64::consts::E))
}

pub fn install(registry: &mut FunctionRegistry) {
    let unary: [(&str, fn(&[Value]) -> Result<Value, String>); 9] = [
        ("Math.abs", math_abs),
        ("Math.sign", math_sign),
        ("Math.floor", math_floor),
        ("Math.ceil", math_ceil),
        ("Math.round", math_round),
        ("Math.trunc", math_trunc),
        ("Math.sqrt", math_sqrt),
        ("Math.log", math_log),
        ("Math.exp", math_exp),
    ];
    for (name, imp) in unary {
        registry.register(
            SafeFunction::new(name, Category::Math, 1, imp)
                .with_max(1)
                .with_checks(&[ArgKind::Number]),
        );
    }

    registry.register(SafeFunction::new("Math.min", Category::Math, 1, math_min));
    registry.register(SafeFunction::new("Math.max", Category::Math, 1, math_max));
    registry.register(
        SafeFunction::new("Math.pow", Category::Math, 2, math_pow)
            .with_max(2)
            .with_checks(&[ArgKind::Number, ArgKind::Number]),
    );
    registry.register(SafeFunction::new("Math.PI", Category::Math, 0, math_pi).with_max(0));
    registry.register(SafeFunction::new("Math.E", Category::Math, 0, math_e).with_max(0));
}
