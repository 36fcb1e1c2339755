//! Operator semantics: the per-op arithmetic, comparison and containment
//! rules the tree walker dispatches to.

use crate::evaluator::EvalError;
use crate::parser::{BinaryOp, Span, UnaryOp};
use crate::values::Value;

pub(super) fn unary(op: UnaryOp, value: &Value) -> Value {
    match op {
        UnaryOp::Plus => Value::Number(value.to_number()),
        UnaryOp::Neg => Value::Number(-value.to_number()),
        UnaryOp::Not => Value::Bool(!value.is_truthy()),
        UnaryOp::TypeOf => Value::str(value.type_of()),
    }
}

pub(super) fn binary(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    span: Span,
) -> Result<Value, EvalError> {
    let result = match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        // IEEE-754: division by zero yields ±Infinity or NaN, not an error
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Rem => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Pow => Value::Number(left.to_number().powf(right.to_number())),
        BinaryOp::Eq => Value::Bool(left.loose_eq(right)),
        BinaryOp::Ne => Value::Bool(!left.loose_eq(right)),
        BinaryOp::StrictEq => Value::Bool(left.strict_eq(right)),
        BinaryOp::StrictNe => Value::Bool(!left.strict_eq(right)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => compare(op, left, right),
        BinaryOp::In => return contains(left, right, span),
    };
    Ok(result)
}

/// `+` first reduces both sides to primitives; if either is then a
/// string the result is concatenation, otherwise double addition.
fn add(left: &Value, right: &Value) -> Value {
    let lp = left.to_primitive();
    let rp = right.to_primitive();
    if matches!(lp, Value::Str(_)) || matches!(rp, Value::Str(_)) {
        Value::str(format!("{}{}", lp, rp))
    } else {
        Value::Number(lp.to_number() + rp.to_number())
    }
}

/// Relational comparison: two strings compare lexicographically, any
/// other pairing compares numerically (NaN makes everything false).
fn compare(op: BinaryOp, left: &Value, right: &Value) -> Value {
    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        return Value::Bool(match op {
            BinaryOp::Lt => a < b,
            BinaryOp::Le => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::Ge => a >= b,
            _ => unreachable!("compare only sees relational ops"),
        });
    }
    let a = left.to_number();
    let b = right.to_number();
    if a.is_nan() || b.is_nan() {
        return Value::Bool(false);
    }
    Value::Bool(match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Le => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::Ge => a >= b,
        _ => unreachable!("compare only sees relational ops"),
    })
}

/// The `in` operator: own-key test on objects, index-range test on
/// arrays; anything else is a runtime error.
fn contains(left: &Value, right: &Value, span: Span) -> Result<Value, EvalError> {
    match right {
        Value::Object(props) => {
            let key = left.to_string();
            Ok(Value::Bool(props.contains_key(&key)))
        }
        Value::Array(items) => {
            let index = left.to_number();
            Ok(Value::Bool(
                index.fract() == 0.0 && index >= 0.0 && (index as usize) < items.len(),
            ))
        }
        other => Err(EvalError::runtime(
            format!("Cannot use 'in' on a {}", other.kind_name()),
            span,
        )),
    }
}
