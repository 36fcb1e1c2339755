//! The callback engine: higher-order array methods whose callbacks are
//! arrow subtrees, not host callables.
//!
//! The arrow body is re-entered through the evaluator under an overlay
//! scope that binds the arrow's parameters positionally. No host closure
//! is ever constructed, which is what keeps the sandbox closed.

use std::rc::Rc;

use crate::evaluator::eval::Evaluator;
use crate::evaluator::EvalError;
use crate::parser::Node;
use crate::values::Value;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum CallbackMethod {
    Filter,
    Map,
    Find,
    Some,
    Every,
    Reduce,
}

impl CallbackMethod {
    pub(super) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "filter" => CallbackMethod::Filter,
            "map" => CallbackMethod::Map,
            "find" => CallbackMethod::Find,
            "some" => CallbackMethod::Some,
            "every" => CallbackMethod::Every,
            "reduce" => CallbackMethod::Reduce,
            _ => return None,
        })
    }
}

/// Bind arrow parameters positionally to the provided values; excess
/// parameters bind to undefined.
fn bind_params(params: &[&str], values: &[Value]) -> Vec<(String, Value)> {
    params
        .iter()
        .enumerate()
        .map(|(i, name)| {
            (
                name.to_string(),
                values.get(i).cloned().unwrap_or(Value::Undefined),
            )
        })
        .collect()
}

/// Evaluate the arrow body once under an overlay scope.
fn call_arrow(
    ev: &mut Evaluator<'_, '_>,
    params: &[&str],
    body: &Node<'_>,
    values: &[Value],
) -> Result<Value, EvalError> {
    ev.scopes.push_overlay(bind_params(params, values));
    let result = ev.eval_node(body);
    ev.scopes.pop_overlay();
    result
}

/// Run a callback method over an array.
///
/// Per-element errors are swallowed according to the method's policy
/// (an erroring element is "no match": false / undefined / skipped /
/// unchanged accumulator) — except resource-cap errors, which always
/// propagate so the caps stay meaningful.
pub(super) fn run(
    ev: &mut Evaluator<'_, '_>,
    method: CallbackMethod,
    items: &Rc<Vec<Value>>,
    params: &[&str],
    body: &Node<'_>,
    extra: &[Value],
) -> Result<Value, EvalError> {
    let array = Value::Array(items.clone());

    match method {
        CallbackMethod::Filter => {
            let mut kept = Vec::new();
            for (index, item) in items.iter().enumerate() {
                let args = [item.clone(), Value::Number(index as f64), array.clone()];
                match call_arrow(ev, params, body, &args) {
                    Ok(result) if result.is_truthy() => kept.push(item.clone()),
                    Ok(_) => {}
                    Err(err) if err.is_resource_limit() => return Err(err),
                    Err(_) => {} // erroring element is false
                }
            }
            Ok(Value::array(kept))
        }

        CallbackMethod::Map => {
            let mut mapped = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let args = [item.clone(), Value::Number(index as f64), array.clone()];
                match call_arrow(ev, params, body, &args) {
                    Ok(result) => mapped.push(result),
                    Err(err) if err.is_resource_limit() => return Err(err),
                    Err(_) => mapped.push(Value::Undefined),
                }
            }
            Ok(Value::array(mapped))
        }

        CallbackMethod::Find => {
            for (index, item) in items.iter().enumerate() {
                let args = [item.clone(), Value::Number(index as f64), array.clone()];
                match call_arrow(ev, params, body, &args) {
                    Ok(result) if result.is_truthy() => return Ok(item.clone()),
                    Ok(_) => {}
                    Err(err) if err.is_resource_limit() => return Err(err),
                    Err(_) => {}
                }
            }
            Ok(Value::Undefined)
        }

        CallbackMethod::Some => {
            for (index, item) in items.iter().enumerate() {
                let args = [item.clone(), Value::Number(index as f64), array.clone()];
                match call_arrow(ev, params, body, &args) {
                    Ok(result) if result.is_truthy() => return Ok(Value::Bool(true)),
                    Ok(_) => {}
                    Err(err) if err.is_resource_limit() => return Err(err),
                    Err(_) => {}
                }
            }
            Ok(Value::Bool(false))
        }

        CallbackMethod::Every => {
            for (index, item) in items.iter().enumerate() {
                let args = [item.clone(), Value::Number(index as f64), array.clone()];
                match call_arrow(ev, params, body, &args) {
                    Ok(result) if !result.is_truthy() => return Ok(Value::Bool(false)),
                    Ok(_) => {}
                    Err(err) if err.is_resource_limit() => return Err(err),
                    Err(_) => return Ok(Value::Bool(false)),
                }
            }
            Ok(Value::Bool(true))
        }

        CallbackMethod::Reduce => {
            // absent initial value seeds the accumulator with undefined;
            // reducing an empty array therefore yields undefined
            let mut accumulator = extra.first().cloned().unwrap_or(Value::Undefined);
            for (index, item) in items.iter().enumerate() {
                let args = [
                    accumulator.clone(),
                    item.clone(),
                    Value::Number(index as f64),
                    array.clone(),
                ];
                match call_arrow(ev, params, body, &args) {
                    Ok(result) => accumulator = result,
                    Err(err) if err.is_resource_limit() => return Err(err),
                    Err(_) => {} // keep the prior accumulator
                }
            }
            Ok(accumulator)
        }
    }
}
