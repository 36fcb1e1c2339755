//! Core evaluation logic: the tree walker.

use std::time::Instant;

use indexmap::IndexMap;

use crate::cache::LruCache;
use crate::evaluator::{callbacks, operators, EvalError, ExecutionOptions};
use crate::functions::FunctionRegistry;
use crate::parser::{Lit, LogicalOp, MemberProp, Node, NodeKind, PropertyKey, Span};
use crate::policy;
use crate::scope_stack::ScopeStack;
use crate::values::{format_number, Value};

/// Tree-walking interpreter for validated node trees.
///
/// One evaluator handles one `evaluate` call: it borrows the registry and
/// the caller's context, carries the wall-clock deadline and depth
/// budget, and keeps a small per-call memo of primitive property reads.
pub struct Evaluator<'r, 'c> {
    registry: &'r FunctionRegistry,
    pub(super) scopes: ScopeStack<'c>,
    started: Instant,
    options: ExecutionOptions,
    depth: usize,
    property_memo: LruCache<(usize, String), Value>,
}

impl<'r, 'c> Evaluator<'r, 'c> {
    pub fn new(
        registry: &'r FunctionRegistry,
        options: ExecutionOptions,
        context: &'c IndexMap<String, Value>,
    ) -> Self {
        Self {
            registry,
            scopes: ScopeStack::new(context),
            started: Instant::now(),
            options,
            depth: 0,
            property_memo: LruCache::new(128),
        }
    }

    /// Evaluate a node tree against the context.
    pub fn eval(&mut self, node: &Node<'_>) -> Result<Value, EvalError> {
        self.eval_node(node)
    }

    /// Per-dispatch guards: wall clock first, then recursion depth.
    pub(super) fn eval_node(&mut self, node: &Node<'_>) -> Result<Value, EvalError> {
        if self.started.elapsed() >= self.options.timeout {
            return Err(EvalError::Timeout {
                limit: self.options.timeout,
            });
        }
        if self.depth >= self.options.max_depth {
            return Err(EvalError::StackOverflow {
                depth: self.depth,
                max_depth: self.options.max_depth,
            });
        }

        self.depth += 1;
        let result = self.eval_inner(node);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, node: &Node<'_>) -> Result<Value, EvalError> {
        match node.kind {
            NodeKind::Literal(lit) => Ok(match lit {
                Lit::Null => Value::Null,
                Lit::Bool(b) => Value::Bool(b),
                Lit::Num(n) => Value::Number(n),
                Lit::Str(s) => Value::str(s),
            }),

            NodeKind::Ident(name) => Ok(self.resolve_ident(name)),

            NodeKind::Member { object, property } => self.eval_member(object, property, node.span),

            NodeKind::Call { callee, args } => self.eval_call(callee, args, node.span),

            NodeKind::Unary { op, argument } => {
                let value = self.eval_node(argument)?;
                Ok(operators::unary(op, &value))
            }

            NodeKind::Binary { op, left, right } => {
                let left = self.eval_node(left)?;
                let right = self.eval_node(right)?;
                operators::binary(op, &left, &right, node.span)
            }

            NodeKind::Logical { op, left, right } => {
                let left_value = self.eval_node(left)?;
                let take_right = match op {
                    LogicalOp::And => left_value.is_truthy(),
                    LogicalOp::Or => !left_value.is_truthy(),
                    LogicalOp::Nullish => left_value.is_nullish(),
                };
                if take_right {
                    self.eval_node(right)
                } else {
                    Ok(left_value)
                }
            }

            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                // exactly one branch is evaluated
                if self.eval_node(test)?.is_truthy() {
                    self.eval_node(consequent)
                } else {
                    self.eval_node(alternate)
                }
            }

            NodeKind::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(match element {
                        Some(node) => self.eval_node(node)?,
                        None => Value::Undefined,
                    });
                }
                Ok(Value::array(values))
            }

            NodeKind::Object(properties) => {
                let mut map = IndexMap::with_capacity(properties.len());
                for property in properties {
                    let key = match property.key {
                        PropertyKey::Ident(name) | PropertyKey::Str(name) => name.to_string(),
                        PropertyKey::Num(n) => format_number(n),
                        PropertyKey::Computed(expr) => self.eval_node(expr)?.to_string(),
                    };
                    let value = self.eval_node(&property.value)?;
                    // duplicate keys keep the last value (and the first
                    // position, which IndexMap::insert gives us)
                    map.insert(key, value);
                }
                Ok(Value::object(map))
            }

            NodeKind::Arrow { .. } => Err(EvalError::runtime(
                "Arrow functions are only valid as callback arguments",
                node.span,
            )),
        }
    }

    /// Identifier resolution: literal-meaning names first, then the scope
    /// stack; unresolved names are undefined, never an error.
    fn resolve_ident(&self, name: &str) -> Value {
        match name {
            "undefined" => Value::Undefined,
            "NaN" => Value::Number(f64::NAN),
            "Infinity" => Value::Number(f64::INFINITY),
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => self
                .scopes
                .lookup(name)
                .cloned()
                .unwrap_or(Value::Undefined),
        }
    }

    fn eval_member(
        &mut self,
        object: &Node<'_>,
        property: MemberProp<'_>,
        span: Span,
    ) -> Result<Value, EvalError> {
        let target = self.eval_node(object)?;

        // nullish short-circuit: the computed property is not evaluated
        if target.is_nullish() {
            return Ok(Value::Undefined);
        }

        // numeric index path for computed access on arrays and strings
        if let MemberProp::Computed(prop) = property {
            let key = self.eval_node(prop)?;
            if let Value::Number(index) = key {
                if matches!(target, Value::Array(_) | Value::Str(_)) {
                    return Ok(index_access(&target, index));
                }
            }
            return self.named_property(&target, &key.to_string(), span);
        }

        let MemberProp::Name(name) = property else {
            unreachable!("computed handled above")
        };
        self.named_property(&target, name, span)
    }

    /// String-keyed property read with the runtime denylist enforced
    /// (defense in depth behind the validator's static check).
    fn named_property(
        &mut self,
        target: &Value,
        name: &str,
        span: Span,
    ) -> Result<Value, EvalError> {
        if policy::is_blocked_property(name) {
            return Err(EvalError::security(
                format!("Access to property '{}' is blocked", name),
                span,
            ));
        }

        match target {
            Value::Array(items) => Ok(match name {
                "length" => Value::Number(items.len() as f64),
                _ => match name.parse::<f64>() {
                    Ok(index) => index_access(target, index),
                    Err(_) => Value::Undefined,
                },
            }),
            Value::Str(s) => Ok(match name {
                "length" => Value::Number(s.chars().count() as f64),
                _ => match name.parse::<f64>() {
                    Ok(index) => index_access(target, index),
                    Err(_) => Value::Undefined,
                },
            }),
            Value::Object(props) => {
                let memo_key = (std::rc::Rc::as_ptr(props) as usize, name.to_string());
                if let Some(hit) = self.property_memo.get(&memo_key) {
                    return Ok(hit.clone());
                }
                let value = props.get(name).cloned().unwrap_or(Value::Undefined);
                if matches!(
                    value,
                    Value::Null | Value::Bool(_) | Value::Number(_) | Value::Str(_)
                ) {
                    self.property_memo.insert(memo_key, value.clone());
                }
                Ok(value)
            }
            _ => Ok(Value::Undefined),
        }
    }

    fn eval_call(
        &mut self,
        callee: &Node<'_>,
        args: &[Node<'_>],
        span: Span,
    ) -> Result<Value, EvalError> {
        match callee.kind {
            // bare call: resolve in the registry
            NodeKind::Ident(name) => {
                let values = self.eval_args(args)?;
                self.registry
                    .call(name, &values, false)
                    .map_err(EvalError::from)
            }

            NodeKind::Member { object, property } => {
                let MemberProp::Name(method) = property else {
                    return Err(EvalError::runtime(
                        "Only named methods can be called",
                        span,
                    ));
                };

                // qualified form first: `Math.round(x)` is a bare call on
                // the atomic key "Math.round"
                if let NodeKind::Ident(ns) = object.kind {
                    let qualified = format!("{}.{}", ns, method);
                    if self.registry.has(&qualified) {
                        let values = self.eval_args(args)?;
                        return self
                            .registry
                            .call(&qualified, &values, false)
                            .map_err(EvalError::from);
                    }
                }

                let receiver = self.eval_node(object)?;

                // callback methods take their arrow argument unevaluated
                if let Some(method_kind) = callbacks::CallbackMethod::from_name(method) {
                    if let Value::Array(items) = &receiver {
                        let Some(arrow) = args.first() else {
                            return Err(EvalError::runtime(
                                format!("'{}' requires a callback argument", method),
                                span,
                            ));
                        };
                        let NodeKind::Arrow { params, body } = arrow.kind else {
                            return Err(EvalError::runtime(
                                format!(
                                    "'{}' requires an arrow function as its first argument",
                                    method
                                ),
                                span,
                            ));
                        };
                        let extra = self.eval_args(&args[1..])?;
                        let items = items.clone();
                        return callbacks::run(self, method_kind, &items, params, body, &extra);
                    }
                }

                // plain method: receiver becomes the first argument
                if self.registry.has(method) {
                    let mut values = Vec::with_capacity(args.len() + 1);
                    values.push(receiver);
                    values.extend(self.eval_args(args)?);
                    return self
                        .registry
                        .call(method, &values, true)
                        .map_err(EvalError::from);
                }

                Err(EvalError::runtime(
                    format!("Unknown method '{}'", method),
                    span,
                ))
            }

            _ => Err(EvalError::runtime(
                "Only named functions and methods can be called",
                span,
            )),
        }
    }

    /// Arguments evaluate strictly left to right.
    fn eval_args(&mut self, args: &[Node<'_>]) -> Result<Vec<Value>, EvalError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_node(arg)?);
        }
        Ok(values)
    }
}

/// Numeric index into an array or string. Fractional, negative and
/// out-of-range indices are undefined, not errors.
fn index_access(target: &Value, index: f64) -> Value {
    if index.fract() != 0.0 || index < 0.0 {
        return Value::Undefined;
    }
    let index = index as usize;
    match target {
        Value::Array(items) => items.get(index).cloned().unwrap_or(Value::Undefined),
        Value::Str(s) => s
            .chars()
            .nth(index)
            .map(|c| Value::str(c.to_string()))
            .unwrap_or(Value::Undefined),
        _ => Value::Undefined,
    }
}
