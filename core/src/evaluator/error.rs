//! Runtime evaluation errors.
//!
//! Validation catches most unsafe shapes before execution, so the
//! evaluator's own errors are runtime facts: denylist hits on dynamic
//! property names, unknown functions in non-strict mode, resource caps.

use std::fmt;
use std::time::Duration;

use crate::functions::FunctionError;
use crate::parser::Span;

#[derive(Debug, Clone)]
pub enum EvalError {
    /// Runtime property-denylist hit (defense in depth).
    Security { message: String, span: Option<Span> },

    /// Ordinary runtime failure: unknown method, bad `in` operand, an
    /// arrow outside a callback position.
    Runtime { message: String, span: Option<Span> },

    /// Registry dispatch failed (arity, type check, or the
    /// implementation itself).
    Function(FunctionError),

    /// Wall-clock budget exhausted.
    Timeout { limit: Duration },

    /// Evaluation recursion depth exceeded.
    StackOverflow { depth: usize, max_depth: usize },
}

impl EvalError {
    pub fn security(message: impl Into<String>, span: Span) -> Self {
        EvalError::Security {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn runtime(message: impl Into<String>, span: Span) -> Self {
        EvalError::Runtime {
            message: message.into(),
            span: Some(span),
        }
    }

    /// Resource-cap errors must not be swallowed by callback policies.
    pub fn is_resource_limit(&self) -> bool {
        matches!(
            self,
            EvalError::Timeout { .. } | EvalError::StackOverflow { .. }
        )
    }
}

impl From<FunctionError> for EvalError {
    fn from(err: FunctionError) -> Self {
        EvalError::Function(err)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Security { message, span } => {
                write!(f, "Security violation: {}", message)?;
                if let Some(span) = span {
                    write!(f, " at {}..{}", span.start, span.end)?;
                }
                Ok(())
            }
            EvalError::Runtime { message, span } => {
                write!(f, "{}", message)?;
                if let Some(span) = span {
                    write!(f, " at {}..{}", span.start, span.end)?;
                }
                Ok(())
            }
            EvalError::Function(err) => write!(f, "{}", err),
            EvalError::Timeout { limit } => {
                write!(f, "Evaluation timed out after {:?}", limit)
            }
            EvalError::StackOverflow { depth, max_depth } => {
                write!(
                    f,
                    "Evaluation stack overflow: depth {} exceeds maximum of {}",
                    depth, max_depth
                )
            }
        }
    }
}

impl std::error::Error for EvalError {}
