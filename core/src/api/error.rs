//! The API-boundary error: everything a failed `evaluate` can report.

use snafu::Snafu;

use crate::evaluator::EvalError;
use crate::functions::FunctionError;
use crate::parser::{ParseError, Span};
use crate::validator::Violation;

/// Coarse error classification exposed to callers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Security,
    Runtime,
    Type,
    Complexity,
    Timeout,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Security => "security",
            ErrorKind::Runtime => "runtime",
            ErrorKind::Type => "type",
            ErrorKind::Complexity => "complexity",
            ErrorKind::Timeout => "timeout",
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EngineError {
    /// The input could not be lifted into the node model.
    #[snafu(display("Parse error: {message}"))]
    Parse { message: String, span: Option<Span> },

    /// The validator produced at least one error-severity violation.
    #[snafu(display("Expression rejected: {}", violation_summary(violations)))]
    Rejected { violations: Vec<Violation> },

    /// Parse-metadata complexity over the configured cap.
    #[snafu(display("Expression complexity {complexity} exceeds the limit of {limit}"))]
    TooComplex { complexity: f64, limit: f64 },

    /// Parse-metadata depth over the configured cap.
    #[snafu(display("Expression depth {depth} exceeds the limit of {limit}"))]
    TooDeep { depth: usize, limit: usize },

    /// Evaluation failed.
    #[snafu(display("{source}"))]
    Eval { source: EvalError },

    /// A template hole failed; the whole template aborts.
    #[snafu(display("In template hole '{{{{{hole}}}}}': {source}"))]
    TemplateHole {
        hole: String,
        #[snafu(source(from(EngineError, Box::new)))]
        source: Box<EngineError>,
    },
}

impl EngineError {
    pub(crate) fn from_parse(err: &ParseError) -> Self {
        EngineError::Parse {
            message: err.to_string(),
            span: Some(err.span()),
        }
    }

    /// Structural classification (no message sniffing).
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Parse { .. } => ErrorKind::Syntax,
            EngineError::Rejected { .. } => ErrorKind::Security,
            EngineError::TooComplex { .. } | EngineError::TooDeep { .. } => ErrorKind::Complexity,
            EngineError::Eval { source } => match source {
                EvalError::Security { .. } => ErrorKind::Security,
                EvalError::Runtime { .. } => ErrorKind::Runtime,
                EvalError::Function(err) => match err {
                    FunctionError::Arity { .. } | FunctionError::ArgType { .. } => ErrorKind::Type,
                    FunctionError::Unknown { .. } | FunctionError::Failed { .. } => {
                        ErrorKind::Runtime
                    }
                },
                EvalError::Timeout { .. } | EvalError::StackOverflow { .. } => ErrorKind::Timeout,
            },
            EngineError::TemplateHole { source, .. } => source.kind(),
        }
    }
}

fn violation_summary(violations: &[Violation]) -> String {
    let mut errors = violations
        .iter()
        .filter(|v| v.severity == crate::validator::Severity::Error);
    match errors.next() {
        Some(first) => {
            let rest = errors.count();
            if rest == 0 {
                first.to_string()
            } else {
                format!("{} (+{} more)", first, rest)
            }
        }
        None => "no error violations".to_string(),
    }
}
