//! Security validator: a pre-order audit of node trees against the
//! closed policy.
//!
//! The validator sits between parser and evaluator the way a type checker
//! would: it never executes anything, it only accumulates violations. A
//! tree is accepted iff no error-severity violation was produced;
//! warnings (resource-shape findings) never block.

mod rules;


use std::fmt;
use std::sync::Arc;

use crate::functions::FunctionRegistry;
use crate::parser::{Node, Span};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// What a violation is about. `as_str` yields the stable machine name
/// reported to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    BlockedIdentifier,
    BlockedProperty,
    PrototypeAccess,
    UnknownFunction,
    InvalidCallTarget,
    MissingCallback,
    BlockedOperator,
    ArrowShape,
    DangerousLiteral,
    ResourceLimit,
    Custom(String),
}

impl ViolationKind {
    pub fn as_str(&self) -> &str {
        match self {
            ViolationKind::BlockedIdentifier => "blocked_identifier",
            ViolationKind::BlockedProperty => "blocked_property",
            ViolationKind::PrototypeAccess => "prototype_access",
            ViolationKind::UnknownFunction => "unknown_function",
            ViolationKind::InvalidCallTarget => "invalid_call_target",
            ViolationKind::MissingCallback => "missing_callback",
            ViolationKind::BlockedOperator => "blocked_operator",
            ViolationKind::ArrowShape => "arrow_shape",
            ViolationKind::DangerousLiteral => "dangerous_literal",
            ViolationKind::ResourceLimit => "resource_limit",
            ViolationKind::Custom(name) => name,
        }
    }
}

/// A single finding, pointing back into the source.
#[derive(Debug, Clone)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub suggestion: Option<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}

/// Everything the walk produced, warnings included.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Accepted iff no error-severity violation exists.
    pub fn is_valid(&self) -> bool {
        !self
            .violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
    }
}

/// A caller-installed rule: a predicate run on every node. A `true`
/// result records a violation of the given kind and severity.
#[derive(Clone)]
pub struct CustomRule {
    pub name: String,
    pub severity: Severity,
    pub message: String,
    pub check: Arc<dyn Fn(&Node<'_>) -> bool + Send + Sync>,
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("name", &self.name)
            .field("severity", &self.severity)
            .finish()
    }
}

/// The audit pass. Holds the custom rule set; the built-in policy is
/// compiled in.
#[derive(Debug, Default, Clone)]
pub struct Validator {
    custom_rules: Vec<CustomRule>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, rule: CustomRule) {
        self.custom_rules.push(rule);
    }

    /// Audit a tree. The registry is consulted for call-target
    /// resolution only; nothing is invoked.
    pub fn validate(&self, root: &Node<'_>, registry: &FunctionRegistry) -> ValidationReport {
        let mut report = ValidationReport::default();
        rules::walk(root, registry, &self.custom_rules, &mut report);
        report
    }
}
