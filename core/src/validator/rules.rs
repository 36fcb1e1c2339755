//! The built-in rule set: one pre-order walk, all rules applied per node.

use crate::functions::FunctionRegistry;
use crate::parser::{Lit, MemberProp, Node, NodeKind, PropertyKey, Span, UnaryOp};
use crate::policy;
use crate::validator::{CustomRule, Severity, ValidationReport, Violation, ViolationKind};

// Resource-shape caps; exceeding one is a warning, not a block.
const MAX_MEMBER_CHAIN: usize = 10;
const MAX_CALL_ARGS: usize = 20;
const MAX_STRING_LITERAL: usize = 10_000;
const MAX_OBJECT_PROPERTIES: usize = 50;

pub(super) fn walk(
    root: &Node<'_>,
    registry: &FunctionRegistry,
    custom_rules: &[CustomRule],
    report: &mut ValidationReport,
) {
    visit(root, registry, custom_rules, report, false);
}

fn error(report: &mut ValidationReport, kind: ViolationKind, span: Span, message: String) {
    report.violations.push(Violation {
        kind,
        severity: Severity::Error,
        message,
        span,
        suggestion: None,
    });
}

fn error_with(
    report: &mut ValidationReport,
    kind: ViolationKind,
    span: Span,
    message: String,
    suggestion: String,
) {
    report.violations.push(Violation {
        kind,
        severity: Severity::Error,
        message,
        span,
        suggestion: Some(suggestion),
    });
}

fn warn(report: &mut ValidationReport, span: Span, message: String) {
    report.violations.push(Violation {
        kind: ViolationKind::ResourceLimit,
        severity: Severity::Warning,
        message,
        span,
        suggestion: None,
    });
}

fn visit(
    node: &Node<'_>,
    registry: &FunctionRegistry,
    custom_rules: &[CustomRule],
    report: &mut ValidationReport,
    in_member_chain: bool,
) {
    for rule in custom_rules {
        if (rule.check)(node) {
            report.violations.push(Violation {
                kind: ViolationKind::Custom(rule.name.clone()),
                severity: rule.severity,
                message: rule.message.clone(),
                span: node.span,
                suggestion: None,
            });
        }
    }

    match node.kind {
        NodeKind::Literal(lit) => check_literal(lit, node.span, report),

        NodeKind::Ident(name) => check_identifier(name, node.span, report),

        NodeKind::Member { object, property } => {
            check_member(node, object, property, report);
            if !in_member_chain {
                let length = member_chain_length(node);
                if length > MAX_MEMBER_CHAIN {
                    warn(
                        report,
                        node.span,
                        format!(
                            "Member chain of length {} exceeds {}",
                            length, MAX_MEMBER_CHAIN
                        ),
                    );
                }
            }
            visit(object, registry, custom_rules, report, true);
            if let MemberProp::Computed(prop) = property {
                visit(prop, registry, custom_rules, report, false);
            }
        }

        NodeKind::Call { callee, args } => {
            check_call_target(callee, args, registry, report);
            if args.len() > MAX_CALL_ARGS {
                warn(
                    report,
                    node.span,
                    format!("Call with {} arguments exceeds {}", args.len(), MAX_CALL_ARGS),
                );
            }
            visit(callee, registry, custom_rules, report, false);
            for arg in args {
                visit(arg, registry, custom_rules, report, false);
            }
        }

        NodeKind::Unary { op, argument } => {
            if op == UnaryOp::TypeOf {
                // the evaluator knows typeof, but the user-facing surface
                // stays narrow: reject it statically
                error(
                    report,
                    ViolationKind::BlockedOperator,
                    node.span,
                    "Operator 'typeof' is not allowed".to_string(),
                );
            }
            visit(argument, registry, custom_rules, report, false);
        }

        NodeKind::Binary { left, right, .. } | NodeKind::Logical { left, right, .. } => {
            visit(left, registry, custom_rules, report, false);
            visit(right, registry, custom_rules, report, false);
        }

        NodeKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            visit(test, registry, custom_rules, report, false);
            visit(consequent, registry, custom_rules, report, false);
            visit(alternate, registry, custom_rules, report, false);
        }

        NodeKind::Array(elements) => {
            for element in elements.iter().flatten() {
                visit(element, registry, custom_rules, report, false);
            }
        }

        NodeKind::Object(properties) => {
            if properties.len() > MAX_OBJECT_PROPERTIES {
                warn(
                    report,
                    node.span,
                    format!(
                        "Object literal with {} properties exceeds {}",
                        properties.len(),
                        MAX_OBJECT_PROPERTIES
                    ),
                );
            }
            for property in properties {
                if let PropertyKey::Computed(key) = property.key {
                    visit(key, registry, custom_rules, report, false);
                }
                visit(&property.value, registry, custom_rules, report, false);
            }
        }

        NodeKind::Arrow { params, body } => {
            check_arrow_params(params, node.span, report);
            visit(body, registry, custom_rules, report, false);
        }
    }
}

fn check_identifier(name: &str, span: Span, report: &mut ValidationReport) {
    if policy::is_blocked_identifier(name) {
        error_with(
            report,
            ViolationKind::BlockedIdentifier,
            span,
            format!("Identifier '{}' is blocked", name),
            "Only context variables and registered functions are available".to_string(),
        );
    }
}

fn check_literal(lit: Lit<'_>, span: Span, report: &mut ValidationReport) {
    let Lit::Str(text) = lit else { return };
    if let Some(pattern) = policy::find_dangerous_pattern(text) {
        error(
            report,
            ViolationKind::DangerousLiteral,
            span,
            format!("String literal matches dangerous pattern '{}'", pattern),
        );
    }
    if text.len() > MAX_STRING_LITERAL {
        warn(
            report,
            span,
            format!(
                "String literal of {} bytes exceeds {}",
                text.len(),
                MAX_STRING_LITERAL
            ),
        );
    }
}

/// Blocked-property and prototype-chain checks on a member node.
fn check_member(
    node: &Node<'_>,
    object: &Node<'_>,
    property: MemberProp<'_>,
    report: &mut ValidationReport,
) {
    if let Some(name) = static_property_name(property) {
        if policy::is_blocked_property(name) {
            error_with(
                report,
                ViolationKind::BlockedProperty,
                node.span,
                format!("Property '{}' is blocked", name),
                "Prototype and reflection properties are never available".to_string(),
            );
        }
    }

    // obj.__proto__.x / obj['__proto__']['x'] — the inner member already
    // errors, but flag the chained walk explicitly
    if let NodeKind::Member {
        property: inner, ..
    } = object.kind
    {
        if let Some(name) = static_property_name(inner) {
            if policy::is_blocked_property(name) {
                error(
                    report,
                    ViolationKind::PrototypeAccess,
                    node.span,
                    format!("Member access through blocked property '{}'", name),
                );
            }
        }
    }
}

/// The property name when it is statically known: dot access, or a
/// computed access with a string-literal key.
fn static_property_name<'a>(property: MemberProp<'a>) -> Option<&'a str> {
    match property {
        MemberProp::Name(name) => Some(name),
        MemberProp::Computed(node) => match node.kind {
            NodeKind::Literal(Lit::Str(text)) => Some(text),
            _ => None,
        },
    }
}

fn check_call_target(
    callee: &Node<'_>,
    args: &[Node<'_>],
    registry: &FunctionRegistry,
    report: &mut ValidationReport,
) {
    match callee.kind {
        NodeKind::Ident(name) => {
            if !registry.has(name) {
                error_with(
                    report,
                    ViolationKind::UnknownFunction,
                    callee.span,
                    format!("Unknown function '{}'", name),
                    "Register the function before using it".to_string(),
                );
            }
        }
        NodeKind::Member {
            object,
            property: MemberProp::Name(method),
        } => {
            if policy::is_callback_method(method) {
                // callback methods are allowed without a registry entry,
                // but their first argument must be an arrow
                let takes_arrow = args
                    .first()
                    .is_some_and(|arg| matches!(arg.kind, NodeKind::Arrow { .. }));
                if !takes_arrow {
                    error_with(
                        report,
                        ViolationKind::MissingCallback,
                        callee.span,
                        format!("'{}' requires an arrow function as its first argument", method),
                        format!("Write e.g. items.{}(x => ...)", method),
                    );
                }
                return;
            }

            let qualified = match object.kind {
                NodeKind::Ident(ns) if policy::is_static_namespace(ns) => {
                    Some(format!("{}.{}", ns, method))
                }
                _ => None,
            };
            let resolves = qualified.as_deref().is_some_and(|q| registry.has(q))
                || registry.has(method);
            if !resolves {
                error(
                    report,
                    ViolationKind::UnknownFunction,
                    callee.span,
                    format!("Unknown method '{}'", method),
                );
            }
        }
        _ => {
            error(
                report,
                ViolationKind::InvalidCallTarget,
                callee.span,
                "Only named functions and methods can be called".to_string(),
            );
        }
    }
}

fn check_arrow_params(params: &[&str], span: Span, report: &mut ValidationReport) {
    if params.len() > 4 {
        error(
            report,
            ViolationKind::ArrowShape,
            span,
            format!("Arrow function with {} parameters (maximum 4)", params.len()),
        );
    }
    for name in params {
        if policy::is_blocked_identifier(name) {
            error(
                report,
                ViolationKind::BlockedIdentifier,
                span,
                format!("Arrow parameter '{}' is blocked", name),
            );
        }
    }
}

/// Length of a `a.b.c...` chain counted from its outermost member.
fn member_chain_length(node: &Node<'_>) -> usize {
    let mut length = 0;
    let mut current = node;
    loop {
        match current.kind {
            NodeKind::Member { object, .. } => {
                length += 1;
                current = object;
            }
            _ => return length,
        }
    }
}
