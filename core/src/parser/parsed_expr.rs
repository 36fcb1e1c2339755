//! The immutable parse result: root node plus extracted metadata.

use bumpalo::Bump;

use crate::parser::ast::{Lit, MemberProp, Node, NodeKind, PropertyKey};
use crate::parser::template;
use crate::policy;

/// An immutable bundle of a parsed expression and everything the
/// orchestrator needs to know about it without walking the tree again.
///
/// Allocated in the same arena as the node tree; all slices borrow from
/// it. Collections are arena slices, not `Vec`s, because `Bump` never
/// runs destructors.
#[derive(Debug)]
pub struct ParsedExpression<'a> {
    pub root: &'a Node<'a>,
    pub source: &'a str,
    /// Context roots the expression references, sorted and deduplicated.
    pub dependencies: &'a [&'a str],
    /// Called function names: bare callees plus recognized
    /// `Namespace.method` forms, sorted and deduplicated.
    pub functions: &'a [&'a str],
    /// Weighted node-count estimate, rounded to one decimal.
    pub complexity: f64,
    /// Maximum structural depth of the tree.
    pub depth: usize,
    /// True when the tree contains only identifier / member / literal /
    /// binary / logical nodes.
    pub is_simple: bool,
    /// True when the original input contained template holes.
    pub has_templates: bool,
    /// Rough byte estimate of the tree in memory.
    pub memory_estimate: usize,
}

impl<'a> ParsedExpression<'a> {
    /// Build the bundle for a parsed tree, walking it once for metadata.
    pub fn new(arena: &'a Bump, source: &str, root: &'a Node<'a>) -> &'a ParsedExpression<'a> {
        let mut walker = MetadataWalker::new();
        walker.visit(root, 1);

        walker.dependencies.sort_unstable();
        walker.dependencies.dedup();
        walker.functions.sort_unstable();
        walker.functions.dedup();

        let dependencies: Vec<&'a str> = walker
            .dependencies
            .iter()
            .map(|name| &*arena.alloc_str(name))
            .collect();
        let functions: Vec<&'a str> = walker
            .functions
            .iter()
            .map(|name| &*arena.alloc_str(name))
            .collect();

        arena.alloc(ParsedExpression {
            root,
            source: arena.alloc_str(source),
            dependencies: arena.alloc_slice_copy(&dependencies),
            functions: arena.alloc_slice_copy(&functions),
            complexity: (walker.complexity * 10.0).round() / 10.0,
            depth: walker.depth,
            is_simple: walker.is_simple,
            has_templates: template::has_holes(source),
            memory_estimate: walker.memory,
        })
    }
}

struct MetadataWalker {
    dependencies: Vec<String>,
    functions: Vec<String>,
    complexity: f64,
    depth: usize,
    is_simple: bool,
    memory: usize,
}

impl MetadataWalker {
    fn new() -> Self {
        Self {
            dependencies: Vec::new(),
            functions: Vec::new(),
            complexity: 0.0,
            depth: 0,
            is_simple: true,
            memory: 0,
        }
    }

    fn visit(&mut self, node: &Node<'_>, depth: usize) {
        self.depth = self.depth.max(depth);
        self.complexity += complexity_weight(node);
        self.memory += memory_weight(node);

        match node.kind {
            NodeKind::Literal(_) => {}
            NodeKind::Ident(name) => {
                if policy::is_context_root(name) {
                    self.dependencies.push(name.to_string());
                }
            }
            NodeKind::Member { object, property } => {
                self.visit(object, depth + 1);
                if let MemberProp::Computed(prop) = property {
                    self.visit(prop, depth + 1);
                }
            }
            NodeKind::Call { callee, args } => {
                self.is_simple = false;
                match callee.kind {
                    NodeKind::Ident(name) => {
                        self.functions.push(name.to_string());
                    }
                    NodeKind::Member {
                        object,
                        property: MemberProp::Name(method),
                    } => {
                        if let NodeKind::Ident(ns) = object.kind {
                            if policy::is_static_namespace(ns) {
                                self.functions.push(format!("{}.{}", ns, method));
                            }
                        }
                    }
                    _ => {}
                }
                self.visit(callee, depth + 1);
                for arg in args {
                    self.visit(arg, depth + 1);
                }
            }
            NodeKind::Unary { argument, .. } => {
                self.is_simple = false;
                self.visit(argument, depth + 1);
            }
            NodeKind::Binary { left, right, .. } | NodeKind::Logical { left, right, .. } => {
                self.visit(left, depth + 1);
                self.visit(right, depth + 1);
            }
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.is_simple = false;
                self.visit(test, depth + 1);
                self.visit(consequent, depth + 1);
                self.visit(alternate, depth + 1);
            }
            NodeKind::Array(elements) => {
                self.is_simple = false;
                for element in elements.iter().flatten() {
                    self.visit(element, depth + 1);
                }
            }
            NodeKind::Object(properties) => {
                self.is_simple = false;
                for property in properties {
                    if let PropertyKey::Computed(key) = property.key {
                        self.visit(key, depth + 1);
                    }
                    self.visit(&property.value, depth + 1);
                }
            }
            NodeKind::Arrow { body, .. } => {
                self.is_simple = false;
                self.visit(body, depth + 1);
            }
        }
    }
}

/// Complexity weights: calls and control flow cost more than data access.
fn complexity_weight(node: &Node<'_>) -> f64 {
    match node.kind {
        NodeKind::Call { .. } => 3.0,
        NodeKind::Member { .. } => 1.0,
        NodeKind::Binary { .. } | NodeKind::Logical { .. } => 1.0,
        NodeKind::Conditional { .. } => 4.0,
        NodeKind::Arrow { .. } => 5.0,
        NodeKind::Array(elements) => 2.0 + 0.5 * elements.len() as f64,
        NodeKind::Object(properties) => 2.0 + 0.5 * properties.len() as f64,
        _ => 0.5,
    }
}

/// Per-variant byte estimates; strings weigh two bytes per UTF-16 code
/// unit like the host runtime they model.
fn memory_weight(node: &Node<'_>) -> usize {
    match node.kind {
        NodeKind::Literal(Lit::Str(s)) => 16 + 2 * s.encode_utf16().count(),
        NodeKind::Literal(_) => 16,
        NodeKind::Ident(name) => 16 + 2 * name.encode_utf16().count(),
        NodeKind::Member { .. } => 32,
        NodeKind::Call { .. } => 48,
        NodeKind::Unary { .. } => 24,
        NodeKind::Binary { .. } | NodeKind::Logical { .. } => 32,
        NodeKind::Conditional { .. } => 48,
        NodeKind::Array(_) => 32,
        NodeKind::Object(_) => 48,
        NodeKind::Arrow { .. } => 64,
    }
}
