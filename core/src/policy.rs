//! The closed security policy: name sets shared by the parser's
//! dependency extraction, the validator's audit and the evaluator's
//! runtime property guard.
//!
//! These lists are deliberately `const` data, not configuration. Widening
//! the sandbox surface should require a source change here, in one place.

use std::sync::LazyLock;

use regex::Regex;

/// Names recognized as context roots for dependency extraction.
pub const CONTEXT_ROOTS: &[&str] = &["item", "inputs", "outputs", "node", "execution"];

/// Names with literal meaning; never free variables, never dependencies.
pub const BUILTIN_NAMES: &[&str] = &["true", "false", "null", "undefined", "NaN", "Infinity"];

/// Namespaces recognized in qualified function names (`Math.round`).
pub const STATIC_NAMESPACES: &[&str] = &[
    "Object", "Math", "JSON", "Date", "Array", "Crypto", "String", "Number",
];

/// Array methods that take an arrow-function callback and are permitted
/// without a registry entry.
pub const CALLBACK_METHODS: &[&str] = &["filter", "map", "find", "some", "every", "reduce"];

/// Identifiers that would expose the host runtime. Referencing any of
/// these (or using one as an arrow parameter) is a hard error.
pub const BLOCKED_IDENTIFIERS: &[&str] = &[
    "eval",
    "Function",
    "constructor",
    "prototype",
    "__proto__",
    "window",
    "document",
    "global",
    "globalThis",
    "self",
    "parent",
    "top",
    "frames",
    "process",
    "require",
    "module",
    "exports",
    "__dirname",
    "__filename",
    "Buffer",
    "setImmediate",
    "clearImmediate",
    "setInterval",
    "clearInterval",
    "alert",
    "confirm",
    "prompt",
    "console",
    "fetch",
    "XMLHttpRequest",
    "localStorage",
    "sessionStorage",
    "indexedDB",
    "location",
    "history",
    "navigator",
    "setTimeout",
    "clearTimeout",
    "Worker",
    "SharedWorker",
    "ServiceWorker",
    "importScripts",
    "import",
    "WebAssembly",
    "WebSocket",
    "EventSource",
    "FileReader",
    "Blob",
    "URL",
    "URLSearchParams",
    "postMessage",
    "MessageChannel",
    "BroadcastChannel",
    "Error",
    "SyntaxError",
    "ReferenceError",
    "TypeError",
];

/// Property names that walk prototype chains or rebind callables.
/// Enforced statically by the validator and again at member access.
pub const BLOCKED_PROPERTIES: &[&str] = &[
    "constructor",
    "prototype",
    "__proto__",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
    "valueOf",
    "toString",
    "hasOwnProperty",
    "isPrototypeOf",
    "propertyIsEnumerable",
    "__defineProperty__",
    "__getOwnPropertyDescriptor__",
    "__getPrototypeOf__",
    "__setPrototypeOf__",
    "apply",
    "call",
    "bind",
];

/// Patterns that make a string literal dangerous on its own: executable
/// URI pseudo-schemes, inline event handlers and bare call forms of
/// blocked globals.
pub static DANGEROUS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)javascript:",
        r"(?i)data:text/html",
        r"(?i)data:application/javascript",
        r"(?i)vbscript:",
        r"(?i)<script",
        r"(?i)\bon\w+\s*=",
        r"\beval\s*\(",
        r"\bFunction\s*\(",
        r"\bsetTimeout\s*\(",
        r"\bsetInterval\s*\(",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("pattern table is static"))
    .collect()
});

pub fn is_context_root(name: &str) -> bool {
    CONTEXT_ROOTS.contains(&name)
}

pub fn is_builtin_name(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

pub fn is_static_namespace(name: &str) -> bool {
    STATIC_NAMESPACES.contains(&name)
}

pub fn is_callback_method(name: &str) -> bool {
    CALLBACK_METHODS.contains(&name)
}

pub fn is_blocked_identifier(name: &str) -> bool {
    BLOCKED_IDENTIFIERS.contains(&name)
}

pub fn is_blocked_property(name: &str) -> bool {
    BLOCKED_PROPERTIES.contains(&name)
}

/// Scan a string literal against the dangerous pattern table. Returns the
/// matching pattern's text for the diagnostic.
pub fn find_dangerous_pattern(text: &str) -> Option<&'static str> {
    static SOURCES: &[&str] = &[
        "javascript:",
        "data:text/html",
        "data:application/javascript",
        "vbscript:",
        "<script",
        "on<event>=",
        "eval(",
        "Function(",
        "setTimeout(",
        "setInterval(",
    ];
    DANGEROUS_PATTERNS
        .iter()
        .position(|re| re.is_match(text))
        .map(|i| SOURCES[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denylists_are_disjoint_from_roots() {
        for root in CONTEXT_ROOTS {
            assert!(!is_blocked_identifier(root), "{root} must stay usable");
        }
    }

    #[test]
    fn dangerous_patterns_match_expected_shapes() {
        assert_eq!(find_dangerous_pattern("JavaScript:alert(1)"), Some("javascript:"));
        assert_eq!(find_dangerous_pattern("<SCRIPT>x</script>"), Some("<script"));
        assert_eq!(find_dangerous_pattern("onclick = steal"), Some("on<event>="));
        assert_eq!(find_dangerous_pattern("eval(payload)"), Some("eval("));
        assert_eq!(find_dangerous_pattern("a perfectly fine string"), None);
    }

    #[test]
    fn every_namespace_is_recognized() {
        for ns in ["Object", "Math", "JSON", "Date", "Array", "Crypto", "String", "Number"] {
            assert!(is_static_namespace(ns));
        }
        assert!(!is_static_namespace("Reflect"));
    }
}
