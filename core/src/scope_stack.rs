//! Scope stack for name resolution during evaluation.
//!
//! The base scope is the caller's context, borrowed immutably. Callback
//! evaluation pushes *overlay* scopes that bind the arrow's parameters on
//! top; overlays shadow outer bindings and never touch the base, so a
//! context reused across evaluations observes no mutation.

use indexmap::IndexMap;

use crate::values::Value;

/// One resolution frame.
enum Scope<'c> {
    /// The caller's context; immutable, searched last.
    Base(&'c IndexMap<String, Value>),
    /// Callback parameter bindings; small and positional.
    Overlay(Vec<(String, Value)>),
}

impl Scope<'_> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        match self {
            Scope::Base(map) => map.get(name),
            Scope::Overlay(bindings) => bindings
                .iter()
                .rev()
                .find(|(bound, _)| bound == name)
                .map(|(_, value)| value),
        }
    }
}

/// A stack of scopes searched from innermost to outermost.
pub struct ScopeStack<'c> {
    scopes: Vec<Scope<'c>>,
}

impl<'c> ScopeStack<'c> {
    pub fn new(base: &'c IndexMap<String, Value>) -> Self {
        Self {
            scopes: vec![Scope::Base(base)],
        }
    }

    /// Push callback parameter bindings.
    pub fn push_overlay(&mut self, bindings: Vec<(String, Value)>) {
        self.scopes.push(Scope::Overlay(bindings));
    }

    /// Pop the innermost overlay. The base scope is never popped.
    pub fn pop_overlay(&mut self) {
        debug_assert!(self.scopes.len() > 1, "no overlay to pop");
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Look up a name, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.lookup(name))
    }

    /// Current overlay depth (0 outside any callback).
    pub fn overlay_depth(&self) -> usize {
        self.scopes.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> IndexMap<String, Value> {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::Number(1.0));
        map.insert("b".to_string(), Value::Number(2.0));
        map
    }

    #[test]
    fn base_scope_lookup() {
        let ctx = base();
        let stack = ScopeStack::new(&ctx);
        assert_eq!(stack.lookup("a"), Some(&Value::Number(1.0)));
        assert_eq!(stack.lookup("missing"), None);
    }

    #[test]
    fn overlay_shadows_base() {
        let ctx = base();
        let mut stack = ScopeStack::new(&ctx);
        stack.push_overlay(vec![("a".to_string(), Value::Number(10.0))]);
        assert_eq!(stack.lookup("a"), Some(&Value::Number(10.0)));
        assert_eq!(stack.lookup("b"), Some(&Value::Number(2.0)));

        stack.pop_overlay();
        assert_eq!(stack.lookup("a"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn later_bindings_shadow_earlier_within_an_overlay() {
        let ctx = base();
        let mut stack = ScopeStack::new(&ctx);
        stack.push_overlay(vec![
            ("x".to_string(), Value::Number(1.0)),
            ("x".to_string(), Value::Number(2.0)),
        ]);
        assert_eq!(stack.lookup("x"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn overlays_nest() {
        let ctx = base();
        let mut stack = ScopeStack::new(&ctx);
        stack.push_overlay(vec![("x".to_string(), Value::Number(1.0))]);
        stack.push_overlay(vec![("x".to_string(), Value::Number(2.0))]);
        assert_eq!(stack.overlay_depth(), 2);
        assert_eq!(stack.lookup("x"), Some(&Value::Number(2.0)));
        stack.pop_overlay();
        assert_eq!(stack.lookup("x"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn base_is_never_mutated() {
        let ctx = base();
        {
            let mut stack = ScopeStack::new(&ctx);
            stack.push_overlay(vec![("a".to_string(), Value::str("shadow"))]);
            assert_eq!(stack.lookup("a"), Some(&Value::str("shadow")));
        }
        assert_eq!(ctx.get("a"), Some(&Value::Number(1.0)));
        assert_eq!(ctx.len(), 2);
    }
}
