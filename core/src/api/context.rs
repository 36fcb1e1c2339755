//! Expression contexts: the variables an evaluation sees.

use indexmap::IndexMap;

use crate::values::Value;

/// A name → value mapping supplied by the caller. The evaluator reads it
/// through an immutable borrow; reusing a context across evaluations
/// never observes mutation.
#[derive(Debug, Clone, Default)]
pub struct Context {
    vars: IndexMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object; each top-level key becomes a context
    /// root. Returns `None` when the document is not an object.
    pub fn from_json(json: serde_json::Value) -> Option<Self> {
        match Value::from_json(json) {
            Value::Object(props) => Some(Self {
                vars: props.as_ref().clone(),
            }),
            _ => None,
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.vars.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub(crate) fn vars(&self) -> &IndexMap<String, Value> {
        &self.vars
    }
}

impl From<IndexMap<String, Value>> for Context {
    fn from(vars: IndexMap<String, Value>) -> Self {
        Self { vars }
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}
