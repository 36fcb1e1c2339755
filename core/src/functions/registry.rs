use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::values::Value;

/// Signature of a registered implementation. Errors are plain messages;
/// the registry rewraps them with the function name.
pub type FunctionImpl = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Category tag, used for listing and stats.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    String,
    Array,
    Object,
    Math,
    Date,
    Json,
    Crypto,
    Conditional,
    Utility,
    Custom,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::String,
        Category::Array,
        Category::Object,
        Category::Math,
        Category::Date,
        Category::Json,
        Category::Crypto,
        Category::Conditional,
        Category::Utility,
        Category::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::String => "string",
            Category::Array => "array",
            Category::Object => "object",
            Category::Math => "math",
            Category::Date => "date",
            Category::Json => "json",
            Category::Crypto => "crypto",
            Category::Conditional => "conditional",
            Category::Utility => "utility",
            Category::Custom => "custom",
        }
    }
}

/// Positional argument expectation. `Any` accepts everything including
/// nullish values; the typed kinds reject them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArgKind {
    Any,
    Number,
    Str,
    Bool,
    Array,
    Object,
}

impl ArgKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgKind::Any => "any",
            ArgKind::Number => "number",
            ArgKind::Str => "string",
            ArgKind::Bool => "boolean",
            ArgKind::Array => "array",
            ArgKind::Object => "object",
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ArgKind::Any => true,
            ArgKind::Number => matches!(value, Value::Number(_)),
            ArgKind::Str => matches!(value, Value::Str(_)),
            ArgKind::Bool => matches!(value, Value::Bool(_)),
            ArgKind::Array => matches!(value, Value::Array(_)),
            ArgKind::Object => matches!(value, Value::Object(_)),
        }
    }
}

/// Errors surfaced by registry dispatch.
#[derive(Debug, Clone)]
pub enum FunctionError {
    Unknown {
        name: String,
    },
    Arity {
        name: String,
        min: usize,
        max: Option<usize>,
        got: usize,
    },
    ArgType {
        name: String,
        index: usize,
        expected: ArgKind,
        got: &'static str,
    },
    /// The implementation itself failed.
    Failed {
        name: String,
        message: String,
    },
}

impl fmt::Display for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionError::Unknown { name } => write!(f, "Unknown function '{}'", name),
            FunctionError::Arity {
                name,
                min,
                max,
                got,
            } => match max {
                Some(max) if max == min => write!(
                    f,
                    "Function '{}' expects {} argument(s), got {}",
                    name, min, got
                ),
                Some(max) => write!(
                    f,
                    "Function '{}' expects between {} and {} arguments, got {}",
                    name, min, max, got
                ),
                None => write!(
                    f,
                    "Function '{}' expects at least {} argument(s), got {}",
                    name, min, got
                ),
            },
            FunctionError::ArgType {
                name,
                index,
                expected,
                got,
            } => write!(
                f,
                "Function '{}' expects {} for argument {}, got {}",
                name,
                expected.as_str(),
                index + 1,
                got
            ),
            FunctionError::Failed { name, message } => {
                write!(f, "Error in function '{}': {}", name, message)
            }
        }
    }
}

impl std::error::Error for FunctionError {}

/// A registered callable with its calling convention.
#[derive(Clone)]
pub struct SafeFunction {
    pub name: String,
    pub category: Category,
    pub min_args: usize,
    pub max_args: Option<usize>,
    /// Positional checks; shorter than the argument list means the tail
    /// is unchecked.
    pub type_checks: Vec<ArgKind>,
    pub description: String,
    imp: FunctionImpl,
}

impl fmt::Debug for SafeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeFunction")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish()
    }
}

impl SafeFunction {
    pub fn new(
        name: impl Into<String>,
        category: Category,
        min_args: usize,
        imp: impl Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            min_args,
            max_args: None,
            type_checks: Vec::new(),
            description: String::new(),
            imp: Arc::new(imp),
        }
    }

    pub fn with_max(mut self, max_args: usize) -> Self {
        debug_assert!(self.min_args <= max_args);
        self.max_args = Some(max_args);
        self
    }

    pub fn with_checks(mut self, checks: &[ArgKind]) -> Self {
        self.type_checks = checks.to_vec();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Apply arity and type checks, then invoke. When called as a method
    /// the receiver is already the first argument and the effective
    /// minimum drops by one.
    pub fn invoke(&self, args: &[Value], as_method: bool) -> Result<Value, FunctionError> {
        let min = if as_method {
            self.min_args.saturating_sub(1)
        } else {
            self.min_args
        };
        if args.len() < min || self.max_args.is_some_and(|max| args.len() > max) {
            return Err(FunctionError::Arity {
                name: self.name.clone(),
                min,
                max: self.max_args,
                got: args.len(),
            });
        }
        for (index, (check, arg)) in self.type_checks.iter().zip(args.iter()).enumerate() {
            if !check.matches(arg) {
                return Err(FunctionError::ArgType {
                    name: self.name.clone(),
                    index,
                    expected: *check,
                    got: arg.kind_name(),
                });
            }
        }
        (self.imp)(args).map_err(|message| FunctionError::Failed {
            name: self.name.clone(),
            message,
        })
    }
}

/// Per-category counts returned by [`FunctionRegistry::stats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub total: usize,
    pub by_category: Vec<(Category, usize)>,
}

/// Name-keyed store of safe callables. Lookup is exact and
/// case-sensitive; registering over an existing name replaces it.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    entries: HashMap<String, SafeFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, function: SafeFunction) {
        self.entries.insert(function.name.clone(), function);
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&SafeFunction> {
        self.entries.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered functions, optionally restricted to a category, sorted
    /// by name.
    pub fn list(&self, category: Option<Category>) -> Vec<&SafeFunction> {
        let mut functions: Vec<&SafeFunction> = self
            .entries
            .values()
            .filter(|f| category.is_none_or(|c| f.category == c))
            .collect();
        functions.sort_by(|a, b| a.name.cmp(&b.name));
        functions
    }

    pub fn stats(&self) -> RegistryStats {
        let mut by_category: Vec<(Category, usize)> = Vec::new();
        for category in Category::ALL {
            let count = self
                .entries
                .values()
                .filter(|f| f.category == *category)
                .count();
            if count > 0 {
                by_category.push((*category, count));
            }
        }
        RegistryStats {
            total: self.entries.len(),
            by_category,
        }
    }

    /// Snapshot every entry, e.g. to seed another registry.
    pub fn export(&self) -> Vec<SafeFunction> {
        let mut functions: Vec<SafeFunction> = self.entries.values().cloned().collect();
        functions.sort_by(|a, b| a.name.cmp(&b.name));
        functions
    }

    /// Bulk-register; same overwrite semantics as [`register`].
    ///
    /// [`register`]: FunctionRegistry::register
    pub fn import(&mut self, functions: impl IntoIterator<Item = SafeFunction>) {
        for function in functions {
            self.register(function);
        }
    }

    /// Resolve and invoke in one step.
    pub fn call(&self, name: &str, args: &[Value], as_method: bool) -> Result<Value, FunctionError> {
        let function = self.get(name).ok_or_else(|| FunctionError::Unknown {
            name: name.to_string(),
        })?;
        function.invoke(args, as_method)
    }
}
