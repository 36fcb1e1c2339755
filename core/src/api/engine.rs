//! The orchestrator: parse → caps → validate → evaluate, template
//! rendering, caches and statistics.

use std::cell::RefCell;
use std::rc::Rc;

use bumpalo::Bump;
use tracing::debug;

use crate::api::{Context, EngineError, EngineOptions};
use crate::cache::LruCache;
use crate::evaluator::{Evaluator, ExecutionOptions};
use crate::functions::{Category, FunctionRegistry, SafeFunction};
use crate::parser::{self, ParseError, ParsedExpression, TemplateLayout};
use crate::stdlib;
use crate::types::{Serialized, TypeConfig, TypeRegistry};
use crate::validator::{CustomRule, ValidationReport, Validator};
use crate::values::Value;

/// Result of a successful evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub value: Value,
    /// Parse metadata of the expression (absent in template mode, where
    /// each hole has its own).
    pub info: Option<ExpressionInfo>,
    /// Per-hole records in template mode.
    pub holes: Option<Vec<ProcessedHole>>,
}

/// Metadata surfaced alongside a direct-mode result.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionInfo {
    pub complexity: f64,
    pub depth: usize,
    pub is_simple: bool,
    pub dependencies: Vec<String>,
    pub functions: Vec<String>,
}

/// Result of rendering a template.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub text: String,
    pub holes: Vec<ProcessedHole>,
}

/// Diagnostic record for one rendered hole.
#[derive(Debug, Clone)]
pub struct ProcessedHole {
    pub original: String,
    pub evaluated: Value,
    pub start: usize,
    pub end: usize,
}

/// Evaluation counters; reset with [`Engine::reset_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub evaluations: u64,
    pub template_renders: u64,
    pub parse_cache_hits: u64,
    pub parse_cache_misses: u64,
    pub errors: u64,
}

/// The sandboxed expression engine.
///
/// Owns the function registry, the type registry, the validator and the
/// bounded caches. Node trees are allocated into the caller-supplied
/// arena and live as long as the engine; the arena grows monotonically
/// and is reclaimed when the caller drops it.
///
/// # Example
///
/// ```ignore
/// use bumpalo::Bump;
/// use skerry_core::api::{Context, Engine};
///
/// let arena = Bump::new();
/// let engine = Engine::new(&arena);
/// let ctx = Context::from_json(serde_json::json!({"item": {"price": 10.99}})).unwrap();
/// let out = engine.evaluate("Math.round(item.price * 1.2)", &ctx).unwrap();
/// assert_eq!(out.value.as_number(), Some(13.0));
/// ```
pub struct Engine<'a> {
    arena: &'a Bump,
    options: EngineOptions,
    functions: FunctionRegistry,
    types: TypeRegistry,
    validator: Validator,
    parse_cache: RefCell<LruCache<String, Result<&'a ParsedExpression<'a>, ParseError>>>,
    validation_cache: RefCell<LruCache<String, ValidationReport>>,
    template_cache: RefCell<LruCache<String, Rc<TemplateLayout>>>,
    stats: RefCell<EngineStats>,
}

impl<'a> Engine<'a> {
    /// Engine with default options and the default function set.
    pub fn new(arena: &'a Bump) -> Self {
        Self::with_options(arena, EngineOptions::default())
    }

    pub fn with_options(arena: &'a Bump, options: EngineOptions) -> Self {
        let mut functions = FunctionRegistry::new();
        stdlib::install_defaults(&mut functions);
        let capacity = options.cache_capacity;
        Self {
            arena,
            options,
            functions,
            types: TypeRegistry::new(),
            validator: Validator::new(),
            parse_cache: RefCell::new(LruCache::new(capacity)),
            validation_cache: RefCell::new(LruCache::new(capacity)),
            template_cache: RefCell::new(LruCache::new(capacity)),
            stats: RefCell::new(EngineStats::default()),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// Evaluate an input against a context. Inputs containing `{{ … }}`
    /// holes take template mode; everything else is a direct expression.
    pub fn evaluate(&self, source: &str, ctx: &Context) -> Result<Evaluation, EngineError> {
        let layout = self.template_layout(source);
        if layout.is_template() {
            let rendered = self.render_layout(source, &layout, ctx).map_err(|e| {
                self.stats.borrow_mut().errors += 1;
                e
            })?;
            return Ok(Evaluation {
                value: Value::str(rendered.text),
                info: None,
                holes: Some(rendered.holes),
            });
        }
        self.evaluate_expression(source, ctx)
    }

    /// Direct mode with the engine's default execution limits.
    pub fn evaluate_expression(
        &self,
        source: &str,
        ctx: &Context,
    ) -> Result<Evaluation, EngineError> {
        self.evaluate_expression_with(source, ctx, self.options.execution.clone())
    }

    /// Direct mode with per-call execution limits.
    pub fn evaluate_expression_with(
        &self,
        source: &str,
        ctx: &Context,
        execution: ExecutionOptions,
    ) -> Result<Evaluation, EngineError> {
        let result = self.evaluate_inner(source, ctx, execution);
        let mut stats = self.stats.borrow_mut();
        match &result {
            Ok(_) => stats.evaluations += 1,
            Err(_) => stats.errors += 1,
        }
        result
    }

    fn evaluate_inner(
        &self,
        source: &str,
        ctx: &Context,
        execution: ExecutionOptions,
    ) -> Result<Evaluation, EngineError> {
        let parsed = self.parse(source)?;

        // caps come from parse metadata alone; nothing executes yet
        if parsed.complexity > self.options.max_complexity {
            return Err(EngineError::TooComplex {
                complexity: parsed.complexity,
                limit: self.options.max_complexity,
            });
        }
        if parsed.depth > self.options.max_depth {
            return Err(EngineError::TooDeep {
                depth: parsed.depth,
                limit: self.options.max_depth,
            });
        }

        if self.options.strict {
            let report = self.validation_report(source, parsed);
            if !report.is_valid() {
                debug!(expression = source, "validation rejected expression");
                return Err(EngineError::Rejected {
                    violations: report.violations,
                });
            }
        }

        let value = Evaluator::new(&self.functions, execution, ctx.vars())
            .eval(parsed.root)
            .map_err(|source| EngineError::Eval { source })?;

        Ok(Evaluation {
            value,
            info: Some(ExpressionInfo {
                complexity: parsed.complexity,
                depth: parsed.depth,
                is_simple: parsed.is_simple,
                dependencies: parsed.dependencies.iter().map(|s| s.to_string()).collect(),
                functions: parsed.functions.iter().map(|s| s.to_string()).collect(),
            }),
            holes: None,
        })
    }

    /// Render a template: every hole runs in direct mode, results are
    /// spliced back in reverse source order.
    pub fn render_template(&self, source: &str, ctx: &Context) -> Result<Rendered, EngineError> {
        let layout = self.template_layout(source);
        self.render_layout(source, &layout, ctx)
    }

    fn render_layout(
        &self,
        source: &str,
        layout: &TemplateLayout,
        ctx: &Context,
    ) -> Result<Rendered, EngineError> {
        // evaluate in source order; any hole error aborts the template
        let mut holes = Vec::with_capacity(layout.holes.len());
        let mut replacements = Vec::with_capacity(layout.holes.len());
        for hole in &layout.holes {
            let evaluation = self
                .evaluate_expression(&hole.expr, ctx)
                .map_err(|source| EngineError::TemplateHole {
                    hole: hole.expr.clone(),
                    source: Box::new(source),
                })?;
            replacements.push(self.render_hole_value(&evaluation.value));
            holes.push(ProcessedHole {
                original: hole.expr.clone(),
                evaluated: evaluation.value,
                start: hole.start,
                end: hole.end,
            });
        }

        // splice in reverse so earlier indices stay valid
        let mut text = source.to_string();
        for (hole, replacement) in layout.holes.iter().zip(replacements.iter()).rev() {
            text.replace_range(hole.start..hole.end, replacement);
        }

        self.stats.borrow_mut().template_renders += 1;
        debug!(holes = holes.len(), "rendered template");
        Ok(Rendered { text, holes })
    }

    /// Stringify one hole result: nullish renders empty, a detected type
    /// serializes by strategy (JSON-strategy output is escaped so it can
    /// embed inside a surrounding JSON string literal), anything else is
    /// the default string coercion.
    fn render_hole_value(&self, value: &Value) -> String {
        if value.is_nullish() {
            return String::new();
        }
        if let Some(name) = self.types.detect_type(value) {
            match self.types.serialize(value, name) {
                Some(Serialized::Json(text)) => return escape_for_json_embedding(&text),
                Some(Serialized::Text(text)) => return text,
                Some(Serialized::Raw(raw)) => return raw.to_string(),
                None => {}
            }
        }
        value.to_string()
    }

    // ------------------------------------------------------------------
    // Parsing and validation surface
    // ------------------------------------------------------------------

    /// Parse (or fetch from cache). Negative results are cached too.
    pub fn parse(&self, source: &str) -> Result<&'a ParsedExpression<'a>, EngineError> {
        let mut cache = self.parse_cache.borrow_mut();
        if let Some(cached) = cache.get(&source.to_string()) {
            self.stats.borrow_mut().parse_cache_hits += 1;
            return cached.clone().map_err(|e| EngineError::from_parse(&e));
        }
        self.stats.borrow_mut().parse_cache_misses += 1;

        let result = parser::parse_expression(self.arena, source, &self.options.parser);
        cache.insert(source.to_string(), result.clone());
        debug!(expression = source, ok = result.is_ok(), "parsed expression");
        result.map_err(|e| EngineError::from_parse(&e))
    }

    /// Validate without executing. Warnings are included in the report.
    pub fn validate(&self, source: &str) -> Result<ValidationReport, EngineError> {
        let parsed = self.parse(source)?;
        Ok(self.validation_report(source, parsed))
    }

    fn validation_report(&self, source: &str, parsed: &ParsedExpression<'_>) -> ValidationReport {
        let mut cache = self.validation_cache.borrow_mut();
        if let Some(report) = cache.get(&source.to_string()) {
            return report.clone();
        }
        let report = self.validator.validate(parsed.root, &self.functions);
        cache.insert(source.to_string(), report.clone());
        report
    }

    /// Context roots referenced by an expression or template (union over
    /// holes), sorted and deduplicated.
    pub fn extract_dependencies(&self, source: &str) -> Result<Vec<String>, EngineError> {
        let layout = self.template_layout(source);
        if !layout.is_template() {
            let parsed = self.parse(source)?;
            return Ok(parsed.dependencies.iter().map(|s| s.to_string()).collect());
        }
        let mut deps = Vec::new();
        for hole in &layout.holes {
            let parsed = self.parse(&hole.expr)?;
            deps.extend(parsed.dependencies.iter().map(|s| s.to_string()));
        }
        deps.sort_unstable();
        deps.dedup();
        Ok(deps)
    }

    fn template_layout(&self, source: &str) -> Rc<TemplateLayout> {
        let mut cache = self.template_cache.borrow_mut();
        if let Some(layout) = cache.get(&source.to_string()) {
            return layout.clone();
        }
        let layout = Rc::new(parser::template::scan(source));
        cache.insert(source.to_string(), layout.clone());
        layout
    }

    // ------------------------------------------------------------------
    // Registry surface
    // ------------------------------------------------------------------

    /// Register a function. Validation results depend on the registry,
    /// so the validation cache is dropped.
    pub fn add_function(&mut self, function: SafeFunction) {
        self.functions.register(function);
        self.validation_cache.borrow_mut().clear();
    }

    pub fn remove_function(&mut self, name: &str) -> bool {
        let removed = self.functions.unregister(name);
        if removed {
            self.validation_cache.borrow_mut().clear();
        }
        removed
    }

    pub fn list_functions(&self, category: Option<Category>) -> Vec<String> {
        self.functions
            .list(category)
            .into_iter()
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn register_type(&mut self, name: impl Into<String>, config: TypeConfig) {
        self.types.register(name, config);
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.types.has_type(name)
    }

    pub fn registered_types(&self) -> Vec<String> {
        self.types.list().into_iter().map(String::from).collect()
    }

    pub fn type_registry(&self) -> &TypeRegistry {
        &self.types
    }

    /// Install a custom validation rule.
    pub fn add_rule(&mut self, rule: CustomRule) {
        self.validator.add_rule(rule);
        self.validation_cache.borrow_mut().clear();
    }

    // ------------------------------------------------------------------
    // Stats and caches
    // ------------------------------------------------------------------

    pub fn stats(&self) -> EngineStats {
        *self.stats.borrow()
    }

    pub fn reset_stats(&self) {
        *self.stats.borrow_mut() = EngineStats::default();
    }

    pub fn clear_caches(&self) {
        self.parse_cache.borrow_mut().clear();
        self.validation_cache.borrow_mut().clear();
        self.template_cache.borrow_mut().clear();
    }
}

/// Escape a JSON-serialized hole value so it can sit inside a JSON
/// string literal in the surrounding template: backslashes first, then
/// double quotes.
fn escape_for_json_embedding(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
