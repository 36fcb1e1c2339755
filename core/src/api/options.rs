//! Engine configuration.

use crate::evaluator::ExecutionOptions;
use crate::parser::ParserOptions;

/// Orchestrator-level options. Execution limits nest inside and can also
/// be overridden per call.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Run the security validator before every direct evaluation.
    pub strict: bool,
    /// Reject expressions whose parse-metadata complexity exceeds this.
    pub max_complexity: f64,
    /// Reject expressions whose structural depth exceeds this.
    pub max_depth: usize,
    /// Parser limits (nesting).
    pub parser: ParserOptions,
    /// Default per-call execution limits (timeout, stack depth).
    pub execution: ExecutionOptions,
    /// Capacity of each bounded cache (parse, validation, template).
    pub cache_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            strict: true,
            max_complexity: 500.0,
            max_depth: 32,
            parser: ParserOptions::default(),
            execution: ExecutionOptions::default(),
            cache_capacity: 256,
        }
    }
}
