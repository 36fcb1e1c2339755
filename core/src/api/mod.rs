//! Public API for the Skerry expression engine.
//!
//! The [`Engine`] sequences the pipeline — parse → complexity caps →
//! security validation → evaluation — and owns the registries and
//! caches. Everything else in the crate is reachable for embedders that
//! need the pieces individually, but this module is the stable surface.

mod context;
mod engine;
mod error;
mod options;

#[cfg(test)]
mod engine_test;

pub use context::Context;
pub use engine::{Engine, EngineStats, Evaluation, ExpressionInfo, ProcessedHole, Rendered};
pub use error::{EngineError, ErrorKind};
pub use options::EngineOptions;
