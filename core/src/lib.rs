//! Skerry: a sandboxed expression evaluator.
//!
//! Skerry accepts a restricted C-family expression language, lifts it
//! into a closed tree of typed nodes, audits that tree against a security
//! policy, and interprets it against a caller-supplied context — without
//! ever delegating to a host interpreter. Strings with `{{ … }}` holes
//! are templates: each hole is evaluated and spliced back in, with
//! schema-registered context values serialized intelligently.
//!
//! ```ignore
//! use bumpalo::Bump;
//! use skerry_core::api::{Context, Engine};
//!
//! let arena = Bump::new();
//! let engine = Engine::new(&arena);
//! let ctx = Context::from_json(serde_json::json!({
//!     "items": [{"active": true, "name": "A"}, {"active": false, "name": "B"}]
//! })).unwrap();
//!
//! let out = engine
//!     .evaluate("items.filter(x => x.active).map(x => x.name)", &ctx)
//!     .unwrap();
//! assert_eq!(out.value.to_json(), serde_json::json!(["A"]));
//! ```

pub mod api;
pub mod cache;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod policy;
pub mod scope_stack;
pub mod stdlib;
pub mod types;
pub mod validator;
pub mod values;

pub use api::{Context, Engine, EngineError, EngineOptions, ErrorKind};
pub use values::Value;
