//! The type registry: schema-keyed detection and serialization of
//! context values.
//!
//! Callers register named object schemas; when a template hole produces a
//! value, the orchestrator asks the registry what it is and how to render
//! it. Detection walks entries most-recently-registered first and returns
//! the first schema the value satisfies.

mod registry;

#[cfg(test)]
mod registry_test;

pub use registry::{
    PropKind, Serialized, Strategy, TypeConfig, TypeEntry, TypeRegistry, TypeSchema,
};
