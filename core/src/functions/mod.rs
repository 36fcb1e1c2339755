//! The function registry: named, arity- and type-checked safe callables.
//!
//! Every callable an expression can reach lives here, including the
//! qualified `Namespace.method` forms, which are plain registry keys that
//! happen to contain a dot. Nothing is ever resolved against the host
//! runtime.

mod registry;

#[cfg(test)]
mod registry_test;

pub use registry::{
    ArgKind, Category, FunctionError, FunctionImpl, FunctionRegistry, RegistryStats, SafeFunction,
};
