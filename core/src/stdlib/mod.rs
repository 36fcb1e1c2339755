//! Skerry Standard Library
//!
//! Default safe functions, grouped by category:
//! - string: trim, case conversion, slicing, searching, splitting
//! - array: length, join, slice, first/last, reverse, flatten, unique, chunk
//! - object: keys, values, entries
//! - math: the `Math.*` qualified operations plus PI and E
//! - date: now, parse, today, addDays, diffDays
//! - json: JSON.parse / JSON.stringify with local failure recovery
//! - crypto: uuid, base64Encode, base64Decode
//! - conditional: $if, $and, $or, $not
//! - utility: isEmpty, hasField
//!
//! Each module registers its functions into a [`FunctionRegistry`];
//! `install_defaults` wires up the full set.

pub mod array;
pub mod conditional;
pub mod crypto;
pub mod datetime;
pub mod json;
pub mod math;
pub mod object;
pub mod string;
pub mod util;


use crate::functions::FunctionRegistry;

/// Register the complete default function set.
pub fn install_defaults(registry: &mut FunctionRegistry) {
    string::install(registry);
    array::install(registry);
    object::install(registry);
    math::install(registry);
    datetime::install(registry);
    json::install(registry);
    crypto::install(registry);
    conditional::install(registry);
    util::install(registry);
}
