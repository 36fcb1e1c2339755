//! Dynamic runtime values.
//!
//! The evaluator is dynamically typed: every expression produces a [`Value`].
//! `Str`, `Array` and `Object` share their payload through `Rc`, so cloning a
//! value is cheap and evaluation never deep-copies caller context.

mod value;


pub use value::{format_number, Value};
