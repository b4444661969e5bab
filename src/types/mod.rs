//! Syrup value types and marker wrappers.

mod value;

pub use value::{Record, Set, Symbol, Value};
