//! Dynamic values for the sigil validation engine.
//!
//! [`Value`] models the loosely-typed data that schemas are checked against:
//! everything JSON can express plus host function handles. JSON conversion
//! lives in the `json` module.

mod error;
mod json;
mod value;

pub use error::ValueError;
pub use value::{Array, FunctionRef, Map, Quoted, Value, ValueKind, format_number, is_integral};
