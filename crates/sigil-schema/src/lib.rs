//! Declarative, recursive data validation
//!
//! A [`SchemaNode`] tree describes the expected shape of a dynamic
//! [`Value`](sigil_value::Value). Validation walks the tree depth-first and
//! reports the first violation. Nodes can bind validated values into a
//! [`Scope`] (`$`) and later constraints can refer to them (`use$`).
//!
//! ```
//! use serde_json::json;
//! use sigil_schema::{SchemaNode, validate};
//! use sigil_value::Value;
//!
//! let schema = SchemaNode::from_json(json!({
//!     "type": "array",
//!     "match": [
//!         {"type": "integer", "$": "size"},
//!         {"type": "array", "length": "$size", "use$": true}
//!     ]
//! }))
//! .unwrap();
//!
//! assert!(validate(&schema, Some(&Value::from(json!([2, ["a", "b"]])))).is_ok());
//! assert!(validate(&schema, Some(&Value::from(json!([3, ["a", "b"]])))).is_err());
//! ```

mod parse;
pub mod schema;
pub mod scope;
pub mod validate;

pub use schema::{
    ArraySchema, BooleanSchema, ContainsRule, Match, MatchEntry, MatchSlot, NumberSchema,
    ObjectSchema, Pattern, Quantity, Range, SchemaNode, SchemaNodeContent, SchemaType, StringSchema,
};
pub use scope::Scope;
pub use validate::{
    Bounds, ErrorKind, ExpectedKind, SchemaError, Site, Target, TypeValidator, ValidateOptions,
    ValidationContext, ValidationError, Validator, Validators, validate, validate_with,
};
