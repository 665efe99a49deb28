//! Validation error types
//!
//! Two categories of errors:
//! - `SchemaError`: the schema itself is unusable (unknown type, undefined
//!   variable, malformed constraint). Never swallowed by trial validation.
//! - `ValidationError`: the first violation found in the target, or a
//!   `SchemaError` wrapped with the target and schema it was raised at.

use std::fmt;

use sigil_value::{Value, ValueKind};
use thiserror::Error;

use crate::schema::{SchemaNode, SchemaType};

use super::context::default_target_name;
use super::reference::ExpectedKind;

// =============================================================================
// SchemaError (authoring errors)
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("no validator registered for schema type `{0}`")]
    UnknownType(SchemaType),

    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),

    #[error("`{constraint}` must be {expected}, found {}", .found.quoted())]
    KindMismatch {
        constraint: String,
        expected: ExpectedKind,
        found: Value,
    },

    #[error("match list mixes literals and ranges")]
    MixedMatchList,

    #[error("ranges are not supported in `{0}` match constraints")]
    RangeNotSupported(SchemaType),

    #[error("`{0}` match only accepts a single value")]
    ListNotSupported(SchemaType),

    #[error("empty alternative group at match index {0}")]
    EmptyAlternatives(usize),

    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("malformed schema: {0}")]
    Malformed(String),
}

// =============================================================================
// Target
// =============================================================================

/// Diagnostic identity of the value an error was raised for.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub name: String,
    /// `None` when the target was absent.
    pub value: Option<Value>,
}

impl Target {
    pub fn new(name: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// =============================================================================
// Bounds
// =============================================================================

/// A resolved size constraint (`length`, `amount`). Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounds {
    Exact(usize),
    Range { min: Option<usize>, max: Option<usize> },
}

impl Bounds {
    pub fn contains(&self, n: usize) -> bool {
        match *self {
            Bounds::Exact(expected) => n == expected,
            Bounds::Range { min, max } => {
                min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max)
            }
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Bounds::Exact(n) => write!(f, "exactly {n}"),
            Bounds::Range {
                min: Some(min),
                max: Some(max),
            } => write!(f, "between {min} and {max}"),
            Bounds::Range {
                min: Some(min),
                max: None,
            } => write!(f, "at least {min}"),
            Bounds::Range {
                min: None,
                max: Some(max),
            } => write!(f, "at most {max}"),
            Bounds::Range {
                min: None,
                max: None,
            } => f.write_str("any number"),
        }
    }
}

// =============================================================================
// ValidationError
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Required,
    TypeMismatch,
    Value,
    Length,
    Amount,
    Schema,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Required => "required",
            ErrorKind::TypeMismatch => "type",
            ErrorKind::Value => "value",
            ErrorKind::Length => "length",
            ErrorKind::Amount => "amount",
            ErrorKind::Schema => "schema",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "required" => Some(ErrorKind::Required),
            "type" => Some(ErrorKind::TypeMismatch),
            "value" => Some(ErrorKind::Value),
            "length" => Some(ErrorKind::Length),
            "amount" => Some(ErrorKind::Amount),
            "schema" => Some(ErrorKind::Schema),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First violation found during validation.
///
/// `schema` is the compact JSON of the node the error was raised at.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("{target} is required")]
    Required { target: Target, schema: String },

    #[error("{target} must be of type {expected}, got {actual}")]
    TypeMismatch {
        expected: SchemaType,
        actual: ValueKind,
        target: Target,
        schema: String,
    },

    #[error("{target} {constraint}")]
    Value {
        constraint: String,
        target: Target,
        schema: String,
    },

    #[error("{target} has length {length}, expected {expected}")]
    Length {
        length: usize,
        expected: Bounds,
        target: Target,
        schema: String,
    },

    #[error("{target} has {count} matching element(s), expected {expected}")]
    Amount {
        count: usize,
        expected: Bounds,
        target: Target,
        schema: String,
    },

    #[error("invalid schema {schema} for {target}: {error}")]
    Schema {
        error: SchemaError,
        target: Target,
        schema: String,
    },
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::Required { .. } => ErrorKind::Required,
            ValidationError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ValidationError::Value { .. } => ErrorKind::Value,
            ValidationError::Length { .. } => ErrorKind::Length,
            ValidationError::Amount { .. } => ErrorKind::Amount,
            ValidationError::Schema { .. } => ErrorKind::Schema,
        }
    }

    /// `true` when the schema, not the target, is at fault.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, ValidationError::Schema { .. })
    }

    pub fn target(&self) -> &Target {
        match self {
            ValidationError::Required { target, .. }
            | ValidationError::TypeMismatch { target, .. }
            | ValidationError::Value { target, .. }
            | ValidationError::Length { target, .. }
            | ValidationError::Amount { target, .. }
            | ValidationError::Schema { target, .. } => target,
        }
    }

    pub fn schema(&self) -> &str {
        match self {
            ValidationError::Required { schema, .. }
            | ValidationError::TypeMismatch { schema, .. }
            | ValidationError::Value { schema, .. }
            | ValidationError::Length { schema, .. }
            | ValidationError::Amount { schema, .. }
            | ValidationError::Schema { schema, .. } => schema,
        }
    }

    pub fn as_schema_error(&self) -> Option<&SchemaError> {
        match self {
            ValidationError::Schema { error, .. } => Some(error),
            _ => None,
        }
    }
}

// =============================================================================
// Site (error construction)
// =============================================================================

/// The schema node and target a validator is currently looking at.
///
/// Builds errors carrying both, so validators only describe the violation.
#[derive(Debug, Clone, Copy)]
pub struct Site<'a> {
    pub node: &'a SchemaNode,
    /// `None` names the target by its rendering.
    pub name: Option<&'a str>,
    pub value: Option<&'a Value>,
}

impl<'a> Site<'a> {
    pub fn new(node: &'a SchemaNode, name: Option<&'a str>, value: Option<&'a Value>) -> Self {
        Self { node, name, value }
    }

    /// Same target, different schema node.
    pub fn with_node(self, node: &'a SchemaNode) -> Self {
        Self { node, ..self }
    }

    pub fn target(&self) -> Target {
        let name = match self.name {
            Some(name) => name.to_string(),
            None => default_target_name(self.value),
        };
        Target::new(name, self.value.cloned())
    }

    pub fn required(&self) -> ValidationError {
        ValidationError::Required {
            target: self.target(),
            schema: self.node.to_json_string(),
        }
    }

    pub fn type_mismatch(&self, actual: ValueKind) -> ValidationError {
        ValidationError::TypeMismatch {
            expected: self.node.schema_type(),
            actual,
            target: self.target(),
            schema: self.node.to_json_string(),
        }
    }

    pub fn value(&self, constraint: impl Into<String>) -> ValidationError {
        ValidationError::Value {
            constraint: constraint.into(),
            target: self.target(),
            schema: self.node.to_json_string(),
        }
    }

    pub fn length(&self, length: usize, expected: Bounds) -> ValidationError {
        ValidationError::Length {
            length,
            expected,
            target: self.target(),
            schema: self.node.to_json_string(),
        }
    }

    pub fn amount(&self, count: usize, expected: Bounds) -> ValidationError {
        ValidationError::Amount {
            count,
            expected,
            target: self.target(),
            schema: self.node.to_json_string(),
        }
    }

    pub fn schema(&self, error: SchemaError) -> ValidationError {
        ValidationError::Schema {
            error,
            target: self.target(),
            schema: self.node.to_json_string(),
        }
    }

    /// A node reached a validator registered for another type.
    pub fn unexpected_content(&self, expected: SchemaType) -> ValidationError {
        self.schema(SchemaError::Malformed(format!(
            "`{expected}` validator received a `{}` schema",
            self.node.schema_type()
        )))
    }
}
