//! Constraint value resolution
//!
//! Schema constraint fields hold either a literal or, when the node sets
//! `use$`, a `$name` reference into the [`Scope`]. Either way the resolved
//! value is checked against the kind the constraint needs.

use std::fmt;

use sigil_value::{Value, format_number, is_integral};

use crate::schema::{Quantity, Range};
use crate::scope::{Scope, is_reference};

use super::error::{Bounds, SchemaError};

/// Kind a constraint value must resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedKind {
    Boolean,
    Number,
    Integer,
    String,
    /// Finite, non-negative, integral number (`length`, `amount`).
    Count,
}

impl ExpectedKind {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            ExpectedKind::Boolean => value.as_bool().is_some(),
            ExpectedKind::Number => value.as_number().is_some(),
            ExpectedKind::Integer => value.as_integer().is_some(),
            ExpectedKind::String => value.as_str().is_some(),
            ExpectedKind::Count => value.as_integer().is_some_and(|n| n >= 0.0),
        }
    }
}

impl fmt::Display for ExpectedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExpectedKind::Boolean => "a boolean",
            ExpectedKind::Number => "a number",
            ExpectedKind::Integer => "an integer",
            ExpectedKind::String => "a string",
            ExpectedKind::Count => "a non-negative integer",
        })
    }
}

/// Resolve a raw constraint value.
///
/// `constraint` names the schema field for error messages.
pub fn resolve(
    raw: &Value,
    scope: &Scope,
    expected: ExpectedKind,
    use_references: bool,
    constraint: &str,
) -> Result<Value, SchemaError> {
    let resolved = match raw {
        Value::Text(name) if use_references && is_reference(name) => scope
            .get(name)
            .ok_or_else(|| SchemaError::UndefinedVariable(name.clone()))?,
        literal => literal,
    };
    if !expected.accepts(resolved) {
        return Err(SchemaError::KindMismatch {
            constraint: constraint.to_string(),
            expected,
            found: resolved.clone(),
        });
    }
    Ok(resolved.clone())
}

pub fn resolve_bool(
    raw: &Value,
    scope: &Scope,
    use_references: bool,
    constraint: &str,
) -> Result<bool, SchemaError> {
    let value = resolve(raw, scope, ExpectedKind::Boolean, use_references, constraint)?;
    Ok(value.as_bool().unwrap_or_default())
}

pub fn resolve_number(
    raw: &Value,
    scope: &Scope,
    expected: ExpectedKind,
    use_references: bool,
    constraint: &str,
) -> Result<f64, SchemaError> {
    let value = resolve(raw, scope, expected, use_references, constraint)?;
    Ok(value.as_number().unwrap_or(f64::NAN))
}

pub fn resolve_count(
    raw: &Value,
    scope: &Scope,
    use_references: bool,
    constraint: &str,
) -> Result<usize, SchemaError> {
    let n = resolve_number(raw, scope, ExpectedKind::Count, use_references, constraint)?;
    debug_assert!(is_integral(n) && n >= 0.0);
    Ok(n as usize)
}

/// Resolve a `length`/`amount` quantity into inclusive [`Bounds`].
pub fn resolve_bounds(
    quantity: &Quantity,
    scope: &Scope,
    use_references: bool,
    constraint: &str,
) -> Result<Bounds, SchemaError> {
    match quantity {
        Quantity::Exact(raw) => Ok(Bounds::Exact(resolve_count(
            raw,
            scope,
            use_references,
            constraint,
        )?)),
        Quantity::Range(Range { min, max }) => {
            let min = min
                .as_ref()
                .map(|raw| resolve_count(raw, scope, use_references, &format!("{constraint}.min")))
                .transpose()?;
            let max = max
                .as_ref()
                .map(|raw| resolve_count(raw, scope, use_references, &format!("{constraint}.max")))
                .transpose()?;
            Ok(Bounds::Range { min, max })
        }
    }
}

/// Inclusive numeric interval with optional ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn resolve(
        range: &Range,
        scope: &Scope,
        expected: ExpectedKind,
        use_references: bool,
    ) -> Result<Self, SchemaError> {
        let min = range
            .min
            .as_ref()
            .map(|raw| resolve_number(raw, scope, expected, use_references, "match.min"))
            .transpose()?;
        let max = range
            .max
            .as_ref()
            .map(|raw| resolve_number(raw, scope, expected, use_references, "match.max"))
            .transpose()?;
        Ok(Self { min, max })
    }

    /// A value is outside only when it is below a present `min` or above a
    /// present `max`; comparisons with NaN never fail.
    pub fn contains(&self, n: f64) -> bool {
        !(self.min.is_some_and(|min| n < min) || self.max.is_some_and(|max| n > max))
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min = self.min.map(format_number).unwrap_or_default();
        let max = self.max.map(format_number).unwrap_or_default();
        write!(f, "[{min}, {max}]")
    }
}
