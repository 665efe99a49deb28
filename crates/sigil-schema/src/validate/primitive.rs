//! Primitive type validators
//!
//! Validators for: Any, Null, Function, Boolean, Integer, Number, String.
//! The scalar ones share `check_match` for their `match` constraint.

use sigil_value::{Value, format_number};

use crate::schema::{Match, MatchEntry, SchemaNodeContent, SchemaType};

use super::TypeValidator;
use super::context::ValidationContext;
use super::error::{SchemaError, Site, ValidationError};
use super::reference::{self, ExpectedKind, NumericRange};

// =============================================================================
// match
// =============================================================================

/// Which `match` forms a scalar type supports.
#[derive(Debug, Clone, Copy)]
struct MatchRules {
    kind: ExpectedKind,
    lists: bool,
    ranges: bool,
}

const BOOLEAN_RULES: MatchRules = MatchRules {
    kind: ExpectedKind::Boolean,
    lists: false,
    ranges: false,
};

const NUMBER_RULES: MatchRules = MatchRules {
    kind: ExpectedKind::Number,
    lists: true,
    ranges: true,
};

const INTEGER_RULES: MatchRules = MatchRules {
    kind: ExpectedKind::Integer,
    lists: true,
    ranges: true,
};

const STRING_RULES: MatchRules = MatchRules {
    kind: ExpectedKind::String,
    lists: true,
    ranges: false,
};

fn check_match(
    cx: &ValidationContext<'_>,
    site: &Site<'_>,
    constraint: &Match,
    value: &Value,
    rules: MatchRules,
) -> Result<(), ValidationError> {
    let use_references = site.node.use_references;
    let schema_type = site.node.schema_type();

    match constraint {
        Match::Exact(raw) => {
            let expected = cx
                .resolve(raw, rules.kind, use_references, "match")
                .map_err(|e| site.schema(e))?;
            if *value != expected {
                return Err(site.value(format!("must be {}", expected.quoted())));
            }
            Ok(())
        }
        Match::List(entries) => {
            if !rules.lists {
                return Err(site.schema(SchemaError::ListNotSupported(schema_type)));
            }
            let has_ranges = entries.iter().any(MatchEntry::is_range);
            let has_scalars = entries.iter().any(|entry| !entry.is_range());
            if has_ranges && has_scalars {
                return Err(site.schema(SchemaError::MixedMatchList));
            }
            if has_ranges {
                if !rules.ranges {
                    return Err(site.schema(SchemaError::RangeNotSupported(schema_type)));
                }
                check_any_range(cx, site, entries, value, rules)
            } else {
                check_membership(cx, site, entries, value, rules)
            }
        }
        Match::Range(range) => {
            if !rules.ranges {
                return Err(site.schema(SchemaError::RangeNotSupported(schema_type)));
            }
            let n = value.as_number().unwrap_or(f64::NAN);
            if let Some(raw) = &range.min {
                let min = reference::resolve_number(
                    raw,
                    cx.scope,
                    rules.kind,
                    use_references,
                    "match.min",
                )
                .map_err(|e| site.schema(e))?;
                if n < min {
                    return Err(site.value(format!(
                        "must be greater than or equal to {}",
                        format_number(min)
                    )));
                }
            }
            if let Some(raw) = &range.max {
                let max = reference::resolve_number(
                    raw,
                    cx.scope,
                    rules.kind,
                    use_references,
                    "match.max",
                )
                .map_err(|e| site.schema(e))?;
                if n > max {
                    return Err(site.value(format!(
                        "must be less than or equal to {}",
                        format_number(max)
                    )));
                }
            }
            Ok(())
        }
    }
}

fn check_membership(
    cx: &ValidationContext<'_>,
    site: &Site<'_>,
    entries: &[MatchEntry],
    value: &Value,
    rules: MatchRules,
) -> Result<(), ValidationError> {
    let mut allowed = Vec::with_capacity(entries.len());
    for entry in entries {
        if let MatchEntry::Scalar(raw) = entry {
            let resolved = cx
                .resolve(raw, rules.kind, site.node.use_references, "match")
                .map_err(|e| site.schema(e))?;
            allowed.push(resolved);
        }
    }
    if allowed.contains(value) {
        return Ok(());
    }
    let listed: Vec<String> = allowed.iter().map(|v| v.quoted().to_string()).collect();
    Err(site.value(format!("must be one of [{}]", listed.join(", "))))
}

fn check_any_range(
    cx: &ValidationContext<'_>,
    site: &Site<'_>,
    entries: &[MatchEntry],
    value: &Value,
    rules: MatchRules,
) -> Result<(), ValidationError> {
    let mut ranges = Vec::with_capacity(entries.len());
    for entry in entries {
        if let MatchEntry::Range(range) = entry {
            let resolved =
                NumericRange::resolve(range, cx.scope, rules.kind, site.node.use_references)
                    .map_err(|e| site.schema(e))?;
            ranges.push(resolved);
        }
    }
    let n = value.as_number().unwrap_or(f64::NAN);
    if ranges.iter().any(|range| range.contains(n)) {
        return Ok(());
    }
    let listed: Vec<String> = ranges.iter().map(ToString::to_string).collect();
    Err(site.value(format!("must be within one of {}", listed.join(", "))))
}

// =============================================================================
// AnyValidator / NullValidator / FunctionValidator
// =============================================================================

/// Accepts every present value.
pub struct AnyValidator;

impl TypeValidator for AnyValidator {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Any
    }

    fn accepts(&self, _value: &Value) -> bool {
        true
    }
}

pub struct NullValidator;

impl TypeValidator for NullValidator {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Null
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_null()
    }
}

pub struct FunctionValidator;

impl TypeValidator for FunctionValidator {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Function
    }

    fn accepts(&self, value: &Value) -> bool {
        value.as_function().is_some()
    }
}

// =============================================================================
// BooleanValidator
// =============================================================================

pub struct BooleanValidator;

impl TypeValidator for BooleanValidator {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Boolean
    }

    fn accepts(&self, value: &Value) -> bool {
        value.as_bool().is_some()
    }

    fn validate(
        &self,
        cx: &mut ValidationContext<'_>,
        site: &Site<'_>,
        value: &Value,
    ) -> Result<(), ValidationError> {
        let SchemaNodeContent::Boolean(schema) = &site.node.content else {
            return Err(site.unexpected_content(SchemaType::Boolean));
        };
        if let Some(constraint) = &schema.matches {
            check_match(cx, site, constraint, value, BOOLEAN_RULES)?;
        }
        Ok(())
    }
}

// =============================================================================
// NumberValidator / IntegerValidator
// =============================================================================

/// Accepts any number, including NaN and infinities.
pub struct NumberValidator;

impl TypeValidator for NumberValidator {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Number
    }

    fn accepts(&self, value: &Value) -> bool {
        value.as_number().is_some()
    }

    fn validate(
        &self,
        cx: &mut ValidationContext<'_>,
        site: &Site<'_>,
        value: &Value,
    ) -> Result<(), ValidationError> {
        let SchemaNodeContent::Number(schema) = &site.node.content else {
            return Err(site.unexpected_content(SchemaType::Number));
        };
        if let Some(constraint) = &schema.matches {
            check_match(cx, site, constraint, value, NUMBER_RULES)?;
        }
        Ok(())
    }
}

/// Accepts finite numbers without a fractional part.
pub struct IntegerValidator;

impl TypeValidator for IntegerValidator {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Integer
    }

    fn accepts(&self, value: &Value) -> bool {
        value.as_integer().is_some()
    }

    fn validate(
        &self,
        cx: &mut ValidationContext<'_>,
        site: &Site<'_>,
        value: &Value,
    ) -> Result<(), ValidationError> {
        let SchemaNodeContent::Integer(schema) = &site.node.content else {
            return Err(site.unexpected_content(SchemaType::Integer));
        };
        if let Some(constraint) = &schema.matches {
            check_match(cx, site, constraint, value, INTEGER_RULES)?;
        }
        Ok(())
    }
}

// =============================================================================
// StringValidator
// =============================================================================

/// Checks `match`, then `length`, then `pattern`.
pub struct StringValidator;

impl TypeValidator for StringValidator {
    fn schema_type(&self) -> SchemaType {
        SchemaType::String
    }

    fn accepts(&self, value: &Value) -> bool {
        value.as_str().is_some()
    }

    fn validate(
        &self,
        cx: &mut ValidationContext<'_>,
        site: &Site<'_>,
        value: &Value,
    ) -> Result<(), ValidationError> {
        let SchemaNodeContent::String(schema) = &site.node.content else {
            return Err(site.unexpected_content(SchemaType::String));
        };
        let text = value.as_str().unwrap_or_default();

        if let Some(constraint) = &schema.matches {
            check_match(cx, site, constraint, value, STRING_RULES)?;
        }

        if let Some(length) = &schema.length {
            let bounds =
                reference::resolve_bounds(length, cx.scope, site.node.use_references, "length")
                    .map_err(|e| site.schema(e))?;
            let len = text.chars().count();
            if !bounds.contains(len) {
                return Err(site.length(len, bounds));
            }
        }

        if let Some(pattern) = &schema.pattern {
            if !pattern.is_match(text) {
                return Err(site.value(format!("must match pattern `{pattern}`")));
            }
        }

        Ok(())
    }
}
