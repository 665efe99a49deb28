//! Array validator
//!
//! Constraint groups run in order: `length`, positional `match`, then
//! `contains`. The first failing group's error is returned.

use sigil_value::Value;
use tracing::trace;

use crate::schema::{ArraySchema, ContainsRule, MatchSlot, SchemaNodeContent, SchemaType};

use super::TypeValidator;
use super::context::ValidationContext;
use super::error::{Site, ValidationError};
use super::reference;
use super::union::validate_alternatives;

// =============================================================================
// ArrayValidator
// =============================================================================

pub struct ArrayValidator;

impl TypeValidator for ArrayValidator {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Array
    }

    fn accepts(&self, value: &Value) -> bool {
        value.as_array().is_some()
    }

    fn validate(
        &self,
        cx: &mut ValidationContext<'_>,
        site: &Site<'_>,
        value: &Value,
    ) -> Result<(), ValidationError> {
        let SchemaNodeContent::Array(schema) = &site.node.content else {
            return Err(site.unexpected_content(SchemaType::Array));
        };
        let items = value.as_array().unwrap_or_default();

        validate_length(cx, site, schema, items)?;
        validate_positions(cx, site, schema, items)?;
        for rule in &schema.contains {
            validate_contains(cx, site, rule, items)?;
        }
        Ok(())
    }
}

fn validate_length(
    cx: &ValidationContext<'_>,
    site: &Site<'_>,
    schema: &ArraySchema,
    items: &[Value],
) -> Result<(), ValidationError> {
    let Some(length) = &schema.length else {
        return Ok(());
    };
    let bounds = reference::resolve_bounds(length, cx.scope, site.node.use_references, "length")
        .map_err(|e| site.schema(e))?;
    if !bounds.contains(items.len()) {
        return Err(site.length(items.len(), bounds));
    }
    Ok(())
}

/// Index `i` of `match` constrains element `i`. Elements past the end of
/// `match` are unconstrained; `match` entries past the end of the array see an
/// absent value.
fn validate_positions(
    cx: &mut ValidationContext<'_>,
    site: &Site<'_>,
    schema: &ArraySchema,
    items: &[Value],
) -> Result<(), ValidationError> {
    for (index, slot) in schema.items.iter().enumerate() {
        let item = items.get(index);
        let name = cx.index_name(site.name, index);
        match slot {
            MatchSlot::Single(node) => cx.validate(node, item, name.as_deref())?,
            MatchSlot::AnyOf(alternatives) => {
                validate_alternatives(cx, site, index, alternatives, item, name.as_deref())?
            }
        }
    }
    Ok(())
}

/// Count the elements satisfying `rule.schema`, each as a separate attempt.
///
/// Bindings from a failed attempt are undone. Successful attempts keep theirs
/// in element order, so a binding made by the sub-schema ends up holding the
/// last matching element.
fn validate_contains(
    cx: &mut ValidationContext<'_>,
    site: &Site<'_>,
    rule: &ContainsRule,
    items: &[Value],
) -> Result<(), ValidationError> {
    let rule_site = site.with_node(&rule.schema);
    let use_references = site.node.use_references || rule.schema.use_references;

    let required = match &rule.required {
        Some(raw) => reference::resolve_bool(raw, cx.scope, use_references, "contains.required")
            .map_err(|e| rule_site.schema(e))?,
        None => false,
    };
    let amount = rule
        .amount
        .as_ref()
        .map(|q| reference::resolve_bounds(q, cx.scope, use_references, "contains.amount"))
        .transpose()
        .map_err(|e| rule_site.schema(e))?;

    let mut count = 0;
    for (index, item) in items.iter().enumerate() {
        let name = cx.index_name(site.name, index);
        match cx.attempt(&rule.schema, Some(item), name.as_deref()) {
            Ok(()) => count += 1,
            Err(error) if error.is_schema_error() => return Err(error),
            Err(_) => {}
        }
    }
    trace!(target_name = site.name, count, "containment counted");

    match amount {
        None if required && count == 0 => Err(rule_site.required()),
        None => Ok(()),
        Some(bounds) if bounds.contains(count) => Ok(()),
        Some(bounds) => Err(rule_site.amount(count, bounds)),
    }
}
