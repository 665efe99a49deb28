//! OR-group validator
//!
//! An OR-group is an ordered list of alternative schemas for one array
//! position. Alternatives are tried in order. Bindings made by a failed
//! alternative are undone before the next one runs.

use sigil_value::Value;
use tracing::trace;

use crate::schema::SchemaNode;

use super::context::ValidationContext;
use super::error::{SchemaError, Site, ValidationError};

/// Validate `value` against the first matching alternative.
///
/// The first success keeps its bindings. When every alternative fails,
/// the last alternative's error is returned. Schema errors stop the search.
pub(crate) fn validate_alternatives(
    cx: &mut ValidationContext<'_>,
    site: &Site<'_>,
    index: usize,
    alternatives: &[SchemaNode],
    value: Option<&Value>,
    name: Option<&str>,
) -> Result<(), ValidationError> {
    let mut last_error = None;
    for (alternative, node) in alternatives.iter().enumerate() {
        match cx.attempt(node, value, name) {
            Ok(()) => {
                trace!(target_name = name, alternative, "alternative accepted");
                return Ok(());
            }
            Err(error) if error.is_schema_error() => return Err(error),
            Err(error) => {
                trace!(target_name = name, alternative, %error, "alternative rejected");
                last_error = Some(error);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| site.schema(SchemaError::EmptyAlternatives(index))))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::schema::SchemaNode;
    use crate::scope::Scope;
    use crate::validate::{ErrorKind, ValidateOptions, validate, validate_with};

    use super::*;

    fn schema(json: serde_json::Value) -> SchemaNode {
        SchemaNode::from_json(json).unwrap()
    }

    fn array(items: Vec<Value>) -> Value {
        Value::from(items)
    }

    #[test]
    fn test_first_matching_alternative_wins() {
        let node = schema(json!({
            "type": "array",
            "match": [
                [{"type": "string", "match": "a"}, {"type": "string", "match": "b"}],
                {"type": "number"}
            ]
        }));
        assert!(validate(&node, Some(&array(vec!["a".into(), 1.into()]))).is_ok());
        assert!(validate(&node, Some(&array(vec!["b".into(), 1.into()]))).is_ok());

        let error = validate(&node, Some(&array(vec!["c".into(), 1.into()]))).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Value);
        assert_eq!(error.schema(), r#"{"type":"string","match":"b"}"#);
    }

    #[test]
    fn test_failed_alternatives_leave_no_bindings() {
        let node = schema(json!({
            "type": "array",
            "match": [[
                {"type": "string", "$": "s"},
                {"type": "number", "match": 5, "$": "n"},
                {"type": "number", "$": "m"}
            ]]
        }));
        let mut scope = Scope::new();
        let value = array(vec![7.into()]);
        validate_with(&node, Some(&value), &mut scope, &ValidateOptions::default()).unwrap();
        assert!(!scope.contains("$s"));
        assert!(!scope.contains("$n"));
        assert_eq!(scope.get("$m"), Some(&Value::from(7)));
    }

    #[test]
    fn test_schema_error_stops_alternation() {
        let node = schema(json!({
            "type": "array",
            "match": [[
                {"type": "number", "match": "$missing", "use$": true},
                {"type": "number"}
            ]]
        }));
        let error = validate(&node, Some(&array(vec![1.into()]))).unwrap_err();
        assert_eq!(
            error.as_schema_error(),
            Some(&SchemaError::UndefinedVariable("$missing".to_string()))
        );
    }

    #[test]
    fn test_empty_group_is_schema_error() {
        let node = schema(json!({"type": "array", "match": [{"type": "any"}, []]}));
        let error = validate(&node, Some(&array(vec![1.into(), 2.into()]))).unwrap_err();
        assert_eq!(
            error.as_schema_error(),
            Some(&SchemaError::EmptyAlternatives(1))
        );
    }
}
