//! Loading schema trees from JSON

use serde::Deserialize;
use sigil_value::Value;

use crate::schema::{ContainsRule, Quantity, SchemaNode};
use crate::validate::SchemaError;

impl SchemaNode {
    /// Parse a schema tree from JSON source.
    pub fn from_json_str(source: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(source).map_err(|e| SchemaError::Malformed(e.to_string()))
    }

    /// Build a schema tree from an already parsed JSON value.
    pub fn from_json(json: serde_json::Value) -> Result<Self, SchemaError> {
        serde_json::from_value(json).map_err(|e| SchemaError::Malformed(e.to_string()))
    }

    /// Compact JSON rendering used in error reports.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| format!(r#"{{"type":"{}"}}"#, self.schema_type()))
    }
}

/// Accepted spellings of a containment rule.
///
/// `Wrapped` is the canonical `{schema, required?, amount?}` form. `Inline`
/// puts `amount` next to the sub-schema's own fields, and the sub-schema's
/// `required` doubles as the rule's.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ContainsRepr {
    Wrapped {
        schema: SchemaNode,
        #[serde(default)]
        required: Option<Value>,
        #[serde(default)]
        amount: Option<Quantity>,
    },
    Inline {
        #[serde(default)]
        amount: Option<Quantity>,
        #[serde(flatten)]
        schema: SchemaNode,
    },
}

impl From<ContainsRepr> for ContainsRule {
    fn from(repr: ContainsRepr) -> Self {
        match repr {
            ContainsRepr::Wrapped {
                schema,
                required,
                amount,
            } => ContainsRule {
                schema,
                required,
                amount,
            },
            ContainsRepr::Inline { amount, schema } => ContainsRule {
                required: schema.required.clone(),
                schema,
                amount,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Match, MatchEntry, MatchSlot, Range, SchemaNodeContent, SchemaType};
    use serde_json::json;

    fn load(json: serde_json::Value) -> SchemaNode {
        SchemaNode::from_json(json).unwrap()
    }

    #[test]
    fn test_common_fields() {
        let node = load(json!({"type": "number", "required": true, "$": "x", "use$": true}));
        assert_eq!(node.schema_type(), SchemaType::Number);
        assert_eq!(node.required, Some(Value::Bool(true)));
        assert_eq!(node.bind.as_deref(), Some("x"));
        assert!(node.use_references);
    }

    #[test]
    fn test_number_match_forms() {
        let exact = load(json!({"type": "number", "match": 3}));
        let SchemaNodeContent::Number(schema) = exact.content else {
            panic!("expected number schema");
        };
        assert_eq!(schema.matches, Some(Match::Exact(Value::from(3))));

        let range = load(json!({"type": "integer", "match": {"min": 1, "max": "$top"}}));
        let SchemaNodeContent::Integer(schema) = range.content else {
            panic!("expected integer schema");
        };
        assert_eq!(
            schema.matches,
            Some(Match::Range(Range::new(
                Some(Value::from(1)),
                Some(Value::from("$top"))
            )))
        );

        let mixed = load(json!({"type": "number", "match": [1, {"min": 2, "max": 3}]}));
        let SchemaNodeContent::Number(schema) = mixed.content else {
            panic!("expected number schema");
        };
        let Some(Match::List(entries)) = schema.matches else {
            panic!("expected list");
        };
        assert!(!entries[0].is_range());
        assert!(matches!(entries[1], MatchEntry::Range(_)));
    }

    #[test]
    fn test_array_match_slots() {
        let node = load(json!({
            "type": "array",
            "match": [
                [{"type": "string", "match": "a"}, {"type": "string", "match": "b"}],
                {"type": "number"}
            ]
        }));
        let SchemaNodeContent::Array(schema) = node.content else {
            panic!("expected array schema");
        };
        assert!(matches!(&schema.items[0], MatchSlot::AnyOf(alts) if alts.len() == 2));
        assert!(matches!(&schema.items[1], MatchSlot::Single(_)));
    }

    #[test]
    fn test_contains_wrapped_form() {
        let node = load(json!({
            "type": "array",
            "contains": [{"schema": {"type": "number"}, "required": true, "amount": {"min": 1}}]
        }));
        let SchemaNodeContent::Array(schema) = node.content else {
            panic!("expected array schema");
        };
        let rule = &schema.contains[0];
        assert_eq!(rule.schema.schema_type(), SchemaType::Number);
        assert_eq!(rule.required, Some(Value::Bool(true)));
        assert!(matches!(rule.amount, Some(Quantity::Range(_))));
    }

    #[test]
    fn test_contains_inline_form() {
        let node = load(json!({
            "type": "array",
            "contains": [{"type": "string", "required": true, "amount": 2}]
        }));
        let SchemaNodeContent::Array(schema) = node.content else {
            panic!("expected array schema");
        };
        let rule = &schema.contains[0];
        assert_eq!(rule.schema.schema_type(), SchemaType::String);
        assert_eq!(rule.required, Some(Value::Bool(true)));
        assert_eq!(rule.amount, Some(Quantity::Exact(Value::from(2))));
    }

    #[test]
    fn test_object_properties_keep_order() {
        let node = load(json!({
            "type": "object",
            "properties": {"z": {"type": "any"}, "a": {"type": "any"}}
        }));
        let SchemaNodeContent::Object(schema) = node.content else {
            panic!("expected object schema");
        };
        let keys: Vec<_> = schema.properties.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_loaders_agree_on_property_order() {
        let text = r#"{
            "type": "object",
            "properties": {
                "value": {"type": "integer", "match": "$expected", "use$": true},
                "expected": {"type": "integer", "$": "expected"}
            }
        }"#;
        let from_str = SchemaNode::from_json_str(text).unwrap();
        let from_value = SchemaNode::from_json(serde_json::from_str(text).unwrap()).unwrap();
        assert_eq!(from_str, from_value);

        let SchemaNodeContent::Object(schema) = from_value.content else {
            panic!("expected object schema");
        };
        let keys: Vec<_> = schema.properties.keys().cloned().collect();
        assert_eq!(keys, vec!["value", "expected"]);
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let result = SchemaNode::from_json(json!({"type": "tuple"}));
        assert!(matches!(result, Err(SchemaError::Malformed(_))));
    }

    #[test]
    fn test_to_json_string() {
        let node = SchemaNode::number().required(true).bind("x");
        assert_eq!(
            node.to_json_string(),
            r#"{"type":"number","required":true,"$":"x"}"#
        );
        assert_eq!(
            SchemaNode::from_json_str(&node.to_json_string()).unwrap(),
            node
        );
    }
}
