//! Object validator

use sigil_value::Value;

use crate::schema::{SchemaNodeContent, SchemaType};

use super::TypeValidator;
use super::context::ValidationContext;
use super::error::{Site, ValidationError};

/// Validates `properties` in declaration order. A missing property is
/// validated as absent; unlisted properties are ignored.
pub struct ObjectValidator;

impl TypeValidator for ObjectValidator {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Object
    }

    fn accepts(&self, value: &Value) -> bool {
        value.as_object().is_some()
    }

    fn validate(
        &self,
        cx: &mut ValidationContext<'_>,
        site: &Site<'_>,
        value: &Value,
    ) -> Result<(), ValidationError> {
        let SchemaNodeContent::Object(schema) = &site.node.content else {
            return Err(site.unexpected_content(SchemaType::Object));
        };
        let Some(map) = value.as_object() else {
            return Err(site.type_mismatch(value.kind()));
        };
        for (key, property) in &schema.properties {
            let item = map.get(key);
            let name = cx.key_name(site.name, key);
            cx.validate(property, item, name.as_deref())?;
        }
        Ok(())
    }
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

    #[test]
    fn test_properties() {
        let node = schema(json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "required": true},
                "age": {"type": "integer"}
            }
        }));
        let ok = Value::from(json!({"name": "a", "extra": [1, 2]}));
        assert!(validate(&node, Some(&ok)).is_ok());

        let missing = Value::from(json!({"age": 3}));
        assert_eq!(
            validate(&node, Some(&missing)).unwrap_err().kind(),
            ErrorKind::Required
        );

        let not_object = Value::from(json!([]));
        assert_eq!(
            validate(&node, Some(&not_object)).unwrap_err().kind(),
            ErrorKind::TypeMismatch
        );
    }

    #[test]
    fn test_sibling_reference() {
        let node = schema(json!({
            "type": "object",
            "properties": {
                "max": {"type": "integer", "$": "max"},
                "value": {"type": "integer", "match": {"max": "$max"}, "use$": true}
            }
        }));
        let options = ValidateOptions::new().with_target_name("config");
        let mut scope = Scope::new();

        let ok = Value::from(json!({"max": 10, "value": 7}));
        assert!(validate_with(&node, Some(&ok), &mut scope, &options).is_ok());

        let mut scope = Scope::new();
        let too_big = Value::from(json!({"max": 10, "value": 11}));
        let error = validate_with(&node, Some(&too_big), &mut scope, &options).unwrap_err();
        assert_eq!(error.to_string(), "config.value must be less than or equal to 10");
    }

    #[test]
    fn test_declaration_order_drives_binding() {
        let node = schema(json!({
            "type": "object",
            "properties": {
                "value": {"type": "integer", "match": "$expected", "use$": true},
                "expected": {"type": "integer", "$": "expected"}
            }
        }));
        let value = Value::from(json!({"expected": 1, "value": 1}));
        let error = validate(&node, Some(&value)).unwrap_err();
        assert!(error.is_schema_error());
    }
}
