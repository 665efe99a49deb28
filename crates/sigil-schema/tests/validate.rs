use std::sync::Arc;
use std::thread;

use serde_json::json;
use sigil_schema::{
    ContainsRule, ErrorKind, Match, MatchSlot, Quantity, Range, SchemaError, SchemaNode,
    SchemaNodeContent, Scope, ValidateOptions, ValidationError, Validator, validate, validate_with,
};
use sigil_value::Value;

fn schema(json: serde_json::Value) -> SchemaNode {
    SchemaNode::from_json(json).unwrap()
}

fn value(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn kind_of(node: &SchemaNode, target: Option<&Value>) -> Option<ErrorKind> {
    validate(node, target).err().map(|e| e.kind())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[test]
fn test_optional_absent_skips_checks() {
    let node = schema(json!({"type": "number", "required": false, "match": 3}));
    assert!(validate(&node, None).is_ok());
}

#[test]
fn test_required_absent() {
    let node = schema(json!({"type": "number", "required": true}));
    assert_eq!(kind_of(&node, None), Some(ErrorKind::Required));
}

#[test]
fn test_array_kind() {
    let node = schema(json!({"type": "array"}));
    assert_eq!(
        kind_of(&node, Some(&Value::from(0))),
        Some(ErrorKind::TypeMismatch)
    );
    assert_eq!(kind_of(&node, Some(&value(json!([])))), None);
}

#[test]
fn test_or_group_reports_last_alternative() {
    init_tracing();
    let node = schema(json!({
        "type": "array",
        "match": [
            [{"type": "string", "match": "a"}, {"type": "string", "match": "b"}],
            {"type": "number"}
        ]
    }));
    assert!(validate(&node, Some(&value(json!(["a", 1])))).is_ok());
    assert!(validate(&node, Some(&value(json!(["b", 1])))).is_ok());

    let error = validate(&node, Some(&value(json!(["c", 1])))).unwrap_err();
    let ValidationError::Value {
        constraint, schema, ..
    } = error
    else {
        panic!("expected value error, got {error:?}");
    };
    assert_eq!(constraint, r#"must be "b""#);
    assert_eq!(schema, r#"{"type":"string","match":"b"}"#);
}

#[test]
fn test_containment_examples() {
    init_tracing();
    let required = schema(json!({
        "type": "array",
        "contains": [{"type": "number", "required": true}]
    }));
    assert_eq!(
        kind_of(&required, Some(&value(json!(["a"])))),
        Some(ErrorKind::Required)
    );
    assert_eq!(kind_of(&required, Some(&value(json!(["a", 1])))), None);

    let exact = schema(json!({
        "type": "array",
        "contains": [{"type": "string", "required": true, "amount": 2}]
    }));
    assert_eq!(
        kind_of(&exact, Some(&value(json!(["a"])))),
        Some(ErrorKind::Amount)
    );
    assert_eq!(kind_of(&exact, Some(&value(json!(["a", "a"])))), None);

    let ranged = schema(json!({
        "type": "array",
        "contains": [{"schema": {"type": "number"}, "amount": {"min": 1, "max": 3}}]
    }));
    assert_eq!(
        kind_of(&ranged, Some(&value(json!([1, 2, 3, 4])))),
        Some(ErrorKind::Amount)
    );
    assert_eq!(kind_of(&ranged, Some(&value(json!([1, 2])))), None);
}

#[test]
fn test_mixed_match_list() {
    let node = schema(json!({"type": "number", "match": [1, {"min": 2, "max": 3}]}));
    for target in [0.0, 1.0, 2.5, f64::NAN] {
        let error = validate(&node, Some(&Value::from(target))).unwrap_err();
        assert_eq!(error.as_schema_error(), Some(&SchemaError::MixedMatchList));
    }
}

#[test]
fn test_binding_then_reference() {
    let node = schema(json!({
        "type": "array",
        "match": [
            {"type": "number", "$": "x"},
            {"type": "number", "match": "$x", "use$": true}
        ]
    }));
    assert!(validate(&node, Some(&value(json!([4, 4])))).is_ok());
    assert_eq!(
        kind_of(&node, Some(&value(json!([4, 5])))),
        Some(ErrorKind::Value)
    );
}

#[test]
fn test_sigil_prefixed_binding_name() {
    let node = schema(json!({"type": "string", "$": "$name"}));
    let mut scope = Scope::new();
    validate_with(
        &node,
        Some(&Value::from("abc")),
        &mut scope,
        &ValidateOptions::default(),
    )
    .unwrap();
    assert_eq!(scope.get("$name"), Some(&Value::from("abc")));
    assert!(!scope.contains("$$name"));
}

#[test]
fn test_reference_without_use_references_is_literal() {
    let node = schema(json!({"type": "string", "match": "$x"}));
    assert!(validate(&node, Some(&Value::from("$x"))).is_ok());
}

#[test]
fn test_caller_scope_feeds_references() {
    let node = schema(json!({"type": "integer", "match": {"min": "$floor"}, "use$": true}));
    let mut scope: Scope = [("floor", Value::from(10))].into_iter().collect();
    let options = ValidateOptions::new().with_target_name("count");
    let error = validate_with(&node, Some(&Value::from(3)), &mut scope, &options).unwrap_err();
    assert_eq!(error.to_string(), "count must be greater than or equal to 10");
}

#[test]
fn test_nested_structure() {
    let node = schema(json!({
        "type": "object",
        "properties": {
            "kind": {"type": "string", "match": ["point", "line"], "$": "kind"},
            "coords": {
                "type": "array",
                "length": {"min": 2, "max": 3},
                "contains": [{"schema": {"type": "number"}, "amount": {"min": 2}}]
            },
            "label": {"type": "string", "pattern": "^[A-Z]"}
        }
    }));
    assert!(validate(&node, Some(&value(json!({"kind": "point", "coords": [1, 2]})))).is_ok());

    let options = ValidateOptions::new().with_target_name("shape");
    let mut scope = Scope::new();
    let error = validate_with(
        &node,
        Some(&value(json!({"kind": "line", "coords": [1, "y"], "label": "A"}))),
        &mut scope,
        &options,
    )
    .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Amount);
    assert_eq!(error.target().name, "shape.coords");
}

#[test]
fn test_programmatic_schema() {
    let mut array = SchemaNode::array();
    if let SchemaNodeContent::Array(schema) = &mut array.content {
        schema.length = Some(Quantity::Range(Range::new(Some(Value::from(1)), None)));
        schema.items.push(MatchSlot::AnyOf(vec![
            SchemaNode::null(),
            SchemaNode::boolean().with_match(Match::Exact(Value::Bool(true))),
        ]));
        schema.contains.push(
            ContainsRule::new(SchemaNode::integer())
                .required(true)
                .amount(Quantity::Exact(Value::from(1))),
        );
    }

    assert!(validate(&array, Some(&value(json!([true, 3])))).is_ok());
    assert!(validate(&array, Some(&value(json!([null, 3])))).is_ok());
    assert_eq!(
        kind_of(&array, Some(&value(json!([false, 3])))),
        Some(ErrorKind::Value)
    );
    assert_eq!(
        kind_of(&array, Some(&value(json!([true, 3, 4])))),
        Some(ErrorKind::Amount)
    );
    assert_eq!(kind_of(&array, Some(&value(json!([])))), Some(ErrorKind::Length));
}

#[test]
fn test_shared_validator_across_threads() {
    let validator = Arc::new(Validator::new());
    let node = Arc::new(schema(json!({"type": "integer", "$": "n"})));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let validator = Arc::clone(&validator);
            let node = Arc::clone(&node);
            thread::spawn(move || {
                let mut scope = Scope::new();
                let target = Value::from(i);
                validator
                    .validate(&node, Some(&target), &mut scope, &ValidateOptions::default())
                    .map(|()| scope.get("$n").cloned())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let bound = handle.join().unwrap().unwrap();
        assert_eq!(bound, Some(Value::from(i)));
    }
}
