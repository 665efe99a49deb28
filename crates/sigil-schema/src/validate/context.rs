//! Validation context and options
//!
//! `ValidationContext` carries the state shared by one validation run:
//! - the validator registry
//! - the variable scope, written on success only
//! - how child targets are named in errors

use sigil_value::Value;

use crate::schema::SchemaNode;
use crate::scope::{Scope, variable_key};

use super::Validators;
use super::error::{SchemaError, ValidationError};
use super::reference::{self, ExpectedKind};

// =============================================================================
// ValidateOptions
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidateOptions {
    /// Name of the root target in errors. Defaults to the rendered value
    /// (`undefined` when absent).
    pub target_name: Option<String>,
}

impl ValidateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }
}

/// Default diagnostic name for a target.
pub fn default_target_name(value: Option<&Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "undefined".to_string(),
    }
}

// =============================================================================
// ValidationContext
// =============================================================================

pub struct ValidationContext<'a> {
    pub validators: &'a Validators,
    pub scope: &'a mut Scope,
    /// Name children as `parent[i]` / `parent.key` instead of by their own
    /// rendering. Enabled when the caller named the root target.
    path_names: bool,
    /// Bindings replaced inside open attempts, as (key, previous value).
    journal: Vec<(String, Option<Value>)>,
    open_attempts: usize,
}

impl<'a> ValidationContext<'a> {
    pub fn new(validators: &'a Validators, scope: &'a mut Scope) -> Self {
        Self {
            validators,
            scope,
            path_names: false,
            journal: Vec::new(),
            open_attempts: 0,
        }
    }

    pub fn with_path_names(mut self, path_names: bool) -> Self {
        self.path_names = path_names;
        self
    }

    /// Validate `value` against `node`, binding into this context's scope.
    pub fn validate(
        &mut self,
        node: &SchemaNode,
        value: Option<&Value>,
        name: Option<&str>,
    ) -> Result<(), ValidationError> {
        super::dispatch(self, node, value, name)
    }

    /// Trial validation.
    ///
    /// Bindings written during a failed attempt are undone, so the scope is
    /// left exactly as it was. Nested attempts keep their journal entries
    /// until the outermost attempt settles.
    pub fn attempt(
        &mut self,
        node: &SchemaNode,
        value: Option<&Value>,
        name: Option<&str>,
    ) -> Result<(), ValidationError> {
        let mark = self.journal.len();
        self.open_attempts += 1;
        let result = self.validate(node, value, name);
        self.open_attempts -= 1;
        if result.is_err() {
            for (key, previous) in self.journal.drain(mark..).rev() {
                self.scope.restore(&key, previous);
            }
        } else if self.open_attempts == 0 {
            self.journal.clear();
        }
        result
    }

    /// Bind `value` under `name`, journaling the replaced value while an
    /// attempt is open.
    pub fn bind(&mut self, name: &str, value: Value) {
        let key = variable_key(name);
        let previous = self.scope.bind(&key, value);
        if self.open_attempts > 0 {
            self.journal.push((key, previous));
        }
    }

    pub fn resolve(
        &self,
        raw: &Value,
        expected: ExpectedKind,
        use_references: bool,
        constraint: &str,
    ) -> Result<Value, SchemaError> {
        reference::resolve(raw, self.scope, expected, use_references, constraint)
    }

    /// Name of element `index` under `parent`. `None` leaves the child to be
    /// named by its own rendering when an error is reported.
    pub fn index_name(&self, parent: Option<&str>, index: usize) -> Option<String> {
        self.path_names
            .then(|| format!("{}[{index}]", parent.unwrap_or_default()))
    }

    pub fn key_name(&self, parent: Option<&str>, key: &str) -> Option<String> {
        self.path_names
            .then(|| format!("{}.{key}", parent.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target_name() {
        assert_eq!(default_target_name(None), "undefined");
        assert_eq!(default_target_name(Some(&Value::from("abc"))), "abc");
        assert_eq!(
            default_target_name(Some(&Value::from(vec![Value::from(1)]))),
            "[1]"
        );
    }

    #[test]
    fn test_child_names() {
        let validators = Validators::standard();
        let mut scope = Scope::new();

        let cx = ValidationContext::new(&validators, &mut scope);
        assert_eq!(cx.index_name(Some("list"), 2), None);
        assert_eq!(cx.key_name(None, "k"), None);

        let cx = cx.with_path_names(true);
        assert_eq!(cx.index_name(Some("list"), 2).as_deref(), Some("list[2]"));
        assert_eq!(cx.key_name(Some("obj"), "k").as_deref(), Some("obj.k"));
    }

    #[test]
    fn test_attempt_commits_only_on_success() {
        let validators = Validators::standard();
        let mut scope = Scope::new();
        let mut cx = ValidationContext::new(&validators, &mut scope);

        let failing = SchemaNode::string().bind("x");
        assert!(cx.attempt(&failing, Some(&Value::from(1)), None).is_err());
        assert!(cx.scope.is_empty());

        let passing = SchemaNode::number().bind("x");
        assert!(cx.attempt(&passing, Some(&Value::from(1)), None).is_ok());
        assert_eq!(cx.scope.get("$x"), Some(&Value::from(1)));
    }

    #[test]
    fn test_failed_attempt_restores_overwritten_binding() {
        let validators = Validators::standard();
        let mut scope: Scope = [("x", Value::from("kept"))].into_iter().collect();
        let mut cx = ValidationContext::new(&validators, &mut scope);

        // `a` rebinds `$x` and adds `$y` before `b` fails
        let node = SchemaNode::from_json(serde_json::json!({
            "type": "object",
            "properties": {
                "a": {"type": "number", "$": "x"},
                "y": {"type": "number", "$": "y"},
                "b": {"type": "string"}
            }
        }))
        .unwrap();
        let value = Value::from(serde_json::json!({"a": 1, "y": 2, "b": 3}));
        assert!(cx.attempt(&node, Some(&value), None).is_err());
        assert_eq!(cx.scope.get("x"), Some(&Value::from("kept")));
        assert!(!cx.scope.contains("y"));
        assert_eq!(cx.scope.len(), 1);
        assert!(cx.journal.is_empty());
    }

    #[test]
    fn test_nested_attempts_undo_with_outer_failure() {
        let validators = Validators::standard();
        let mut scope = Scope::new();
        let mut cx = ValidationContext::new(&validators, &mut scope);

        // the inner OR-group alternative succeeds and binds, then the outer
        // attempt fails on the second position
        let node = SchemaNode::from_json(serde_json::json!({
            "type": "array",
            "match": [
                [{"type": "number", "$": "n"}],
                {"type": "string"}
            ]
        }))
        .unwrap();
        let value = Value::from(serde_json::json!([1, 2]));
        assert!(cx.attempt(&node, Some(&value), None).is_err());
        assert!(cx.scope.is_empty());

        let value = Value::from(serde_json::json!([1, "s"]));
        assert!(cx.attempt(&node, Some(&value), None).is_ok());
        assert_eq!(cx.scope.get("n"), Some(&Value::from(1)));
        assert!(cx.journal.is_empty());
    }

    #[test]
    fn test_bind_outside_attempt_is_not_journaled() {
        let validators = Validators::standard();
        let mut scope = Scope::new();
        let mut cx = ValidationContext::new(&validators, &mut scope);
        cx.bind("x", Value::from(1));
        assert!(cx.journal.is_empty());
        assert_eq!(cx.scope.get("$x"), Some(&Value::from(1)));
    }
}
