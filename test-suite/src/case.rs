use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use sigil_schema::{ErrorKind, SchemaNode, Scope, ValidateOptions, ValidationError, validate_with};
use sigil_value::Value;

/// A case file holds either one case or a map of named cases.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CaseFile {
    Multi { cases: BTreeMap<String, CaseData> },
    Single(CaseData),
}

impl CaseFile {
    /// All cases in the file. A single-case file yields one case with an
    /// empty name.
    pub fn all_cases(&self) -> Vec<(&str, &CaseData)> {
        match self {
            CaseFile::Multi { cases } => cases
                .iter()
                .map(|(name, data)| (name.as_str(), data))
                .collect(),
            CaseFile::Single(data) => vec![("", data)],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseData {
    #[serde(default)]
    pub description: Option<String>,
    pub schema: JsonValue,
    /// The validation target. A missing key means an absent value, while an
    /// explicit `null` is the null value.
    #[serde(default, deserialize_with = "present")]
    pub value: Option<JsonValue>,
    /// Variables bound before validation starts.
    #[serde(default)]
    pub vars: BTreeMap<String, JsonValue>,
    /// Root target name passed to the validator.
    #[serde(default)]
    pub name: Option<String>,
    pub expect: Expectation,
    /// Exact rendering of the expected error.
    #[serde(default)]
    pub message: Option<String>,
    /// Variables expected in scope after a successful validation.
    #[serde(default)]
    pub bindings: BTreeMap<String, JsonValue>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

/// Expected outcome: `"ok"` or the name of an error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Expectation {
    Ok,
    Error(ErrorKind),
}

impl TryFrom<String> for Expectation {
    type Error = String;

    fn try_from(name: String) -> Result<Self, String> {
        if name == "ok" {
            return Ok(Expectation::Ok);
        }
        ErrorKind::from_name(&name)
            .map(Expectation::Error)
            .ok_or_else(|| format!("unknown expectation `{name}`"))
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Ok => f.write_str("ok"),
            Expectation::Error(kind) => write!(f, "{kind} error"),
        }
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone)]
pub enum ScenarioResult {
    Passed,
    Failed { error: String },
}

impl ScenarioResult {
    pub fn is_passed(&self) -> bool {
        matches!(self, ScenarioResult::Passed)
    }

    fn check(passed: bool, error: impl FnOnce() -> String) -> Self {
        if passed {
            ScenarioResult::Passed
        } else {
            ScenarioResult::Failed { error: error() }
        }
    }
}

/// Named scenario with its result
#[derive(Debug, Clone)]
pub struct NamedScenarioResult {
    pub name: String,
    pub result: ScenarioResult,
}

/// Result of running all scenarios in a test case
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub scenarios: Vec<NamedScenarioResult>,
}

impl CaseResult {
    pub fn passed_count(&self) -> usize {
        self.scenarios.iter().filter(|s| s.result.is_passed()).count()
    }

    pub fn total_count(&self) -> usize {
        self.scenarios.len()
    }

    pub fn all_passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.result.is_passed())
    }

    pub fn failed_scenarios(&self) -> Vec<&NamedScenarioResult> {
        self.scenarios.iter().filter(|s| !s.result.is_passed()).collect()
    }

    fn push(&mut self, name: &str, result: ScenarioResult) {
        self.scenarios.push(NamedScenarioResult {
            name: name.to_string(),
            result,
        });
    }
}

pub struct Case {
    pub path: PathBuf,
    pub name: String,
    pub data: CaseData,
}

impl Case {
    pub fn new(path: PathBuf, name: String, data: CaseData) -> Self {
        Self { path, name, data }
    }

    /// One-line summary of the inputs, shown next to failures.
    pub fn status_summary(&self) -> String {
        let value = match &self.data.value {
            Some(value) => value.to_string(),
            None => "<absent>".to_string(),
        };
        let mut summary = format!("schema: {}\nvalue:  {}", self.data.schema, value);
        if let Some(description) = &self.data.description {
            summary = format!("{description}\n{summary}");
        }
        summary
    }

    pub fn run_all(&self) -> CaseResult {
        let mut result = CaseResult {
            scenarios: Vec::new(),
        };
        let mut scope: Scope = self
            .data
            .vars
            .iter()
            .map(|(name, json)| (name, Value::from(json.clone())))
            .collect();

        let outcome = self.validate(&mut scope);
        let expect = self.data.expect;
        result.push(
            "validate",
            ScenarioResult::check(outcome_matches(&outcome, expect), || {
                format!("expected {expect}, got {}", describe(&outcome))
            }),
        );

        if let Some(message) = &self.data.message {
            let actual = outcome.as_ref().err().map(|e| e.to_string());
            result.push(
                "message",
                ScenarioResult::check(actual.as_deref() == Some(message.as_str()), || {
                    format!("expected message {message:?}, got {actual:?}")
                }),
            );
        }

        if !self.data.bindings.is_empty() {
            let mismatches: Vec<String> = self
                .data
                .bindings
                .iter()
                .filter_map(|(name, json)| {
                    let expected = Value::from(json.clone());
                    match scope.get(name) {
                        Some(actual) if *actual == expected => None,
                        actual => Some(format!("{name}: expected {expected}, got {actual:?}")),
                    }
                })
                .collect();
            result.push(
                "bindings",
                ScenarioResult::check(mismatches.is_empty(), || mismatches.join("\n")),
            );
        }

        result
    }

    fn validate(&self, scope: &mut Scope) -> Result<(), CaseError> {
        let schema = SchemaNode::from_json(self.data.schema.clone()).map_err(CaseError::Schema)?;
        let value = self.data.value.clone().map(Value::from);
        let options = match &self.data.name {
            Some(name) => ValidateOptions::new().with_target_name(name.clone()),
            None => ValidateOptions::default(),
        };
        validate_with(&schema, value.as_ref(), scope, &options).map_err(CaseError::Validation)
    }
}

/// Failure while running a case: either the schema document itself was
/// rejected or the value failed validation.
#[derive(Debug, thiserror::Error)]
enum CaseError {
    #[error("{0}")]
    Schema(sigil_schema::SchemaError),
    #[error("{0}")]
    Validation(ValidationError),
}

impl CaseError {
    fn kind(&self) -> ErrorKind {
        match self {
            CaseError::Schema(_) => ErrorKind::Schema,
            CaseError::Validation(error) => error.kind(),
        }
    }
}

fn outcome_matches(outcome: &Result<(), CaseError>, expect: Expectation) -> bool {
    match (outcome, expect) {
        (Ok(()), Expectation::Ok) => true,
        (Err(error), Expectation::Error(kind)) => error.kind() == kind,
        _ => false,
    }
}

fn describe(outcome: &Result<(), CaseError>) -> String {
    match outcome {
        Ok(()) => "ok".to_string(),
        Err(error) => format!("{} error: {error}", error.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> CaseFile {
        serde_json::from_str(source).unwrap()
    }

    #[test]
    fn test_expectation_names() {
        assert_eq!(
            Expectation::try_from("ok".to_string()),
            Ok(Expectation::Ok)
        );
        assert_eq!(
            Expectation::try_from("type".to_string()),
            Ok(Expectation::Error(ErrorKind::TypeMismatch))
        );
        assert!(Expectation::try_from("nope".to_string()).is_err());
    }

    #[test]
    fn test_single_and_multi_files() {
        let single = parse(r#"{"schema": {"type": "any"}, "value": null, "expect": "ok"}"#);
        let cases = single.all_cases();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].0, "");
        assert_eq!(cases[0].1.value, Some(JsonValue::Null));

        let multi = parse(
            r#"{"cases": {
                "b": {"schema": {"type": "number"}, "expect": "required"},
                "a": {"schema": {"type": "number"}, "expect": "ok"}
            }}"#,
        );
        let names: Vec<_> = multi.all_cases().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(multi.all_cases()[0].1.value, None);
    }

    #[test]
    fn test_unknown_expectation_is_rejected() {
        let result: Result<CaseFile, _> =
            serde_json::from_str(r#"{"schema": {"type": "any"}, "expect": "maybe"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_checks_message_and_bindings() {
        let file = parse(
            r#"{
                "schema": {"type": "object", "properties": {
                    "b": {"type": "integer", "$": "b"},
                    "a": {"type": "integer", "match": "$b", "use$": true}
                }},
                "value": {"a": 2, "b": 2},
                "expect": "ok",
                "bindings": {"b": 2}
            }"#,
        );
        let (name, data) = file.all_cases()[0];
        let case = Case::new(PathBuf::from("inline.json"), name.to_string(), data.clone());
        let result = case.run_all();
        assert!(result.all_passed(), "{:?}", result.failed_scenarios());
        assert_eq!(result.total_count(), 2);
    }
}
