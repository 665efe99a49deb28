//! Schema tree as Rust ADT
//!
//! A schema is an owned, recursive tree of [`SchemaNode`]s. Every node carries
//! the shared fields (`required`, `use$`, `$`) next to a [`SchemaNodeContent`]
//! discriminated by the `type` tag. Constraint values are kept raw as
//! [`Value`]s because they may be variable references that are only resolved
//! at validation time.

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sigil_value::Value;

use crate::validate::SchemaError;

// =============================================================================
// SchemaNode
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(flatten)]
    pub content: SchemaNodeContent,

    /// Boolean literal, or a reference resolving to a boolean.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Value>,

    /// Interpret `$`-prefixed strings in constraint fields as variable
    /// references.
    #[serde(rename = "use$", default, skip_serializing_if = "is_false")]
    pub use_references: bool,

    /// Variable the validated value is bound to on success.
    #[serde(rename = "$", default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl SchemaNode {
    pub fn new(content: SchemaNodeContent) -> Self {
        Self {
            content,
            required: None,
            use_references: false,
            bind: None,
        }
    }

    pub fn any() -> Self {
        Self::new(SchemaNodeContent::Any)
    }

    pub fn null() -> Self {
        Self::new(SchemaNodeContent::Null)
    }

    pub fn function() -> Self {
        Self::new(SchemaNodeContent::Function)
    }

    pub fn boolean() -> Self {
        Self::new(SchemaNodeContent::Boolean(BooleanSchema::default()))
    }

    pub fn integer() -> Self {
        Self::new(SchemaNodeContent::Integer(NumberSchema::default()))
    }

    pub fn number() -> Self {
        Self::new(SchemaNodeContent::Number(NumberSchema::default()))
    }

    pub fn string() -> Self {
        Self::new(SchemaNodeContent::String(StringSchema::default()))
    }

    pub fn array() -> Self {
        Self::new(SchemaNodeContent::Array(ArraySchema::default()))
    }

    pub fn object() -> Self {
        Self::new(SchemaNodeContent::Object(ObjectSchema::default()))
    }

    pub fn required(mut self, required: impl Into<Value>) -> Self {
        self.required = Some(required.into());
        self
    }

    pub fn bind(mut self, name: impl Into<String>) -> Self {
        self.bind = Some(name.into());
        self
    }

    pub fn use_references(mut self) -> Self {
        self.use_references = true;
        self
    }

    /// Set the scalar `match` constraint.
    ///
    /// Ignored for variants without one (`any`, `null`, `function`, `array`,
    /// `object`).
    pub fn with_match(mut self, constraint: Match) -> Self {
        match &mut self.content {
            SchemaNodeContent::Boolean(s) => s.matches = Some(constraint),
            SchemaNodeContent::Integer(s) | SchemaNodeContent::Number(s) => {
                s.matches = Some(constraint)
            }
            SchemaNodeContent::String(s) => s.matches = Some(constraint),
            _ => {}
        }
        self
    }

    pub fn schema_type(&self) -> SchemaType {
        self.content.schema_type()
    }
}

// =============================================================================
// SchemaNodeContent
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaNodeContent {
    Any,
    Null,
    Function,
    Boolean(BooleanSchema),
    Integer(NumberSchema),
    Number(NumberSchema),
    String(StringSchema),
    Array(ArraySchema),
    Object(ObjectSchema),
}

impl SchemaNodeContent {
    pub fn schema_type(&self) -> SchemaType {
        match self {
            SchemaNodeContent::Any => SchemaType::Any,
            SchemaNodeContent::Null => SchemaType::Null,
            SchemaNodeContent::Function => SchemaType::Function,
            SchemaNodeContent::Boolean(_) => SchemaType::Boolean,
            SchemaNodeContent::Integer(_) => SchemaType::Integer,
            SchemaNodeContent::Number(_) => SchemaType::Number,
            SchemaNodeContent::String(_) => SchemaType::String,
            SchemaNodeContent::Array(_) => SchemaType::Array,
            SchemaNodeContent::Object(_) => SchemaType::Object,
        }
    }
}

/// The `type` tag of a schema node; the key of the validator registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Any,
    Null,
    Function,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl SchemaType {
    pub const ALL: [SchemaType; 9] = [
        SchemaType::Any,
        SchemaType::Null,
        SchemaType::Function,
        SchemaType::Boolean,
        SchemaType::Integer,
        SchemaType::Number,
        SchemaType::String,
        SchemaType::Array,
        SchemaType::Object,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Any => "any",
            SchemaType::Null => "null",
            SchemaType::Function => "function",
            SchemaType::Boolean => "boolean",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
            SchemaType::String => "string",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Scalar schemas
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BooleanSchema {
    /// Single literal or reference; lists and ranges are rejected at
    /// validation time.
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Match>,
}

/// Shared by `number` and `integer`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NumberSchema {
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Match>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StringSchema {
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Match>,

    /// Length in Unicode scalar values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<Quantity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
}

/// Regular expression compiled when the schema is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, SchemaError> {
        Regex::new(source)
            .map(Pattern)
            .map_err(|e| SchemaError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl TryFrom<String> for Pattern {
    type Error = SchemaError;

    fn try_from(source: String) -> Result<Self, SchemaError> {
        Pattern::new(&source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.as_str().to_string()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar `match` constraint.
///
/// Variant order matters for untagged deserialization: lists first, then
/// objects that look like ranges, then any other literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Match {
    List(Vec<MatchEntry>),
    Range(Range),
    Exact(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchEntry {
    Range(Range),
    Scalar(Value),
}

impl MatchEntry {
    pub fn is_range(&self) -> bool {
        matches!(self, MatchEntry::Range(_))
    }
}

/// Inclusive `{min?, max?}` bounds. Each bound is a literal or a reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Range {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
}

impl Range {
    pub fn new(min: Option<Value>, max: Option<Value>) -> Self {
        Self { min, max }
    }
}

/// A size constraint: exact count or inclusive range. Used by `length` and
/// containment `amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Range(Range),
    Exact(Value),
}

// =============================================================================
// Compound schemas
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArraySchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<Quantity>,

    /// Positional constraints; index `i` applies to element `i`.
    #[serde(rename = "match", default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<MatchSlot>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<ContainsRule>,
}

/// One positional entry of an array `match`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchSlot {
    /// OR-group: the element must satisfy one of the alternatives.
    AnyOf(Vec<SchemaNode>),
    Single(Box<SchemaNode>),
}

/// Quantified containment rule: how many elements must satisfy `schema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "crate::parse::ContainsRepr")]
pub struct ContainsRule {
    pub schema: SchemaNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Quantity>,
}

impl ContainsRule {
    pub fn new(schema: SchemaNode) -> Self {
        Self {
            schema,
            required: None,
            amount: None,
        }
    }

    pub fn required(mut self, required: impl Into<Value>) -> Self {
        self.required = Some(required.into());
        self
    }

    pub fn amount(mut self, amount: Quantity) -> Self {
        self.amount = Some(amount);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectSchema {
    /// Validated in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
}
