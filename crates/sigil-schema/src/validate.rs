//! Value validation against a schema tree
//!
//! # Architecture
//!
//! - `dispatch`: the shared protocol every node goes through (required,
//!   kind check, type-specific constraints, binding)
//! - `TypeValidator`: one implementation per [`SchemaType`], looked up in a
//!   [`Validators`] registry
//! - `ValidationContext`: the registry plus the variable [`Scope`] threaded
//!   through the descent
//!
//! # Error Handling
//!
//! Validation stops at the first violation. Trial validations (OR-groups,
//! containment) discard data errors but always propagate schema errors.

mod compound;
mod context;
mod error;
mod primitive;
mod record;
mod reference;
mod union;

pub use context::{ValidateOptions, ValidationContext, default_target_name};
pub use error::{Bounds, ErrorKind, SchemaError, Site, Target, ValidationError};
pub use reference::{ExpectedKind, NumericRange, resolve, resolve_bool, resolve_bounds};

use std::fmt;
use std::sync::LazyLock;

use ahash::AHashMap;
use sigil_value::Value;
use tracing::{debug, trace};

use crate::schema::{SchemaNode, SchemaType};
use crate::scope::Scope;

use compound::ArrayValidator;
use primitive::{
    AnyValidator, BooleanValidator, FunctionValidator, IntegerValidator, NullValidator,
    NumberValidator, StringValidator,
};
use record::ObjectValidator;

// =============================================================================
// Public API
// =============================================================================

static STANDARD: LazyLock<Validator> = LazyLock::new(Validator::new);

/// Validate `value` against `schema` with a fresh scope and default options.
///
/// # Example
///
/// ```
/// use sigil_schema::{SchemaNode, validate};
/// use sigil_value::Value;
///
/// let schema = SchemaNode::from_json_str(r#"{"type": "number", "match": {"min": 0}}"#).unwrap();
/// assert!(validate(&schema, Some(&Value::from(3))).is_ok());
/// assert!(validate(&schema, Some(&Value::from(-1))).is_err());
/// ```
pub fn validate(schema: &SchemaNode, value: Option<&Value>) -> Result<(), ValidationError> {
    let mut scope = Scope::new();
    validate_with(schema, value, &mut scope, &ValidateOptions::default())
}

/// Validate with a caller-supplied scope and options using the standard
/// validators. Bindings made during a successful run stay in `scope`.
pub fn validate_with(
    schema: &SchemaNode,
    value: Option<&Value>,
    scope: &mut Scope,
    options: &ValidateOptions,
) -> Result<(), ValidationError> {
    STANDARD.validate(schema, value, scope, options)
}

/// A validator registry bound into a reusable engine.
///
/// `Validator` is `Send + Sync`; share one across threads and give each
/// validation its own [`Scope`].
#[derive(Debug, Default)]
pub struct Validator {
    validators: Validators,
}

impl Validator {
    pub fn new() -> Self {
        Self::with_validators(Validators::standard())
    }

    pub fn with_validators(validators: Validators) -> Self {
        Self { validators }
    }

    pub fn validators(&self) -> &Validators {
        &self.validators
    }

    pub fn validate(
        &self,
        schema: &SchemaNode,
        value: Option<&Value>,
        scope: &mut Scope,
        options: &ValidateOptions,
    ) -> Result<(), ValidationError> {
        ValidationContext::new(&self.validators, scope)
            .with_path_names(options.target_name.is_some())
            .validate(schema, value, options.target_name.as_deref())
    }
}

// =============================================================================
// TypeValidator
// =============================================================================

/// Type-specific part of validation.
///
/// The dispatcher handles absence and binding; implementations only see
/// present values whose kind they accepted.
pub trait TypeValidator: Send + Sync {
    fn schema_type(&self) -> SchemaType;

    /// Runtime kind check. A rejected value is a type mismatch.
    fn accepts(&self, value: &Value) -> bool;

    /// Constraint checks beyond the kind check.
    fn validate(
        &self,
        _cx: &mut ValidationContext<'_>,
        _site: &Site<'_>,
        _value: &Value,
    ) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Registry of type validators keyed by [`SchemaType`].
pub struct Validators {
    by_type: AHashMap<SchemaType, Box<dyn TypeValidator>>,
}

impl Validators {
    /// A registry with nothing registered; every node is an unknown type.
    pub fn empty() -> Self {
        Self {
            by_type: AHashMap::new(),
        }
    }

    /// The built-in validator for every [`SchemaType`].
    pub fn standard() -> Self {
        Self::empty()
            .with(AnyValidator)
            .with(NullValidator)
            .with(FunctionValidator)
            .with(BooleanValidator)
            .with(IntegerValidator)
            .with(NumberValidator)
            .with(StringValidator)
            .with(ArrayValidator)
            .with(ObjectValidator)
    }

    /// Register `validator` for its schema type, replacing any previous one.
    pub fn register(&mut self, validator: impl TypeValidator + 'static) -> &mut Self {
        self.by_type
            .insert(validator.schema_type(), Box::new(validator));
        self
    }

    pub fn with(mut self, validator: impl TypeValidator + 'static) -> Self {
        self.register(validator);
        self
    }

    pub fn remove(&mut self, schema_type: SchemaType) -> bool {
        self.by_type.remove(&schema_type).is_some()
    }

    pub fn get(&self, schema_type: SchemaType) -> Option<&dyn TypeValidator> {
        self.by_type.get(&schema_type).map(|v| v.as_ref())
    }

    pub fn contains(&self, schema_type: SchemaType) -> bool {
        self.by_type.contains_key(&schema_type)
    }
}

impl Default for Validators {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Validators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<_> = SchemaType::ALL
            .iter()
            .filter(|ty| self.by_type.contains_key(*ty))
            .collect();
        f.debug_struct("Validators")
            .field("registered", &registered)
            .finish()
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Shared protocol for every schema node:
///
/// 1. absent value: resolve `required`; absent-and-optional succeeds without
///    binding
/// 2. kind check
/// 3. type-specific constraints
/// 4. bind the value when `$` is set
fn dispatch(
    cx: &mut ValidationContext<'_>,
    node: &SchemaNode,
    value: Option<&Value>,
    name: Option<&str>,
) -> Result<(), ValidationError> {
    let schema_type = node.schema_type();
    let site = Site::new(node, name, value);
    let validators = cx.validators;
    let Some(validator) = validators.get(schema_type) else {
        return Err(site.schema(SchemaError::UnknownType(schema_type)));
    };
    trace!(%schema_type, target_name = name, "validating");

    let Some(value) = value else {
        let required = match &node.required {
            Some(raw) => reference::resolve_bool(raw, cx.scope, node.use_references, "required")
                .map_err(|e| site.schema(e))?,
            None => false,
        };
        if required {
            return Err(site.required());
        }
        return Ok(());
    };

    if !validator.accepts(value) {
        return Err(site.type_mismatch(value.kind()));
    }
    validator.validate(cx, &site, value)?;

    if let Some(variable) = &node.bind {
        debug!(variable = %variable, value = %value.quoted(), "binding");
        cx.bind(variable, value.clone());
    }
    Ok(())
}
