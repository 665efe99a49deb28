//! Conversion between [`Value`] and JSON.
//!
//! JSON has no function or non-finite number representation, so converting to
//! `serde_json::Value` is fallible while the opposite direction is not.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value as JsonValue;

use crate::error::ValueError;
use crate::value::{Array, Map, Value, is_integral};

/// Largest integer magnitude an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            // serde_json numbers are always finite, so `as_f64` only fails
            // for arbitrary-precision builds
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Array(items) => {
                Value::Array(Array(items.into_iter().map(Value::from).collect()))
            }
            JsonValue::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Value {
    /// Convert into a JSON value.
    ///
    /// Integral numbers within the exactly-representable range become JSON
    /// integers so that `1` does not turn into `1.0`.
    pub fn to_json(&self) -> Result<JsonValue, ValueError> {
        match self {
            Value::Null => Ok(JsonValue::Null),
            Value::Bool(b) => Ok(JsonValue::Bool(*b)),
            Value::Number(n) => number_to_json(*n),
            Value::Text(s) => Ok(JsonValue::String(s.clone())),
            Value::Function(f) => Err(ValueError::FunctionNotSupported(f.name().to_string())),
            Value::Array(items) => {
                let mut result = Vec::with_capacity(items.0.len());
                for item in &items.0 {
                    result.push(item.to_json()?);
                }
                Ok(JsonValue::Array(result))
            }
            Value::Object(map) => {
                let mut result = serde_json::Map::new();
                for (key, item) in &map.0 {
                    result.insert(key.clone(), item.to_json()?);
                }
                Ok(JsonValue::Object(result))
            }
        }
    }

    /// Parse a JSON document.
    pub fn from_json_str(source: &str) -> Result<Self, ValueError> {
        serde_json::from_str(source).map_err(|e| ValueError::InvalidJson(e.to_string()))
    }
}

fn number_to_json(n: f64) -> Result<JsonValue, ValueError> {
    if is_integral(n) && n.abs() <= MAX_SAFE_INTEGER {
        return Ok(JsonValue::Number((n as i64).into()));
    }
    serde_json::Number::from_f64(n)
        .map(JsonValue::Number)
        .ok_or(ValueError::NonFiniteNumber(n))
}

// =============================================================================
// serde
// =============================================================================

/// Functions serialize as their display form (`[function name]`), which keeps
/// error reports printable even for values JSON cannot carry.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => {
                if is_integral(*n) && n.abs() <= MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::Text(s) => serializer.serialize_str(s),
            Value::Function(_) => serializer.serialize_str(&self.to_string()),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.0.len()))?;
                for item in &items.0 {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.0.len()))?;
                for (key, item) in &entries.0 {
                    map.serialize_entry(key, item)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON-compatible value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::Text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(Array(items)))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = Map::default();
        while let Some((key, item)) = access.next_entry::<String, Value>()? {
            map.insert(key, item);
        }
        Ok(Value::Object(map))
    }
}
