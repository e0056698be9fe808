//! Scalar field values and field types.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar field value.
///
/// Deserialization is untagged so dataset files can write plain scalars
/// (`price: 2450.8`, `model: Ferrari`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Returns the natural field type of this value.
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Bool(_) => FieldType::Bool,
            Value::Int(_) => FieldType::Int,
            Value::Float(_) => FieldType::Float,
            Value::Text(_) => FieldType::Text,
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view of the value, if it has one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two values.
    ///
    /// Integers and floats compare numerically in `f64` when the two sides
    /// differ in type. Returns `None` for incomparable pairs and for `NaN`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Text,
}

impl FieldType {
    /// Returns true if values of this type have a total order usable by
    /// range predicates.
    pub fn is_ordered(self) -> bool {
        !matches!(self, FieldType::Bool)
    }

    /// Returns true if a value can be compared against a field of this type.
    pub fn is_comparable_with(self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Int | FieldType::Float, Value::Int(_) | Value::Float(_)) => true,
            (ty, value) => ty == value.field_type(),
        }
    }

    /// Converts a value into this type for storage.
    ///
    /// Only widening `Int -> Float` is performed; anything else must already
    /// match the declared type.
    pub fn coerce(self, value: Value) -> Option<Value> {
        match (self, value) {
            (FieldType::Float, Value::Int(v)) => Some(Value::Float(v as f64)),
            (ty, value) if value.field_type() == ty => Some(value),
            _ => None,
        }
    }

    /// Parses a raw command-line string as a value of this type.
    pub fn parse_value(self, raw: &str) -> Result<Value, String> {
        match self {
            FieldType::Bool => raw
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|e| format!("'{raw}' is not a bool: {e}")),
            FieldType::Int => raw
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| format!("'{raw}' is not an integer: {e}")),
            FieldType::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| format!("'{raw}' is not a number: {e}")),
            FieldType::Text => Ok(Value::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Bool => "bool",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Text => "text",
        };
        f.write_str(name)
    }
}
