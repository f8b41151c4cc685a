//! The closed set of primitive kinds a leaf schema can require, and the
//! native scalar extracted from a matched value.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One of the six primitive kinds. `Integer` is a strict subset of `Number`;
/// `Any` matches every value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleType {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    #[default]
    Any,
}

/// Native representation of a matched value, used only for pattern, format,
/// range and length comparisons. Numbers keep their `serde_json::Number` so
/// the decimal rendering of the literal is preserved for exact comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl SimpleType {
    /// Structural predicate: does `value` belong to this kind?
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            SimpleType::String => value.is_string(),
            SimpleType::Number => value.is_number(),
            SimpleType::Integer => value.is_i64() || value.is_u64(),
            SimpleType::Boolean => value.is_boolean(),
            SimpleType::Null => value.is_null(),
            SimpleType::Any => true,
        }
    }

    /// Extract the comparable scalar from a matching value.
    ///
    /// Returns `None` when `value` does not match this kind, and always for
    /// `Null` and `Any`: neither has a meaningful comparison value, so
    /// constraint code gates on [`matches`](Self::matches) and never extracts
    /// for those two.
    pub fn native_value(&self, value: &Value) -> Option<Scalar> {
        if !self.matches(value) {
            return None;
        }
        match (self, value) {
            (SimpleType::String, Value::String(s)) => Some(Scalar::Text(s.clone())),
            (SimpleType::Number | SimpleType::Integer, Value::Number(n)) => {
                Some(Scalar::Number(n.clone()))
            }
            (SimpleType::Boolean, Value::Bool(b)) => Some(Scalar::Bool(*b)),
            // Null and Any never extract; there is nothing to compare.
            _ => None,
        }
    }

    /// Lowercase name, as it appears in schema documents and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            SimpleType::String => "string",
            SimpleType::Number => "number",
            SimpleType::Integer => "integer",
            SimpleType::Boolean => "boolean",
            SimpleType::Null => "null",
            SimpleType::Any => "any",
        }
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Scalar {
    /// Text rendering used by pattern and length checks.
    pub fn render(&self) -> String {
        match self {
            Scalar::Text(s) => s.clone(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}
