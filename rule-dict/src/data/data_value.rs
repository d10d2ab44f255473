use serde_json::Value as JsonValue;
use std::fmt;

/// A normalized leaf value read out of a record
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Json(String), // Nested object/array kept as compact JSON text
    Null,
}

impl DataValue {
    /// Normalize a JSON value found at the end of a path
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => DataValue::Null,
            JsonValue::Bool(b) => DataValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    DataValue::Float(f)
                } else {
                    // u64 beyond i64::MAX
                    DataValue::String(n.to_string())
                }
            }
            JsonValue::String(s) => DataValue::String(s.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) => DataValue::Json(value.to_string()),
        }
    }

    /// Blank values never show up in dropdowns and never satisfy a filter.
    /// `false` and `0` are real values.
    pub fn is_blank(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::Json(j) => write!(f, "{}", j),
            DataValue::Null => write!(f, ""),
        }
    }
}
