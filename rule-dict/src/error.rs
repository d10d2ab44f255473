use thiserror::Error;

/// Reasons a document cannot become a dataset.
///
/// Path misses and empty results are not errors; they resolve to blank
/// values and empty datasets respectively.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON array of records, found {found}")]
    NotAnArray { found: &'static str },

    #[error("record {index} is {found}, expected an object")]
    NotAnObject { index: usize, found: &'static str },
}

/// Human readable name of a JSON value's kind, used in error messages
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
