use serde_json::Value as JsonValue;

use crate::data::data_value::DataValue;

/// Walk a dotted path through a record.
///
/// Object segments index by key, array segments by decimal position. Any
/// missing or null step yields `DataValue::Null`; a miss is never an error.
pub fn resolve(record: &JsonValue, path: &str) -> DataValue {
    match walk(record, path) {
        Some(value) => DataValue::from_json(value),
        None => DataValue::Null,
    }
}

/// Raw lookup behind [`resolve`], returning the JSON node at `path`
pub fn walk<'a>(record: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut current = record;
    for segment in path.split('.') {
        current = match current {
            JsonValue::Object(map) => map.get(segment)?,
            JsonValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}
