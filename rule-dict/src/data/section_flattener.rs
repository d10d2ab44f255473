//! Flattening of the `given` / `when` / `then` sections into dot-path columns.
//!
//! A section comes in one of two shapes depending on the document:
//!
//! * an object of sub-rules: `{"given": {"g1": {"action": "click"}}}`
//!   flattens to `given.g1.action`
//! * an array of sub-rules: `{"given": [{"action": "click"}]}` flattens to
//!   `given.0.action`, the position standing in for the sub-rule key
//!
//! Both land in the same key space, and both keys resolve through
//! [`path_resolver::resolve`](crate::data::path_resolver::resolve) to the same
//! leaf. A sub-entry holding a scalar (`{"given": {"givenId": "G1"}}`) becomes
//! the two-level column `given.givenId`.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt;

use crate::data::data_value::DataValue;

/// One of the three known nested groupings of a rule record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Given,
    When,
    Then,
}

impl Section {
    /// Column discovery order
    pub const ALL: [Section; 3] = [Section::Given, Section::When, Section::Then];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Given => "given",
            Section::When => "when",
            Section::Then => "then",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    /// The section a column belongs to, judged by its first path segment
    pub fn of_column(column: &str) -> Option<Self> {
        let head = column.split('.').next().unwrap_or(column);
        if head.len() == column.len() {
            // A bare `given` column is a plain field, not a flattened one
            return None;
        }
        Self::from_name(head)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flatten one section of a record into `section.subKey.field` entries.
///
/// A record without the section (or with a null or scalar section) yields an
/// empty map. Null leaves become `DataValue::Null`.
pub fn flatten(record: &JsonValue, section: Section) -> IndexMap<String, DataValue> {
    let mut result = IndexMap::new();
    let name = section.as_str();

    match record.get(name) {
        Some(JsonValue::Object(sub_rules)) => {
            for (sub_key, sub_rule) in sub_rules {
                flatten_sub_rule(&mut result, name, sub_key, sub_rule);
            }
        }
        Some(JsonValue::Array(sub_rules)) => {
            for (position, sub_rule) in sub_rules.iter().enumerate() {
                // Scalars in a list have no field name to hang a column on
                if sub_rule.is_object() {
                    flatten_sub_rule(&mut result, name, &position.to_string(), sub_rule);
                }
            }
        }
        _ => {}
    }

    result
}

fn flatten_sub_rule(
    result: &mut IndexMap<String, DataValue>,
    section: &str,
    sub_key: &str,
    sub_rule: &JsonValue,
) {
    match sub_rule {
        JsonValue::Object(fields) => {
            for (field, value) in fields {
                result.insert(
                    format!("{}.{}.{}", section, sub_key, field),
                    DataValue::from_json(value),
                );
            }
        }
        other => {
            result.insert(
                format!("{}.{}", section, sub_key),
                DataValue::from_json(other),
            );
        }
    }
}
