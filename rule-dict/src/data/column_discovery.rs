use tracing::debug;

use crate::data::dataset::Dataset;
use crate::data::section_flattener::{flatten, Section};

/// The fixed leading column of every discovered table
pub const LEADING_COLUMN: &str = "businessRuleId";

/// Derive the ordered column list from the first record's shape.
///
/// Only the first record is inspected: nested keys that appear solely in
/// later records are never discovered.
pub fn discover_columns(dataset: &Dataset) -> Vec<String> {
    let first = match dataset.first() {
        Some(record) => record,
        None => return Vec::new(),
    };

    let mut columns = vec![LEADING_COLUMN.to_string()];
    for section in Section::ALL {
        for column in flatten(first, section).into_keys() {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
    }

    debug!(target: "columns", "Discovered {} columns", columns.len());
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_dataset_has_no_columns() {
        assert!(discover_columns(&Dataset::new()).is_empty());
    }

    #[test]
    fn test_section_order_and_leading_column() {
        let dataset = Dataset::from_json(json!([{
            "then": {"t1": {"thenId": "T1"}},
            "businessRuleId": "R1",
            "when": {"w1": {"whenId": "W1"}},
            "given": {"g1": {"givenId": "G1", "action": "click"}}
        }]))
        .unwrap();

        assert_eq!(
            discover_columns(&dataset),
            vec![
                "businessRuleId",
                "given.g1.givenId",
                "given.g1.action",
                "when.w1.whenId",
                "then.t1.thenId"
            ]
        );
    }

    #[test]
    fn test_only_first_record_shapes_columns() {
        let dataset = Dataset::from_json(json!([
            {"businessRuleId": "R1", "given": {"g1": {"action": "click"}}},
            {"businessRuleId": "R2", "given": {"g1": {"action": "type", "value": "x"}}}
        ]))
        .unwrap();

        let columns = discover_columns(&dataset);
        assert_eq!(columns, vec!["businessRuleId", "given.g1.action"]);
    }

    #[test]
    fn test_leading_column_present_even_when_missing_from_record() {
        let dataset = Dataset::from_json(json!([{"other": 1}])).unwrap();
        assert_eq!(discover_columns(&dataset), vec![LEADING_COLUMN]);
    }
}
