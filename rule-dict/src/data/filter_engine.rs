use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use tracing::debug;

use crate::data::column_discovery::LEADING_COLUMN;
use crate::data::dataset::Dataset;
use crate::data::unique_values::column_value;

/// Active column → value constraints. An empty value means "no constraint".
pub type FilterMap = IndexMap<String, String>;

/// How a filter value is compared with a column's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Dropdown columns: exact equality of the stringified value
    Exact,
    /// Free-text columns: case-insensitive substring containment
    Contains,
}

impl MatchPolicy {
    pub fn matches(&self, cell: &str, filter: &str) -> bool {
        match self {
            MatchPolicy::Exact => cell == filter,
            MatchPolicy::Contains => cell.to_lowercase().contains(&filter.to_lowercase()),
        }
    }
}

/// Evaluates a filter map against a dataset.
///
/// Free-text columns match by substring, every other column by exact value.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    text_columns: HashSet<String>,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new([LEADING_COLUMN])
    }
}

impl FilterEngine {
    pub fn new<I, S>(text_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text_columns: text_columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_text_column(&self, column: &str) -> bool {
        self.text_columns.contains(column)
    }

    pub fn policy_for(&self, column: &str) -> MatchPolicy {
        if self.is_text_column(column) {
            MatchPolicy::Contains
        } else {
            MatchPolicy::Exact
        }
    }

    /// Whether a single record satisfies every non-empty filter.
    /// A blank value at a filtered column never matches.
    pub fn record_matches(&self, record: &JsonValue, filters: &FilterMap) -> bool {
        filters
            .iter()
            .filter(|(_, wanted)| !wanted.is_empty())
            .all(|(column, wanted)| {
                let value = column_value(record, column);
                if value.is_blank() {
                    return false;
                }
                self.policy_for(column).matches(&value.to_string(), wanted)
            })
    }

    /// Derive the records that satisfy all active filters.
    ///
    /// Filters naming columns that are no longer visible still apply.
    pub fn apply(&self, dataset: &Dataset, filters: &FilterMap) -> Dataset {
        let active = filters.values().filter(|v| !v.is_empty()).count();
        if active == 0 {
            return dataset.clone();
        }

        let filtered = dataset.filter(|record| self.record_matches(record, filters));
        debug!(
            target: "filter",
            "Applied {} filters: {} of {} records kept",
            active,
            filtered.len(),
            dataset.len()
        );
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::path_resolver::resolve;
    use serde_json::json;

    fn rules() -> Dataset {
        Dataset::from_json(json!([
            {"businessRuleId": "BR-100", "given": {"g1": {"action": "click"}}},
            {"businessRuleId": "BR-200", "given": {"g1": {"action": "Click"}}},
            {"businessRuleId": "br-101", "given": {"g1": {"action": ""}}},
            {"given": {"g1": {"action": "click"}}}
        ]))
        .unwrap()
    }

    fn filters(pairs: &[(&str, &str)]) -> FilterMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ids(dataset: &Dataset) -> Vec<String> {
        dataset
            .iter()
            .map(|r| resolve(r, "businessRuleId").to_string())
            .collect()
    }

    #[test]
    fn test_dropdown_columns_match_exactly() {
        let engine = FilterEngine::default();
        let result = engine.apply(&rules(), &filters(&[("given.g1.action", "click")]));
        assert_eq!(ids(&result), vec!["BR-100", ""]);
    }

    #[test]
    fn test_text_columns_match_substring_ignoring_case() {
        let engine = FilterEngine::default();
        let result = engine.apply(&rules(), &filters(&[("businessRuleId", "br-1")]));
        assert_eq!(ids(&result), vec!["BR-100", "br-101"]);
    }

    #[test]
    fn test_all_filters_must_match() {
        let engine = FilterEngine::default();
        let result = engine.apply(
            &rules(),
            &filters(&[("businessRuleId", "BR"), ("given.g1.action", "click")]),
        );
        assert_eq!(ids(&result), vec!["BR-100"]);
    }

    #[test]
    fn test_blank_value_fails_a_filter() {
        let engine = FilterEngine::default();
        let result = engine.apply(&rules(), &filters(&[("businessRuleId", "1")]));
        // The record without an id is excluded
        assert_eq!(ids(&result), vec!["BR-100", "br-101"]);
    }

    #[test]
    fn test_empty_filter_value_is_no_constraint() {
        let engine = FilterEngine::default();
        let dataset = rules();
        let result = engine.apply(&dataset, &filters(&[("given.g1.action", "")]));
        assert_eq!(result, dataset);
    }

    #[test]
    fn test_stale_filter_on_unknown_column_still_applies() {
        let engine = FilterEngine::default();
        let result = engine.apply(&rules(), &filters(&[("then.t1.value", "x")]));
        assert!(result.is_empty());
    }

    #[test]
    fn test_custom_text_columns() {
        let engine = FilterEngine::new(["given.g1.action"]);
        assert_eq!(engine.policy_for("given.g1.action"), MatchPolicy::Contains);
        assert_eq!(engine.policy_for("businessRuleId"), MatchPolicy::Exact);

        let result = engine.apply(&rules(), &filters(&[("given.g1.action", "CLI")]));
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let engine = FilterEngine::default();
        let f = filters(&[("businessRuleId", "br")]);
        let once = engine.apply(&rules(), &f);
        let twice = engine.apply(&once, &f);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dotted_sub_keys_filter_like_their_dropdown() {
        let dataset = Dataset::from_json(json!([
            {"businessRuleId": "R1", "given": {"g.1": {"action": "click"}}},
            {"businessRuleId": "R2", "given": {"g.1": {"action": "type"}}},
            {"businessRuleId": "R3", "then": {"t1": {"value.expected": "ok"}}}
        ]))
        .unwrap();
        let engine = FilterEngine::default();

        let result = engine.apply(&dataset, &filters(&[("given.g.1.action", "click")]));
        assert_eq!(ids(&result), vec!["R1"]);

        let result = engine.apply(&dataset, &filters(&[("then.t1.value.expected", "ok")]));
        assert_eq!(ids(&result), vec!["R3"]);
    }
}
