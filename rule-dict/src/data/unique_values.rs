use indexmap::IndexSet;
use serde_json::Value as JsonValue;
use tracing::trace;

use crate::data::data_value::DataValue;
use crate::data::dataset::Dataset;
use crate::data::path_resolver::resolve;
use crate::data::section_flattener::{flatten, Section};

/// Value of one column for one record.
///
/// Sectioned columns go through the flattener, everything else through the
/// path resolver.
pub fn column_value(record: &JsonValue, column: &str) -> DataValue {
    match Section::of_column(column) {
        Some(section) => flatten(record, section)
            .swap_remove(column)
            .unwrap_or(DataValue::Null),
        None => resolve(record, column),
    }
}

/// Distinct non-blank display values of a column, in first-occurrence order
pub fn unique_values(dataset: &Dataset, column: &str) -> IndexSet<String> {
    let values: IndexSet<String> = dataset
        .iter()
        .map(|record| column_value(record, column))
        .filter(|value| !value.is_blank())
        .map(|value| value.to_string())
        .collect();

    trace!(target: "columns", "{} has {} distinct values", column, values.len());
    values
}

/// True when at least one record has a non-blank value for the column.
/// Short-circuits instead of building the whole set.
pub fn has_values(dataset: &Dataset, column: &str) -> bool {
    dataset
        .iter()
        .any(|record| !column_value(record, column).is_blank())
}
