use tracing::debug;

use crate::data::dataset::Dataset;
use crate::data::unique_values::has_values;

/// Columns of `all_columns` that hold at least one non-blank value in
/// `dataset`, in their original order.
///
/// Always computed from scratch so the set can grow back when a filter is
/// relaxed.
pub fn visible_columns(dataset: &Dataset, all_columns: &[String]) -> Vec<String> {
    let visible: Vec<String> = all_columns
        .iter()
        .filter(|column| has_values(dataset, column))
        .cloned()
        .collect();

    debug!(
        target: "columns",
        "{} of {} columns visible over {} records",
        visible.len(),
        all_columns.len(),
        dataset.len()
    );
    visible
}
