//! Session state for one loaded rules document.
//!
//! A [`SessionState`] is never edited in place. Every user action (load,
//! filter edit, apply, clear) is a function from the current snapshot to a
//! new one, so the full dataset, the filter map, the filtered rows and the
//! visible columns always change together.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::data::column_discovery::discover_columns;
use crate::data::dataset::Dataset;
use crate::data::filter_engine::{FilterEngine, FilterMap};
use crate::data::unique_values::{column_value, unique_values};
use crate::data::visibility::visible_columns;
use crate::error::LoadError;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Nothing loaded yet
    #[default]
    Empty,
    /// Full dataset on display
    Loaded,
    /// Filters applied to the full dataset
    Filtered,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    phase: SessionPhase,
    all_columns: Vec<String>,
    full_dataset: Dataset,
    filters: FilterMap,
    filtered_dataset: Dataset,
    visible_columns: Vec<String>,
}

impl SessionState {
    /// The initial, empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session over an already parsed dataset
    pub fn from_dataset(dataset: Dataset) -> Self {
        let all_columns = discover_columns(&dataset);
        let visible = visible_columns(&dataset, &all_columns);
        info!(
            target: "session",
            "Loaded {} records, {} columns ({} visible)",
            dataset.len(),
            all_columns.len(),
            visible.len()
        );

        Self {
            phase: SessionPhase::Loaded,
            all_columns,
            filtered_dataset: dataset.clone(),
            full_dataset: dataset,
            filters: FilterMap::new(),
            visible_columns: visible,
        }
    }

    /// Parse document text into a fresh session. On error the caller keeps
    /// whatever session it already had.
    pub fn load_str(text: &str) -> Result<Self, LoadError> {
        Ok(Self::from_dataset(Dataset::from_json_str(text)?))
    }

    /// Load a document from disk into a fresh session
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_dataset(Dataset::load_file(path)?))
    }

    /// Record a pending edit to one column's filter. Nothing is re-filtered
    /// until [`apply_filters`](Self::apply_filters).
    pub fn with_filter(&self, column: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.filters.insert(column.into(), value.into());
        next
    }

    /// Drop the pending filter for one column
    pub fn without_filter(&self, column: &str) -> Self {
        let mut next = self.clone();
        next.filters.shift_remove(column);
        next
    }

    /// Filter the full dataset with the current filter map and recompute the
    /// visible columns over the result
    pub fn apply_filters(&self, engine: &FilterEngine) -> Self {
        if self.phase == SessionPhase::Empty {
            return self.clone();
        }

        let filtered = engine.apply(&self.full_dataset, &self.filters);
        let visible = visible_columns(&filtered, &self.all_columns);
        info!(
            target: "session",
            "Filters applied: {} of {} records, {} columns visible",
            filtered.len(),
            self.full_dataset.len(),
            visible.len()
        );

        Self {
            phase: SessionPhase::Filtered,
            filtered_dataset: filtered,
            visible_columns: visible,
            ..self.clone()
        }
    }

    /// Forget every filter and go back to the full dataset
    pub fn clear_filters(&self) -> Self {
        if self.phase == SessionPhase::Empty {
            return Self {
                filters: FilterMap::new(),
                ..self.clone()
            };
        }

        info!(target: "session", "Filters cleared");
        Self {
            phase: SessionPhase::Loaded,
            filters: FilterMap::new(),
            filtered_dataset: self.full_dataset.clone(),
            visible_columns: visible_columns(&self.full_dataset, &self.all_columns),
            ..self.clone()
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn all_columns(&self) -> &[String] {
        &self.all_columns
    }

    pub fn visible_columns(&self) -> &[String] {
        &self.visible_columns
    }

    pub fn filters(&self) -> &FilterMap {
        &self.filters
    }

    pub fn full_dataset(&self) -> &Dataset {
        &self.full_dataset
    }

    pub fn filtered_dataset(&self) -> &Dataset {
        &self.filtered_dataset
    }

    /// Dropdown choices for a column, drawn from the full dataset so a
    /// narrowed view can still be re-targeted
    pub fn filter_options(&self, column: &str) -> Vec<String> {
        unique_values(&self.full_dataset, column).into_iter().collect()
    }

    /// Everything a renderer needs: visible columns, row cells and one
    /// filter control per visible column
    pub fn projection(&self, engine: &FilterEngine) -> TableProjection {
        let rows = self
            .filtered_dataset
            .iter()
            .map(|record| {
                self.visible_columns
                    .iter()
                    .map(|column| column_value(record, column).to_string())
                    .collect()
            })
            .collect();

        let controls = self
            .visible_columns
            .iter()
            .map(|column| ColumnFilter {
                column: column.clone(),
                control: if engine.is_text_column(column) {
                    FilterControl::Text
                } else {
                    FilterControl::Dropdown {
                        options: self.filter_options(column),
                    }
                },
                current: self.filters.get(column).cloned().unwrap_or_default(),
            })
            .collect();

        TableProjection {
            columns: self.visible_columns.clone(),
            rows,
            controls,
        }
    }
}

/// The kind of input a renderer should offer for a column
#[derive(Debug, Clone, PartialEq)]
pub enum FilterControl {
    /// Free text, matched as a case-insensitive substring
    Text,
    /// Pick one of the column's distinct values
    Dropdown { options: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub control: FilterControl,
    /// Value currently entered for this column, empty when unconstrained
    pub current: String,
}

/// Rendering payload for the current session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableProjection {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub controls: Vec<ColumnFilter>,
}

impl TableProjection {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// No rows to show; renderers print a "no data" line instead of a table
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
