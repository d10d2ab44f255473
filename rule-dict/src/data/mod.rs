//! Data layer for the rules dictionary
//!
//! Records are held as parsed JSON; everything here derives columns, values
//! and filtered views from them without mutating the loaded dataset.

pub mod data_value;
pub mod dataset;

// Column structure
pub mod column_discovery;
pub mod path_resolver;
pub mod section_flattener;

// Filtering and visibility
pub mod filter_engine;
pub mod unique_values;
pub mod visibility;
