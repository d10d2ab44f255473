//! Business rules dictionary: load a JSON array of rule records, discover
//! its `given` / `when` / `then` column structure, filter rows per column and
//! project the result onto the columns that still hold data.

pub mod config;
pub mod data;
pub mod error;
pub mod session;
pub mod table_display;
pub mod utils;

pub use data::dataset::{Dataset, Record};
pub use data::filter_engine::{FilterEngine, FilterMap, MatchPolicy};
pub use error::LoadError;
pub use session::{SessionPhase, SessionState, TableProjection};
