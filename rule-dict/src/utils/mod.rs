//! Utility functions and helpers
//!
//! Paths for config and history files, and the logging setup shared by the
//! binary and tests.

pub mod app_paths;
pub mod logging;
