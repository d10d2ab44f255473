//! Configuration module
//!
//! Display, filter and history settings loaded from a TOML file.

pub mod config;
