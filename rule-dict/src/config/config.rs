use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::data::column_discovery::LEADING_COLUMN;
use crate::data::filter_engine::FilterEngine;
use crate::utils::app_paths::AppPaths;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub filters: FilterConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show a leading row-number column
    pub show_row_numbers: bool,

    /// Compact table borders
    pub compact_mode: bool,

    /// Cells longer than this are truncated with an ellipsis (0 = no limit)
    pub max_column_width: usize,

    /// Printed instead of a table when no rows remain
    pub no_data_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Columns filtered by case-insensitive substring instead of exact value
    pub text_columns: Vec<String>,

    /// Dropdown choice meaning "no constraint"
    pub all_option_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Keep REPL command history between sessions
    pub enable_history: bool,

    /// Maximum history entries
    pub max_history_entries: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_row_numbers: false,
            compact_mode: false,
            max_column_width: 40,
            no_data_message: "No data available or matching filters.".to_string(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            text_columns: vec![LEADING_COLUMN.to_string()],
            all_option_label: "All".to_string(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            enable_history: true,
            max_history_entries: 1000,
        }
    }
}

impl FilterConfig {
    /// Build the filter engine these settings describe
    pub fn engine(&self) -> FilterEngine {
        FilterEngine::new(self.text_columns.iter().cloned())
    }

    /// Map a user-entered filter value to what goes in the filter map; the
    /// "All" dropdown choice means no constraint
    pub fn normalize_value(&self, value: &str) -> String {
        if value.eq_ignore_ascii_case(&self.all_option_label) {
            String::new()
        } else {
            value.to_string()
        }
    }
}

impl Config {
    /// Load config from the default location, writing defaults on first use
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        debug!(target: "config", "Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        AppPaths::config_file()
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Rules Dictionary Configuration File
# Location: ~/.config/rule-dict/config.toml (Linux)
#           ~/Library/Application Support/rule-dict/config.toml (macOS)
#           %APPDATA%\rule-dict\config.toml (Windows)

[display]
# Show a row-number column in tables
show_row_numbers = false

# Use compact table borders
compact_mode = false

# Truncate cells longer than this many characters (0 = never truncate)
max_column_width = 40

# Shown instead of a table when the dataset or filter result is empty
no_data_message = "No data available or matching filters."

[filters]
# Columns filtered by case-insensitive substring; all others match exactly
text_columns = ["businessRuleId"]

# Dropdown choice that clears a column's filter
all_option_label = "All"

[behavior]
# Keep command history between sessions
enable_history = true

# Maximum number of history entries to keep
max_history_entries = 1000
"#
        .to_string()
    }
}
