use anyhow::{bail, Result};
use crossterm::style::Stylize;
use std::sync::{Arc, Mutex};

use rule_dict::config::config::Config;
use rule_dict::table_display::{export_to_csv, render_filter_controls, render_projection};
use rule_dict::utils::logging::LogRingBuffer;
use rule_dict::{FilterEngine, SessionPhase, SessionState};

/// One line of REPL input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(String),
    Filter { column: String, value: String },
    Unfilter(String),
    Apply,
    Clear,
    Show,
    Columns,
    Options(String),
    Filters,
    Export(String),
    Log(usize),
    Help,
    Quit,
}

pub const COMMAND_NAMES: &[&str] = &[
    "load", "filter", "unfilter", "apply", "clear", "show", "columns", "options", "filters",
    "export", "log", "help", "quit",
];

/// Commands whose first argument is a column name
pub const COLUMN_COMMANDS: &[&str] = &["filter", "unfilter", "options"];

const DEFAULT_LOG_LINES: usize = 20;

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name {
            "load" | "open" => Command::Load(required(rest, "load <file.json>")?),
            "filter" => {
                let (column, value) = match rest.split_once(char::is_whitespace) {
                    Some((column, value)) => (column, value.trim()),
                    None => (rest, ""),
                };
                if column.is_empty() {
                    bail!("Usage: filter <column> <value|All>");
                }
                Command::Filter {
                    column: column.to_string(),
                    value: value.to_string(),
                }
            }
            "unfilter" => Command::Unfilter(required(rest, "unfilter <column>")?),
            "apply" => Command::Apply,
            "clear" => Command::Clear,
            "show" => Command::Show,
            "columns" => Command::Columns,
            "options" => Command::Options(required(rest, "options <column>")?),
            "filters" => Command::Filters,
            "export" => Command::Export(required(rest, "export <file.csv>")?),
            "log" => Command::Log(if rest.is_empty() {
                DEFAULT_LOG_LINES
            } else {
                rest.parse()?
            }),
            "help" | "\\help" | "?" => Command::Help,
            "quit" | "exit" | "\\q" => Command::Quit,
            other => bail!("Unknown command '{}'. Type 'help' for a list.", other),
        };
        Ok(command)
    }
}

fn required(arg: &str, usage: &str) -> Result<String> {
    if arg.is_empty() {
        bail!("Usage: {}", usage);
    }
    Ok(arg.to_string())
}

pub enum Flow {
    Continue,
    Quit,
}

/// REPL state: the current session plus everything needed to act on it
pub struct App {
    session: SessionState,
    engine: FilterEngine,
    config: Config,
    columns: Arc<Mutex<Vec<String>>>,
    log_buffer: LogRingBuffer,
}

impl App {
    pub fn new(config: Config, columns: Arc<Mutex<Vec<String>>>, log_buffer: LogRingBuffer) -> Self {
        Self {
            session: SessionState::new(),
            engine: config.filters.engine(),
            config,
            columns,
            log_buffer,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Swap in a new session and keep completion in step with it
    fn replace_session(&mut self, session: SessionState) {
        if let Ok(mut columns) = self.columns.lock() {
            *columns = session.all_columns().to_vec();
        }
        self.session = session;
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Load(path) => {
                // A failed load keeps the current session
                let session = SessionState::load_file(&path)?;
                self.replace_session(session);
                println!(
                    "{}",
                    format!(
                        "Loaded {} records, {} columns ({} visible)",
                        self.session.full_dataset().len(),
                        self.session.all_columns().len(),
                        self.session.visible_columns().len()
                    )
                    .green()
                );
                self.print_table();
            }
            Command::Filter { column, value } => {
                self.require_loaded()?;
                if !self.session.all_columns().contains(&column) {
                    println!("{}", format!("Note: '{}' is not a known column", column).yellow());
                }
                let value = self.config.filters.normalize_value(&value);
                self.session = self.session.with_filter(column, value);
            }
            Command::Unfilter(column) => {
                self.session = self.session.without_filter(&column);
            }
            Command::Apply => {
                self.require_loaded()?;
                self.session = self.session.apply_filters(&self.engine);
                self.print_table();
            }
            Command::Clear => {
                self.session = self.session.clear_filters();
                if self.session.phase() != SessionPhase::Empty {
                    self.print_table();
                }
            }
            Command::Show => {
                self.require_loaded()?;
                self.print_table();
            }
            Command::Columns => {
                self.require_loaded()?;
                let visible = self.session.visible_columns();
                for column in self.session.all_columns() {
                    if visible.contains(column) {
                        println!("  {}", column);
                    } else {
                        println!("  {}", format!("{} (hidden)", column).dark_grey());
                    }
                }
            }
            Command::Options(column) => {
                self.require_loaded()?;
                if self.engine.is_text_column(&column) {
                    println!("{}", format!("{} is a free-text column", column).cyan());
                }
                let options = self.session.filter_options(&column);
                if options.is_empty() {
                    println!("{}", format!("No values for {}", column).yellow());
                }
                for option in options {
                    println!("  {}", option);
                }
            }
            Command::Filters => {
                self.require_loaded()?;
                let projection = self.session.projection(&self.engine);
                println!(
                    "{}",
                    render_filter_controls(&projection, &self.config.filters.all_option_label)
                );
                // Pending entries on columns that are not currently visible
                for (column, value) in self.session.filters() {
                    if !value.is_empty() && !projection.columns.contains(column) {
                        println!("{}", format!("{} [hidden] = {}", column, value).dark_grey());
                    }
                }
            }
            Command::Export(path) => {
                self.require_loaded()?;
                let projection = self.session.projection(&self.engine);
                export_to_csv(&projection, &path)?;
                println!(
                    "{}",
                    format!("Exported {} rows to {}", projection.row_count(), path).green()
                );
            }
            Command::Log(count) => {
                for entry in self.log_buffer.get_recent(count) {
                    println!("{}", entry.format_for_display());
                }
            }
            Command::Help => print_help(),
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn require_loaded(&self) -> Result<()> {
        if self.session.phase() == SessionPhase::Empty {
            bail!("No file loaded. Use: load <file.json>");
        }
        Ok(())
    }

    pub fn print_table(&self) {
        let projection = self.session.projection(&self.engine);
        println!("{}", render_projection(&projection, &self.config.display));
        let summary = format!(
            "{} of {} rows, {} of {} columns",
            projection.row_count(),
            self.session.full_dataset().len(),
            projection.columns.len(),
            self.session.all_columns().len()
        );
        println!("{}", summary.green());
    }
}

pub fn print_help() {
    println!("{}", "Rules Dictionary - filter business rule documents".blue().bold());
    println!();
    println!("{}", "Commands:".yellow());
    println!("  {}          - Load a JSON array of rule records", "load <file>".green());
    println!("  {} - Set a column filter (All clears it)", "filter <col> <value>".green());
    println!("  {}      - Remove one column filter", "unfilter <col>".green());
    println!("  {}                - Apply the pending filters", "apply".green());
    println!("  {}                - Clear all filters", "clear".green());
    println!("  {}                 - Show the current table", "show".green());
    println!("  {}              - List columns (hidden ones dimmed)", "columns".green());
    println!("  {}        - List a column's filter values", "options <col>".green());
    println!("  {}              - Show filter controls", "filters".green());
    println!("  {}   - Export the current table to CSV", "export <file.csv>".green());
    println!("  {}              - Show recent log entries", "log [n]".green());
    println!("  {}                 - Exit", "quit".green());
    println!();
    println!("{}", "Text columns match substrings ignoring case; others match exactly.".dark_grey());
}
