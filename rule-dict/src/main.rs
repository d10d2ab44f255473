use anyhow::{Context, Result};
use clap::Parser;
use crossterm::style::Stylize;
use reedline::{
    default_emacs_keybindings, ColumnarMenu, Emacs, FileBackedHistory, KeyCode, KeyModifiers,
    MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline,
    ReedlineEvent, ReedlineMenu, Signal,
};
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::warn;

mod commands;
mod completer;

use commands::{print_help, App, Command, Flow};
use completer::RuleCompleter;
use rule_dict::config::config::Config;
use rule_dict::table_display::render_projection;
use rule_dict::utils::app_paths::AppPaths;
use rule_dict::utils::logging::{init_tracing, LogRingBuffer};
use rule_dict::SessionState;

/// Browse and filter business rule documents (JSON arrays of
/// given/when/then records)
#[derive(Parser, Debug)]
#[command(name = "rule-dict", version, about)]
struct Cli {
    /// JSON document to load on start
    file: Option<PathBuf>,

    /// Column filter, repeatable (e.g. -f given.g1.action=click)
    #[arg(short = 'f', long = "filter", value_name = "COLUMN=VALUE")]
    filters: Vec<String>,

    /// Print the filtered table and exit instead of starting the REPL
    #[arg(short, long)]
    print: bool,

    /// Echo debug logs to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print a commented default config file and exit
    #[arg(long)]
    generate_config: bool,
}

fn parse_filter_arg(arg: &str) -> Result<(String, String)> {
    let (column, value) = arg
        .split_once('=')
        .with_context(|| format!("Filter '{}' must look like COLUMN=VALUE", arg))?;
    Ok((column.trim().to_string(), value.to_string()))
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Ok(Config::load().unwrap_or_else(|e| {
            warn!(target: "config", "Falling back to default config: {:#}", e);
            Config::default()
        })),
    }
}

struct RulePrompt;

impl Prompt for RulePrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed("rules")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("> ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse search: {})",
            prefix, history_search.term
        ))
    }
}

/// Load, filter once and print
fn run_print(cli: &Cli, config: &Config) -> Result<()> {
    let file = cli
        .file
        .as_ref()
        .context("--print needs a JSON file to load")?;

    let mut session = SessionState::load_file(file)?;
    for arg in &cli.filters {
        let (column, value) = parse_filter_arg(arg)?;
        session = session.with_filter(column, config.filters.normalize_value(&value));
    }

    let engine = config.filters.engine();
    if !session.filters().is_empty() {
        session = session.apply_filters(&engine);
    }

    let projection = session.projection(&engine);
    println!("{}", render_projection(&projection, &config.display));
    println!(
        "\n{}",
        format!(
            "{} of {} rows, {} of {} columns",
            projection.row_count(),
            session.full_dataset().len(),
            projection.columns.len(),
            session.all_columns().len()
        )
        .green()
    );
    Ok(())
}

fn build_line_editor(config: &Config, columns: Arc<Mutex<Vec<String>>>) -> Result<Reedline> {
    let completion_menu = Box::new(
        ColumnarMenu::default()
            .with_name("rule_completion")
            .with_columns(1)
            .with_column_width(None)
            .with_column_padding(2),
    );

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Menu("rule_completion".to_string()),
    );

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(RuleCompleter::new(columns)))
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    if config.behavior.enable_history {
        let history_file = AppPaths::history_file()?;
        let history =
            FileBackedHistory::with_file(config.behavior.max_history_entries, history_file)
                .context("Error configuring history")?;
        line_editor = line_editor.with_history(Box::new(history));
    }

    Ok(line_editor)
}

fn run_repl(cli: &Cli, config: Config, log_buffer: LogRingBuffer) -> Result<()> {
    let columns = Arc::new(Mutex::new(Vec::new()));
    let mut line_editor = build_line_editor(&config, columns.clone())?;
    let mut app = App::new(config, columns, log_buffer);

    print_help();

    if let Some(file) = &cli.file {
        match app.execute(Command::Load(file.display().to_string())) {
            Ok(_) if !cli.filters.is_empty() => {
                for arg in &cli.filters {
                    let (column, value) = parse_filter_arg(arg)?;
                    app.execute(Command::Filter { column, value })?;
                }
                app.execute(Command::Apply)?;
            }
            Ok(_) => {}
            Err(e) => eprintln!("{}", format!("Error: {:#}", e).red()),
        }
    }

    let prompt = RulePrompt;
    loop {
        let sig = line_editor.read_line(&prompt)?;
        match sig {
            Signal::Success(buffer) => {
                if buffer.trim().is_empty() {
                    continue;
                }
                let result = Command::parse(&buffer).and_then(|command| app.execute(command));
                match result {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => eprintln!("{}", format!("Error: {:#}", e).red()),
                }
            }
            Signal::CtrlD | Signal::CtrlC => {
                println!("\nGoodbye!");
                break;
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        print!("{}", Config::create_default_with_comments());
        return Ok(());
    }

    let log_buffer = init_tracing(cli.verbose);
    let config = load_config(&cli)?;

    if cli.print {
        run_print(&cli, &config)
    } else {
        run_repl(&cli, config, log_buffer)
    }
}
