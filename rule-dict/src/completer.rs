use reedline::{Completer, Span, Suggestion};
use std::sync::{Arc, Mutex};

use crate::commands::{COLUMN_COMMANDS, COMMAND_NAMES};

/// Completes command names, and column names after `filter`, `unfilter` and
/// `options`. The column list is shared with the REPL and swapped on load.
pub struct RuleCompleter {
    columns: Arc<Mutex<Vec<String>>>,
}

impl RuleCompleter {
    pub fn new(columns: Arc<Mutex<Vec<String>>>) -> Self {
        Self { columns }
    }

    fn candidates(&self, input: &str) -> (Vec<String>, &'static str) {
        let words: Vec<&str> = input.split_whitespace().collect();
        let completing_new_word = input.is_empty() || input.ends_with(char::is_whitespace);
        let word_index = if completing_new_word {
            words.len()
        } else {
            words.len().saturating_sub(1)
        };

        match word_index {
            0 => (
                COMMAND_NAMES.iter().map(|c| c.to_string()).collect(),
                "command",
            ),
            1 if COLUMN_COMMANDS.contains(&words[0]) => {
                let columns = match self.columns.lock() {
                    Ok(columns) => columns.clone(),
                    Err(_) => Vec::new(),
                };
                (columns, "column")
            }
            _ => (Vec::new(), ""),
        }
    }
}

impl Completer for RuleCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let input = &line[..pos];
        let partial = if input.ends_with(char::is_whitespace) {
            ""
        } else {
            input.split_whitespace().last().unwrap_or("")
        };
        let start_pos = pos.saturating_sub(partial.len());

        let (candidates, kind) = self.candidates(input);
        candidates
            .into_iter()
            .filter(|value| value.starts_with(partial))
            .map(|value| Suggestion {
                value,
                description: Some(kind.to_string()),
                extra: None,
                span: Span {
                    start: start_pos,
                    end: pos,
                },
                style: None,
                append_whitespace: kind == "command",
            })
            .collect()
    }
}
