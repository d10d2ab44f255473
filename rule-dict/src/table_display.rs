use anyhow::{Context, Result};
use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use std::path::Path;
use tracing::info;

use crate::config::config::DisplayConfig;
use crate::session::{FilterControl, TableProjection};

/// Build a comfy-table for the visible columns and filtered rows
pub fn build_table(projection: &TableProjection, display: &DisplayConfig) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if display.compact_mode {
        table.load_preset(presets::UTF8_FULL_CONDENSED);
    } else {
        table.load_preset(presets::UTF8_FULL);
    }

    let mut headers: Vec<Cell> = Vec::with_capacity(projection.columns.len() + 1);
    if display.show_row_numbers {
        headers.push(Cell::new("#").add_attribute(Attribute::Bold));
    }
    headers.extend(
        projection
            .columns
            .iter()
            .map(|c| Cell::new(c).add_attribute(Attribute::Bold)),
    );
    table.set_header(headers);

    for (idx, row) in projection.rows.iter().enumerate() {
        let mut cells: Vec<String> = Vec::with_capacity(row.len() + 1);
        if display.show_row_numbers {
            cells.push((idx + 1).to_string());
        }
        cells.extend(
            row.iter()
                .map(|value| truncate_cell(value, display.max_column_width)),
        );
        table.add_row(cells);
    }

    table
}

/// Render the projection, or the "no data" message when there are no rows
pub fn render_projection(projection: &TableProjection, display: &DisplayConfig) -> String {
    if projection.is_empty() {
        return display.no_data_message.clone();
    }
    build_table(projection, display).to_string()
}

/// One line per visible column describing its filter control
pub fn render_filter_controls(projection: &TableProjection, all_label: &str) -> String {
    projection
        .controls
        .iter()
        .map(|control| {
            let current = if control.current.is_empty() {
                all_label
            } else {
                control.current.as_str()
            };
            match &control.control {
                FilterControl::Text => {
                    format!("{} [text] = {}", control.column, current)
                }
                FilterControl::Dropdown { options } => format!(
                    "{} [{} choices] = {}",
                    control.column,
                    options.len(),
                    current
                ),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shorten a cell to at most `max_width` characters, marking the cut with an
/// ellipsis. A width of 0 disables truncation.
pub fn truncate_cell(value: &str, max_width: usize) -> String {
    if max_width == 0 || value.chars().count() <= max_width {
        return value.to_string();
    }
    let keep = max_width.saturating_sub(1);
    let mut truncated: String = value.chars().take(keep).collect();
    truncated.push('…');
    truncated
}

/// Write the visible columns of the filtered rows to a CSV file
pub fn export_to_csv<P: AsRef<Path>>(projection: &TableProjection, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {:?}", path))?;

    wtr.write_record(&projection.columns)?;
    for row in &projection.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;

    info!(
        target: "export",
        "Exported {} rows to {}",
        projection.row_count(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter_engine::FilterEngine;
    use crate::session::SessionState;
    use tempfile::NamedTempFile;

    fn projection() -> TableProjection {
        let session = SessionState::load_str(
            r#"[
                {"businessRuleId": "R1", "given": {"g1": {"action": "click"}}},
                {"businessRuleId": "R2", "given": {"g1": {"action": "type"}}}
            ]"#,
        )
        .unwrap();
        session.projection(&FilterEngine::default())
    }

    #[test]
    fn test_render_contains_headers_and_cells() {
        let rendered = render_projection(&projection(), &DisplayConfig::default());
        assert!(rendered.contains("businessRuleId"));
        assert!(rendered.contains("given.g1.action"));
        assert!(rendered.contains("R2"));
        assert!(rendered.contains("type"));
    }

    #[test]
    fn test_render_empty_projection() {
        let display = DisplayConfig::default();
        let rendered = render_projection(&TableProjection::default(), &display);
        assert_eq!(rendered, display.no_data_message);
    }

    #[test]
    fn test_row_numbers() {
        let display = DisplayConfig {
            show_row_numbers: true,
            ..DisplayConfig::default()
        };
        let rendered = build_table(&projection(), &display).to_string();
        assert!(rendered.contains('#'));
        assert!(rendered.contains("│ 2 "));
    }

    #[test]
    fn test_truncate_cell() {
        assert_eq!(truncate_cell("short", 10), "short");
        assert_eq!(truncate_cell("abcdefgh", 5), "abcd…");
        assert_eq!(truncate_cell("abcdefgh", 0), "abcdefgh");
    }

    #[test]
    fn test_filter_controls_listing() {
        let listing = render_filter_controls(&projection(), "All");
        assert_eq!(
            listing,
            "businessRuleId [text] = All\ngiven.g1.action [2 choices] = All"
        );
    }

    #[test]
    fn test_export_to_csv() {
        let file = NamedTempFile::new().unwrap();
        export_to_csv(&projection(), file.path()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "businessRuleId,given.g1.action");
        assert_eq!(lines[1], "R1,click");
        assert_eq!(lines.len(), 3);
    }
}
