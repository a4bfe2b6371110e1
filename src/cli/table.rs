//! Table formatting utilities for CLI list commands
//!
//! Rows are built from typed cells so each output format (aligned TSV, CSV,
//! Markdown, bare ids) can render the same value its own way.

use console::style;

use crate::cli::helpers::{escape_csv, format_short_id, truncate_str};
use crate::cli::OutputFormat;
use crate::core::color::ColorHex;
use crate::core::identity::RecordId;
use crate::core::shortid::ShortIdIndex;
use crate::entities::MixState;

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Show summary line after table (e.g., "5 paint can(s) found")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { show_summary: true }
    }
}

impl TableConfig {
    /// Create config optimized for piping (no summary)
    pub fn for_pipe() -> Self {
        Self {
            show_summary: false,
        }
    }
}

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Record id (truncated in tables, cyan colored)
    Id(RecordId),
    /// Plain text, truncated to the column width
    Text(String),
    /// Display color: a colored block followed by the hex value
    Swatch(ColorHex),
    /// Remaining quantity, colored by how much is left
    Percent(u8),
    /// Pure or mixed with water
    Mix(MixState),
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => {
                format!("{:<width$}", style(format_short_id(id)).cyan(), width = width)
            }
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Swatch(color) => {
                format!(
                    "{} {:<width$}",
                    style("■").color256(color.ansi256()),
                    color.to_string(),
                    width = width.saturating_sub(2)
                )
            }
            CellValue::Percent(p) => {
                let text = format!("{}%", p);
                let styled = match *p {
                    50.. => style(text).green(),
                    20..=49 => style(text).yellow(),
                    _ => style(text).red(),
                };
                format!("{:>width$}", styled, width = width)
            }
            CellValue::Mix(state) => {
                let s = state.to_string();
                let styled = match state {
                    MixState::Pure => style(s).dim(),
                    MixState::Diluted => style(s).blue(),
                };
                format!("{:<width$}", styled, width = width)
            }
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Text(s) => escape_csv(s),
            CellValue::Mix(state) => (*state == MixState::Diluted).to_string(),
            _ => self.raw(),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Swatch(color) => format!("`{}`", color),
            CellValue::Percent(p) => format!("{}%", p),
            _ => self.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(id) => id.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Swatch(color) => color.to_string(),
            CellValue::Percent(p) => p.to_string(),
            CellValue::Mix(state) => state.to_string(),
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Id(_) => 16,
            CellValue::Text(s) => s.chars().count(),
            CellValue::Swatch(_) => 9, // "■ #RRGGBB"
            CellValue::Percent(p) => p.to_string().len() + 1,
            CellValue::Mix(state) => state.to_string().len(),
        }
    }
}

/// Column definition with header label and width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub short_id: String,
    pub full_id: RecordId,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(full_id: RecordId, short_ids: &ShortIdIndex) -> Self {
        let short_id = short_ids
            .get_short_id(&full_id)
            .map(|n| format!("@{}", n))
            .unwrap_or_default();
        Self {
            short_id,
            full_id,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            config: TableConfig::default(),
        }
    }

    /// Configure the formatter with custom settings
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Output rows in the specified format
    pub fn output<I>(&self, rows: I, format: OutputFormat, visible_columns: &[&str])
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();
        for line in self.render(&rows, format, visible_columns) {
            println!("{}", line);
        }
    }

    /// Render rows to output lines
    pub fn render(&self, rows: &[TableRow], format: OutputFormat, visible_columns: &[&str]) -> Vec<String> {
        match format {
            OutputFormat::Csv => self.render_csv(rows, visible_columns),
            OutputFormat::Md => self.render_md(rows, visible_columns),
            OutputFormat::Id => rows.iter().map(|r| r.full_id.to_string()).collect(),
            OutputFormat::ShortId => rows.iter().map(|r| r.short_id.clone()).collect(),
            _ => self.render_tsv(rows, visible_columns),
        }
    }

    fn visible<'c>(&'c self, visible_columns: &'c [&str]) -> impl Iterator<Item = &'c ColumnDef> + 'c {
        self.columns
            .iter()
            .filter(move |col| visible_columns.contains(&col.key))
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow], visible_columns: &[&str]) -> Vec<usize> {
        let short_width = rows
            .iter()
            .map(|r| r.short_id.len())
            .max()
            .unwrap_or(5)
            .max(5); // "SHORT" header
        let mut widths = vec![short_width];

        for col in self.visible(visible_columns) {
            let max_content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(|v| v.display_width())
                .max()
                .unwrap_or(0);

            // +2 leaves room for the truncation buffer; never wider than the column allows
            let natural_width = col.header.len().max(max_content.saturating_add(2));
            widths.push(natural_width.min(col.width));
        }

        widths
    }

    fn render_tsv(&self, rows: &[TableRow], visible_columns: &[&str]) -> Vec<String> {
        let widths = self.calculate_widths(rows, visible_columns);
        let mut lines = Vec::with_capacity(rows.len() + 4);

        let mut header_parts = vec![format!("{:<width$}", style("SHORT").bold().dim(), width = widths[0])];
        for (col, width) in self.visible(visible_columns).zip(&widths[1..]) {
            header_parts.push(format!("{:<width$}", style(col.header).bold(), width = *width));
        }
        lines.push(header_parts.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        lines.push("-".repeat(total_width));

        for row in rows {
            let mut row_parts = vec![format!("{:<width$}", style(&row.short_id).cyan(), width = widths[0])];
            for (col, width) in self.visible(visible_columns).zip(&widths[1..]) {
                match row.get(col.key) {
                    Some(value) => row_parts.push(value.format_tsv(*width)),
                    None => row_parts.push(format!("{:<width$}", "-", width = *width)),
                }
            }
            lines.push(row_parts.join(" "));
        }

        if self.config.show_summary {
            lines.push(String::new());
            lines.push(format!(
                "{} {}(s) found. Use {} to reference by short ID.",
                style(rows.len()).cyan(),
                self.entity_name,
                style("@N").cyan()
            ));
        }

        lines
    }

    fn render_csv(&self, rows: &[TableRow], visible_columns: &[&str]) -> Vec<String> {
        let mut headers = vec!["short_id".to_string(), "id".to_string()];
        headers.extend(self.visible(visible_columns).map(|col| col.key.to_string()));

        let mut lines = vec![headers.join(",")];
        for row in rows {
            let mut values = vec![escape_csv(&row.short_id), row.full_id.to_string()];
            for col in self.visible(visible_columns) {
                values.push(row.get(col.key).map(CellValue::format_csv).unwrap_or_default());
            }
            lines.push(values.join(","));
        }
        lines
    }

    fn render_md(&self, rows: &[TableRow], visible_columns: &[&str]) -> Vec<String> {
        let mut headers = vec!["Short".to_string(), "ID".to_string()];
        headers.extend(self.visible(visible_columns).map(|col| col.header.to_string()));

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        let mut lines = vec![
            format!("| {} |", headers.join(" | ")),
            format!("|{}|", separators.join("|")),
        ];

        for row in rows {
            let mut values = vec![row.short_id.clone(), row.full_id.to_string()];
            for col in self.visible(visible_columns) {
                values.push(
                    row.get(col.key)
                        .map(CellValue::format_md)
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            lines.push(format!("| {} |", values.join(" | ")));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("name", "NAME", 24),
        ColumnDef::new("percent", "LEFT", 6),
    ];

    fn sample_rows() -> (Vec<TableRow>, RecordId) {
        let id = RecordId::new();
        let mut short_ids = ShortIdIndex::new();
        short_ids.add(id);
        let row = TableRow::new(id, &short_ids)
            .cell("name", CellValue::Text("Rojo, mate".to_string()))
            .cell("percent", CellValue::Percent(40));
        (vec![row], id)
    }

    #[test]
    fn test_cell_value_text_format() {
        let cell = CellValue::Text("Hello World".to_string());
        assert!(cell.format_tsv(20).contains("Hello World"));
        assert_eq!(cell.format_csv(), "Hello World");
        assert_eq!(cell.format_md(), "Hello World");
    }

    #[test]
    fn test_cell_value_swatch() {
        let cell = CellValue::Swatch(ColorHex::new(0x00, 0x7A, 0x33));
        assert_eq!(cell.format_csv(), "#007A33");
        assert_eq!(cell.format_md(), "`#007A33`");
        assert!(cell.format_tsv(10).contains("#007A33"));
    }

    #[test]
    fn test_cell_value_mix_and_percent() {
        assert_eq!(CellValue::Mix(MixState::Diluted).format_csv(), "true");
        assert_eq!(CellValue::Mix(MixState::Pure).raw(), "pure");
        assert_eq!(CellValue::Percent(35).format_md(), "35%");
        assert_eq!(CellValue::Percent(35).format_csv(), "35");
    }

    #[test]
    fn test_cell_value_md_escapes_pipes() {
        let cell = CellValue::Text("a|b|c".to_string());
        assert_eq!(cell.format_md(), "a\\|b\\|c");
    }

    #[test]
    fn test_table_row_builder() {
        let (rows, id) = sample_rows();
        assert_eq!(rows[0].short_id, "@1");
        assert_eq!(rows[0].full_id, id);
        assert!(rows[0].get("name").is_some());
        assert!(rows[0].get("missing").is_none());
    }

    #[test]
    fn test_render_csv_escapes_and_orders_columns() {
        let (rows, id) = sample_rows();
        let lines = TableFormatter::new(COLUMNS, "paint can").render(&rows, OutputFormat::Csv, &["name", "percent"]);
        assert_eq!(lines[0], "short_id,id,name,percent");
        assert_eq!(lines[1], format!("@1,{},\"Rojo, mate\",40", id));
    }

    #[test]
    fn test_render_hides_unselected_columns() {
        let (rows, _) = sample_rows();
        let lines = TableFormatter::new(COLUMNS, "paint can").render(&rows, OutputFormat::Md, &["percent"]);
        assert_eq!(lines[0], "| Short | ID | LEFT |");
        assert!(!lines[2].contains("Rojo"));
    }

    #[test]
    fn test_render_tsv_summary() {
        let (rows, _) = sample_rows();
        let formatter = TableFormatter::new(COLUMNS, "paint can");
        let lines = formatter.render(&rows, OutputFormat::Tsv, &["name", "percent"]);
        assert!(lines.last().unwrap().contains("paint can(s) found"));

        let piped = formatter
            .with_config(TableConfig::for_pipe())
            .render(&rows, OutputFormat::Tsv, &["name", "percent"]);
        assert_eq!(piped.len(), 3);
    }

    #[test]
    fn test_render_ids() {
        let (rows, id) = sample_rows();
        let formatter = TableFormatter::new(COLUMNS, "paint can");
        assert_eq!(formatter.render(&rows, OutputFormat::Id, &[]), vec![id.to_string()]);
        assert_eq!(formatter.render(&rows, OutputFormat::ShortId, &[]), vec!["@1".to_string()]);
    }
}
