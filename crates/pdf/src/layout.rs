//! Layout engine: turns a normalized table into a printable document section.

use crate::config::LayoutConfig;
use crate::error::{PdfError, Result};
use sheetpress_sheet::NormalizedTable;

/// Approximate width of one character, in points
pub const CHAR_WIDTH: f32 = 6.0;

/// Shown instead of table rows when a sheet has no data
pub const NO_DATA_MESSAGE: &str = "No data available in this sheet.";

/// How much of a table made it into the section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Truncation {
    pub rows_total: usize,
    pub rows_kept: usize,
    pub cols_total: usize,
    pub cols_kept: usize,
}

impl Truncation {
    #[must_use]
    pub fn rows_truncated(&self) -> bool {
        self.rows_kept < self.rows_total
    }

    #[must_use]
    pub fn cols_truncated(&self) -> bool {
        self.cols_kept < self.cols_total
    }

    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.rows_truncated() || self.cols_truncated()
    }
}

/// Counts and value kinds of a sheet, shown above its table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub rows: usize,
    pub columns: usize,
    pub kinds: Vec<String>,
}

impl SheetSummary {
    /// Summarize the full table (before any truncation)
    #[must_use]
    pub fn of(table: &NormalizedTable) -> Self {
        Self {
            rows: table.row_count(),
            columns: table.col_count(),
            kinds: table
                .distinct_kinds()
                .into_iter()
                .map(|kind| kind.label().to_string())
                .collect(),
        }
    }

    /// Lines of the summary block
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let kinds = if self.kinds.is_empty() {
            "none".to_string()
        } else {
            self.kinds.join(", ")
        };
        vec![
            format!("Rows: {}", self.rows),
            format!("Columns: {}", self.columns),
            format!("Data Types: {kinds}"),
        ]
    }
}

/// A table ready for the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// One width per header column, in points
    pub column_widths: Vec<f32>,
    /// Header is drawn again at the top of every page the table spans
    pub repeat_header: bool,
    /// Message drawn below the header when there are no rows
    pub placeholder: Option<String>,
    pub truncation: Truncation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    Table(TableBlock),
    /// The sheet could not be loaded or laid out
    Error(String),
}

/// One sheet's contribution to the report
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSection {
    pub title: String,
    pub summary: Option<SheetSummary>,
    pub body: SectionBody,
}

impl DocumentSection {
    /// Section carrying an inline error note instead of a table
    #[must_use]
    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            summary: None,
            body: SectionBody::Error(message.into()),
        }
    }

    #[must_use]
    pub fn table(&self) -> Option<&TableBlock> {
        match &self.body {
            SectionBody::Table(table) => Some(table),
            SectionBody::Error(_) => None,
        }
    }
}

/// Lay out one sheet's table.
///
/// Keeps at most `max_rows_per_sheet` rows and `max_cols_per_sheet` columns
/// (leading prefix, original order), sizes each column from its longest
/// value and marks the header as repeating.
///
/// # Errors
///
/// Returns [`PdfError::SheetRender`] when the column width range in `config`
/// is unusable.
pub fn layout(
    name: &str,
    table: &NormalizedTable,
    config: &LayoutConfig,
) -> Result<DocumentSection> {
    config.validate().map_err(|message| PdfError::SheetRender {
        sheet: name.to_string(),
        message,
    })?;

    if let Some(row) = table.rows().iter().position(|row| row.len() != table.col_count()) {
        return Err(PdfError::SheetRender {
            sheet: name.to_string(),
            message: format!("row {row} does not have {} values", table.col_count()),
        });
    }

    let truncation = Truncation {
        rows_total: table.row_count(),
        rows_kept: table.row_count().min(config.max_rows_per_sheet),
        cols_total: table.col_count(),
        cols_kept: table.col_count().min(config.max_cols_per_sheet),
    };

    if truncation.rows_truncated() {
        tracing::warn!(
            sheet = name,
            kept = truncation.rows_kept,
            total = truncation.rows_total,
            "table truncated to max rows"
        );
    }
    if truncation.cols_truncated() {
        tracing::warn!(
            sheet = name,
            kept = truncation.cols_kept,
            total = truncation.cols_total,
            "table truncated to max columns"
        );
    }

    let header: Vec<String> = table.columns()[..truncation.cols_kept].to_vec();
    let rows: Vec<Vec<String>> = table.rows()[..truncation.rows_kept]
        .iter()
        .map(|row| row[..truncation.cols_kept].to_vec())
        .collect();
    let column_widths = column_widths(&header, &rows, config);

    let placeholder = rows.is_empty().then(|| NO_DATA_MESSAGE.to_string());
    let summary = (config.include_summaries && !table.is_empty()).then(|| SheetSummary::of(table));

    Ok(DocumentSection {
        title: name.to_string(),
        summary,
        body: SectionBody::Table(TableBlock {
            header,
            rows,
            column_widths,
            repeat_header: true,
            placeholder,
            truncation,
        }),
    })
}

/// Width per column: longest value (header included) times [`CHAR_WIDTH`],
/// clamped to the configured range.
#[must_use]
pub fn column_widths(header: &[String], rows: &[Vec<String>], config: &LayoutConfig) -> Vec<f32> {
    header
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let longest = rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|value| value.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0);
            (longest as f32 * CHAR_WIDTH).clamp(config.min_col_width, config.max_col_width)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> NormalizedTable {
        NormalizedTable::from_parts(
            columns.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn numbered_rows(count: usize) -> NormalizedTable {
        let rows: Vec<Vec<String>> = (0..count).map(|i| vec![i.to_string()]).collect();
        NormalizedTable::from_parts(vec!["n".to_string()], rows).unwrap()
    }

    #[test]
    fn test_row_truncation_boundary() {
        let config = LayoutConfig::default().with_max_rows(30);
        let section = layout("S", &numbered_rows(31), &config).unwrap();
        let block = section.table().unwrap();

        assert_eq!(block.rows.len(), 30);
        assert_eq!(block.rows[0], vec!["0"]);
        assert_eq!(block.rows[29], vec!["29"]);
        assert!(block.truncation.rows_truncated());
        assert_eq!(block.truncation.rows_total, 31);
    }

    #[test]
    fn test_no_truncation_at_limit() {
        let config = LayoutConfig::default().with_max_rows(30);
        let section = layout("S", &numbered_rows(30), &config).unwrap();
        let block = section.table().unwrap();
        assert_eq!(block.rows.len(), 30);
        assert!(!block.truncation.is_truncated());
    }

    #[test]
    fn test_column_truncation() {
        let t = table(&["a", "b", "c"], &[&["1", "2", "3"]]);
        let config = LayoutConfig::default().with_max_cols(2);
        let section = layout("S", &t, &config).unwrap();
        let block = section.table().unwrap();

        assert_eq!(block.header, vec!["a", "b"]);
        assert_eq!(block.rows[0], vec!["1", "2"]);
        assert_eq!(block.column_widths.len(), 2);
        assert!(block.truncation.cols_truncated());
    }

    #[test]
    fn test_column_widths_clamped() {
        let long = "x".repeat(50);
        let medium = "y".repeat(20);
        let t = table(&["id", "name", "desc"], &[&["1", medium.as_str(), long.as_str()]]);
        let section = layout("S", &t, &LayoutConfig::default()).unwrap();
        let block = section.table().unwrap();

        // 2 chars -> min 80; 20 chars -> 120; 50 chars -> max 200
        assert_eq!(block.column_widths, vec![80.0, 120.0, 200.0]);
    }

    #[test]
    fn test_header_counts_toward_width() {
        let t = table(&["a fairly long header name"], &[&["1"]]);
        let section = layout("S", &t, &LayoutConfig::default()).unwrap();
        assert_eq!(section.table().unwrap().column_widths, vec![150.0]);
    }

    #[test]
    fn test_empty_table_gets_placeholder_and_no_summary() {
        let t = table(&["Only"], &[]);
        let section = layout("Sparse", &t, &LayoutConfig::default()).unwrap();
        let block = section.table().unwrap();

        assert_eq!(block.header, vec!["Only"]);
        assert!(block.rows.is_empty());
        assert_eq!(block.placeholder.as_deref(), Some(NO_DATA_MESSAGE));
        assert!(block.repeat_header);
        assert!(section.summary.is_none());
    }

    #[test]
    fn test_zero_max_rows_keeps_header() {
        let config = LayoutConfig::default().with_max_rows(0);
        let section = layout("S", &numbered_rows(3), &config).unwrap();
        let block = section.table().unwrap();
        assert_eq!(block.header, vec!["n"]);
        assert!(block.rows.is_empty());
        assert!(block.placeholder.is_some());
    }

    #[test]
    fn test_summary_uses_full_table() {
        let config = LayoutConfig::default().with_max_rows(2);
        let section = layout("S", &numbered_rows(5), &config).unwrap();
        let summary = section.summary.unwrap();
        assert_eq!(summary.rows, 5);
        assert_eq!(summary.columns, 1);
        assert_eq!(summary.lines()[2], "Data Types: text");
    }

    #[test]
    fn test_summaries_disabled() {
        let config = LayoutConfig::default().with_summaries(false);
        let section = layout("S", &numbered_rows(2), &config).unwrap();
        assert!(section.summary.is_none());
    }

    #[test]
    fn test_bad_width_range_is_render_error() {
        let config = LayoutConfig::default().with_col_width_range(300.0, 100.0);
        let err = layout("Broken", &numbered_rows(1), &config).unwrap_err();
        assert!(matches!(err, PdfError::SheetRender { sheet, .. } if sheet == "Broken"));
    }
}
