//! High-level conversion: open a workbook, pick sheets, write the report.

use crate::config::{LayoutConfig, RenderConfig};
use crate::error::{PdfError, Result};
use crate::report::{AssembledReport, ReportAssembler, SheetResult};
use indexmap::IndexMap;
use sheetpress_sheet::{table_from_grid, Workbook};
use std::path::{Path, PathBuf};

/// Sheets converted in proforma mode, in output order
pub const PROFORMA_SHEETS: [&str; 4] =
    ["Assumptions", "Proforma", "Proforma Condensed", "Calculations"];

/// Which sheets to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelection {
    /// Every sheet in workbook order
    All,
    /// These sheets, in the given order
    Named(Vec<String>),
    /// The proforma sheets present in the workbook
    Proforma,
}

/// Proforma sheets present in `available`, in [`PROFORMA_SHEETS`] order
#[must_use]
pub fn select_proforma<S: AsRef<str>>(available: &[S]) -> Vec<String> {
    PROFORMA_SHEETS
        .iter()
        .filter(|wanted| available.iter().any(|name| name.as_ref() == **wanted))
        .map(|name| (*name).to_string())
        .collect()
}

/// Display facts about one sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub has_data: bool,
    pub kinds: Vec<String>,
}

/// Settings for one conversion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertOptions {
    /// Output file name inside the output directory; derived from the
    /// workbook name when unset
    pub filename: Option<String>,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl ConvertOptions {
    #[must_use]
    pub fn proforma() -> Self {
        Self {
            layout: LayoutConfig::proforma(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }
}

/// Converts sheets of one workbook into PDF reports
#[derive(Debug)]
pub struct Converter {
    workbook: Workbook,
    output_dir: PathBuf,
}

impl Converter {
    /// Open `path`; reports will go to `output_dir`, which is created on
    /// the first conversion.
    ///
    /// # Errors
    ///
    /// Fails if the workbook cannot be opened.
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(path: P, output_dir: Q) -> Result<Self> {
        let workbook = Workbook::open(path)?;
        Ok(Self {
            workbook,
            output_dir: output_dir.as_ref().to_path_buf(),
        })
    }

    #[must_use]
    pub fn available_sheets(&self) -> &[String] {
        self.workbook.sheet_names()
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Input file name without its extension
    #[must_use]
    pub fn stem(&self) -> String {
        self.workbook
            .path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workbook".to_string())
    }

    #[must_use]
    pub fn default_filename(&self) -> String {
        format!("{}_converted.pdf", self.stem())
    }

    /// Whether each named sheet exists and holds at least one non-empty cell
    pub fn validate_sheets<S: AsRef<str>>(&mut self, names: &[S]) -> IndexMap<String, bool> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let valid = self
                    .workbook
                    .read_grid(name)
                    .map(|grid| grid.has_content())
                    .unwrap_or(false);
                (name.to_string(), valid)
            })
            .collect()
    }

    /// Row, column and type facts for one sheet after normalization.
    ///
    /// # Errors
    ///
    /// Returns the per-sheet load error for unknown or unreadable sheets.
    pub fn sheet_info(&mut self, name: &str) -> Result<SheetInfo> {
        let grid = self.workbook.read_grid(name)?;
        let table = table_from_grid(&grid);
        Ok(SheetInfo {
            name: name.to_string(),
            rows: table.row_count(),
            columns: table.col_count(),
            column_names: table.columns().to_vec(),
            has_data: grid.has_content(),
            kinds: table
                .distinct_kinds()
                .into_iter()
                .map(|kind| kind.label().to_string())
                .collect(),
        })
    }

    /// Load and normalize the selected sheets.
    ///
    /// Sheets that cannot be read are kept as errors in the returned map so
    /// the report can note them.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::NoProformaSheetsFound`] when a proforma
    /// selection matches nothing.
    pub fn load(&mut self, selection: &SheetSelection) -> Result<IndexMap<String, SheetResult>> {
        let names = match selection {
            SheetSelection::All => self.workbook.sheet_names().to_vec(),
            SheetSelection::Named(names) => names.clone(),
            SheetSelection::Proforma => {
                let names = self.proforma_sheets()?;
                tracing::info!(sheets = ?names, "selected proforma sheets");
                names
            }
        };

        let mut loaded = IndexMap::with_capacity(names.len());
        for (name, grid) in self.workbook.read_grids(&names) {
            let table = match grid {
                Ok(grid) => {
                    let table = table_from_grid(&grid);
                    tracing::info!(
                        sheet = %name,
                        rows = table.row_count(),
                        cols = table.col_count(),
                        "loaded sheet"
                    );
                    Ok(table)
                }
                Err(e) if e.is_per_sheet() => {
                    tracing::error!(sheet = %name, error = %e, "failed to load sheet");
                    Err(PdfError::from(e))
                }
                Err(e) => return Err(e.into()),
            };
            loaded.insert(name, table);
        }
        Ok(loaded)
    }

    /// Proforma sheets of this workbook in output order.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::NoProformaSheetsFound`] when the workbook has none.
    pub fn proforma_sheets(&self) -> Result<Vec<String>> {
        let names = select_proforma(self.workbook.sheet_names());
        if names.is_empty() {
            return Err(PdfError::NoProformaSheetsFound {
                available: self.workbook.sheet_names().to_vec(),
            });
        }
        Ok(names)
    }

    /// Render `loaded` into a report in the output directory, creating the
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::NoSheetsLoaded`] for an empty selection, or any
    /// render or IO failure while writing the file.
    pub fn convert(
        &self,
        loaded: &IndexMap<String, SheetResult>,
        options: &ConvertOptions,
    ) -> Result<AssembledReport> {
        if loaded.is_empty() {
            return Err(PdfError::NoSheetsLoaded);
        }

        let filename = options
            .filename
            .clone()
            .unwrap_or_else(|| self.default_filename());
        let path = self.output_dir.join(filename);
        let title = format!("Proforma Analysis - {}", self.stem());
        let notes = self.notes(loaded.len(), &options.layout);

        let assembler = ReportAssembler::new(options.layout.clone(), options.render.clone());
        assembler.assemble(&title, loaded, &notes, &path)
    }

    /// Convert the proforma sheets with the proforma limits.
    ///
    /// Writes `<stem>_proforma.pdf` unless `filename` is given.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::NoProformaSheetsFound`] (without writing a file)
    /// when none of the proforma sheets exist.
    pub fn convert_proforma(&mut self, filename: Option<&str>) -> Result<AssembledReport> {
        let loaded = self.load(&SheetSelection::Proforma)?;
        let filename =
            filename.map_or_else(|| format!("{}_proforma.pdf", self.stem()), str::to_string);
        self.convert(&loaded, &ConvertOptions::proforma().with_filename(filename))
    }

    fn notes(&self, sheet_count: usize, layout: &LayoutConfig) -> Vec<String> {
        let source = self
            .workbook
            .path()
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        vec![
            format!("Source file: {source}"),
            format!("Sheets processed: {sheet_count}"),
            format!(
                "Tables limited to {} rows and {} columns per sheet",
                layout.max_rows_per_sheet, layout.max_cols_per_sheet
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_proforma_order() {
        assert_eq!(
            select_proforma(&["Assumptions", "Proforma", "Other"]),
            vec!["Assumptions", "Proforma"]
        );
        assert_eq!(
            select_proforma(&["Calculations", "Notes", "Assumptions"]),
            vec!["Assumptions", "Calculations"]
        );
    }

    #[test]
    fn test_select_proforma_exact_names() {
        assert!(select_proforma(&["assumptions", "Proforma ", "Summary"]).is_empty());
        let none: [&str; 0] = [];
        assert!(select_proforma(&none).is_empty());
    }

    #[test]
    fn test_convert_options() {
        let options = ConvertOptions::proforma().with_filename("out.pdf");
        assert_eq!(options.layout.max_rows_per_sheet, 1000);
        assert_eq!(options.filename.as_deref(), Some("out.pdf"));
        assert_eq!(ConvertOptions::default().layout, LayoutConfig::default());
    }

    #[test]
    fn test_open_missing_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let err = Converter::open(dir.path().join("missing.xlsx"), dir.path()).unwrap_err();
        assert!(matches!(err, PdfError::Workbook(_)));
    }

    #[test]
    fn test_open_leaves_output_dir_alone() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("book.xlsx");
        let mut book = rust_xlsxwriter::Workbook::new();
        book.add_worksheet().set_name("Data").unwrap();
        book.save(&input).unwrap();

        let out = dir.path().join("reports");
        let converter = Converter::open(&input, &out).unwrap();
        assert_eq!(converter.output_dir(), out.as_path());
        assert!(!out.exists());
        assert!(matches!(
            converter.proforma_sheets(),
            Err(PdfError::NoProformaSheetsFound { available }) if available == ["Data"]
        ));
    }
}
