use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::grid::RawGrid;
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use indexmap::IndexMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or_else(|| CellValue::Float(dt.as_f64()), CellValue::DateTime),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

/// Place a used range at its absolute sheet coordinates.
///
/// calamine ranges start at the first used cell; the leading blank rows and
/// columns are filled back in so row indices match the sheet.
fn range_to_grid(range: &Range<Data>) -> RawGrid {
    let Some((start_row, start_col)) = range.start() else {
        return RawGrid::new();
    };
    let start_row = start_row as usize;
    let start_col = start_col as usize;

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![CellValue::Null; start_col];
        cells.extend(row.iter().map(data_to_cell_value));
        rows.push(cells);
    }

    RawGrid::from_cells(rows)
}

/// A workbook opened for reading.
///
/// The format (xlsx, xlsm, xlsb, xls, ods) is picked from the file extension.
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
    sheet_names: Vec<String>,
}

impl std::fmt::Debug for Workbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbook")
            .field("path", &self.path)
            .field("sheet_names", &self.sheet_names)
            .finish_non_exhaustive()
    }
}

impl Workbook {
    /// Open a workbook file
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::WorkbookLoad`] if the file is missing, corrupt or
    /// not a supported spreadsheet format.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let sheets = open_workbook_auto(&path).map_err(|e| SheetError::WorkbookLoad {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let sheet_names = sheets.sheet_names();

        tracing::info!(path = %path.display(), sheets = sheet_names.len(), "loaded workbook");

        Ok(Workbook {
            path,
            sheets,
            sheet_names,
        })
    }

    /// Path the workbook was opened from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sheet names in workbook order
    #[must_use]
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    #[must_use]
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheet_names.iter().any(|n| n == name)
    }

    /// Read one sheet into a raw grid
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::SheetNotFound`] for unknown names and
    /// [`SheetError::SheetRead`] if the sheet data cannot be decoded.
    pub fn read_grid(&mut self, name: &str) -> Result<RawGrid> {
        if !self.has_sheet(name) {
            return Err(SheetError::SheetNotFound {
                name: name.to_string(),
            });
        }

        let range = self
            .sheets
            .worksheet_range(name)
            .map_err(|e| SheetError::SheetRead {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        let grid = range_to_grid(&range);
        tracing::info!(sheet = name, rows = grid.row_count(), "read sheet");
        Ok(grid)
    }

    /// Read several sheets, keeping the requested order.
    ///
    /// Each sheet gets its own result so one bad sheet does not hide the others.
    pub fn read_grids<S: AsRef<str>>(&mut self, names: &[S]) -> IndexMap<String, Result<RawGrid>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), self.read_grid(name))
            })
            .collect()
    }
}
