//! Sheet loading and cleanup for sheetpress
//!
//! Reads worksheets into raw grids, finds the header row, and turns the grid
//! into a [`NormalizedTable`] of display strings ready for layout.
//!
//! # Examples
//!
//! ## Normalizing an in-memory grid
//!
//! ```
//! use sheetpress_sheet::{detect_header, normalize, RawGrid};
//!
//! let grid = RawGrid::from_rows(vec![
//!     vec!["Quarterly report", "", ""],
//!     vec!["Item", "Q1", "Q2"],
//!     vec!["Rent", "1200", "1250.5"],
//! ]);
//!
//! let header = detect_header(&grid);
//! assert_eq!(header, 1);
//!
//! let table = normalize(&grid, header);
//! assert_eq!(table.columns(), ["Item", "Q1", "Q2"]);
//! assert_eq!(table.rows()[0], vec!["Rent", "1200", "1250.50"]);
//! ```
//!
//! ## Formatting single cells
//!
//! ```
//! use sheetpress_sheet::{format_cell, CellValue};
//!
//! assert_eq!(format_cell(&CellValue::Float(3.0)), "3");
//! assert_eq!(format_cell(&CellValue::Float(2.71828)), "2.72");
//! assert_eq!(format_cell(&CellValue::Null), "");
//! ```
//!
//! ## Reading a workbook
//!
//! ```no_run
//! use sheetpress_sheet::{table_from_grid, Workbook};
//!
//! let mut workbook = Workbook::open("proforma.xlsx").unwrap();
//! let names = workbook.sheet_names().to_vec();
//! for (name, grid) in workbook.read_grids(&names) {
//!     match grid {
//!         Ok(grid) => println!("{name}: {} rows", table_from_grid(&grid).row_count()),
//!         Err(e) => eprintln!("{name}: {e}"),
//!     }
//! }
//! ```

mod cell;
mod error;
mod format;
mod grid;
mod header;
mod normalize;
mod workbook;

/// Re-export cell value types.
pub use cell::{CellValue, ValueKind};
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export the cell formatter.
pub use format::{format_cell, format_str, MAX_TEXT_CHARS};
/// Re-export the raw grid type.
pub use grid::RawGrid;
/// Re-export header detection.
pub use header::{detect_header, HEADER_SCAN_ROWS};
/// Re-export table normalization.
pub use normalize::{normalize, ColumnKind, NormalizedTable};
/// Re-export the workbook reader.
pub use workbook::Workbook;

/// Header detection followed by normalization
#[must_use]
pub fn table_from_grid(grid: &RawGrid) -> NormalizedTable {
    normalize(grid, detect_header(grid))
}
