//! PDF report generation for sheetpress
//!
//! Lays out normalized sheet tables (truncation, column widths, summaries),
//! renders them onto paginated PDF pages with repeating table headers, and
//! writes one report per workbook.
//!
//! # Example
//!
//! ```no_run
//! use sheetpress_pdf::{ConvertOptions, Converter, SheetSelection};
//!
//! let mut converter = Converter::open("proforma.xlsx", "output").unwrap();
//! let loaded = converter.load(&SheetSelection::All).unwrap();
//! let report = converter.convert(&loaded, &ConvertOptions::default()).unwrap();
//! println!("wrote {}", report.path.display());
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod render;
pub mod report;
pub mod text;

pub use config::{LayoutConfig, Orientation, PageSize, RenderConfig, ReportConfig};
pub use convert::{
    select_proforma, ConvertOptions, Converter, SheetInfo, SheetSelection, PROFORMA_SHEETS,
};
pub use error::{PdfError, Result};
pub use layout::{
    layout, DocumentSection, SectionBody, SheetSummary, TableBlock, Truncation, NO_DATA_MESSAGE,
};
pub use render::{Block, PdfRenderer, TextStyle};
pub use report::{AssembledReport, ReportAssembler, SheetOutcome, SheetResult, SheetStatus};
