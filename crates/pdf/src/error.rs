use sheetpress_sheet::SheetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("No sheets loaded. Load sheets before converting")]
    NoSheetsLoaded,

    #[error("None of the proforma sheets were found. Available sheets: {}", available.join(", "))]
    NoProformaSheetsFound { available: Vec<String> },

    #[error("Failed to render sheet '{sheet}': {message}")]
    SheetRender { sheet: String, message: String },

    #[error(transparent)]
    Workbook(#[from] SheetError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("PDF render error: {0}")]
    Render(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PdfError>;
