use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading workbooks and sheets
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Failed to load workbook {}: {message}", path.display())]
    WorkbookLoad { path: PathBuf, message: String },

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Failed to read sheet '{name}': {message}")]
    SheetRead { name: String, message: String },

    #[error("Row {row} has {actual} values, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

impl SheetError {
    /// Whether this error only affects a single sheet (the rest of the
    /// workbook can still be processed).
    #[must_use]
    pub fn is_per_sheet(&self) -> bool {
        matches!(
            self,
            SheetError::SheetNotFound { .. } | SheetError::SheetRead { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
