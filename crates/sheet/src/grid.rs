use crate::cell::CellValue;

static NULL_CELL: CellValue = CellValue::Null;

/// Raw two-dimensional cell grid as read from a worksheet.
///
/// Rows may be ragged; cells past the end of a row read as [`CellValue::Null`].
/// No row is treated as a header at this level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<CellValue>>,
}

impl RawGrid {
    /// Create an empty grid
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a grid from already converted cells
    #[must_use]
    pub fn from_cells(rows: Vec<Vec<CellValue>>) -> Self {
        RawGrid { rows }
    }

    /// Create a grid from a 2D vector of values
    #[must_use]
    pub fn from_rows<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let rows = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        RawGrid { rows }
    }

    /// Number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row by index
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Get a cell, treating anything outside the stored data as null
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&NULL_CELL)
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Whether any cell holds a non-missing value
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.rows.iter().flatten().any(|cell| !cell.is_missing())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_access() {
        let grid = RawGrid::from_cells(vec![
            vec![CellValue::from("a"), CellValue::from("b"), CellValue::from("c")],
            vec![CellValue::from("d")],
        ]);

        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.get(1, 0), &CellValue::from("d"));
        assert_eq!(grid.get(1, 2), &CellValue::Null);
        assert_eq!(grid.get(9, 9), &CellValue::Null);
    }

    #[test]
    fn test_has_content() {
        assert!(!RawGrid::new().has_content());
        assert!(!RawGrid::from_rows(vec![vec!["", "  "]]).has_content());
        assert!(RawGrid::from_rows(vec![vec!["", "x"]]).has_content());
    }
}
