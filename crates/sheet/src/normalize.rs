use crate::cell::{CellValue, ValueKind};
use crate::error::{Result, SheetError};
use crate::format::format_cell;
use crate::grid::RawGrid;
use std::collections::HashSet;

/// What kind of values a column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Only missing data cells (the column survives because of its header)
    Empty,
    Uniform(ValueKind),
    Mixed,
}

impl ColumnKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ColumnKind::Empty => "empty",
            ColumnKind::Uniform(kind) => kind.label(),
            ColumnKind::Mixed => "mixed",
        }
    }

    fn absorb(self, kind: ValueKind) -> Self {
        match self {
            ColumnKind::Empty => ColumnKind::Uniform(kind),
            ColumnKind::Uniform(existing) if existing == kind => self,
            _ => ColumnKind::Mixed,
        }
    }
}

/// A cleaned table: unique column names plus rows of display strings.
///
/// Every row has exactly one value per column, and no row or column is
/// entirely blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    kinds: Vec<ColumnKind>,
}

impl NormalizedTable {
    /// Build a table from already formatted parts.
    ///
    /// Column kinds are inferred as text for non-blank values.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::RowLength`] if a row does not have one value per column.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(SheetError::RowLength {
                row: index,
                expected: columns.len(),
                actual: row.len(),
            });
        }

        let kinds = (0..columns.len())
            .map(|col| {
                rows.iter()
                    .filter(|row| !row[col].trim().is_empty())
                    .fold(ColumnKind::Empty, |kind, _| kind.absorb(ValueKind::Text))
            })
            .collect();

        Ok(NormalizedTable {
            columns,
            rows,
            kinds,
        })
    }

    /// Column names in display order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows (header excluded)
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn column_kinds(&self) -> &[ColumnKind] {
        &self.kinds
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    /// True when there are no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct column kinds in first-seen order, skipping empty columns
    #[must_use]
    pub fn distinct_kinds(&self) -> Vec<ColumnKind> {
        let mut seen = HashSet::new();
        self.kinds
            .iter()
            .copied()
            .filter(|kind| *kind != ColumnKind::Empty && seen.insert(*kind))
            .collect()
    }
}

/// Turn a raw grid into a [`NormalizedTable`] using `header_row` as the header.
///
/// Rows above the header are discarded. Fully blank data rows are dropped,
/// as are columns with neither a header label nor any data. Blank header
/// cells are named `Column_<i>` after their original position; repeated
/// names get `.1`, `.2`, ... suffixes.
#[must_use]
pub fn normalize(grid: &RawGrid, header_row: usize) -> NormalizedTable {
    if header_row >= grid.row_count() {
        return NormalizedTable::default();
    }

    let width = grid.width();
    let data_rows: Vec<usize> = ((header_row + 1)..grid.row_count())
        .filter(|&row| (0..width).any(|col| !grid.get(row, col).is_missing()))
        .collect();

    let kept_columns: Vec<usize> = (0..width)
        .filter(|&col| {
            !grid.get(header_row, col).is_missing()
                || data_rows.iter().any(|&row| !grid.get(row, col).is_missing())
        })
        .collect();

    let dropped_rows = grid.row_count() - header_row - 1 - data_rows.len();
    let dropped_columns = width - kept_columns.len();
    if dropped_rows > 0 || dropped_columns > 0 {
        tracing::debug!(dropped_rows, dropped_columns, "pruned empty rows and columns");
    }

    let columns = unique_names(
        kept_columns
            .iter()
            .map(|&col| header_name(grid.get(header_row, col), col)),
    );

    let rows = data_rows
        .iter()
        .map(|&row| {
            kept_columns
                .iter()
                .map(|&col| format_cell(grid.get(row, col)))
                .collect()
        })
        .collect();

    let kinds = kept_columns
        .iter()
        .map(|&col| {
            data_rows
                .iter()
                .filter_map(|&row| grid.get(row, col).kind())
                .fold(ColumnKind::Empty, ColumnKind::absorb)
        })
        .collect();

    NormalizedTable {
        columns,
        rows,
        kinds,
    }
}

fn header_name(cell: &CellValue, position: usize) -> String {
    if cell.is_missing() {
        format!("Column_{position}")
    } else {
        cell.to_string().trim().to_string()
    }
}

fn unique_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut result = Vec::new();

    for name in names {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while used.contains(&candidate) {
            candidate = format!("{name}.{suffix}");
            suffix += 1;
        }
        used.insert(candidate.clone());
        result.push(candidate);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariants(table: &NormalizedTable) {
        for row in table.rows() {
            assert_eq!(row.len(), table.col_count());
            assert!(row.iter().any(|value| !value.is_empty()));
        }
        assert_eq!(table.column_kinds().len(), table.col_count());
    }

    #[test]
    fn test_basic_normalize() {
        let grid = RawGrid::from_cells(vec![
            vec![CellValue::from("Item"), CellValue::from("Amount")],
            vec![CellValue::from("Rent"), CellValue::Float(1200.0)],
            vec![CellValue::from("Utilities"), CellValue::Float(150.75)],
        ]);
        let table = normalize(&grid, 0);

        assert_eq!(table.columns(), ["Item", "Amount"]);
        assert_eq!(table.rows()[0], vec!["Rent", "1200"]);
        assert_eq!(table.rows()[1], vec!["Utilities", "150.75"]);
        assert_eq!(
            table.column_kinds(),
            [
                ColumnKind::Uniform(ValueKind::Text),
                ColumnKind::Uniform(ValueKind::Number)
            ]
        );
        assert_invariants(&table);
    }

    #[test]
    fn test_rows_above_header_discarded() {
        let grid = RawGrid::from_rows(vec![
            vec!["Title", "", ""],
            vec!["A", "B", "C"],
            vec!["1", "2", "3"],
        ]);
        let table = normalize(&grid, 1);
        assert_eq!(table.columns(), ["A", "B", "C"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_empty_rows_and_columns_dropped() {
        let grid = RawGrid::from_cells(vec![
            vec![
                CellValue::from("Name"),
                CellValue::Null,
                CellValue::from("Value"),
                CellValue::Null,
            ],
            vec![
                CellValue::from("a"),
                CellValue::Null,
                CellValue::Int(1),
                CellValue::from("x"),
            ],
            vec![CellValue::Null, CellValue::from(" "), CellValue::Null, CellValue::Null],
            vec![CellValue::from("b"), CellValue::Null, CellValue::Int(2)],
        ]);
        let table = normalize(&grid, 0);

        // column 1 has neither header nor data; column 3 has data but no header
        assert_eq!(table.columns(), ["Name", "Value", "Column_3"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0], vec!["a", "1", "x"]);
        assert_eq!(table.rows()[1], vec!["b", "2", ""]);
        assert_invariants(&table);
    }

    #[test]
    fn test_duplicate_headers() {
        let grid = RawGrid::from_rows(vec![
            vec!["Year", "Year", "Year", "Total"],
            vec!["1", "2", "3", "6"],
        ]);
        let table = normalize(&grid, 0);
        assert_eq!(table.columns(), ["Year", "Year.1", "Year.2", "Total"]);
    }

    #[test]
    fn test_synthesized_name_collision() {
        let grid = RawGrid::from_cells(vec![
            vec![CellValue::Null, CellValue::from("Column_0")],
            vec![CellValue::from("a"), CellValue::from("b")],
        ]);
        let table = normalize(&grid, 0);
        assert_eq!(table.columns(), ["Column_0", "Column_0.1"]);
    }

    #[test]
    fn test_header_only_single_cell() {
        let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); 5];
        rows.push(vec![CellValue::Null, CellValue::Null, CellValue::from("Only")]);
        let grid = RawGrid::from_cells(rows);

        let table = normalize(&grid, 5);
        assert_eq!(table.columns(), ["Only"]);
        assert!(table.is_empty());
        assert_eq!(table.column_kinds(), [ColumnKind::Empty]);
    }

    #[test]
    fn test_header_past_end() {
        let grid = RawGrid::from_rows(vec![vec!["a"]]);
        let table = normalize(&grid, 3);
        assert_eq!(table.col_count(), 0);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_fully_blank_grid() {
        let grid = RawGrid::from_rows(vec![vec!["", ""], vec!["", ""]]);
        let table = normalize(&grid, 0);
        assert_eq!(table.col_count(), 0);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_ragged_rows_padded() {
        let grid = RawGrid::from_cells(vec![
            vec![CellValue::from("A"), CellValue::from("B"), CellValue::from("C")],
            vec![CellValue::Int(1)],
            vec![CellValue::Int(2), CellValue::Int(3), CellValue::Int(4)],
        ]);
        let table = normalize(&grid, 0);
        assert_eq!(table.rows()[0], vec!["1", "", ""]);
        assert_invariants(&table);
    }

    #[test]
    fn test_mixed_kinds() {
        let grid = RawGrid::from_cells(vec![
            vec![CellValue::from("Mixed")],
            vec![CellValue::Int(1)],
            vec![CellValue::from("n/a")],
        ]);
        let table = normalize(&grid, 0);
        assert_eq!(table.column_kinds(), [ColumnKind::Mixed]);
        assert_eq!(table.distinct_kinds(), vec![ColumnKind::Mixed]);
    }

    #[test]
    fn test_from_parts_rejects_ragged_rows() {
        let err = NormalizedTable::from_parts(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into(), "2".into()], vec!["3".into()]],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SheetError::RowLength {
                row: 1,
                expected: 2,
                actual: 1
            }
        ));
    }
}
