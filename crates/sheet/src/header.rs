use crate::grid::RawGrid;

/// Number of leading rows considered when looking for a header
pub const HEADER_SCAN_ROWS: usize = 10;

/// Pick the row most likely to hold column headers.
///
/// Counts the non-missing cells with non-empty text in each of the first
/// [`HEADER_SCAN_ROWS`] rows and returns the index of the row with the
/// highest count. Ties keep the earliest row; an empty grid (or one whose
/// leading rows are all blank) yields row 0.
#[must_use]
pub fn detect_header(grid: &RawGrid) -> usize {
    let mut best_row = 0;
    let mut best_count = 0;

    for (index, row) in grid.rows().take(HEADER_SCAN_ROWS).enumerate() {
        let count = row
            .iter()
            .filter(|cell| !cell.is_missing() && !cell.to_string().trim().is_empty())
            .count();
        if count > best_count {
            best_row = index;
            best_count = count;
        }
    }

    tracing::debug!(row = best_row, cells = best_count, "detected header row");
    best_row
}
