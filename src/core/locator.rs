//! Table locator - finds the header row of the distribution table in a sheet
//!
//! Plan sheets carry titles, notes and blank rows above the table, so the
//! header position is not fixed. The header is the first row that has a
//! `DESTINO` cell and at least one product cell.

use crate::types::{CellGrid, HeaderRow, Product};

/// Label of the destination column
pub const DESTINATION_LABEL: &str = "DESTINO";

/// Return the zero-based index of the first header-like row.
///
/// `None` means the sheet has no table (`TableNotFound` for the caller).
/// Grids with fewer than two rows never contain a table.
pub fn locate(grid: &CellGrid) -> Option<usize> {
    if grid.height() < 2 {
        return None;
    }

    grid.rows()
        .position(|cells| is_header(&HeaderRow::from_cells(cells)))
}

/// Header rule: a `DESTINO` label plus at least one recognized product label
pub fn is_header(row: &HeaderRow) -> bool {
    row.contains(DESTINATION_LABEL)
        && row
            .labels()
            .iter()
            .any(|label| Product::from_label(label).is_some())
}
