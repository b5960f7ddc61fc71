//! Table normalizer - turns the rows below a located header into a [`DataTable`]
//!
//! Output columns are `DESTINO` plus whichever of REGULAR/PREMIUM/DIESEL the
//! header carries; every other column is dropped. Quantity cells that are
//! blank or not numeric count as 0 so partially filled plans still total.

use super::locator::DESTINATION_LABEL;
use crate::types::{CellGrid, DataRow, DataTable, HeaderRow, Terminal};
use tracing::debug;

/// Normalize the table whose header sits at `header_index`.
///
/// Rows without a destination are skipped. The table is built in full before
/// it is returned, so callers never see a partially normalized result.
pub fn normalize(grid: &CellGrid, header_index: usize, terminal: Terminal) -> DataTable {
    let header = match grid.row(header_index) {
        Some(cells) => HeaderRow::from_cells(cells),
        None => return DataTable::new(terminal, []),
    };

    let product_columns = header.product_columns();
    let mut table = DataTable::new(terminal, product_columns.iter().map(|(p, _)| *p));

    let Some(destination_col) = header.position(DESTINATION_LABEL) else {
        return table;
    };

    let mut coerced = 0usize;
    for row_index in (header_index + 1)..grid.height() {
        let Some(destination) = grid.cell(row_index, destination_col).text() else {
            continue;
        };

        let mut row = DataRow::new(destination, terminal);
        for (product, col) in &product_columns {
            let cell = grid.cell(row_index, *col);
            let quantity = cell.as_quantity().unwrap_or_else(|| {
                if !cell.is_blank() {
                    coerced += 1;
                }
                0.0
            });
            row.quantities.insert(*product, quantity);
        }
        table.rows.push(row);
    }

    if coerced > 0 {
        debug!(
            terminal = %terminal,
            cells = coerced,
            "non-numeric quantity cells counted as 0"
        );
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_drops_empty_destination_and_coerces_quantities() {
        let grid = CellGrid::from_rows([
            vec!["DESTINO", "REGULAR"],
            vec!["A", "5"],
            vec!["", "10"],
            vec!["B", "x"],
        ]);

        let table = normalize(&grid, 0, Terminal::Guaymas);

        assert_eq!(
            table.rows,
            vec![
                DataRow::new("A", Terminal::Guaymas).with_quantity(Product::Regular, 5.0),
                DataRow::new("B", Terminal::Guaymas).with_quantity(Product::Regular, 0.0),
            ]
        );
    }

    #[test]
    fn test_keeps_only_canonical_columns() {
        let grid = CellGrid::from_rows([
            vec!["titulo", "", "", ""],
            vec!["Diesel", "Observaciones", "destino", "Premium"],
            vec!["30", "urgente", "Tepic", "12.5"],
        ]);

        let table = normalize(&grid, 1, Terminal::Zapopan);

        assert_eq!(
            table.products.iter().copied().collect::<Vec<_>>(),
            vec![Product::Premium, Product::Diesel]
        );
        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.destination, "Tepic");
        assert_eq!(row.terminal, Terminal::Zapopan);
        assert_eq!(row.quantity(Product::Premium), 12.5);
        assert_eq!(row.quantity(Product::Diesel), 30.0);
        assert!(!row.offers(Product::Regular));
    }

    #[test]
    fn test_whitespace_destination_is_dropped() {
        let grid = CellGrid::from_rows([
            vec!["DESTINO", "DIESEL"],
            vec!["   ", "40"],
            vec![" Mazatlan ", "20"],
        ]);

        let table = normalize(&grid, 0, Terminal::Topolobampo);

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].destination, "Mazatlan");
    }

    #[test]
    fn test_short_rows_read_as_zero() {
        let grid = CellGrid::from_rows([
            vec!["DESTINO", "REGULAR", "PREMIUM"],
            vec!["Colima"],
        ]);

        let table = normalize(&grid, 0, Terminal::Manzanillo);

        assert_eq!(table.rows[0].quantity(Product::Regular), 0.0);
        assert!(table.rows[0].offers(Product::Premium));
    }

    #[test]
    fn test_header_only_gives_empty_table() {
        let grid = CellGrid::from_rows([vec!["x"], vec!["DESTINO", "DIESEL"]]);
        let table = normalize(&grid, 1, Terminal::Rosarito);
        assert!(table.is_empty());
        assert!(table.offers(Product::Diesel));
    }

    #[test]
    fn test_numeric_destination_becomes_text() {
        let grid = CellGrid::from_rows([vec!["DESTINO", "REGULAR"], vec!["101", "7"]]);
        let table = normalize(&grid, 0, Terminal::LCardenas);
        assert_eq!(table.rows[0].destination, "101");
    }
}
