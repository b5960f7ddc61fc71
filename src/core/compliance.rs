//! Compliance report reader
//!
//! The companion "Completo v5" workbook carries a `Reporte SAD` sheet with one
//! row per terminal and three metrics: demand fulfillment, capacity
//! utilization and the gap between programmed and assigned volume. Its header
//! is fixed at the fourth row. The report is optional; anything missing
//! simply yields no report.

use crate::excel::SheetSource;
use crate::types::CellGrid;
use serde::Serialize;
use tracing::{debug, warn};

pub const REPORT_SHEET: &str = "Reporte SAD";
/// Zero-based row holding the column labels
pub const HEADER_ROW: usize = 3;
/// The terminal names sit under this (misleading) label
const TERMINAL_COLUMN: &str = "GASOLINA REGULAR";
const SUMMARY_MARKER: &str = "terminales";

const FULFILLMENT_KEY: &str = "Cump";
const UTILIZATION_KEY: &str = "Utilizado";
const GAP_KEY: &str = "Diferencia";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceRow {
    pub terminal: String,
    pub fulfillment: Option<f64>,
    pub utilization: Option<f64>,
    pub gap: Option<f64>,
}

/// Terminal metrics sorted by terminal name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    /// Source column labels, `None` when the sheet lacks the metric
    pub fulfillment_column: Option<String>,
    pub utilization_column: Option<String>,
    pub gap_column: Option<String>,
    pub rows: Vec<ComplianceRow>,
}

/// Read the report sheet from a workbook, if present and well formed
pub fn load_compliance<S: SheetSource + ?Sized>(source: &mut S) -> Option<ComplianceReport> {
    if !source.has_sheet(REPORT_SHEET) {
        debug!(sheet = REPORT_SHEET, "compliance sheet not present");
        return None;
    }
    match source.load_grid(REPORT_SHEET) {
        Ok(grid) => read_compliance(&grid),
        Err(e) => {
            warn!(error = %e, "compliance sheet unreadable");
            None
        }
    }
}

/// Extract the report from the sheet grid
pub fn read_compliance(grid: &CellGrid) -> Option<ComplianceReport> {
    let header: Vec<String> = grid
        .row(HEADER_ROW)?
        .iter()
        .map(|cell| cell.text().unwrap_or_default())
        .collect();

    let terminal_col = header.iter().position(|h| h == TERMINAL_COLUMN)?;
    let find = |key: &str| header.iter().position(|h| h.contains(key));
    let fulfillment_col = find(FULFILLMENT_KEY);
    let utilization_col = find(UTILIZATION_KEY);
    let gap_col = find(GAP_KEY);

    if fulfillment_col.is_none() && utilization_col.is_none() && gap_col.is_none() {
        return None;
    }

    let metric = |row: usize, col: Option<usize>| col.and_then(|c| grid.cell(row, c).as_quantity());

    let mut rows: Vec<ComplianceRow> = ((HEADER_ROW + 1)..grid.height())
        .filter_map(|row| {
            let terminal = grid.cell(row, terminal_col).text()?;
            if terminal.to_lowercase().contains(SUMMARY_MARKER) {
                return None;
            }
            Some(ComplianceRow {
                terminal,
                fulfillment: metric(row, fulfillment_col),
                utilization: metric(row, utilization_col),
                gap: metric(row, gap_col),
            })
        })
        .collect();
    rows.sort_by(|a, b| a.terminal.cmp(&b.terminal));

    let label = |col: Option<usize>| col.map(|c| header[c].clone());
    Some(ComplianceReport {
        fulfillment_column: label(fulfillment_col),
        utilization_column: label(utilization_col),
        gap_column: label(gap_col),
        rows,
    })
}
