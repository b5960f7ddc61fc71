//! Excel access
//!
//! - Import: workbook sheets → raw cell grids (calamine)
//! - Export: aggregate set → report workbook (rust_xlsxwriter)

mod exporter;
mod importer;

pub use exporter::{ReportExporter, DESTINATIONS_SHEET, SUMMARY_SHEET, TERMINALS_SHEET};
pub use importer::{ExcelWorkbook, InMemoryWorkbook, SheetSource};
