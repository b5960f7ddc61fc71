//! Excel report exporter - aggregate set → .xlsx
//!
//! Sheets: `Summary` (headline numbers), `Terminals` (stacked by product),
//! `Destinations` (all terminals combined) and one sheet per loaded terminal
//! holding its normalized rows.

use crate::core::summary::{destination_series, terminal_series, SummaryMetrics};
use crate::error::{FuelPlanError, FuelPlanResult};
use crate::types::{AggregateSet, DataTable, Product};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

pub const SUMMARY_SHEET: &str = "Summary";
pub const TERMINALS_SHEET: &str = "Terminals";
pub const DESTINATIONS_SHEET: &str = "Destinations";

fn export_err(e: XlsxError) -> FuelPlanError {
    FuelPlanError::Export(e.to_string())
}

/// Writes the report workbook for one aggregate set
pub struct ReportExporter<'a> {
    set: &'a AggregateSet,
    metrics: SummaryMetrics,
    header: Format,
}

impl<'a> ReportExporter<'a> {
    pub fn new(set: &'a AggregateSet) -> Self {
        Self {
            set,
            metrics: SummaryMetrics::compute(set),
            header: Format::new().set_bold(),
        }
    }

    /// Export the report to an .xlsx file
    pub fn export(&self, output_path: &Path) -> FuelPlanResult<()> {
        let mut workbook = Workbook::new();

        self.export_summary(workbook.add_worksheet())?;
        self.export_terminals(workbook.add_worksheet())?;
        self.export_destinations(workbook.add_worksheet())?;
        for table in self.set.tables() {
            self.export_table(workbook.add_worksheet(), table)?;
        }

        workbook.save(output_path).map_err(|e| {
            FuelPlanError::Export(format!("Failed to save Excel file: {}", e))
        })?;
        Ok(())
    }

    fn write_header(&self, worksheet: &mut Worksheet, labels: &[&str]) -> FuelPlanResult<()> {
        for (col, label) in labels.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, *label, &self.header)
                .map_err(export_err)?;
        }
        Ok(())
    }

    fn export_summary(&self, worksheet: &mut Worksheet) -> FuelPlanResult<()> {
        worksheet.set_name(SUMMARY_SHEET).map_err(export_err)?;
        self.write_header(worksheet, &["Metric", "Volume"])?;

        let kpis = self.metrics.kpis();
        let lines = [
            ("TOTAL", kpis.total),
            (Product::Regular.label(), kpis.regular),
            (Product::Premium.label(), kpis.premium),
            (Product::Diesel.label(), kpis.diesel),
        ];
        for (idx, (label, value)) in lines.iter().enumerate() {
            let row = idx as u32 + 1;
            worksheet.write_string(row, 0, *label).map_err(export_err)?;
            worksheet.write_number(row, 1, *value).map_err(export_err)?;
        }
        Ok(())
    }

    fn export_terminals(&self, worksheet: &mut Worksheet) -> FuelPlanResult<()> {
        worksheet.set_name(TERMINALS_SHEET).map_err(export_err)?;
        self.write_header(worksheet, &["Terminal", "REGULAR", "PREMIUM", "DIESEL", "TOTAL"])?;

        for (idx, entry) in terminal_series(self.set).iter().enumerate() {
            let row = idx as u32 + 1;
            worksheet
                .write_string(row, 0, entry.terminal.sheet_name())
                .map_err(export_err)?;
            for (col, product) in Product::ALL.iter().enumerate() {
                worksheet
                    .write_number(row, col as u16 + 1, entry.volumes.get(*product))
                    .map_err(export_err)?;
            }
            worksheet.write_number(row, 4, entry.total).map_err(export_err)?;
        }
        Ok(())
    }

    fn export_destinations(&self, worksheet: &mut Worksheet) -> FuelPlanResult<()> {
        worksheet.set_name(DESTINATIONS_SHEET).map_err(export_err)?;
        self.write_header(worksheet, &["DESTINO", "REGULAR", "PREMIUM", "DIESEL", "TOTAL"])?;

        for (idx, entry) in destination_series(self.set, None).iter().enumerate() {
            let row = idx as u32 + 1;
            worksheet
                .write_string(row, 0, &entry.destination)
                .map_err(export_err)?;
            for (col, product) in Product::ALL.iter().enumerate() {
                worksheet
                    .write_number(row, col as u16 + 1, entry.volumes.get(*product))
                    .map_err(export_err)?;
            }
            worksheet.write_number(row, 4, entry.total).map_err(export_err)?;
        }
        Ok(())
    }

    /// Normalized rows of one terminal; only its offered products get a column
    fn export_table(&self, worksheet: &mut Worksheet, table: &DataTable) -> FuelPlanResult<()> {
        worksheet
            .set_name(table.terminal.sheet_name())
            .map_err(export_err)?;

        let products: Vec<Product> = table.products.iter().copied().collect();
        let mut labels = vec!["DESTINO"];
        labels.extend(products.iter().map(Product::label));
        self.write_header(worksheet, &labels)?;

        for (idx, data_row) in table.rows.iter().enumerate() {
            let row = idx as u32 + 1;
            worksheet
                .write_string(row, 0, &data_row.destination)
                .map_err(export_err)?;
            for (col, product) in products.iter().enumerate() {
                worksheet
                    .write_number(row, col as u16 + 1, data_row.quantity(*product))
                    .map_err(export_err)?;
            }
        }
        Ok(())
    }
}
