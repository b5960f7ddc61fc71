//! Workbook reader - loads one named sheet into a raw [`CellGrid`]
//!
//! No assumption is made about where a table starts: the grid is anchored at
//! A1 so row indices match the sheet's own row numbers (zero-based).

use crate::error::{FuelPlanError, FuelPlanResult};
use crate::types::{Cell, CellGrid};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use chrono::{Duration, NaiveDate};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Anything that can hand out sheets as raw cell grids
pub trait SheetSource {
    /// Sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    fn has_sheet(&self, name: &str) -> bool {
        self.sheet_names().iter().any(|s| s == name)
    }

    /// Read one sheet
    fn load_grid(&mut self, sheet: &str) -> FuelPlanResult<CellGrid>;
}

/// Spreadsheet file on disk (.xlsx, .xlsm, .xls, .xlsb, .ods)
pub struct ExcelWorkbook {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
}

impl ExcelWorkbook {
    /// Open a workbook, detecting the format from its extension
    pub fn open<P: AsRef<Path>>(path: P) -> FuelPlanResult<Self> {
        let path = path.as_ref().to_path_buf();
        let workbook = open_workbook_auto(&path).map_err(|e| {
            FuelPlanError::Workbook(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self { path, workbook })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SheetSource for ExcelWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    fn load_grid(&mut self, sheet: &str) -> FuelPlanResult<CellGrid> {
        let range = self.workbook.worksheet_range(sheet).map_err(|e| {
            FuelPlanError::Workbook(format!("Failed to read sheet '{}': {}", sheet, e))
        })?;
        Ok(range_to_grid(&range))
    }
}

/// Workbook held in memory, used by tests and by callers that already
/// parsed their input elsewhere
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkbook {
    sheets: Vec<(String, CellGrid)>,
}

impl InMemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, grid: CellGrid) -> Self {
        self.sheets.push((name.into(), grid));
        self
    }
}

impl SheetSource for InMemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn load_grid(&mut self, sheet: &str) -> FuelPlanResult<CellGrid> {
        self.sheets
            .iter()
            .find(|(name, _)| name == sheet)
            .map(|(_, grid)| grid.clone())
            .ok_or_else(|| FuelPlanError::Workbook(format!("Sheet '{}' not found", sheet)))
    }
}

/// Convert a calamine range into a grid anchored at A1
fn range_to_grid(range: &Range<Data>) -> CellGrid {
    if range.is_empty() {
        return CellGrid::default();
    }

    // calamine ranges start at the first used cell; pad back to A1
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Blank; col_offset];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }

    CellGrid::new(rows)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => excel_date_text(dt.as_f64())
            .map(Cell::Text)
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        // Error cells (#N/A, #REF!, ...) behave like empty cells
        _ => Cell::Blank,
    }
}

/// ISO text for an Excel serial date (1900 system): `2023-03-15`, or
/// `2023-03-15T18:00:00` when the serial carries a time of day
fn excel_date_text(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.floor();
    let seconds = ((serial - days) * 86_400.0).round() as i64;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::days(days as i64))?;
    if seconds == 0 {
        Some(date.format("%Y-%m-%d").to_string())
    } else {
        let moment = date.and_hms_opt(0, 0, 0)? + Duration::seconds(seconds);
        Some(moment.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cell_values() {
        assert_eq!(convert_cell(&Data::Int(300)), Cell::Number(300.0));
        assert_eq!(convert_cell(&Data::Float(12.5)), Cell::Number(12.5));
        assert_eq!(
            convert_cell(&Data::String("DESTINO".to_string())),
            Cell::Text("DESTINO".to_string())
        );
        assert_eq!(convert_cell(&Data::Bool(true)), Cell::Text("TRUE".to_string()));
        assert_eq!(convert_cell(&Data::Empty), Cell::Blank);
    }

    #[test]
    fn test_excel_date_text() {
        assert_eq!(excel_date_text(45000.0).as_deref(), Some("2023-03-15"));
        assert_eq!(excel_date_text(45000.75).as_deref(), Some("2023-03-15T18:00:00"));
        assert_eq!(excel_date_text(-1.0), None);
        assert_eq!(excel_date_text(f64::NAN), None);
    }

    #[test]
    fn test_range_to_grid_pads_to_a1() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("DESTINO".to_string()));
        range.set_value((2, 2), Data::String("REGULAR".to_string()));
        range.set_value((3, 1), Data::String("Culiacan".to_string()));
        range.set_value((3, 2), Data::Float(150.0));

        let grid = range_to_grid(&range);

        assert_eq!(grid.height(), 4);
        assert!(grid.row(0).unwrap().is_empty());
        assert_eq!(grid.cell(2, 0), &Cell::Blank);
        assert_eq!(grid.cell(2, 1), &Cell::Text("DESTINO".to_string()));
        assert_eq!(grid.cell(3, 2), &Cell::Number(150.0));
    }

    #[test]
    fn test_range_to_grid_empty() {
        let range: Range<Data> = Range::empty();
        assert!(range_to_grid(&range).is_empty());
    }

    #[test]
    fn test_in_memory_workbook() {
        let mut workbook = InMemoryWorkbook::new()
            .with_sheet("Guaymas", CellGrid::from_rows([vec!["DESTINO", "REGULAR"]]));

        assert_eq!(workbook.sheet_names(), vec!["Guaymas".to_string()]);
        assert!(workbook.has_sheet("Guaymas"));
        assert!(!workbook.has_sheet("Zapopan"));
        assert_eq!(workbook.load_grid("Guaymas").unwrap().height(), 1);
        assert!(matches!(
            workbook.load_grid("Zapopan"),
            Err(FuelPlanError::Workbook(_))
        ));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let result = ExcelWorkbook::open("does-not-exist.xlsx");
        assert!(matches!(result, Err(FuelPlanError::Workbook(_))));
    }
}
