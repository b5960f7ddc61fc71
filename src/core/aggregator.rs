//! Multi-sheet aggregator - runs locate + normalize for every terminal sheet
//!
//! A sheet that is missing, unreadable, has no table or yields no rows is
//! skipped and recorded in the [`AggregationReport`]. The load only fails
//! when no terminal at all produced data.

use super::locator::locate;
use super::normalizer::normalize;
use crate::error::{FuelPlanError, FuelPlanResult};
use crate::excel::SheetSource;
use crate::types::{AggregateSet, CellGrid, DataTable, Terminal};
use serde::Serialize;
use tracing::{info, warn};

/// Why a terminal sheet contributed nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Workbook has no sheet with the terminal's name
    MissingSheet,
    /// Sheet exists but could not be read
    Unreadable(String),
    TableNotFound,
    EmptyTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSheet {
    pub terminal: Terminal,
    pub reason: SkipReason,
}

/// Per-sheet outcome of one aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
    pub loaded: Vec<Terminal>,
    pub skipped: Vec<SkippedSheet>,
}

/// Result of a successful aggregation
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub set: AggregateSet,
    pub report: AggregationReport,
}

/// Locate and normalize the table of one sheet
pub fn extract_table(grid: &CellGrid, terminal: Terminal) -> FuelPlanResult<DataTable> {
    let header_index = locate(grid).ok_or_else(|| FuelPlanError::TableNotFound {
        sheet: terminal.sheet_name().to_string(),
    })?;
    Ok(normalize(grid, header_index, terminal))
}

/// Builds an [`AggregateSet`] from the configured terminal sheets
pub struct Aggregator {
    terminals: Vec<Terminal>,
}

impl Aggregator {
    pub fn new(terminals: impl IntoIterator<Item = Terminal>) -> Self {
        Self {
            terminals: terminals.into_iter().collect(),
        }
    }

    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    /// Aggregate every configured terminal found in `source`.
    ///
    /// Returns `NoValidData` when no terminal yields a non-empty table.
    pub fn aggregate<S: SheetSource + ?Sized>(&self, source: &mut S) -> FuelPlanResult<Aggregation> {
        let mut report = AggregationReport::default();
        let mut tables = Vec::new();

        for &terminal in &self.terminals {
            match self.load_terminal(source, terminal) {
                Ok(table) => {
                    info!(terminal = %terminal, rows = table.len(), "terminal table loaded");
                    report.loaded.push(terminal);
                    tables.push(table);
                }
                Err(reason) => {
                    warn!(terminal = %terminal, reason = ?reason, "terminal skipped");
                    report.skipped.push(SkippedSheet { terminal, reason });
                }
            }
        }

        if tables.is_empty() {
            return Err(FuelPlanError::NoValidData);
        }

        Ok(Aggregation {
            set: AggregateSet::new(tables),
            report,
        })
    }

    fn load_terminal<S: SheetSource + ?Sized>(
        &self,
        source: &mut S,
        terminal: Terminal,
    ) -> Result<DataTable, SkipReason> {
        let sheet = terminal.sheet_name();
        if !source.has_sheet(sheet) {
            return Err(SkipReason::MissingSheet);
        }

        let grid = source
            .load_grid(sheet)
            .map_err(|e| SkipReason::Unreadable(e.to_string()))?;

        let table = match extract_table(&grid, terminal) {
            Ok(table) => table,
            Err(FuelPlanError::TableNotFound { .. }) => return Err(SkipReason::TableNotFound),
            Err(e) => return Err(SkipReason::Unreadable(e.to_string())),
        };

        if table.is_empty() {
            return Err(SkipReason::EmptyTable);
        }
        Ok(table)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(Terminal::ALL)
    }
}
