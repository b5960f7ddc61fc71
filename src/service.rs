//! Load cycle
//!
//! A load runs discovery → aggregation → summary → snapshot → compliance and
//! produces one immutable [`LoadOutcome`]. [`Dashboard`] serializes loads
//! (a second request while one is running is rejected) and swaps the stored
//! result in one step, so readers see either the previous cycle or the new
//! one, never a mix.

use crate::config::DashboardConfig;
use crate::core::{load_compliance, AggregationReport, Aggregator, ComplianceReport, SummaryMetrics};
use crate::discovery::WorkbookLocator;
use crate::error::{FuelPlanError, FuelPlanResult};
use crate::excel::ExcelWorkbook;
use crate::snapshot::SnapshotWriter;
use crate::types::AggregateSet;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// What happened to the historical snapshot of a load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SnapshotStatus {
    Written { path: PathBuf },
    /// The load still succeeded; only the snapshot is missing
    Failed { error: String },
    Disabled,
}

/// Everything one successful load produced
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub workbook: PathBuf,
    pub loaded_at: DateTime<Utc>,
    pub set: AggregateSet,
    pub metrics: SummaryMetrics,
    pub report: AggregationReport,
    pub snapshot: SnapshotStatus,
    pub compliance: Option<ComplianceReport>,
}

impl LoadOutcome {
    pub fn new(
        workbook: PathBuf,
        set: AggregateSet,
        report: AggregationReport,
        snapshot: SnapshotStatus,
        compliance: Option<ComplianceReport>,
    ) -> Self {
        Self {
            workbook,
            loaded_at: Utc::now(),
            metrics: SummaryMetrics::compute(&set),
            set,
            report,
            snapshot,
            compliance,
        }
    }
}

/// Run one complete load with the given configuration
pub fn run_load_cycle(config: &DashboardConfig) -> FuelPlanResult<LoadOutcome> {
    let locator = WorkbookLocator::new(config.search_dirs.clone(), config.extensions.clone());
    let path = locator.find(&config.file_pattern)?;
    info!(path = %path.display(), "loading plan workbook");

    let mut workbook = ExcelWorkbook::open(&path)?;
    let aggregation =
        Aggregator::new(config.terminals.iter().copied()).aggregate(&mut workbook)?;

    let snapshot = if config.write_snapshot {
        match SnapshotWriter::new(&config.snapshot_dir).write_today(&aggregation.set) {
            Ok(path) => SnapshotStatus::Written { path },
            Err(e) => {
                warn!(error = %e, "snapshot not written");
                SnapshotStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    } else {
        SnapshotStatus::Disabled
    };

    let compliance = config
        .compliance_pattern
        .as_deref()
        .and_then(|pattern| read_compliance_workbook(&locator, pattern));

    Ok(LoadOutcome::new(
        path,
        aggregation.set,
        aggregation.report,
        snapshot,
        compliance,
    ))
}

fn read_compliance_workbook(locator: &WorkbookLocator, pattern: &str) -> Option<ComplianceReport> {
    let path = locator.find(pattern).ok()?;
    match ExcelWorkbook::open(&path) {
        Ok(mut workbook) => load_compliance(&mut workbook),
        Err(e) => {
            warn!(error = %e, "compliance workbook not readable");
            None
        }
    }
}

//==============================================================================
// Dashboard state
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    Idle,
    Loading,
}

/// Result of the most recent completed load
#[derive(Debug, Clone)]
pub enum LoadResult {
    Succeeded(Arc<LoadOutcome>),
    Failed(String),
}

type Loader = Box<dyn Fn(&DashboardConfig) -> FuelPlanResult<LoadOutcome> + Send + Sync>;

/// One dashboard instance: configuration plus the latest load result
pub struct Dashboard {
    config: DashboardConfig,
    loader: Loader,
    loading: AtomicBool,
    last: RwLock<Option<LoadResult>>,
}

/// Clears the in-flight flag when a load ends, even on panic
struct LoadGuard<'a>(&'a AtomicBool);

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self::with_loader(config, run_load_cycle)
    }

    /// Use a custom load function instead of [`run_load_cycle`]
    pub fn with_loader<F>(config: DashboardConfig, loader: F) -> Self
    where
        F: Fn(&DashboardConfig) -> FuelPlanResult<LoadOutcome> + Send + Sync + 'static,
    {
        Self {
            config,
            loader: Box::new(loader),
            loading: AtomicBool::new(false),
            last: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn phase(&self) -> LoadPhase {
        if self.loading.load(Ordering::Acquire) {
            LoadPhase::Loading
        } else {
            LoadPhase::Idle
        }
    }

    /// Run a load now. Rejected with `LoadInProgress` if one is running.
    ///
    /// On failure the stored result becomes `Failed`, so data from an earlier
    /// cycle is no longer offered.
    pub fn reload(&self) -> FuelPlanResult<Arc<LoadOutcome>> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FuelPlanError::LoadInProgress);
        }
        let _guard = LoadGuard(&self.loading);

        let (stored, returned) = match (self.loader)(&self.config) {
            Ok(outcome) => {
                let outcome = Arc::new(outcome);
                info!(
                    terminals = outcome.set.len(),
                    total = outcome.metrics.total,
                    "load succeeded"
                );
                (LoadResult::Succeeded(Arc::clone(&outcome)), Ok(outcome))
            }
            Err(e) => {
                warn!(error = %e, "load failed");
                (LoadResult::Failed(e.to_string()), Err(e))
            }
        };

        *self.last.write().unwrap_or_else(PoisonError::into_inner) = Some(stored);
        returned
    }

    pub fn last_result(&self) -> Option<LoadResult> {
        self.last
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Outcome of the last load, if it succeeded
    pub fn latest(&self) -> Option<Arc<LoadOutcome>> {
        match self.last_result() {
            Some(LoadResult::Succeeded(outcome)) => Some(outcome),
            _ => None,
        }
    }
}
