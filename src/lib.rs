//! Fuelplan - fuel distribution plan dashboard
//!
//! Reads the Pacific zone plan workbook, where every terminal sheet carries a
//! per-destination volume table starting at an unpredictable row, and turns it
//! into one aggregated, typed data set.
//!
//! # Pipeline
//!
//! - Discovery: find the plan workbook by file name pattern
//! - Locator: find the `DESTINO` header row in a raw cell grid
//! - Normalizer: rows below the header → typed [`types::DataRow`]s
//! - Aggregator: every terminal sheet → [`types::AggregateSet`]
//! - Snapshot: daily gzip CSV copy of the aggregate
//! - Summary: KPIs and chart series for the dashboard
//!
//! # Example
//!
//! ```no_run
//! use fuelplan::config::DashboardConfig;
//! use fuelplan::service::run_load_cycle;
//!
//! let outcome = run_load_cycle(&DashboardConfig::default())?;
//!
//! println!("Terminals: {}", outcome.set.len());
//! println!("Total volume: {}", outcome.metrics.total);
//! # Ok::<(), fuelplan::error::FuelPlanError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod discovery;
pub mod error;
pub mod excel;
pub mod service;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
pub use config::DashboardConfig;
pub use error::{FuelPlanError, FuelPlanResult};
pub use service::{run_load_cycle, Dashboard, LoadOutcome};
pub use types::{AggregateSet, DataRow, DataTable, Product, Terminal};
