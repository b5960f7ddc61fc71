//! Table extraction and aggregation core

pub mod aggregator;
pub mod compliance;
pub mod locator;
pub mod normalizer;
pub mod summary;

pub use aggregator::{extract_table, Aggregation, AggregationReport, Aggregator, SkipReason};
pub use compliance::{load_compliance, ComplianceReport};
pub use locator::locate;
pub use normalizer::normalize;
pub use summary::{
    destination_series, product_series, terminal_series, DestinationVolume, Kpis,
    ProductVolume, SummaryMetrics, TerminalVolume,
};
