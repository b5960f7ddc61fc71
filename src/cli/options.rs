//! Command-line options shared by the `fuelplan` and `fuelplan-server` binaries

use crate::config::DashboardConfig;
use crate::error::FuelPlanResult;
use clap::Args;
use std::path::PathBuf;

/// Where to find the plan workbook and where to write snapshots
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// YAML configuration file (fields not given keep their defaults)
    #[arg(short, long, env = "FUELPLAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory to search for the plan workbook (repeatable, searched in order)
    #[arg(short = 'd', long = "data-dir")]
    pub data_dirs: Vec<PathBuf>,

    /// Substring the workbook file name must contain
    #[arg(long)]
    pub pattern: Option<String>,

    /// Directory for the daily historical snapshots
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,

    /// Do not write a historical snapshot after loading
    #[arg(long)]
    pub no_snapshot: bool,
}

impl ConfigArgs {
    /// Build the dashboard configuration: file (or defaults), then flags on top
    pub fn resolve(&self) -> FuelPlanResult<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_yaml_file(path)?,
            None => DashboardConfig::default(),
        };

        if !self.data_dirs.is_empty() {
            config.search_dirs = self.data_dirs.clone();
        }
        if let Some(pattern) = &self.pattern {
            config.file_pattern = pattern.clone();
        }
        if let Some(dir) = &self.snapshot_dir {
            config.snapshot_dir = dir.clone();
        }
        if self.no_snapshot {
            config.write_snapshot = false;
        }

        config.validate()?;
        Ok(config)
    }
}
