//! Dashboard configuration
//!
//! Built once per process and handed to the locator, aggregator and snapshot
//! writer. Defaults reproduce the Pacific zone setup; a YAML file can override
//! any field.

use crate::error::{FuelPlanError, FuelPlanResult};
use crate::types::Terminal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for one running dashboard instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directories searched in order for the plan workbook
    pub search_dirs: Vec<PathBuf>,
    /// Substring the plan workbook file name must contain (spaces and case ignored)
    pub file_pattern: String,
    /// Accepted workbook extensions, without the dot
    pub extensions: Vec<String>,
    /// Directory receiving the daily historical snapshots
    pub snapshot_dir: PathBuf,
    pub write_snapshot: bool,
    /// Terminal sheets to read, in load order
    pub terminals: Vec<Terminal>,
    /// File pattern of the optional compliance workbook
    pub compliance_pattern: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            search_dirs: vec![PathBuf::from("data"), PathBuf::from(".")],
            file_pattern: "PACIFICO".to_string(),
            extensions: vec!["xlsx".to_string(), "xlsm".to_string()],
            snapshot_dir: PathBuf::from("historico"),
            write_snapshot: true,
            terminals: Terminal::ALL.to_vec(),
            compliance_pattern: Some("Completo v5".to_string()),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a YAML file; missing fields keep their defaults
    pub fn from_yaml_file(path: &Path) -> FuelPlanResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: DashboardConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FuelPlanResult<()> {
        if self.file_pattern.trim().is_empty() {
            return Err(FuelPlanError::Config(
                "file_pattern must not be empty".to_string(),
            ));
        }
        if self.extensions.is_empty() {
            return Err(FuelPlanError::Config(
                "at least one workbook extension is required".to_string(),
            ));
        }
        if self.terminals.is_empty() {
            return Err(FuelPlanError::Config(
                "at least one terminal is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.file_pattern, "PACIFICO");
        assert_eq!(config.terminals.len(), 7);
        assert_eq!(config.search_dirs[0], PathBuf::from("data"));
        assert!(config.write_snapshot);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_overrides_keep_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fuelplan.yaml");
        fs::write(
            &path,
            "file_pattern: BASE NORTE\nterminals:\n  - Guaymas\n  - El Castillo\n",
        )
        .unwrap();

        let config = DashboardConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.file_pattern, "BASE NORTE");
        assert_eq!(config.terminals, vec![Terminal::Guaymas, Terminal::ElCastillo]);
        assert_eq!(config.snapshot_dir, PathBuf::from("historico"));
    }

    #[test]
    fn test_unknown_terminal_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fuelplan.yaml");
        fs::write(&path, "terminals:\n  - Ensenada\n").unwrap();

        let result = DashboardConfig::from_yaml_file(&path);
        assert!(matches!(result, Err(FuelPlanError::Yaml(_))));
    }

    #[test]
    fn test_empty_terminal_list_is_invalid() {
        let config = DashboardConfig {
            terminals: vec![],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FuelPlanError::Config(_))));
    }
}
