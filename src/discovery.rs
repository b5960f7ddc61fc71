//! Workbook discovery
//!
//! Finds the plan workbook by scanning a short, ordered list of directories
//! for a file whose name contains a fixed pattern.

use crate::error::{FuelPlanError, FuelPlanResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Searches candidate directories for workbook files
#[derive(Debug, Clone)]
pub struct WorkbookLocator {
    search_dirs: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl WorkbookLocator {
    pub fn new(search_dirs: Vec<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            search_dirs,
            extensions: extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// First matching file, searching directories in order and file names
    /// alphabetically within a directory
    pub fn find(&self, pattern: &str) -> FuelPlanResult<PathBuf> {
        let wanted = squash(pattern);

        for dir in &self.search_dirs {
            let Ok(entries) = fs::read_dir(dir) else {
                debug!(dir = %dir.display(), "search directory not readable, skipping");
                continue;
            };

            let mut candidates: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && self.matches(path, &wanted))
                .collect();
            candidates.sort();

            if let Some(found) = candidates.into_iter().next() {
                debug!(path = %found.display(), "workbook found");
                return Ok(found);
            }
        }

        Err(FuelPlanError::FileNotFound(format!(
            "no .{} file containing '{}' in {}",
            self.extensions.join("/."),
            pattern,
            self.search_dirs
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    fn matches(&self, path: &Path, wanted: &str) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        // Excel lock files for open workbooks
        if name.starts_with("~$") {
            return false;
        }
        let extension_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false);

        extension_ok && squash(name).contains(wanted)
    }
}

/// Uppercase with spaces removed
fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}
