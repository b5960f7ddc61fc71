use thiserror::Error;

pub type FuelPlanResult<T> = Result<T, FuelPlanError>;

#[derive(Error, Debug)]
pub enum FuelPlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Workbook not found: {0}")]
    FileNotFound(String),

    #[error("No table with a DESTINO header found in sheet '{sheet}'")]
    TableNotFound { sheet: String },

    #[error("No terminal sheet produced usable data")]
    NoValidData,

    #[error("A load is already in progress")]
    LoadInProgress,

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FuelPlanError {
    /// True when the error ends a load cycle as a user-visible failure.
    ///
    /// Sheet-level problems (`TableNotFound`) and snapshot problems degrade
    /// the result instead of aborting it.
    pub fn aborts_load(&self) -> bool {
        matches!(
            self,
            FuelPlanError::FileNotFound(_)
                | FuelPlanError::NoValidData
                | FuelPlanError::Workbook(_)
                | FuelPlanError::Io(_)
        )
    }
}
