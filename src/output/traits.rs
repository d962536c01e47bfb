//! Output sink trait and error types

use crate::harvest::RunReport;
use crate::records::BatchDataset;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Output target unreachable: {0}")]
    Unreachable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A destination for the final dataset
///
/// Sinks are opened before the run starts, so an unreachable destination
/// fails fast, and written once the run ends.
pub trait DatasetSink {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Persists the dataset together with the run report
    ///
    /// # Arguments
    ///
    /// * `dataset` - Every record collected during the run
    /// * `report` - Per-entity outcomes and the interrupted flag
    fn write(&mut self, dataset: &BatchDataset, report: &RunReport) -> OutputResult<()>;
}
