//! Output module for persisting harvest results
//!
//! This module handles:
//! - Writing the dataset as one pretty-printed JSON document
//! - Storing records and run metadata in SQLite
//! - Printing a console summary of the run

mod json_output;
mod schema;
mod sqlite_output;
pub mod stats;
mod traits;

pub use json_output::JsonOutput;
pub use schema::{initialize_schema, RunStatus};
pub use sqlite_output::SqliteOutput;
pub use stats::{print_statistics, RunStatistics};
pub use traits::{DatasetSink, OutputError, OutputResult};

use crate::config::OutputConfig;
use crate::harvest::RunReport;
use crate::records::BatchDataset;
use crate::HarvestError;

/// Opens every configured sink
///
/// Runs before any API request so an unreachable destination aborts the run
/// up front.
///
/// # Arguments
///
/// * `config` - Output section of the configuration
/// * `config_hash` - Digest recorded with the SQLite run
///
/// # Returns
///
/// * `Ok(Vec<Box<dyn DatasetSink>>)` - JSON sink first, then SQLite if configured
/// * `Err(HarvestError::Precondition)` - A sink could not be opened
pub fn open_sinks(
    config: &OutputConfig,
    config_hash: &str,
) -> Result<Vec<Box<dyn DatasetSink>>, HarvestError> {
    let unreachable = |e: OutputError| HarvestError::Precondition(format!("output sink: {}", e));

    let mut sinks: Vec<Box<dyn DatasetSink>> =
        vec![Box::new(JsonOutput::new(&config.json_path).map_err(unreachable)?)];

    if let Some(path) = &config.database_path {
        sinks.push(Box::new(
            SqliteOutput::open(path, config_hash).map_err(unreachable)?,
        ));
    }

    Ok(sinks)
}

/// Writes the dataset to every sink
///
/// A failing sink does not prevent the others from being written. Returns the
/// first error after all sinks have been attempted.
pub fn write_all(
    sinks: &mut [Box<dyn DatasetSink>],
    dataset: &BatchDataset,
    report: &RunReport,
) -> Result<(), HarvestError> {
    let mut first_error = None;

    for sink in sinks.iter_mut() {
        if let Err(e) = sink.write(dataset, report) {
            tracing::error!("Failed to write {} output: {}", sink.name(), e);
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
