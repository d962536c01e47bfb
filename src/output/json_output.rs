//! Pretty-printed JSON document sink

use crate::harvest::RunReport;
use crate::output::traits::{DatasetSink, OutputError, OutputResult};
use crate::records::BatchDataset;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes `{"users": [...], "tweets": [...], "highlight_tweets": [...]}`
#[derive(Debug, Clone)]
pub struct JsonOutput {
    path: PathBuf,
}

impl JsonOutput {
    /// Creates a sink for `path`, checking that its directory exists
    pub fn new(path: &Path) -> OutputResult<Self> {
        if path.as_os_str().is_empty() {
            return Err(OutputError::Unreachable("empty JSON output path".to_string()));
        }
        if path.is_dir() {
            return Err(OutputError::Unreachable(format!(
                "{} is a directory",
                path.display()
            )));
        }

        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            if !parent.is_dir() {
                return Err(OutputError::Unreachable(format!(
                    "directory {} does not exist",
                    parent.display()
                )));
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSink for JsonOutput {
    fn name(&self) -> &str {
        "json"
    }

    fn write(&mut self, dataset: &BatchDataset, _report: &RunReport) -> OutputResult<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, dataset)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!(
            "Wrote {} records to {}",
            dataset.total_records(),
            self.path.display()
        );
        Ok(())
    }
}
