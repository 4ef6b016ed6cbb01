//! Measurement output: the stdout line format and the persisted JSON report.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::harness::Measurement;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("report serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The one-line stdout form: `<label>run time is <n> us`. There is
/// deliberately no separator between the label and `run`.
pub fn format_line(measurement: &Measurement) -> String {
    format!(
        "{}run time is {} us",
        measurement.predicate, measurement.elapsed_us
    )
}

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub suite: &'a str,
    pub generated_at: DateTime<Utc>,
    pub measurements: &'a [Measurement],
}

/// Writes one JSON report per completed suite under `dir/<suite>/`.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn write(
        &self,
        suite_name: &str,
        measurements: &[Measurement],
    ) -> Result<PathBuf, ReportError> {
        let generated_at = Utc::now();
        let report = Report {
            suite: suite_name,
            generated_at,
            measurements,
        };
        let dir = self.output_dir.join(suite_name);
        fs::create_dir_all(&dir)?;
        let file_name = format!("report_{}.json", generated_at.format("%Y%m%d_%H%M%S"));
        let path = dir.join(file_name);
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}
