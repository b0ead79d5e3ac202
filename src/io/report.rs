//! Read/write report JSON files.
//!
//! Report JSON is the portable representation of a run: the cleaning summary
//! plus the four debt tables, so a report can be re-rendered with
//! `borrowers show` without the source data.
//!
//! The schema is defined by `report::AnalysisReport`.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::error::PipelineError;
use crate::report::AnalysisReport;

/// Write a report JSON file.
pub fn write_report_json(path: &Path, report: &AnalysisReport) -> Result<(), PipelineError> {
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::to_writer_pretty(file, report)?;
    info!(path = %path.display(), "exported report");
    Ok(())
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<AnalysisReport, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let report: AnalysisReport = serde_json::from_reader(file)?;
    Ok(report)
}
