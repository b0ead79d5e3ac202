//! Reporting: the serializable run report and its terminal rendering.

pub mod format;

pub use format::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::DebtTable;
use crate::clean::CleanReport;
use crate::domain::DuplicatePolicy;

/// Everything a run produced, in a form that can be exported and re-rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    /// Input file the report was computed from.
    pub source: String,
    pub duplicate_policy: DuplicatePolicy,
    pub clean: CleanReport,
    pub tables: Vec<DebtTable>,
}

impl AnalysisReport {
    pub fn new(source: impl Into<String>, duplicate_policy: DuplicatePolicy, clean: CleanReport, tables: Vec<DebtTable>) -> Self {
        Self {
            tool: "borrowers".to_string(),
            generated_at: Utc::now(),
            source: source.into(),
            duplicate_policy,
            clean,
            tables,
        }
    }
}
