//! Shared pipeline logic used by every front-end command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> clean -> categorize -> aggregate
//!
//! [`Pipeline`] owns the table for the whole run. Each stage is a separate
//! method so tests can drive one stage at a time; the `run_*` functions chain
//! them for the CLI.

use std::path::Path;

use crate::aggregate::{DebtTable, aggregate};
use crate::categorize::{KeywordTable, categorize};
use crate::clean::{CleanReport, clean};
use crate::domain::{AnalysisConfig, ApplicantTable, DuplicatePolicy};
use crate::error::PipelineError;
use crate::io::ingest::load_applicants;
use crate::report::AnalysisReport;

/// Owns the applicant table while it moves through the stages.
#[derive(Debug, Clone)]
pub struct Pipeline {
    table: ApplicantTable,
    duplicates: DuplicatePolicy,
    keywords: KeywordTable,
}

impl Pipeline {
    pub fn new(table: ApplicantTable) -> Self {
        Self {
            table,
            duplicates: DuplicatePolicy::default(),
            keywords: KeywordTable::default(),
        }
    }

    /// Load the table named by `config` and apply its options.
    pub fn load(config: &AnalysisConfig) -> Result<Self, PipelineError> {
        let table = load_applicants(&config.csv_path, config.delimiter)?;
        let keywords = match &config.keywords {
            Some(path) => KeywordTable::from_json_file(path)?,
            None => KeywordTable::default(),
        };
        Ok(Self::new(table)
            .with_duplicates(config.duplicates)
            .with_keywords(keywords))
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordTable) -> Self {
        self.keywords = keywords;
        self
    }

    /// Cleaner stage.
    pub fn clean(&mut self) -> Result<CleanReport, PipelineError> {
        clean(&mut self.table, self.duplicates)
    }

    /// Categorizer stage.
    pub fn categorize(&mut self) -> Result<(), PipelineError> {
        categorize(&mut self.table, &self.keywords)
    }

    /// Aggregator stage. Read-only.
    pub fn aggregate(&self) -> Result<Vec<DebtTable>, PipelineError> {
        aggregate(&self.table)
    }

    pub fn table(&self) -> &ApplicantTable {
        &self.table
    }

    pub fn into_table(self) -> ApplicantTable {
        self.table
    }
}

/// All computed outputs of a single `borrowers analyze` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub table: ApplicantTable,
    pub report: AnalysisReport,
}

/// Output of `borrowers clean`: the cleaned, categorized table and the summary.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub table: ApplicantTable,
    pub clean: CleanReport,
}

/// Execute the full pipeline.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, PipelineError> {
    let mut pipeline = Pipeline::load(config)?;
    let clean = pipeline.clean()?;
    pipeline.categorize()?;
    let tables = pipeline.aggregate()?;

    let report = AnalysisReport::new(source_name(&config.csv_path), config.duplicates, clean, tables);
    Ok(RunOutput {
        table: pipeline.into_table(),
        report,
    })
}

/// Execute the cleaning and categorizing stages only.
pub fn run_clean(config: &AnalysisConfig) -> Result<CleanOutput, PipelineError> {
    let mut pipeline = Pipeline::load(config)?;
    let clean = pipeline.clean()?;
    pipeline.categorize()?;
    Ok(CleanOutput {
        table: pipeline.into_table(),
        clean,
    })
}

fn source_name(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::tests::record;
    use crate::domain::GroupKey;

    #[test]
    fn stages_run_in_order_on_an_owned_table() {
        let mut a = record(-1, "сотрудник");
        a.total_income = Some(10.0);
        a.days_employed = Some(-5.0);
        let mut b = record(0, "сотрудник");
        b.total_income = Some(20.5);
        b.days_employed = Some(-7.0);
        let mut pipeline = Pipeline::new(ApplicantTable::new(Vec::new(), vec![a, b]));

        assert!(pipeline.aggregate().is_err(), "aggregation needs derived columns");

        let report = pipeline.clean().unwrap();
        assert_eq!(report.sentinel_rows_dropped, 1);
        pipeline.categorize().unwrap();

        let tables = pipeline.aggregate().unwrap();
        assert_eq!(tables.len(), 4);
        assert_eq!(tables.iter().map(|t| t.key).collect::<Vec<_>>(), GroupKey::ALL);
        assert_eq!(pipeline.table().records[0].total_income, Some(20.0));
        assert_eq!(pipeline.table().records[0].days_employed, Some(7.0));
    }
}
