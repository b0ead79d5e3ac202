//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the applicant table (`ApplicantTable`, `ApplicantRecord`)
//! - column selectors used by the generic cleaning helpers
//! - derived categories (`IncomeCategory`, `PurposeCategory`)
//! - run configuration (`AnalysisConfig`, `DuplicatePolicy`)

pub mod types;

pub use types::*;
