//! Data cleaning.
//!
//! Responsibilities:
//!
//! - grouped median imputation (`impute`)
//! - the ordered cleaning steps and their summary (`cleaner`)

pub mod cleaner;
pub mod impute;

pub use cleaner::*;
pub use impute::*;
