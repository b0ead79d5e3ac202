//! Aggregation: one debt cross-tabulation per grouping key.

pub mod crosstab;

pub use crosstab::*;

use tracing::debug;

use crate::domain::{ApplicantTable, GroupKey};
use crate::error::PipelineError;

/// Build the four hypothesis tables (children, family status, income bracket,
/// purpose), in that order.
pub fn aggregate(table: &ApplicantTable) -> Result<Vec<DebtTable>, PipelineError> {
    GroupKey::ALL
        .into_iter()
        .map(|key| {
            let out = crosstab(table, key)?;
            debug!(key = key.column_name(), groups = out.rows.len(), "built debt table");
            Ok(out)
        })
        .collect()
}
