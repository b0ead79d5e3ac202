//! Derived categorical columns.
//!
//! Both classifiers are pure functions of a single value (`income`, `purpose`);
//! [`categorize`] applies them to every row of a cleaned table.

pub mod income;
pub mod purpose;

pub use income::*;
pub use purpose::*;

use tracing::info;

use crate::domain::{ApplicantTable, PurposeCategory};
use crate::error::PipelineError;

/// Fill `total_income_category` and `purpose_category` on every row.
///
/// Expects a cleaned table: a row without `total_income` is an error.
pub fn categorize(table: &mut ApplicantTable, keywords: &KeywordTable) -> Result<(), PipelineError> {
    if let Some(row) = table.records.iter().position(|r| r.total_income.is_none()) {
        return Err(PipelineError::MissingValue {
            row,
            column: "total_income".to_string(),
        });
    }

    for record in table.records.iter_mut() {
        let income = record.total_income.unwrap_or_default().trunc() as i64;
        record.total_income_category = Some(categorize_income(income));
        record.purpose_category = Some(keywords.classify(&record.purpose));
    }

    let uncategorized = table
        .records
        .iter()
        .filter(|r| r.purpose_category == Some(PurposeCategory::NoCategory))
        .count();
    info!(rows = table.len(), uncategorized_purposes = uncategorized, "derived categories");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::tests::record;
    use crate::domain::IncomeCategory;

    #[test]
    fn fills_both_columns() {
        let mut a = record(0, "сотрудник");
        a.total_income = Some(235_000.0);
        a.purpose = "приобретение автомобиля".to_string();
        let mut b = record(0, "сотрудник");
        b.total_income = Some(25_000.0);
        b.purpose = "ремонт".to_string();
        let mut table = ApplicantTable::new(Vec::new(), vec![a, b]);

        categorize(&mut table, &KeywordTable::default()).unwrap();

        assert!(table.is_categorized());
        assert_eq!(table.records[0].total_income_category, Some(IncomeCategory::B));
        assert_eq!(table.records[0].purpose_category, Some(PurposeCategory::CarOperations));
        assert_eq!(table.records[1].total_income_category, Some(IncomeCategory::E));
        assert_eq!(table.records[1].purpose_category, Some(PurposeCategory::NoCategory));
    }

    #[test]
    fn uncleaned_table_is_rejected() {
        let mut table = ApplicantTable::new(Vec::new(), vec![record(0, "сотрудник")]);
        let err = categorize(&mut table, &KeywordTable::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingValue { row: 0, .. }));
        assert!(!table.is_categorized());
    }
}
