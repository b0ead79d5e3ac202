//! Grouped median imputation.
//!
//! Two passes over the table:
//! 1. build `group value -> median of target` from the observed cells
//! 2. fill every missing target cell from that map
//!
//! Every missing cell is checked against the map before anything is written, so
//! a failure leaves the table untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ApplicantRecord, ApplicantTable, NumericColumn, TextColumn};
use crate::error::PipelineError;
use crate::math::median;

/// Outcome of one imputation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Imputation {
    pub column: String,
    pub group_column: String,
    /// Number of cells that were filled.
    pub filled: usize,
    /// Median per group value (groups without observations are absent).
    pub medians: BTreeMap<String, f64>,
}

/// Median of `target` per distinct value of `group`, ignoring missing cells.
pub fn group_medians(
    records: &[ApplicantRecord],
    group: TextColumn,
    target: NumericColumn,
) -> BTreeMap<String, f64> {
    let mut observed: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        if let Some(v) = target.get(record) {
            observed.entry(group.get(record)).or_default().push(v);
        }
    }

    observed
        .into_iter()
        .filter_map(|(key, values)| median(&values).map(|m| (key.to_string(), m)))
        .collect()
}

/// Fill missing `target` cells with the median of their `group`.
pub fn impute_group_median(
    table: &mut ApplicantTable,
    group: TextColumn,
    target: NumericColumn,
) -> Result<Imputation, PipelineError> {
    let medians = group_medians(&table.records, group, target);

    if let Some(orphan) = table
        .records
        .iter()
        .filter(|r| target.get(r).is_none())
        .find(|r| !medians.contains_key(group.get(r)))
    {
        return Err(PipelineError::ImputationUndefined {
            column: target.name().to_string(),
            group: group.get(orphan).to_string(),
        });
    }

    let mut filled = 0;
    for record in table.records.iter_mut() {
        if target.get(record).is_some() {
            continue;
        }
        if let Some(&m) = medians.get(group.get(record)) {
            target.set(record, m);
            filled += 1;
        }
    }

    Ok(Imputation {
        column: target.name().to_string(),
        group_column: group.name().to_string(),
        filled,
        medians,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::tests::record;

    fn income_table(rows: &[(&str, Option<f64>)]) -> ApplicantTable {
        let records = rows
            .iter()
            .map(|(income_type, income)| {
                let mut r = record(0, *income_type);
                r.total_income = *income;
                r
            })
            .collect();
        ApplicantTable::new(Vec::new(), records)
    }

    #[test]
    fn fills_with_group_median() {
        let mut table = income_table(&[
            ("employee", None),
            ("employee", Some(40_000.0)),
            ("employee", Some(60_000.0)),
            ("pensioner", Some(10_000.0)),
        ]);

        let out = impute_group_median(&mut table, TextColumn::IncomeType, NumericColumn::TotalIncome).unwrap();

        assert_eq!(out.filled, 1);
        assert_eq!(table.records[0].total_income, Some(50_000.0));
        assert_eq!(out.medians.get("pensioner"), Some(&10_000.0));
    }

    #[test]
    fn group_without_observations_is_an_error() {
        let mut table = income_table(&[
            ("employee", None),
            ("employee", Some(40_000.0)),
            ("unemployed", None),
        ]);
        let before = table.clone();

        let err = impute_group_median(&mut table, TextColumn::IncomeType, NumericColumn::TotalIncome).unwrap_err();

        match err {
            PipelineError::ImputationUndefined { column, group } => {
                assert_eq!(column, "total_income");
                assert_eq!(group, "unemployed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(table, before);
    }

    #[test]
    fn nothing_missing_means_nothing_filled() {
        let mut table = income_table(&[("employee", Some(1.0)), ("pensioner", Some(2.0))]);
        let out = impute_group_median(&mut table, TextColumn::IncomeType, NumericColumn::TotalIncome).unwrap();
        assert_eq!(out.filled, 0);
        assert_eq!(out.medians.len(), 2);
    }

    #[test]
    fn medians_ignore_other_groups() {
        let mut table = income_table(&[
            ("employee", Some(10.0)),
            ("employee", Some(20.0)),
            ("employee", Some(90.0)),
            ("pensioner", Some(1_000.0)),
        ]);
        let medians = group_medians(&table.records, TextColumn::IncomeType, NumericColumn::TotalIncome);
        assert_eq!(medians.get("employee"), Some(&20.0));

        table.records[0].total_income = None;
        impute_group_median(&mut table, TextColumn::IncomeType, NumericColumn::TotalIncome).unwrap();
        assert_eq!(table.records[0].total_income, Some(55.0));
    }
}
