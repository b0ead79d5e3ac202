//! Debt cross-tabulation.
//!
//! For a grouping key, count rows with `debt = 0` and `debt = 1` per distinct
//! key value, and derive the repayment rate
//! `no_debt / (no_debt + debt) * 100`.
//!
//! Only values present in the table produce a row, so every emitted row has at
//! least one observation and the rate is always defined.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{ApplicantRecord, ApplicantTable, GroupKey};
use crate::error::PipelineError;
use crate::math::percentage;

/// A distinct value of a grouping key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupValue {
    Count(i64),
    Label(String),
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValue::Count(n) => write!(f, "{n}"),
            GroupValue::Label(s) => f.write_str(s),
        }
    }
}

/// Debt counts for one key value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtRow {
    pub value: GroupValue,
    pub no_debt: usize,
    pub debt: usize,
    /// Percentage of rows with `debt = 0`, unrounded.
    pub repayment_rate: f64,
}

impl DebtRow {
    pub fn total(&self) -> usize {
        self.no_debt + self.debt
    }

    /// Percentage of rows with `debt = 1`.
    pub fn debt_rate(&self) -> f64 {
        100.0 - self.repayment_rate
    }
}

/// The cross-tabulation for one grouping key, rows in ascending key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtTable {
    pub key: GroupKey,
    pub rows: Vec<DebtRow>,
}

impl DebtTable {
    pub fn total(&self) -> usize {
        self.rows.iter().map(DebtRow::total).sum()
    }

    pub fn row(&self, value: &GroupValue) -> Option<&DebtRow> {
        self.rows.iter().find(|r| &r.value == value)
    }
}

/// Build the debt table for `key`.
pub fn crosstab(table: &ApplicantTable, key: GroupKey) -> Result<DebtTable, PipelineError> {
    let mut counts: BTreeMap<GroupValue, (usize, usize)> = BTreeMap::new();

    for (row, record) in table.records.iter().enumerate() {
        let value = group_value(record, key).ok_or_else(|| PipelineError::MissingValue {
            row,
            column: key.column_name().to_string(),
        })?;
        let entry = counts.entry(value).or_default();
        if record.debt == 0 {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    let rows = counts
        .into_iter()
        .filter_map(|(value, (no_debt, debt))| {
            let repayment_rate = percentage(no_debt, no_debt + debt)?;
            Some(DebtRow {
                value,
                no_debt,
                debt,
                repayment_rate,
            })
        })
        .collect();

    Ok(DebtTable { key, rows })
}

fn group_value(record: &ApplicantRecord, key: GroupKey) -> Option<GroupValue> {
    match key {
        GroupKey::Children => Some(GroupValue::Count(record.children)),
        GroupKey::FamilyStatus => Some(GroupValue::Label(record.family_status.clone())),
        GroupKey::TotalIncomeCategory => record
            .total_income_category
            .map(|c| GroupValue::Label(c.as_str().to_string())),
        GroupKey::PurposeCategory => record
            .purpose_category
            .map(|c| GroupValue::Label(c.label().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::tests::record;
    use crate::domain::{IncomeCategory, PurposeCategory};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn applicant(children: i64, family_status: &str, debt: u8) -> ApplicantRecord {
        let mut r = record(children, "сотрудник");
        r.family_status = family_status.to_string();
        r.debt = debt;
        r.total_income = Some(100_000.0);
        r.total_income_category = Some(IncomeCategory::C);
        r.purpose_category = Some(PurposeCategory::RealEstate);
        r
    }

    #[test]
    fn counts_and_rate_per_children_value() {
        let table = ApplicantTable::new(
            Vec::new(),
            vec![
                applicant(0, "женат / замужем", 0),
                applicant(0, "женат / замужем", 0),
                applicant(0, "женат / замужем", 0),
                applicant(0, "женат / замужем", 1),
                applicant(2, "вдовец / вдова", 1),
                applicant(1, "в разводе", 0),
            ],
        );

        let out = crosstab(&table, GroupKey::Children).unwrap();

        assert_eq!(
            out.rows,
            vec![
                DebtRow { value: GroupValue::Count(0), no_debt: 3, debt: 1, repayment_rate: 75.0 },
                DebtRow { value: GroupValue::Count(1), no_debt: 1, debt: 0, repayment_rate: 100.0 },
                DebtRow { value: GroupValue::Count(2), no_debt: 0, debt: 1, repayment_rate: 0.0 },
            ]
        );
        assert_eq!(out.total(), 6);
        assert_eq!(out.rows[0].debt_rate(), 25.0);
    }

    #[test]
    fn text_keys_are_sorted() {
        let table = ApplicantTable::new(
            Vec::new(),
            vec![applicant(0, "женат / замужем", 0), applicant(0, "Не женат / не замужем", 1)],
        );
        let out = crosstab(&table, GroupKey::FamilyStatus).unwrap();
        let labels: Vec<String> = out.rows.iter().map(|r| r.value.to_string()).collect();
        assert_eq!(labels, ["Не женат / не замужем", "женат / замужем"]);
    }

    #[test]
    fn uncategorized_rows_are_rejected() {
        let mut r = applicant(0, "женат / замужем", 0);
        r.purpose_category = None;
        let table = ApplicantTable::new(Vec::new(), vec![r]);
        let err = crosstab(&table, GroupKey::PurposeCategory).unwrap_err();
        assert!(matches!(err, PipelineError::MissingValue { ref column, .. } if column == "purpose_category"));
    }

    #[test]
    fn empty_table_has_no_rows() {
        let out = crosstab(&ApplicantTable::default(), GroupKey::Children).unwrap();
        assert!(out.rows.is_empty());
    }

    proptest! {
        #[test]
        fn counts_sum_to_group_sizes(rows in prop::collection::vec((0i64..6, 0u8..2), 1..200)) {
            let records = rows
                .iter()
                .map(|&(children, debt)| applicant(children, "женат / замужем", debt))
                .collect();
            let table = ApplicantTable::new(Vec::new(), records);

            let out = crosstab(&table, GroupKey::Children).unwrap();

            prop_assert_eq!(out.total(), rows.len());
            for row in &out.rows {
                let GroupValue::Count(children) = row.value else { unreachable!() };
                let expected = rows.iter().filter(|(c, _)| *c == children).count();
                prop_assert_eq!(row.total(), expected);
                prop_assert!(row.total() > 0);
                prop_assert!((0.0..=100.0).contains(&row.repayment_rate));
            }
        }
    }
}
