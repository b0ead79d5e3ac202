//! The cleaning stage.
//!
//! Steps run in a fixed order. Later steps depend on earlier ones: the
//! employment median is taken after sentinel rows are gone, and duplicate
//! detection compares already-normalized text.
//!
//! 1. impute `total_income` (per-`income_type` median)
//! 2. `days_employed = |days_employed|`
//! 3. drop rows with `children` in {-1, 20}
//! 4. impute `days_employed` (per-`income_type` median)
//! 5. truncate `total_income` to an integer
//! 6. lowercase `education`
//! 7. count (and optionally drop) exact duplicate rows

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clean::impute::{Imputation, group_medians, impute_group_median};
use crate::domain::{
    ApplicantRecord, ApplicantTable, CHILDREN_SENTINELS, DuplicatePolicy, NumericColumn, TextColumn,
};
use crate::error::PipelineError;

/// Share of missing cells in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingShare {
    pub column: String,
    /// Fraction in `[0, 1]`.
    pub share: f64,
}

/// Everything the cleaner did, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub missing_before: Vec<MissingShare>,
    pub missing_after: Vec<MissingShare>,
    pub income_imputation: Imputation,
    pub days_employed_imputation: Imputation,
    /// Per-`income_type` employment median right after the sign fix.
    pub employment_medians: BTreeMap<String, f64>,
    pub children_values_before: Vec<i64>,
    pub children_values_after: Vec<i64>,
    pub sentinel_rows_dropped: usize,
    pub negative_days_fixed: usize,
    pub education_values_changed: usize,
    pub duplicates_found: usize,
    pub duplicates_removed: usize,
}

/// Run every cleaning step over `table`, in place.
pub fn clean(table: &mut ApplicantTable, policy: DuplicatePolicy) -> Result<CleanReport, PipelineError> {
    let rows_before = table.len();
    let missing_before = missing_profile(table);
    let children_values_before = distinct_children(table);

    let income_imputation = impute_total_income(table)?;
    let negative_days_fixed = normalize_days_employed(table);
    let employment_medians = group_medians(&table.records, TextColumn::IncomeType, NumericColumn::DaysEmployed);
    for (group, m) in &employment_medians {
        debug!(income_type = %group, median_days = *m, "employment median after sign fix");
    }

    let sentinel_rows_dropped = drop_sentinel_children(table);
    let days_employed_imputation = impute_days_employed(table)?;
    truncate_total_income(table);
    let education_values_changed = lowercase_education(table);

    let duplicates_found = count_duplicates(table);
    let duplicates_removed = match policy {
        DuplicatePolicy::Keep => 0,
        DuplicatePolicy::Drop => drop_duplicates(table),
    };

    let report = CleanReport {
        rows_before,
        rows_after: table.len(),
        missing_before,
        missing_after: missing_profile(table),
        income_imputation,
        days_employed_imputation,
        employment_medians,
        children_values_before,
        children_values_after: distinct_children(table),
        sentinel_rows_dropped,
        negative_days_fixed,
        education_values_changed,
        duplicates_found,
        duplicates_removed,
    };

    info!(
        rows_before = report.rows_before,
        rows_after = report.rows_after,
        sentinel_rows_dropped,
        income_filled = report.income_imputation.filled,
        days_employed_filled = report.days_employed_imputation.filled,
        duplicates_found,
        duplicates_removed,
        "cleaned applicant table"
    );

    Ok(report)
}

/// Step 1.
pub fn impute_total_income(table: &mut ApplicantTable) -> Result<Imputation, PipelineError> {
    impute_group_median(table, TextColumn::IncomeType, NumericColumn::TotalIncome)
}

/// Step 2. Returns the number of negative values flipped.
pub fn normalize_days_employed(table: &mut ApplicantTable) -> usize {
    let mut flipped = 0;
    for days in table.records.iter_mut().filter_map(|r| r.days_employed.as_mut()) {
        if *days < 0.0 {
            flipped += 1;
        }
        *days = days.abs();
    }
    flipped
}

/// Step 3. The only step that unconditionally removes rows.
pub fn drop_sentinel_children(table: &mut ApplicantTable) -> usize {
    let before = table.len();
    table
        .records
        .retain(|r| !CHILDREN_SENTINELS.contains(&r.children));
    before - table.len()
}

/// Step 4.
pub fn impute_days_employed(table: &mut ApplicantTable) -> Result<Imputation, PipelineError> {
    impute_group_median(table, TextColumn::IncomeType, NumericColumn::DaysEmployed)
}

/// Step 5. Truncates toward zero, never rounds.
pub fn truncate_total_income(table: &mut ApplicantTable) {
    for income in table.records.iter_mut().filter_map(|r| r.total_income.as_mut()) {
        *income = income.trunc();
    }
}

/// Step 6. Returns the number of cells whose text changed.
pub fn lowercase_education(table: &mut ApplicantTable) -> usize {
    let mut changed = 0;
    for record in table.records.iter_mut() {
        let lower = record.education.to_lowercase();
        if lower != record.education {
            record.education = lower;
            changed += 1;
        }
    }
    changed
}

/// Number of rows identical to an earlier row (first occurrences not counted).
pub fn count_duplicates(table: &ApplicantTable) -> usize {
    let mut seen = HashSet::with_capacity(table.len());
    table
        .records
        .iter()
        .filter(|r| !seen.insert(RowKey::of(*r)))
        .count()
}

/// Remove every row identical to an earlier one. Returns the number removed.
pub fn drop_duplicates(table: &mut ApplicantTable) -> usize {
    let before = table.len();
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(before);
        table.records.iter().map(|r| seen.insert(RowKey::of(r))).collect()
    };
    let mut flags = keep.into_iter();
    table.records.retain(|_| flags.next().unwrap_or(true));
    before - table.len()
}

/// Fraction of missing cells per column, required columns first.
pub fn missing_profile(table: &ApplicantTable) -> Vec<MissingShare> {
    let mut out = vec![
        missing_share(table, "children", |_| false),
        missing_share(table, "days_employed", |r| r.days_employed.is_none()),
        missing_share(table, "education", |r| r.education.is_empty()),
        missing_share(table, "family_status", |r| r.family_status.is_empty()),
        missing_share(table, "income_type", |r| r.income_type.is_empty()),
        missing_share(table, "debt", |_| false),
        missing_share(table, "total_income", |r| r.total_income.is_none()),
        missing_share(table, "purpose", |r| r.purpose.is_empty()),
    ];

    for (idx, column) in table.extra_columns.iter().enumerate() {
        out.push(missing_share(table, column, |r| {
            r.extra.get(idx).is_none_or(|v| v.is_empty())
        }));
    }

    out
}

fn missing_share(
    table: &ApplicantTable,
    column: &str,
    is_missing: impl Fn(&ApplicantRecord) -> bool,
) -> MissingShare {
    let missing = table.records.iter().filter(|&r| is_missing(r)).count();
    let share = if table.is_empty() {
        0.0
    } else {
        missing as f64 / table.len() as f64
    };
    MissingShare {
        column: column.to_string(),
        share,
    }
}

fn distinct_children(table: &ApplicantTable) -> Vec<i64> {
    table
        .records
        .iter()
        .map(|r| r.children)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Hashable view of every column of a row.
#[derive(PartialEq, Eq, Hash)]
struct RowKey<'a> {
    children: i64,
    days_employed: Option<u64>,
    total_income: Option<u64>,
    income_type: &'a str,
    education: &'a str,
    family_status: &'a str,
    purpose: &'a str,
    debt: u8,
    extra: &'a [String],
}

impl<'a> RowKey<'a> {
    fn of(r: &'a ApplicantRecord) -> Self {
        Self {
            children: r.children,
            days_employed: r.days_employed.map(canonical_bits),
            total_income: r.total_income.map(canonical_bits),
            income_type: &r.income_type,
            education: &r.education,
            family_status: &r.family_status,
            purpose: &r.purpose,
            debt: r.debt,
            extra: &r.extra,
        }
    }
}

/// `0.0` and `-0.0` compare equal as values, so they must hash the same.
fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
}
