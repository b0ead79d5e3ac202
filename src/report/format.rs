//! Formatted terminal output.
//!
//! We keep formatting code in one place so the cleaning and aggregation code
//! stays free of presentation concerns. Rates are rounded here, for display
//! only.

use std::collections::BTreeMap;

use crate::aggregate::DebtTable;
use crate::clean::{CleanReport, MissingShare};
use crate::report::AnalysisReport;

/// Width of the key column in debt tables.
const KEY_WIDTH: usize = 28;

/// Format the full report: header, cleaning summary, then the four tables.
pub fn format_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str("=== borrowers - Borrower Reliability Research ===\n");
    out.push_str(&format!("Source: {}\n", report.source));
    out.push_str(&format!(
        "Generated: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push('\n');
    out.push_str(&format_clean_summary(&report.clean));
    for table in &report.tables {
        out.push('\n');
        out.push_str(&format_debt_table(table));
    }
    out
}

/// Format what the cleaner did.
pub fn format_clean_summary(clean: &CleanReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Rows: {} -> {} (sentinel children rows dropped: {}, duplicates: {} found, {} removed)\n",
        clean.rows_before,
        clean.rows_after,
        clean.sentinel_rows_dropped,
        clean.duplicates_found,
        clean.duplicates_removed,
    ));

    out.push_str("\nMissing values before cleaning:\n");
    out.push_str(&format_missing(&clean.missing_before));

    out.push_str(&format!(
        "\nImputed by income_type median: total_income={} cells, days_employed={} cells\n",
        clean.income_imputation.filled, clean.days_employed_imputation.filled,
    ));
    out.push_str(&format!(
        "Negative days_employed made positive: {}\n",
        clean.negative_days_fixed
    ));
    out.push_str(&format!(
        "Education values lowercased: {}\n",
        clean.education_values_changed
    ));
    out.push_str(&format!(
        "children values: {} -> {}\n",
        fmt_list(&clean.children_values_before),
        fmt_list(&clean.children_values_after),
    ));

    out.push_str("\nMedian total_income by income_type:\n");
    out.push_str(&format_medians(&clean.income_imputation.medians, 0));
    out.push_str("\nMedian days_employed by income_type:\n");
    out.push_str(&format_medians(&clean.employment_medians, 1));

    out
}

/// Format one debt table under its hypothesis question.
pub fn format_debt_table(table: &DebtTable) -> String {
    let mut out = String::new();
    out.push_str(table.key.question());
    out.push('\n');

    out.push_str(
        format!(
            "{:<KEY_WIDTH$} {:>9} {:>7} {:>7} {:>10}\n",
            table.key.column_name(),
            "no_debt",
            "debt",
            "total",
            "% no_debt"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!("{:-<KEY_WIDTH$} {:-<9} {:-<7} {:-<7} {:-<10}\n", "", "", "", "", "").trim_end(),
    );
    out.push('\n');

    for row in &table.rows {
        out.push_str(
            format!(
                "{:<KEY_WIDTH$} {:>9} {:>7} {:>7} {:>10.0}\n",
                truncate(&row.value.to_string(), KEY_WIDTH),
                row.no_debt,
                row.debt,
                row.total(),
                row.repayment_rate,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn format_missing(shares: &[MissingShare]) -> String {
    let missing: Vec<&MissingShare> = shares.iter().filter(|m| m.share > 0.0).collect();
    if missing.is_empty() {
        return "  (none)\n".to_string();
    }
    missing
        .iter()
        .map(|m| format!("  {:<20} {:>6.2}%\n", m.column, m.share * 100.0))
        .collect()
}

fn format_medians(medians: &BTreeMap<String, f64>, decimals: usize) -> String {
    if medians.is_empty() {
        return "  (none)\n".to_string();
    }
    medians
        .iter()
        .map(|(group, m)| format!("  {:<KEY_WIDTH$} {:>14.decimals$}\n", truncate(group, KEY_WIDTH), m))
        .collect()
}

fn fmt_list(values: &[i64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{DebtRow, GroupValue};
    use crate::domain::GroupKey;

    #[test]
    fn debt_table_rounds_rate_for_display() {
        let table = DebtTable {
            key: GroupKey::Children,
            rows: vec![DebtRow {
                value: GroupValue::Count(0),
                no_debt: 13,
                debt: 2,
                repayment_rate: 13.0 / 15.0 * 100.0,
            }],
        };

        let text = format_debt_table(&table);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], GroupKey::Children.question());
        assert!(lines[1].starts_with("children"));
        assert!(lines[3].starts_with('0'));
        assert!(lines[3].ends_with(" 87"), "got: {}", lines[3]);
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("операции с недвижимостью", 8), "операци.");
    }

    #[test]
    fn missing_lists_only_columns_with_gaps() {
        let shares = vec![
            MissingShare { column: "children".to_string(), share: 0.0 },
            MissingShare { column: "total_income".to_string(), share: 0.101 },
        ];
        let text = format_missing(&shares);
        assert!(text.contains("total_income"));
        assert!(text.contains("10.10%"));
        assert!(!text.contains("children"));
    }
}
