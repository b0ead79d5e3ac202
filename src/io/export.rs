//! Export applicant tables to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: the input's columns in their canonical order, the preserved extra
//! columns, then (for cleaned tables) the two derived category columns.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::{ApplicantTable, DERIVED_COLUMNS, REQUIRED_COLUMNS};
use crate::error::PipelineError;

/// Write the table to a CSV file.
pub fn write_clean_csv(path: &Path, table: &ApplicantTable) -> Result<(), PipelineError> {
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    write_clean(file, table)?;
    info!(path = %path.display(), rows = table.len(), "exported cleaned table");
    Ok(())
}

/// Write a table without derived columns, in the same shape the loader reads.
pub fn write_raw_csv(path: &Path, table: &ApplicantTable) -> Result<(), PipelineError> {
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    write_table(file, table, false)
}

/// Write the cleaned table, derived columns included, to any writer.
pub fn write_clean<W: Write>(out: W, table: &ApplicantTable) -> Result<(), PipelineError> {
    write_table(out, table, true)
}

fn write_table<W: Write>(out: W, table: &ApplicantTable, derived: bool) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header: Vec<&str> = REQUIRED_COLUMNS.to_vec();
    header.extend(table.extra_columns.iter().map(String::as_str));
    if derived {
        header.extend(DERIVED_COLUMNS);
    }
    writer.write_record(&header)?;

    for r in &table.records {
        let mut row = vec![
            r.children.to_string(),
            fmt_opt(r.days_employed),
            r.education.clone(),
            r.family_status.clone(),
            r.income_type.clone(),
            r.debt.to_string(),
            fmt_opt(r.total_income),
            r.purpose.clone(),
        ];
        row.extend(r.extra.iter().cloned());
        if derived {
            row.push(
                r.total_income_category
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_default(),
            );
            row.push(
                r.purpose_category
                    .map(|c| c.label().to_string())
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&row)?;
    }

    writer
        .flush()
        .map_err(|e| PipelineError::Csv(csv::Error::from(e)))?;
    Ok(())
}

/// Missing cells export as empty; integral values export without a fraction.
fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::{KeywordTable, categorize};
    use crate::clean::clean;
    use crate::clean::tests::record;
    use crate::domain::{DuplicatePolicy, IncomeCategory, PurposeCategory};
    use crate::io::ingest::read_applicants;

    #[test]
    fn export_appends_derived_columns() {
        let mut r = record(1, "сотрудник");
        r.days_employed = Some(1234.5);
        r.total_income = Some(50_000.0);
        r.extra = vec!["F".to_string()];
        r.total_income_category = Some(IncomeCategory::D);
        r.purpose_category = Some(PurposeCategory::RealEstate);
        let table = ApplicantTable::new(vec!["gender".to_string()], vec![r]);

        let mut buf = Vec::new();
        write_clean(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "children,days_employed,education,family_status,income_type,debt,total_income,purpose,gender,total_income_category,purpose_category"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,1234.5,среднее,женат / замужем,сотрудник,0,50000,покупка жилья,F,D,real estate transactions"
        );
    }

    #[test]
    fn exported_table_loads_back() {
        let mut r = record(0, "пенсионер");
        r.days_employed = Some(365_000.0);
        r.total_income = Some(20_000.0);
        let table = ApplicantTable::new(Vec::new(), vec![r]);

        let mut buf = Vec::new();
        write_clean(&mut buf, &table).unwrap();
        let loaded = read_applicants(buf.as_slice(), b',').unwrap();

        assert_eq!(loaded.records[0].total_income, Some(20_000.0));
        assert!(loaded.extra_columns.is_empty());
    }

    #[test]
    fn reexport_derives_categories_once() {
        let mut r = record(0, "сотрудник");
        r.days_employed = Some(-100.0);
        r.total_income = Some(45_000.0);
        r.purpose = "приобретение автомобиля".to_string();
        r.extra = vec!["F".to_string()];
        let mut table = ApplicantTable::new(vec!["gender".to_string()], vec![r]);
        clean(&mut table, DuplicatePolicy::Keep).unwrap();
        categorize(&mut table, &KeywordTable::default()).unwrap();

        let mut first = Vec::new();
        write_clean(&mut first, &table).unwrap();

        // A table that only knows weddings puts the car loan in `no category`.
        let weddings = KeywordTable::from_json_str(
            r#"[{"category": "conducting a wedding", "fragments": ["свадь"]}]"#,
        )
        .unwrap();
        let mut reloaded = read_applicants(first.as_slice(), b',').unwrap();
        assert_eq!(reloaded.extra_columns, ["gender"]);
        clean(&mut reloaded, DuplicatePolicy::Keep).unwrap();
        categorize(&mut reloaded, &weddings).unwrap();

        let mut second = Vec::new();
        write_clean(&mut second, &reloaded).unwrap();
        let text = String::from_utf8(second).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "children,days_employed,education,family_status,income_type,debt,total_income,purpose,gender,total_income_category,purpose_category"
        );
        assert_eq!(
            lines.next().unwrap(),
            "0,100,среднее,женат / замужем,сотрудник,0,45000,приобретение автомобиля,F,D,no category"
        );
    }
}
