//! CSV ingest.
//!
//! This module is responsible for turning the applicant CSV into an
//! `ApplicantTable`, without repairing anything.
//!
//! Design goals:
//! - **Strict schema** for required columns (fails before any cleaning runs)
//! - **Missing stays missing**: empty or `NaN` numeric cells load as `None`
//! - **Text is loaded verbatim**: only headers and numeric cells are trimmed
//! - **Nothing dropped**: every CSV row becomes a record; the cleaner decides
//!   which rows survive
//! - **Unknown columns are preserved** so duplicate detection and exports see
//!   the whole row
//! - **Derived columns are dropped**: a previously exported table is
//!   categorized again from scratch

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::info;

use crate::domain::{ApplicantRecord, ApplicantTable, DERIVED_COLUMNS, REQUIRED_COLUMNS};
use crate::error::PipelineError;

/// Load the applicant table from a delimited file.
pub fn load_applicants(path: &Path, delimiter: u8) -> Result<ApplicantTable, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let table = read_applicants(file, delimiter)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        extra_columns = table.extra_columns.len(),
        "loaded applicant table"
    );
    Ok(table)
}

/// Parse an applicant table from any reader (file, in-memory buffer, ...).
pub fn read_applicants<R: Read>(input: R, delimiter: u8) -> Result<ApplicantTable, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);

    ensure_required_columns_exist(&header_map)?;

    let extra: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (idx, clean_header_name(name).to_string()))
        .filter(|(_, name)| {
            let name = name.to_ascii_lowercase();
            !REQUIRED_COLUMNS.contains(&name.as_str()) && !DERIVED_COLUMNS.contains(&name.as_str())
        })
        .collect();
    let extra_columns = extra.iter().map(|(_, name)| name.clone()).collect();
    let extra_idx: Vec<usize> = extra.iter().map(|(idx, _)| *idx).collect();

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        let record = result?;
        records.push(parse_row(&record, &header_map, &extra_idx, line)?);
    }

    Ok(ApplicantTable::new(extra_columns, records))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (clean_header_name(name).to_ascii_lowercase(), idx))
        .collect()
}

fn clean_header_name(name: &str) -> &str {
    // Spreadsheet exports sometimes put a BOM in front of the first header.
    name.trim().trim_start_matches('\u{feff}')
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), PipelineError> {
    match REQUIRED_COLUMNS
        .iter()
        .find(|column| !header_map.contains_key(**column))
    {
        Some(column) => Err(PipelineError::missing_column(*column)),
        None => Ok(()),
    }
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    extra_idx: &[usize],
    line: usize,
) -> Result<ApplicantRecord, PipelineError> {
    let children = parse_integer(record, header_map, "children", line)?;

    let debt = parse_integer(record, header_map, "debt", line)?;
    let debt = match debt {
        0 => 0,
        1 => 1,
        other => {
            return Err(PipelineError::InvalidDomainValue {
                line,
                column: "debt".to_string(),
                value: other.to_string(),
            });
        }
    };

    Ok(ApplicantRecord {
        children,
        days_employed: parse_opt_f64(record, header_map, "days_employed", line)?,
        total_income: parse_opt_f64(record, header_map, "total_income", line)?,
        income_type: get_text(record, header_map, "income_type"),
        education: get_text(record, header_map, "education"),
        family_status: get_text(record, header_map, "family_status"),
        purpose: get_text(record, header_map, "purpose"),
        debt,
        extra: extra_idx
            .iter()
            .map(|&idx| record.get(idx).unwrap_or("").to_string())
            .collect(),
        total_income_category: None,
        purpose_category: None,
    })
}

fn get_cell<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> &'a str {
    header_map
        .get(name)
        .and_then(|idx| record.get(*idx))
        .unwrap_or("")
}

fn get_text(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> String {
    get_cell(record, header_map, name).to_string()
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("nan") || cell.eq_ignore_ascii_case("na")
}

fn invalid(line: usize, column: &str, value: &str) -> PipelineError {
    PipelineError::InvalidDomainValue {
        line,
        column: column.to_string(),
        value: value.to_string(),
    }
}

fn parse_opt_f64(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
    line: usize,
) -> Result<Option<f64>, PipelineError> {
    let cell = get_cell(record, header_map, name).trim();
    if is_missing(cell) {
        return Ok(None);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(invalid(line, name, cell)),
    }
}

/// Integer columns are sometimes exported as `2.0`; accept those, reject `2.5`
/// and anything that does not fit an `i64`.
fn parse_integer(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
    line: usize,
) -> Result<i64, PipelineError> {
    let cell = get_cell(record, header_map, name).trim();
    if let Ok(v) = cell.parse::<i64>() {
        return Ok(v);
    }
    // 2^63, the first f64 past i64::MAX.
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    match cell.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && (-UPPER..UPPER).contains(&v) => Ok(v as i64),
        _ => Err(invalid(line, name, cell)),
    }
}
