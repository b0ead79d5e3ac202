//! Interactive input picker.
//!
//! Used when `analyze`/`clean` run without `-f` and without `BORROWERS_CSV`.
//! Delimited files under the current directory are listed, and the ones whose
//! header carries every required applicant column are marked and listed first,
//! so the bank export is usually choice `1`.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::REQUIRED_COLUMNS;
use crate::error::AppError;

/// How deep below the current directory to look.
const SEARCH_DEPTH: usize = 3;

/// Directories that never hold input data.
const SKIPPED_DIRS: [&str; 4] = [".git", "target", "node_modules", ".venv"];

/// A file offered by the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    /// The header names every required applicant column.
    pub applicant_schema: bool,
}

/// Ask the user which file to analyze.
///
/// `delimiter` is used to read candidate headers. Accepts a list number, a
/// path, or `q` to cancel.
pub fn prompt_for_csv_path(delimiter: u8) -> Result<PathBuf, AppError> {
    let candidates = discover_candidates(Path::new("."), delimiter);
    if candidates.is_empty() {
        return Err(AppError::new(
            2,
            "No .csv files found here. Pass one with `borrowers analyze -f <file.csv>` or set BORROWERS_CSV.",
        ));
    }

    println!("Applicant tables are marked with *:");
    for (idx, candidate) in candidates.iter().enumerate() {
        let mark = if candidate.applicant_schema { '*' } else { ' ' };
        println!("{:>3}) {mark} {}", idx + 1, display_path(&candidate.path));
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("File number (1-{}), path, or q: ", candidates.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let Some(line) = lines.next() else {
            return Err(AppError::new(
                2,
                "No input received. Pass a file with `borrowers analyze -f <file.csv>`.",
            ));
        };
        let line = line.map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        match resolve_choice(line.trim(), &candidates) {
            Ok(Some(path)) => return Ok(path),
            Ok(None) => return Err(AppError::new(2, "Canceled.")),
            Err(msg) => println!("{msg}"),
        }
    }
}

/// Interpret one line of picker input.
///
/// `Ok(None)` means the user canceled; `Err` carries a message to show before
/// asking again.
fn resolve_choice(input: &str, candidates: &[Candidate]) -> Result<Option<PathBuf>, String> {
    if input.eq_ignore_ascii_case("q") {
        return Ok(None);
    }
    if let Ok(choice) = input.parse::<usize>() {
        return match choice.checked_sub(1).and_then(|i| candidates.get(i)) {
            Some(candidate) => Ok(Some(candidate.path.clone())),
            None => Err(format!("No file numbered {choice}.")),
        };
    }
    validate_csv_path(Path::new(input))
        .map(Some)
        .map_err(|e| e.to_string())
}

/// Check that `path` names an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.is_file() {
        return Err(AppError::new(2, format!("Not a file: {}", path.display())));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(
            2,
            format!("Expected a .csv file, got: {}", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

/// List `.csv` files under `root`, applicant tables first, then by path.
pub fn discover_candidates(root: &Path, delimiter: u8) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = find_csv_files(root)
        .into_iter()
        .map(|path| Candidate {
            applicant_schema: has_applicant_header(&path, delimiter),
            path,
        })
        .collect();
    out.sort_by(|a, b| {
        b.applicant_schema
            .cmp(&a.applicant_schema)
            .then_with(|| display_path(&a.path).cmp(&display_path(&b.path)))
    });
    debug!(
        found = out.len(),
        applicant_tables = out.iter().filter(|c| c.applicant_schema).count(),
        "scanned for input files"
    );
    out
}

fn find_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut pending = vec![(root.to_path_buf(), 0usize)];

    while let Some((dir, depth)) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                let skipped = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| SKIPPED_DIRS.contains(&n));
                if !skipped && depth < SEARCH_DEPTH {
                    pending.push((path, depth + 1));
                }
            } else if file_type.is_file() && has_csv_extension(&path) {
                out.push(path);
            }
        }
    }

    out
}

/// Peek at the header row only.
fn has_applicant_header(path: &Path, delimiter: u8) -> bool {
    let Ok(mut reader) = csv::ReaderBuilder::new().delimiter(delimiter).from_path(path) else {
        return false;
    };
    let Ok(headers) = reader.headers() else {
        return false;
    };
    let names: Vec<String> = headers
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect();
    REQUIRED_COLUMNS
        .iter()
        .all(|required| names.iter().any(|n| n == required))
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn display_path(path: &Path) -> String {
    path.strip_prefix("./").unwrap_or(path).display().to_string()
}
