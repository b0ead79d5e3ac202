//! Command-line parsing for the borrower reliability analysis.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the cleaning/aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::DuplicatePolicy;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "borrowers", version, about = "Borrower reliability research: clean, categorize, cross-tabulate")]
pub struct Cli {
    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clean the dataset and print the four debt tables.
    Analyze(AnalyzeArgs),
    /// Clean and categorize only; print the cleaning summary.
    ///
    /// Combine with `--export-clean` to write the prepared table.
    Clean(AnalyzeArgs),
    /// Render a previously exported report JSON.
    Show(ShowArgs),
    /// Write a synthetic applicant dataset shaped like the bank export.
    Generate(GenerateArgs),
}

/// Logging options, shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct LogArgs {
    /// Log level used when `RUST_LOG` is not set (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Options for analysis and cleaning.
#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Applicant CSV. If omitted, you'll be prompted to pick one.
    #[arg(short = 'f', long, env = "BORROWERS_CSV", value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// Field delimiter of the input file.
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// What to do with exact duplicate rows once they are counted.
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::Keep)]
    pub duplicates: DuplicatePolicy,

    /// JSON file replacing the built-in purpose keyword table.
    #[arg(long, value_name = "JSON")]
    pub keywords: Option<PathBuf>,

    /// Export the cleaned and categorized table to CSV.
    #[arg(long = "export-clean", value_name = "CSV")]
    pub export_clean: Option<PathBuf>,

    /// Export the report (cleaning summary + debt tables) to JSON.
    #[arg(long = "export-report", value_name = "JSON")]
    pub export_report: Option<PathBuf>,
}

/// Options for rendering a saved report.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Report JSON produced by `borrowers analyze --export-report`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,
}

/// Options for synthetic data generation.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Number of rows to generate.
    #[arg(short = 'n', long, default_value_t = 21_525)]
    pub rows: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: PathBuf,

    /// Share of rows with missing `days_employed` and `total_income`.
    #[arg(long, default_value_t = 0.10)]
    pub missing_share: f64,

    /// Share of rows with a sentinel `children` value.
    #[arg(long, default_value_t = 0.006)]
    pub sentinel_share: f64,

    /// Share of rows duplicated from earlier rows.
    #[arg(long, default_value_t = 0.003)]
    pub duplicate_share: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_flags_parse() {
        let cli = Cli::try_parse_from([
            "borrowers",
            "analyze",
            "-f",
            "data.csv",
            "--duplicates",
            "drop",
            "--delimiter",
            ";",
            "-q",
        ])
        .unwrap();

        assert!(cli.log.quiet);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.file, Some(PathBuf::from("data.csv")));
        assert_eq!(args.duplicates, DuplicatePolicy::Drop);
        assert_eq!(args.delimiter, ';');
    }

    #[test]
    fn generate_requires_output() {
        assert!(Cli::try_parse_from(["borrowers", "generate", "-n", "10"]).is_err());
    }
}
