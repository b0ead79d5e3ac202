//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - runs the cleaning/aggregation pipeline
//! - prints reports
//! - writes optional exports

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{AnalyzeArgs, Command, GenerateArgs, LogArgs, ShowArgs};
use crate::data::{SampleConfig, generate_sample};
use crate::domain::AnalysisConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `borrowers` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may carry BORROWERS_CSV, so load it before clap reads the environment.
    dotenvy::dotenv().ok();

    // We want `borrowers`, `borrowers -f data.csv` and `borrowers data.csv` to
    // behave like `borrowers analyze ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_logging(&cli.log);

    match cli.command {
        Command::Analyze(args) => handle_analyze(args, OutputMode::Full),
        Command::Clean(args) => handle_analyze(args, OutputMode::CleanOnly),
        Command::Show(args) => handle_show(args),
        Command::Generate(args) => handle_generate(args),
    }
}

/// Logs go to stderr so stdout only carries the report.
fn init_logging(args: &LogArgs) {
    let level = if args.quiet { "warn" } else { args.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A second call (e.g. from tests) finds a subscriber already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    CleanOnly,
}

fn handle_analyze(args: AnalyzeArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = config_from_args(&args)?;

    match mode {
        OutputMode::Full => {
            let run = pipeline::run_analysis(&config)?;
            println!("{}", crate::report::format_report(&run.report));

            if let Some(path) = &config.export_clean {
                crate::io::write_clean_csv(path, &run.table)?;
            }
            if let Some(path) = &config.export_report {
                crate::io::write_report_json(path, &run.report)?;
            }
        }
        OutputMode::CleanOnly => {
            let run = pipeline::run_clean(&config)?;
            println!("{}", crate::report::format_clean_summary(&run.clean));

            if let Some(path) = &config.export_clean {
                crate::io::write_clean_csv(path, &run.table)?;
            }
            if config.export_report.is_some() {
                warn!("--export-report is ignored by `clean`; use `analyze`");
            }
        }
    }

    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let report = crate::io::read_report_json(&args.report)?;
    println!("{}", crate::report::format_report(&report));
    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        rows: args.rows,
        seed: args.seed,
        missing_share: args.missing_share,
        sentinel_share: args.sentinel_share,
        duplicate_share: args.duplicate_share,
        ..SampleConfig::default()
    };
    let table = generate_sample(&config)?;
    crate::io::write_raw_csv(&args.output, &table)?;

    info!(path = %args.output.display(), rows = table.len(), seed = args.seed, "wrote synthetic dataset");
    println!("Wrote {} rows to {}", table.len(), args.output.display());
    Ok(())
}

/// Build the pipeline configuration, prompting for the CSV when none was given.
pub fn config_from_args(args: &AnalyzeArgs) -> Result<AnalysisConfig, AppError> {
    if !args.delimiter.is_ascii() {
        return Err(AppError::new(
            2,
            format!("Delimiter must be a single ASCII character, got {:?}.", args.delimiter),
        ));
    }
    let delimiter = args.delimiter as u8;

    let csv_path = match &args.file {
        Some(path) => path.clone(),
        None => crate::cli::picker::prompt_for_csv_path(delimiter)?,
    };

    Ok(AnalysisConfig {
        csv_path,
        delimiter,
        duplicates: args.duplicates,
        keywords: args.keywords.clone(),
        export_clean: args.export_clean.clone(),
        export_report: args.export_report.clone(),
    })
}

/// Rewrite argv so `borrowers` defaults to `borrowers analyze`.
///
/// Rules:
/// - `borrowers`                      -> `borrowers analyze`
/// - `borrowers -f data.csv ...`      -> `borrowers analyze -f data.csv ...`
/// - `borrowers data.csv ...`         -> `borrowers analyze -f data.csv ...`
/// - `borrowers --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("analyze".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "analyze" | "clean" | "show" | "generate");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "analyze flags".
    if arg1.starts_with('-') {
        argv.insert(1, "analyze".to_string());
        return argv;
    }

    // A bare CSV path is the input file.
    if arg1.to_ascii_lowercase().ends_with(".csv") {
        argv.insert(1, "-f".to_string());
        argv.insert(1, "analyze".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
