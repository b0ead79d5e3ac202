//! Error types.
//!
//! Library code returns [`PipelineError`] so callers can match on the failure
//! (which column, which group). The binary converts it into an [`AppError`],
//! which only carries a message and a process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while loading, cleaning, categorizing or aggregating.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input table lacks a column the pipeline needs.
    #[error("Missing required column: `{column}`")]
    MissingColumn { column: String },

    /// A group has no observed values to take a median from.
    #[error("Cannot impute `{column}`: income_type group '{group}' has no observed values")]
    ImputationUndefined { column: String, group: String },

    /// A cell holds a value outside its column's domain.
    #[error("Invalid value '{value}' in column `{column}` (line {line})")]
    InvalidDomainValue {
        line: usize,
        column: String,
        value: String,
    },

    /// A stage needs a value that an earlier stage should have filled.
    #[error("Row {row} has no `{column}` value; run the cleaner first")]
    MissingValue { row: usize, column: String },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The purpose keyword table is malformed.
    #[error("Invalid keyword table: {0}")]
    KeywordTable(String),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Exit code used when this error terminates the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ImputationUndefined { .. } => 3,
            _ => 2,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
