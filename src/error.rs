use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Top-level error type for the evaluation toolkit
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Failed to parse stats file: {0}")]
    StatsError(#[from] StatsError),

    #[error("Invalid cache configuration: {0}")]
    CacheError(#[from] CacheError),

    #[error("Failed to draw chart: {0}")]
    PlotError(String),

    #[error("Column '{column}' is missing from '{path}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Unknown benchmark: '{0}'")]
    UnknownBenchmark(String),

    #[error("Results directory not found: '{0}'")]
    ResultsDirMissing(PathBuf),

    #[error("No data: {0}")]
    NoData(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl<E> From<DrawingAreaErrorKind<E>> for EvalError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        EvalError::PlotError(err.to_string())
    }
}

/// Errors related to gem5 stats dumps
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Failed to read '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("'{path}' line {line}: {reason}")]
    ParseError {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

/// Errors related to cache geometry
#[derive(Error, Debug, PartialEq)]
pub enum CacheError {
    #[error("{0}: size must be positive")]
    ZeroSize(String),

    #[error("{0}: associativity must be positive")]
    ZeroAssociativity(String),

    #[error("Cache line size {0}B is not a power of 2")]
    LineNotPow2(u32),

    #[error("{level}: {size_kb}KB cannot hold a {line}B line")]
    LineTooLarge { level: String, size_kb: u32, line: u32 },

    #[error("{level}: {assoc}-way exceeds {lines} lines")]
    AssociativityTooLarge {
        level: String,
        assoc: u32,
        lines: u32,
    },
}

/// Type alias for Result with EvalError
pub type EvalResult<T> = Result<T, EvalError>;
