// =================================================================
// data/errors.rs - Error Types
// =================================================================

use thiserror::Error;

/// Error types for loading price series
#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: missing column {column}")]
    MissingColumn { row: usize, column: usize },

    #[error("Row {row}: invalid date '{value}': {reason}")]
    InvalidDate {
        row: usize,
        value: String,
        reason: String,
    },

    #[error("Row {row}: invalid price '{value}': {reason}")]
    InvalidPrice {
        row: usize,
        value: String,
        reason: String,
    },

    #[error("Invalid sampling: {0}")]
    InvalidSampling(String),

    #[error("No price rows found")]
    Empty,
}
