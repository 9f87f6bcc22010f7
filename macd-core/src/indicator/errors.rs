use thiserror::Error;

/// Indicator computation error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
