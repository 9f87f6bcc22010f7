use macd_common::data::DataError;
use thiserror::Error;

use crate::backtest::BacktestError;
use crate::indicator::IndicatorError;

/// Service layer error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Backtest error: {0}")]
    Backtest(#[from] BacktestError),

    #[error("Chart export error: {0}")]
    Chart(String),

    #[error("Task error: {0}")]
    Task(String),
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Chart(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Chart(err.to_string())
    }
}
