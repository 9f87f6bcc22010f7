// macd-core/src/backtest/types.rs

use chrono::NaiveDate;
use macd_common::data::Direction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backtest settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Units held before the first day
    pub initial_units: u64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self { initial_units: 1000 }
    }
}

/// Backtest error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Division by zero: buy signal at zero price on {date}")]
    DivisionByZero { date: NaiveDate },

    #[error("Arithmetic overflow on {date}")]
    Overflow { date: NaiveDate },
}

/// An executed fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub side: Direction,
    pub quantity: u64,
    pub price: Decimal,
}

/// Wallet state after one step of the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub value: Decimal,
    pub cash: Decimal,
    pub units: u64,
    /// cash + units * value
    pub equity: Decimal,
}

/// Running wallet of one simulation.
///
/// Owned by a single run and threaded through every step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationState {
    pub cash: Decimal,
    pub units: u64,
    pub history: Vec<Snapshot>,
    pub trades: Vec<Trade>,
}

/// Performance figures derived from the equity curve and the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Percent change from the starting value to the final equity
    pub total_return: Decimal,
    /// Largest peak-to-trough fall, as a fraction of the peak
    pub max_drawdown: Decimal,
    /// Days between the peak and the deepest trough
    pub max_drawdown_days: i64,
    pub total_trades: u32,
    pub buy_trades: u32,
    pub sell_trades: u32,
    pub total_volume: Decimal,
}

/// Outcome of one run, ready for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub starting_value: Decimal,
    pub ending_cash: Decimal,
    pub ending_units: u64,
    pub ending_value: Decimal,
    /// Cash plus the value of the units left, rounded once from the exact sum
    pub total: Decimal,
    pub net_income: Decimal,
    pub metrics: Metrics,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<Snapshot>,
}
