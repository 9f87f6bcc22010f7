// =================================================================
// data/types.rs - Series Records
// =================================================================

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One daily row as delivered by the loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub high: Decimal,
    pub low: Decimal,
}

impl PricePoint {
    pub fn new(date: NaiveDate, high: Decimal, low: Decimal) -> Self {
        Self { date, high, low }
    }

    /// Average of the daily high and low.
    ///
    /// Adds half the spread to the lower price, so non-negative prices near
    /// `Decimal::MAX` cannot overflow.
    pub fn midpoint(&self) -> Decimal {
        let (lower, upper) = if self.low <= self.high {
            (self.low, self.high)
        } else {
            (self.high, self.low)
        };
        lower + (upper - lower) / Decimal::from(2)
    }
}

/// Midpoint price for a single date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidpointPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

impl From<&PricePoint> for MidpointPoint {
    fn from(point: &PricePoint) -> Self {
        Self {
            date: point.date,
            value: point.midpoint(),
        }
    }
}

/// Ordered midpoint prices, oldest first
pub type MidpointSeries = Vec<MidpointPoint>;

/// Side of a MACD/SIGNAL crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// MACD crossed above SIGNAL
    Buy,
    /// MACD crossed below SIGNAL
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// Indicator values for one date.
///
/// Fields stay `None` until enough history exists to fill their window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Decimal,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub crossover: Option<Direction>,
}

impl IndicatorPoint {
    /// A record with no indicator fields filled in yet
    pub fn bare(date: NaiveDate, value: Decimal) -> Self {
        Self {
            date,
            value,
            ema_fast: None,
            ema_slow: None,
            macd: None,
            signal: None,
            crossover: None,
        }
    }

    pub fn with_crossover(self, crossover: Option<Direction>) -> Self {
        Self { crossover, ..self }
    }
}

/// Indicator records aligned index-for-index with the midpoint series
pub type IndicatorSeries = Vec<IndicatorPoint>;

/// A crossover flattened out of the annotated series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossoverEvent {
    pub index: usize,
    pub date: NaiveDate,
    pub direction: Direction,
}
