// macd-core/src/backtest/metrics.rs

use super::types::*;
use macd_common::data::Direction;
use rust_decimal::Decimal;

pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Derive the run metrics; fails with `Overflow` when a figure does not
    /// fit in a `Decimal`
    pub fn calculate(
        &self,
        starting_value: Decimal,
        trades: &[Trade],
        history: &[Snapshot],
    ) -> Result<Metrics, BacktestError> {
        let (max_drawdown, max_drawdown_days) = self.calculate_drawdown(history);
        let buy_trades = trades.iter().filter(|t| t.side == Direction::Buy).count() as u32;

        Ok(Metrics {
            total_return: self.calculate_total_return(starting_value, history)?,
            max_drawdown,
            max_drawdown_days,
            total_trades: trades.len() as u32,
            buy_trades,
            sell_trades: trades.len() as u32 - buy_trades,
            total_volume: self.calculate_total_volume(trades)?,
        })
    }

    fn calculate_total_return(&self, starting_value: Decimal, history: &[Snapshot]) -> Result<Decimal, BacktestError> {
        let last = match history.last() {
            Some(point) => point,
            None => return Ok(Decimal::ZERO),
        };

        if starting_value.is_zero() {
            return Ok(Decimal::ZERO);
        }

        last.equity
            .checked_sub(starting_value)
            .and_then(|gain| gain.checked_div(starting_value))
            .and_then(|ratio| ratio.checked_mul(Decimal::from(100)))
            .map(|percent| percent.round_dp(4))
            .ok_or(BacktestError::Overflow { date: last.date })
    }

    fn calculate_drawdown(&self, history: &[Snapshot]) -> (Decimal, i64) {
        let mut max_drawdown = Decimal::ZERO;
        let mut max_drawdown_days = 0;
        let mut peak: Option<&Snapshot> = None;

        for point in history {
            match peak {
                Some(top) if point.equity <= top.equity => {
                    if top.equity > Decimal::ZERO {
                        let drawdown = (top.equity - point.equity) / top.equity;
                        if drawdown > max_drawdown {
                            max_drawdown = drawdown;
                            max_drawdown_days = (point.date - top.date).num_days();
                        }
                    }
                }
                _ => peak = Some(point),
            }
        }

        (max_drawdown.round_dp(6), max_drawdown_days)
    }

    fn calculate_total_volume(&self, trades: &[Trade]) -> Result<Decimal, BacktestError> {
        trades.iter().try_fold(Decimal::ZERO, |total, t| {
            Decimal::from(t.quantity)
                .checked_mul(t.price)
                .and_then(|notional| total.checked_add(notional))
                .ok_or(BacktestError::Overflow { date: t.date })
        })
    }
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}
