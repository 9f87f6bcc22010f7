// macd-core/src/backtest/engine.rs

use super::metrics::MetricsCalculator;
use super::types::*;
use macd_common::data::{Direction, IndicatorPoint};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info};

impl SimulationState {
    pub fn new(units: u64) -> Self {
        Self {
            units,
            ..Self::default()
        }
    }

    /// Apply one day of the series and return the next state.
    ///
    /// A Buy spends as much cash as buys whole units; a Sell liquidates every
    /// unit held. Days without a crossover only record a snapshot.
    pub fn step(mut self, point: &IndicatorPoint) -> Result<Self, BacktestError> {
        let price = point.value;
        let overflow = || BacktestError::Overflow { date: point.date };

        match point.crossover {
            Some(Direction::Buy) => {
                if price.is_zero() {
                    return Err(BacktestError::DivisionByZero { date: point.date });
                }
                let affordable = self
                    .cash
                    .checked_div(price)
                    .and_then(|units| units.floor().to_u64())
                    .ok_or_else(overflow)?;
                if affordable > 0 {
                    let cost = Decimal::from(affordable).checked_mul(price).ok_or_else(overflow)?;
                    self.cash -= cost;
                    self.units = self.units.checked_add(affordable).ok_or_else(overflow)?;
                    self.trades.push(Trade {
                        date: point.date,
                        side: Direction::Buy,
                        quantity: affordable,
                        price,
                    });
                    debug!("{} BUY {} @ {}", point.date, affordable, price);
                }
            }
            Some(Direction::Sell) => {
                if self.units > 0 {
                    let proceeds = Decimal::from(self.units).checked_mul(price).ok_or_else(overflow)?;
                    self.cash = self.cash.checked_add(proceeds).ok_or_else(overflow)?;
                    self.trades.push(Trade {
                        date: point.date,
                        side: Direction::Sell,
                        quantity: self.units,
                        price,
                    });
                    debug!("{} SELL {} @ {}", point.date, self.units, price);
                    self.units = 0;
                }
            }
            None => {}
        }

        let equity = Decimal::from(self.units)
            .checked_mul(price)
            .and_then(|held| held.checked_add(self.cash))
            .ok_or_else(overflow)?;
        self.history.push(Snapshot {
            date: point.date,
            value: price,
            cash: self.cash,
            units: self.units,
            equity,
        });

        Ok(self)
    }
}

/// Replays crossovers against an all-in / all-out trade policy
pub struct BacktestEngine {
    config: BacktestConfig,
    metrics_calculator: MetricsCalculator,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Self {
        Self {
            config,
            metrics_calculator: MetricsCalculator::new(),
        }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run a single pass over an annotated series
    pub fn run(&self, series: &[IndicatorPoint]) -> Result<BacktestSummary, BacktestError> {
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(BacktestError::InvalidInput("series is empty".to_string())),
        };

        let starting_value = Decimal::from(self.config.initial_units)
            .checked_mul(first.value)
            .ok_or(BacktestError::Overflow { date: first.date })?;
        info!(
            "Starting backtest over {} points with {} units (value {})",
            series.len(),
            self.config.initial_units,
            starting_value
        );

        let state = series
            .iter()
            .try_fold(SimulationState::new(self.config.initial_units), |state, point| {
                state.step(point)
            })?;

        let ending_value = Decimal::from(state.units)
            .checked_mul(last.value)
            .ok_or(BacktestError::Overflow { date: last.date })?;
        let total = state
            .cash
            .checked_add(ending_value)
            .ok_or(BacktestError::Overflow { date: last.date })?;
        // Rounding is for reporting only
        let net_income = total
            .checked_sub(starting_value)
            .ok_or(BacktestError::Overflow { date: last.date })?
            .round_dp(2);

        let metrics = self
            .metrics_calculator
            .calculate(starting_value, &state.trades, &state.history)?;

        info!(
            "Backtest completed: {} trades, net income {}",
            metrics.total_trades, net_income
        );

        Ok(BacktestSummary {
            starting_value,
            ending_cash: state.cash.round_dp(2),
            ending_units: state.units,
            ending_value: ending_value.round_dp(2),
            total: total.round_dp(2),
            net_income,
            metrics,
            trades: state.trades,
            equity_curve: state.history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: &[i64], marks: &[Option<Direction>]) -> Vec<IndicatorPoint> {
        let start = NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();
        values
            .iter()
            .zip(marks)
            .enumerate()
            .map(|(i, (value, mark))| {
                IndicatorPoint::bare(start + chrono::Duration::days(i as i64), Decimal::from(*value))
                    .with_crossover(*mark)
            })
            .collect()
    }

    #[test]
    fn test_buy_without_cash_then_sell() {
        let engine = BacktestEngine::new(BacktestConfig { initial_units: 1000 });
        let input = series(
            &[10, 10, 12, 8],
            &[None, Some(Direction::Buy), None, Some(Direction::Sell)],
        );

        let summary = engine.run(&input).unwrap();
        assert_eq!(summary.starting_value, Decimal::from(10_000));
        assert_eq!(summary.ending_cash, Decimal::from(8000));
        assert_eq!(summary.ending_units, 0);
        assert_eq!(summary.ending_value, Decimal::ZERO);
        assert_eq!(summary.net_income, Decimal::from(-2000));
        assert_eq!(summary.total, Decimal::from(8000));

        // the cashless buy leaves no trace in the ledger
        assert_eq!(summary.trades.len(), 1);
        assert_eq!(summary.trades[0].side, Direction::Sell);
        assert_eq!(summary.trades[0].quantity, 1000);
        assert_eq!(summary.equity_curve.len(), 4);
    }

    #[test]
    fn test_sell_then_buy_back() {
        let engine = BacktestEngine::new(BacktestConfig { initial_units: 10 });
        let input = series(
            &[5, 7, 3, 4],
            &[None, Some(Direction::Sell), Some(Direction::Buy), None],
        );

        let summary = engine.run(&input).unwrap();
        // sell 10 @ 7 = 70, buy floor(70 / 3) = 23 @ 3 = 69, 1 left
        assert_eq!(summary.ending_cash, Decimal::ONE);
        assert_eq!(summary.ending_units, 23);
        assert_eq!(summary.ending_value, Decimal::from(92));
        assert_eq!(summary.net_income, Decimal::from(93 - 50));
        assert_eq!(summary.trades.len(), 2);
        assert_eq!(summary.trades[1].quantity, 23);
    }

    #[test]
    fn test_zero_price_buy_fails() {
        let engine = BacktestEngine::new(BacktestConfig::default());
        let input = series(&[4, 0], &[None, Some(Direction::Buy)]);

        let err = engine.run(&input).unwrap_err();
        assert_eq!(
            err,
            BacktestError::DivisionByZero {
                date: input[1].date
            }
        );
    }

    #[test]
    fn test_empty_series_fails() {
        let engine = BacktestEngine::new(BacktestConfig::default());
        assert!(matches!(engine.run(&[]), Err(BacktestError::InvalidInput(_))));
    }

    #[test]
    fn test_step_threads_state() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let state = SimulationState {
            cash: Decimal::new(2550, 2),
            ..SimulationState::new(0)
        };

        let buy = IndicatorPoint::bare(date, Decimal::from(5)).with_crossover(Some(Direction::Buy));
        let state = state.step(&buy).unwrap();
        assert_eq!(state.units, 5);
        assert_eq!(state.cash, Decimal::new(50, 2));
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].equity, Decimal::new(2550, 2));

        let sell = IndicatorPoint::bare(date, Decimal::from(6)).with_crossover(Some(Direction::Sell));
        let state = state.step(&sell).unwrap();
        assert_eq!(state.units, 0);
        assert_eq!(state.cash, Decimal::new(3050, 2));

        // selling with nothing held changes nothing but the history
        let state = state.step(&sell).unwrap();
        assert_eq!(state.cash, Decimal::new(3050, 2));
        assert_eq!(state.trades.len(), 2);
        assert_eq!(state.history.len(), 3);
    }

    #[test]
    fn test_net_income_rounds_at_report() {
        let engine = BacktestEngine::new(BacktestConfig { initial_units: 3 });
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let input = vec![
            IndicatorPoint::bare(start, Decimal::new(1_005, 3)),
            IndicatorPoint::bare(start.succ_opt().unwrap(), Decimal::new(3_333, 3))
                .with_crossover(Some(Direction::Sell)),
        ];

        let summary = engine.run(&input).unwrap();
        // 3 * 3.333 - 3 * 1.005 = 6.984
        assert_eq!(summary.net_income, Decimal::new(698, 2));
        assert_eq!(summary.ending_cash, Decimal::new(1000, 2));
    }

    #[test]
    fn test_total_rounds_the_exact_sum() {
        let engine = BacktestEngine::new(BacktestConfig { initial_units: 3 });
        let start = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap();
        let day = |n: i64| start + chrono::Duration::days(n);
        let input = vec![
            IndicatorPoint::bare(day(0), Decimal::new(1_005, 3)),
            IndicatorPoint::bare(day(1), Decimal::new(1_005, 3)).with_crossover(Some(Direction::Sell)),
            IndicatorPoint::bare(day(2), Decimal::new(1_000, 3)).with_crossover(Some(Direction::Buy)),
            IndicatorPoint::bare(day(3), Decimal::new(1_005, 3)),
        ];

        let summary = engine.run(&input).unwrap();
        // cash 0.015 and value 3.015 each round up, their exact sum does not
        assert_eq!(summary.ending_cash, Decimal::new(2, 2));
        assert_eq!(summary.ending_value, Decimal::new(302, 2));
        assert_eq!(summary.total, Decimal::new(303, 2));
        assert_eq!(summary.net_income, Decimal::new(2, 2));
    }

    #[test]
    fn test_tiny_start_overflows_return_instead_of_panicking() {
        let engine = BacktestEngine::new(BacktestConfig { initial_units: 1 });
        let start = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        let input = vec![
            IndicatorPoint::bare(start, Decimal::new(1, 28)),
            IndicatorPoint::bare(start.succ_opt().unwrap(), Decimal::ONE).with_crossover(Some(Direction::Sell)),
        ];

        assert_eq!(
            engine.run(&input),
            Err(BacktestError::Overflow { date: input[1].date })
        );
    }
}
