use rust_decimal::Decimal;

use super::Analysis;

/// Plain-text summary of one analysis, one fact per line
pub fn render(analysis: &Analysis, with_trades: bool) -> String {
    let summary = &analysis.summary;
    let metrics = &summary.metrics;

    let mut lines = vec![
        analysis.name.clone(),
        format!("starting units value: {}", summary.starting_value),
        format!(
            "ending cash: {} units left: {} units left value: {}",
            summary.ending_cash, summary.ending_units, summary.ending_value
        ),
        format!("total: {}", summary.total),
        format!("income: {}", summary.net_income),
        format!(
            "trades: {} ({} buy / {} sell) volume: {}",
            metrics.total_trades, metrics.buy_trades, metrics.sell_trades, metrics.total_volume
        ),
        format!(
            "total return: {}% max drawdown: {}% over {} days",
            metrics.total_return,
            (metrics.max_drawdown * Decimal::from(100)).round_dp(2),
            metrics.max_drawdown_days
        ),
    ];

    if with_trades {
        lines.extend(summary.trades.iter().map(|trade| {
            format!(
                "{} {} {} @ {}",
                trade.date.format("%Y-%m-%d"),
                trade.side,
                trade.quantity,
                trade.price
            )
        }));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::{BacktestConfig, BacktestEngine};
    use chrono::NaiveDate;
    use macd_common::data::{Direction, IndicatorPoint};

    #[test]
    fn test_render_summary() {
        let start = NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();
        let series: Vec<IndicatorPoint> = [10, 10, 12, 8]
            .iter()
            .zip([None, Some(Direction::Buy), None, Some(Direction::Sell)])
            .enumerate()
            .map(|(i, (value, mark))| {
                IndicatorPoint::bare(start + chrono::Duration::days(i as i64), Decimal::from(*value))
                    .with_crossover(mark)
            })
            .collect();
        let summary = BacktestEngine::new(BacktestConfig { initial_units: 1000 })
            .run(&series)
            .unwrap();
        let analysis = Analysis {
            name: "CCC".to_string(),
            events: Vec::new(),
            series,
            summary,
            chart_path: None,
        };

        let text = render(&analysis, true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "CCC");
        assert_eq!(lines[1], "starting units value: 10000");
        assert_eq!(lines[3], "total: 8000");
        assert_eq!(lines[4], "income: -2000");
        assert_eq!(lines.last().copied(), Some("2020-02-04 SELL 1000 @ 8"));
        assert_eq!(lines.len(), 8);
        assert!(text.ends_with('\n'));

        let without_ledger = render(&analysis, false);
        assert_eq!(without_ledger.lines().count(), 7);
    }
}
