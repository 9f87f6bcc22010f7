// macd-core/src/indicator/macd.rs

use super::{window_ema, IndicatorError};
use macd_common::data::{IndicatorPoint, IndicatorSeries, MidpointPoint, MidpointSeries, PricePoint};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Window sizes handed to the EMA estimator.
///
/// Each window counts `period + 1` samples, so the defaults 13/27/10 give the
/// classic 12/26/9 MACD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 13,
            slow: 27,
            signal: 10,
        }
    }
}

impl MacdParams {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self { fast, slow, signal }
    }

    pub fn validate(&self) -> Result<(), IndicatorError> {
        for (name, window) in [("fast", self.fast), ("slow", self.slow), ("signal", self.signal)] {
            if window == 0 {
                return Err(IndicatorError::InvalidInput(format!(
                    "{} window must be at least 1",
                    name
                )));
            }
        }
        Ok(())
    }

    /// First index at which SIGNAL can be defined
    pub fn warmup(&self) -> usize {
        self.fast.max(self.slow) + self.signal - 2
    }
}

/// Midpoint of high and low for every row, in input order
pub fn midpoints(prices: &[PricePoint]) -> MidpointSeries {
    prices.iter().map(MidpointPoint::from).collect()
}

/// Build the indicator series for a midpoint series.
///
/// Every output record is built fresh; fields whose trailing window is not yet
/// complete stay `None`.
pub fn transform(series: &[MidpointPoint], params: &MacdParams) -> Result<IndicatorSeries, IndicatorError> {
    params.validate()?;
    if series.is_empty() {
        return Err(IndicatorError::InvalidInput("midpoint series is empty".to_string()));
    }

    let values = series
        .iter()
        .map(|point| {
            point.value.to_f64().map(Some).ok_or_else(|| {
                IndicatorError::InvalidInput(format!("value {} on {} is not representable", point.value, point.date))
            })
        })
        .collect::<Result<Vec<Option<f64>>, _>>()?;

    let ema_fast = rolling_ema(&values, params.fast)?;
    let ema_slow = rolling_ema(&values, params.slow)?;
    let macd: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(fast, slow)| match (fast, slow) {
            (Some(fast), Some(slow)) => Some(fast - slow),
            _ => None,
        })
        .collect();
    let signal = rolling_ema(&macd, params.signal)?;

    debug!(
        "Computed MACD({},{},{}) over {} points",
        params.fast,
        params.slow,
        params.signal,
        series.len()
    );

    Ok(series
        .iter()
        .enumerate()
        .map(|(i, point)| IndicatorPoint {
            ema_fast: ema_fast[i],
            ema_slow: ema_slow[i],
            macd: macd[i],
            signal: signal[i],
            ..IndicatorPoint::bare(point.date, point.value)
        })
        .collect())
}

/// EMA over the trailing window ending at each index.
///
/// An index gets a value only when every sample in its window is defined.
fn rolling_ema(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    if window == 0 {
        return Err(IndicatorError::InvalidInput("window must be at least 1".to_string()));
    }

    let mut out = vec![None; values.len()];
    // windows() yields nothing when the series is shorter than the window
    for (offset, samples) in values.windows(window).enumerate() {
        let samples: Option<Vec<f64>> = samples.iter().copied().collect();
        if let Some(samples) = samples {
            out[offset + window - 1] = Some(window_ema(&samples)?);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn series(values: &[i64]) -> MidpointSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MidpointPoint {
                date: start + chrono::Duration::days(i as i64),
                value: Decimal::from(*v),
            })
            .collect()
    }

    fn zigzag(len: usize) -> MidpointSeries {
        let values: Vec<i64> = (0..len as i64).map(|i| 100 + (i % 7) * 3 - (i % 5) * 2 + i / 4).collect();
        series(&values)
    }

    #[test]
    fn test_midpoints_keep_order() {
        let day = |d| NaiveDate::from_ymd_opt(2022, 5, d).unwrap();
        let prices = vec![
            PricePoint::new(day(3), Decimal::from(12), Decimal::from(8)),
            PricePoint::new(day(4), Decimal::from(21), Decimal::from(20)),
        ];
        let mids = midpoints(&prices);
        assert_eq!(mids.len(), 2);
        assert_eq!(mids[0].date, day(3));
        assert_eq!(mids[0].value, Decimal::from(10));
        assert_eq!(mids[1].value, Decimal::new(205, 1));
    }

    #[test]
    fn test_macd_is_fast_minus_slow() {
        let out = transform(&zigzag(80), &MacdParams::default()).unwrap();
        for point in &out {
            if let (Some(fast), Some(slow)) = (point.ema_fast, point.ema_slow) {
                assert_eq!(point.macd, Some(fast - slow));
            } else {
                assert_eq!(point.macd, None);
            }
        }
    }

    #[test]
    fn test_monotonic_fill() {
        let params = MacdParams::new(3, 5, 2);
        let input = zigzag(12);
        let out = transform(&input, &params).unwrap();

        assert_eq!(out.len(), input.len());
        for (i, point) in out.iter().enumerate() {
            assert_eq!(point.date, input[i].date);
            assert_eq!(point.value, input[i].value);
            assert_eq!(point.ema_fast.is_some(), i >= 2, "fast at {}", i);
            assert_eq!(point.ema_slow.is_some(), i >= 4, "slow at {}", i);
            assert_eq!(point.macd.is_some(), i >= 4, "macd at {}", i);
            assert_eq!(point.signal.is_some(), i >= 5, "signal at {}", i);
            assert_eq!(point.crossover, None);
        }
        assert_eq!(params.warmup(), 5);
    }

    #[test]
    fn test_trailing_window() {
        let params = MacdParams::new(2, 3, 1);
        let out = transform(&series(&[1, 2, 3, 4]), &params).unwrap();

        // window [3, 4] at index 3: alpha = 2/3, weights 1 and 1/3
        let expected_fast = (3.0 + 4.0 / 3.0) / (4.0 / 3.0);
        assert!((out[3].ema_fast.unwrap() - expected_fast).abs() < 1e-12);
        // a one-sample signal window is the macd itself
        assert_eq!(out[3].signal, out[3].macd);
    }

    #[test]
    fn test_short_series_leaves_fields_undefined() {
        let out = transform(&series(&[5, 6, 7]), &MacdParams::default()).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|p| p.ema_fast.is_none() && p.signal.is_none()));
    }

    #[test]
    fn test_invalid_input() {
        let input = series(&[1, 2, 3]);
        assert!(matches!(
            transform(&input, &MacdParams::new(0, 27, 10)),
            Err(IndicatorError::InvalidInput(_))
        ));
        assert!(matches!(
            transform(&input, &MacdParams::new(13, 27, 0)),
            Err(IndicatorError::InvalidInput(_))
        ));
        assert!(matches!(
            transform(&[], &MacdParams::default()),
            Err(IndicatorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_transform_is_deterministic() {
        let input = zigzag(60);
        let params = MacdParams::default();
        assert_eq!(transform(&input, &params).unwrap(), transform(&input, &params).unwrap());
    }
}
