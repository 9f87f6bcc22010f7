// macd-core/src/signal/crossover.rs

use macd_common::data::{CrossoverEvent, Direction, IndicatorPoint, IndicatorSeries};
use tracing::debug;

/// Whether MACD sits strictly above SIGNAL.
///
/// Equality counts as below. Undefined when either line is undefined.
pub fn diff_sign(point: &IndicatorPoint) -> Option<bool> {
    match (point.macd, point.signal) {
        (Some(macd), Some(signal)) => Some(macd > signal),
        _ => None,
    }
}

/// Turn a sequence of above/below flags into crossings.
///
/// Index 0 never carries an event, and neither does any index whose own flag
/// or predecessor flag is undefined.
pub fn detect(signs: &[Option<bool>]) -> Vec<Option<Direction>> {
    let mut out: Vec<Option<Direction>> = Vec::with_capacity(signs.len());
    out.extend(signs.first().map(|_| None));
    out.extend(signs.windows(2).map(|pair| match (pair[0], pair[1]) {
        (Some(false), Some(true)) => Some(Direction::Buy),
        (Some(true), Some(false)) => Some(Direction::Sell),
        _ => None,
    }));
    out
}

/// Copy of the series with the `crossover` field filled in
pub fn annotate(series: &[IndicatorPoint]) -> IndicatorSeries {
    let signs: Vec<Option<bool>> = series.iter().map(diff_sign).collect();
    let annotated: IndicatorSeries = series
        .iter()
        .cloned()
        .zip(detect(&signs))
        .map(|(point, crossover)| point.with_crossover(crossover))
        .collect();

    debug!(
        "Found {} crossovers in {} points",
        annotated.iter().filter(|p| p.crossover.is_some()).count(),
        annotated.len()
    );
    annotated
}

/// Crossovers of an annotated series, in date order
pub fn events(series: &[IndicatorPoint]) -> Vec<CrossoverEvent> {
    series
        .iter()
        .enumerate()
        .filter_map(|(index, point)| {
            point.crossover.map(|direction| CrossoverEvent {
                index,
                date: point.date,
                direction,
            })
        })
        .collect()
}
