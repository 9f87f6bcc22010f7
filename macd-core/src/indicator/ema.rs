// macd-core/src/indicator/ema.rs

use super::IndicatorError;

/// Exponentially weighted average of a whole window.
///
/// The period is the window length `n`, so `alpha = 2 / (n + 1)`. Weights decay
/// with the position inside the window: the first sample gets `(1 - alpha)^0`,
/// the second `(1 - alpha)^1` and so on. The weighted sum is divided by the sum
/// of the weights.
pub fn window_ema(samples: &[f64]) -> Result<f64, IndicatorError> {
    if samples.is_empty() {
        return Err(IndicatorError::InvalidInput(
            "EMA window must hold at least one sample".to_string(),
        ));
    }

    let alpha = 2.0 / (samples.len() as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut weight = 1.0;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for sample in samples {
        numerator += weight * sample;
        denominator += weight;
        weight *= decay;
    }

    Ok(numerator / denominator)
}
