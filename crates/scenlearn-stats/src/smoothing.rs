//! Moving-average filters
//!
//! Both filters return a new series of the same length as their input and
//! round every output value to one decimal place. The input is never
//! modified, so a caller can keep the raw series next to the smoothed one.

use crate::descriptive::round_to;

const OUTPUT_DIGITS: i32 = 1;

/// Simple (unweighted, trailing) moving average.
///
/// The first `window - 1` values are copied through unchanged; from index
/// `window - 1` on, each value is the mean of the `window` raw values ending
/// at that index. A window longer than the series copies the whole series.
///
/// # Panics
///
/// Panics if `window` is zero.
///
/// # Examples
///
/// ```
/// use scenlearn_stats::smoothing::simple_moving_average;
///
/// let smoothed = simple_moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
/// assert_eq!(smoothed, vec![1.0, 2.0, 2.0, 3.0, 4.0]);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn simple_moving_average(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window > 0, "moving average window must be positive");

    let mut smoothed = values.to_vec();
    if window > values.len() {
        return smoothed;
    }
    for (offset, chunk) in values.windows(window).enumerate() {
        let mean = chunk.iter().sum::<f64>() / window as f64;
        smoothed[offset + window - 1] = round_to(mean, OUTPUT_DIGITS);
    }
    smoothed
}

/// Exponentially weighted moving average without bias adjustment.
///
/// The smoothing factor is `alpha = 2 / (span + 1)` and the recurrence is
/// `y[0] = x[0]`, `y[t] = (1 - alpha) * y[t - 1] + alpha * x[t]`. Rounding is
/// applied to the output only; the recurrence runs on unrounded values.
///
/// # Panics
///
/// Panics if `span` is zero.
///
/// # Examples
///
/// ```
/// use scenlearn_stats::smoothing::exponential_moving_average;
///
/// // span 3 => alpha 0.5
/// let smoothed = exponential_moving_average(&[0.0, 4.0, 4.0, 0.0], 3);
/// assert_eq!(smoothed, vec![0.0, 2.0, 3.0, 1.5]);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn exponential_moving_average(values: &[f64], span: usize) -> Vec<f64> {
    assert!(span > 0, "moving average span must be positive");

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut current = None;
    values
        .iter()
        .map(|&value| {
            let next = match current {
                None => value,
                Some(prev) => (1.0 - alpha) * prev + alpha * value,
            };
            current = Some(next);
            round_to(next, OUTPUT_DIGITS)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_preserves_length() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        for window in 1..=10 {
            assert_eq!(simple_moving_average(&values, window).len(), values.len());
        }
    }

    #[test]
    fn test_sma_window_one_is_identity() {
        let values = [3.0, 1.0, 4.0];
        assert_eq!(simple_moving_average(&values, 1), values.to_vec());
    }

    #[test]
    fn test_sma_window_longer_than_series() {
        let values = [3.0, 1.0, 4.0];
        assert_eq!(simple_moving_average(&values, 4), values.to_vec());
    }

    #[test]
    fn test_sma_rounds_to_one_decimal() {
        let smoothed = simple_moving_average(&[0.0, 0.0, 1.0], 3);
        assert_eq!(smoothed, vec![0.0, 0.0, 0.3]);
    }

    #[test]
    fn test_ema_first_value_is_raw() {
        let smoothed = exponential_moving_average(&[7.0, 0.0], 10);
        assert_eq!(smoothed[0], 7.0);
        assert!(smoothed[1] < 7.0);
    }

    #[test]
    fn test_ema_constant_series_is_constant() {
        let values = [2.0; 16];
        assert_eq!(exponential_moving_average(&values, 5), values.to_vec());
    }

    #[test]
    fn test_empty_series() {
        assert!(simple_moving_average(&[], 3).is_empty());
        assert!(exponential_moving_average(&[], 3).is_empty());
    }
}
