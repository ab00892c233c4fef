//! Statistical utility functions for metric computation and normalization.
//!
//! This module provides the return-series statistics used by the period
//! metrics calculator and the min-max rescaling used by the cross-sectional
//! scorer.

use ndarray::Array1;

/// Ranges at or below this width are treated as degenerate.
pub const MIN_RANGE_THRESHOLD: f64 = 1e-12;

/// Arithmetic mean of the values, `None` when empty.
///
/// # Examples
///
/// ```
/// use impetu_traits::stats::mean;
///
/// assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
/// assert_eq!(mean(&[]), None);
/// ```
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Simple returns between consecutive prices.
///
/// `r_i = p_i / p_{i-1} - 1`. Pairs whose previous price is not strictly
/// positive are skipped, since the ratio is undefined.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .filter(|r| r.is_finite())
        .collect()
}

/// Downside deviation of a return series.
///
/// Squares and averages only the negative returns, then takes the square
/// root. The average is taken over the count of negative returns. Returns
/// zero when no return is negative.
///
/// # Examples
///
/// ```
/// use impetu_traits::stats::downside_deviation;
///
/// let dd = downside_deviation(&[-0.10, 0.05, 0.15]);
/// assert!((dd - 0.10).abs() < 1e-12);
/// ```
pub fn downside_deviation(returns: &[f64]) -> f64 {
    let (sum_sq, count) = returns
        .iter()
        .filter(|r| **r < 0.0)
        .fold((0.0, 0usize), |(sum, n), r| (sum + r * r, n + 1));

    if count == 0 {
        return 0.0;
    }
    (sum_sq / count as f64).sqrt()
}

/// Clamp into `[lo, hi]`, mapping NaN to `lo`.
#[must_use]
pub fn clamp_finite(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() { lo } else { x.clamp(lo, hi) }
}

/// Min-max rescaling result containing computed statistics.
#[derive(Debug, Clone, Copy)]
pub struct MinMaxResult {
    /// Smallest finite input.
    pub min: f64,
    /// Largest finite input.
    pub max: f64,
    /// Whether rescaling was applied (false for empty or constant input).
    pub applied: bool,
}

/// Rescale an array into `[0, 1]` using its own finite minimum and maximum.
///
/// Non-finite entries map to 0. When the range is degenerate every entry
/// maps to 0.
///
/// # Examples
///
/// ```
/// use impetu_traits::stats::min_max_normalize;
/// use ndarray::Array1;
///
/// let (scaled, result) = min_max_normalize(&Array1::from_vec(vec![2.0, 4.0, 6.0]));
/// assert!(result.applied);
/// assert_eq!(scaled.to_vec(), vec![0.0, 0.5, 1.0]);
/// ```
pub fn min_max_normalize(values: &Array1<f64>) -> (Array1<f64>, MinMaxResult) {
    let (min, max) = values
        .iter()
        .filter(|x| x.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });

    let range = max - min;
    let applied = range.is_finite() && range > MIN_RANGE_THRESHOLD;

    let scaled = if applied {
        values.mapv(|x| if x.is_finite() { (x - min) / range } else { 0.0 })
    } else {
        Array1::zeros(values.len())
    };

    (scaled, MinMaxResult { min, max, applied })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_simple_returns() {
        let returns = simple_returns(&[100.0, 90.0, 95.0, 110.0, 120.0]);
        assert_eq!(returns.len(), 4);
        assert_relative_eq!(returns[0], -0.10, epsilon = 1e-12);
        assert_relative_eq!(returns[1], 95.0 / 90.0 - 1.0, epsilon = 1e-12);
        assert_relative_eq!(returns[3], 120.0 / 110.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_simple_returns_skips_non_positive_base() {
        let returns = simple_returns(&[0.0, 10.0, 11.0]);
        assert_eq!(returns.len(), 1);
        assert_relative_eq!(returns[0], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_downside_deviation_uses_negative_count() {
        // Two negatives: sqrt((0.01 + 0.04) / 2)
        let dd = downside_deviation(&[-0.1, 0.3, -0.2, 0.5]);
        assert_relative_eq!(dd, (0.05f64 / 2.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_downside_deviation_no_negatives() {
        assert_eq!(downside_deviation(&[0.1, 0.0, 0.2]), 0.0);
        assert_eq!(downside_deviation(&[]), 0.0);
    }

    #[test]
    fn test_clamp_finite() {
        assert_eq!(clamp_finite(f64::NAN, 0.0, 1.0), 0.0);
        assert_eq!(clamp_finite(2.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp_finite(f64::NEG_INFINITY, -1.0, 1.0), -1.0);
    }

    #[test]
    fn test_min_max_constant() {
        let (scaled, result) = min_max_normalize(&Array1::from_vec(vec![3.0, 3.0]));
        assert!(!result.applied);
        assert!(scaled.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_min_max_ignores_non_finite() {
        let (scaled, result) =
            min_max_normalize(&Array1::from_vec(vec![1.0, f64::NAN, 3.0]));
        assert!(result.applied);
        assert_eq!(result.min, 1.0);
        assert_eq!(result.max, 3.0);
        assert_eq!(scaled[1], 0.0);
        assert_eq!(scaled[2], 1.0);
    }

    #[test]
    fn test_min_max_empty() {
        let (scaled, result) = min_max_normalize(&Array1::zeros(0));
        assert!(scaled.is_empty());
        assert!(!result.applied);
    }
}
