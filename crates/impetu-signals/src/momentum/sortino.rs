//! Sortino ratio with a bounded zero-risk sentinel.

use impetu_traits::stats::{downside_deviation, mean};

/// Sortino ratio of a daily return series.
///
/// Mean daily return divided by the downside deviation. When the downside
/// deviation is zero (no negative returns) the ratio is undefined, so the
/// bounded sentinel `+cap` is returned for a non-negative mean and `-cap`
/// otherwise. A non-finite quotient is replaced by the same sentinel.
///
/// # Examples
///
/// ```
/// use impetu_signals::momentum::sortino_ratio;
///
/// assert_eq!(sortino_ratio(&[0.01, 0.02], 5.0), 5.0);
/// ```
pub fn sortino_ratio(returns: &[f64], cap: f64) -> f64 {
    let mean_return = mean(returns).filter(|m| m.is_finite()).unwrap_or(0.0);
    let sentinel = if mean_return >= 0.0 { cap } else { -cap };

    let downside = downside_deviation(returns);
    if downside <= 0.0 || !downside.is_finite() {
        return sentinel;
    }

    let ratio = mean_return / downside;
    if ratio.is_finite() { ratio } else { sentinel }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use impetu_traits::stats::simple_returns;

    #[test]
    fn test_reference_series() {
        let returns = simple_returns(&[100.0, 90.0, 95.0, 110.0, 120.0]);
        let sortino = sortino_ratio(&returns, 5.0);

        // mean ~0.0511, downside deviation 0.10
        assert_relative_eq!(sortino, 0.511, epsilon = 1e-3);
    }

    #[test]
    fn test_sentinel_positive_mean() {
        assert_eq!(sortino_ratio(&[0.01, 0.03, 0.0], 5.0), 5.0);
    }

    #[test]
    fn test_sentinel_zero_mean_is_positive() {
        assert_eq!(sortino_ratio(&[0.0, 0.0], 5.0), 5.0);
    }

    #[test]
    fn test_sentinel_respects_cap() {
        assert_eq!(sortino_ratio(&[0.02], 2.5), 2.5);
    }

    #[test]
    fn test_empty_returns_sentinel() {
        assert_eq!(sortino_ratio(&[], 5.0), 5.0);
    }

    #[test]
    fn test_negative_mean() {
        let sortino = sortino_ratio(&[-0.02, -0.01, 0.01], 5.0);
        assert!(sortino < 0.0);
        assert!(sortino.is_finite());
    }

    #[test]
    fn test_sentinel_sign_matches_mean() {
        for returns in [vec![0.0, 0.01], vec![0.05], vec![0.0]] {
            let mean_return = mean(&returns).unwrap();
            let sortino = sortino_ratio(&returns, 5.0);
            assert_eq!(sortino.signum(), if mean_return >= 0.0 { 1.0 } else { -1.0 });
        }
    }
}
