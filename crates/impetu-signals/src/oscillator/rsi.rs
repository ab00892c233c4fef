//! Relative strength index with Wilder smoothing.

use serde::{Deserialize, Serialize};

/// RSI parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiConfig {
    /// Smoothing period (default: 14)
    pub period: usize,

    /// Value used when the series is too short or the result is unusable (default: 50)
    pub neutral: f64,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            period: 14,
            neutral: 50.0,
        }
    }
}

/// Relative strength index calculator.
///
/// The first average gain and loss are simple means over the first `period`
/// price changes; later values use Wilder's smoothing
/// `avg = (avg * (period - 1) + x) / period`. The RSI of the final close is
/// returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rsi {
    config: RsiConfig,
}

impl Rsi {
    /// Create a calculator with the given parameters.
    #[must_use]
    pub const fn new(config: RsiConfig) -> Self {
        Self { config }
    }

    /// Minimum number of closes needed for a computed value.
    #[must_use]
    pub const fn min_closes(&self) -> usize {
        self.config.period + 1
    }

    /// RSI of the last close in an ascending close series.
    ///
    /// Falls back to the neutral value when fewer than `period + 1` closes
    /// are available, when the series is flat, or when the computed value
    /// lands outside `[0, 100]`.
    #[must_use]
    pub fn value(&self, closes: &[f64]) -> f64 {
        let period = self.config.period;
        let neutral = self.config.neutral;
        if period == 0 || closes.len() < self.min_closes() {
            return neutral;
        }

        let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
        let p = period as f64;

        let (seed_gain, seed_loss) = changes[..period]
            .iter()
            .fold((0.0, 0.0), |(gain, loss), &c| {
                if c > 0.0 { (gain + c, loss) } else { (gain, loss - c) }
            });
        let mut avg_gain = seed_gain / p;
        let mut avg_loss = seed_loss / p;

        for &change in &changes[period..] {
            avg_gain = (avg_gain * (p - 1.0) + change.max(0.0)) / p;
            avg_loss = (avg_loss * (p - 1.0) + (-change).max(0.0)) / p;
        }

        let rsi = if avg_loss == 0.0 {
            if avg_gain == 0.0 { neutral } else { 100.0 }
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };

        if rsi.is_finite() && (0.0..=100.0).contains(&rsi) {
            rsi
        } else {
            neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config() {
        let config = RsiConfig::default();
        assert_eq!(config.period, 14);
        assert_relative_eq!(config.neutral, 50.0);
    }

    #[test]
    fn test_short_series_is_neutral() {
        let rsi = Rsi::default();
        let closes: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        assert_relative_eq!(rsi.value(&closes), 50.0);
        assert_relative_eq!(rsi.value(&[]), 50.0);
    }

    #[test]
    fn test_all_gains() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        assert_relative_eq!(Rsi::default().value(&closes), 100.0);
    }

    #[test]
    fn test_all_losses() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        assert_relative_eq!(Rsi::default().value(&closes), 0.0);
    }

    #[test]
    fn test_flat_series_is_neutral() {
        assert_relative_eq!(Rsi::default().value(&[42.0; 30]), 50.0);
    }

    #[test]
    fn test_alternating_series() {
        // Equal gains and losses in the seed window give RSI 50
        let closes: Vec<f64> = (0..15)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        assert_relative_eq!(Rsi::default().value(&closes), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_wilder_smoothing() {
        // Seed window: 14 gains of 1.0, then one loss of 14.0
        let mut closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        closes.push(100.0);

        // avg_gain = 13/14, avg_loss = 1.0, rs = 13/14
        let expected = 100.0 - 100.0 / (1.0 + 13.0 / 14.0);
        assert_relative_eq!(Rsi::default().value(&closes), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_value_is_bounded() {
        let closes = [
            120.0, 118.5, 121.2, 119.9, 125.0, 124.1, 126.7, 123.3, 122.0, 127.5, 130.1, 128.8,
            131.4, 129.9, 133.0, 132.2, 134.9,
        ];
        let rsi = Rsi::default().value(&closes);
        assert!((0.0..=100.0).contains(&rsi));
    }
}
