use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::Indicator;

/// Value reported when there are too few prices to measure momentum.
pub const NEUTRAL_RSI: f64 = 50.0;

/// RSI (Relative Strength Index) using Wilder's smoothing method.
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    /// Final RSI after smoothing over the whole sequence, in `[0, 100]`.
    pub fn value(&self, prices: &[f64]) -> f64 {
        self.latest(prices).unwrap_or(NEUTRAL_RSI)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "rsi"
    }

    fn required_values(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, prices: &[f64]) -> Vec<f64> {
        if prices.len() < self.required_values() {
            return vec![NEUTRAL_RSI];
        }

        let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
        let period = self.period as f64;

        // Seed using simple average of first `period` gains/losses
        let mut avg_gain = deltas[..self.period]
            .iter()
            .map(|&d| d.max(0.0))
            .sum::<f64>()
            / period;
        let mut avg_loss = deltas[..self.period]
            .iter()
            .map(|&d| (-d).max(0.0))
            .sum::<f64>()
            / period;

        let mut results = Vec::with_capacity(deltas.len() - self.period + 1);
        results.push(rsi_value(avg_gain, avg_loss));

        for &delta in &deltas[self.period..] {
            avg_gain = (avg_gain * (period - 1.0) + delta.max(0.0)) / period;
            avg_loss = (avg_loss * (period - 1.0) + (-delta).max(0.0)) / period;
            results.push(rsi_value(avg_gain, avg_loss));
        }

        results
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
