use error_stack::{Report, bail};
use serde::Serialize;

use crate::error::IndicatorError;
use crate::indicator::ema::Ema;
use crate::indicator::{Indicator, round_dp};

/// Latest MACD reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl Macd {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<Self, Report<IndicatorError>> {
        if fast_period == 0 || slow_period == 0 || signal_period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "all periods must be > 0".into(),
            });
        }
        // Aligning the two EMA lines needs a non-negative length offset.
        if fast_period >= slow_period {
            bail!(IndicatorError::InvalidParameter {
                name: "fast_period must be < slow_period".into(),
            });
        }
        Ok(Self {
            fast: Ema::new(fast_period)?,
            slow: Ema::new(slow_period)?,
            signal: Ema::new(signal_period)?,
        })
    }

    /// Latest unrounded reading; `histogram` is exactly `macd - signal`.
    pub fn evaluate_raw(&self, prices: &[f64]) -> MacdResult {
        let macd_line = self.calculate(prices);
        let Some(&macd) = macd_line.last() else {
            return MacdResult::default();
        };
        let signal = self.signal.latest(&macd_line).unwrap_or(0.0);

        MacdResult {
            macd,
            signal,
            histogram: macd - signal,
        }
    }

    /// Latest reading rounded to 4 decimals. The histogram is rounded from
    /// the raw difference, not recomputed from the rounded values.
    pub fn evaluate(&self, prices: &[f64]) -> MacdResult {
        let raw = self.evaluate_raw(prices);
        MacdResult {
            macd: round_dp(raw.macd, 4),
            signal: round_dp(raw.signal, 4),
            histogram: round_dp(raw.histogram, 4),
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        "macd"
    }

    fn required_values(&self) -> usize {
        self.slow.period() + self.signal.period() - 1
    }

    /// Returns the MACD line, aligned to the slow EMA by index offset.
    fn calculate(&self, prices: &[f64]) -> Vec<f64> {
        let fast_ema = self.fast.calculate(prices);
        let slow_ema = self.slow.calculate(prices);
        if fast_ema.is_empty() || slow_ema.is_empty() {
            return Vec::new();
        }

        let offset = fast_ema.len() - slow_ema.len();
        fast_ema[offset..]
            .iter()
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect()
    }
}
