use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::Indicator;

/// Exponential Moving Average.
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self {
            period,
            name: format!("ema{period}"),
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_values(&self) -> usize {
        self.period
    }

    /// The first value is the mean of the first `min(period, len)` prices and
    /// lines up with price index `period - 1`. Inputs no longer than `period`
    /// produce the seed only; an empty input produces nothing.
    fn calculate(&self, prices: &[f64]) -> Vec<f64> {
        if prices.is_empty() {
            return Vec::new();
        }

        let k = 2.0 / (self.period as f64 + 1.0);
        let seed_len = self.period.min(prices.len());
        let seed = prices[..seed_len].iter().sum::<f64>() / seed_len as f64;
        let rest = prices.get(self.period..).unwrap_or(&[]);

        let mut results = Vec::with_capacity(rest.len() + 1);
        results.push(seed);
        rest.iter().fold(seed, |prev, &price| {
            let ema = (price - prev) * k + prev;
            results.push(ema);
            ema
        });

        results
    }
}
