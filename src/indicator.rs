pub mod ema;
pub mod macd;
pub mod rsi;

use crate::model::Candle;

/// A technical indicator computed over a price sequence.
///
/// Prices must be in ascending chronological order (oldest first).
pub trait Indicator: Send + Sync {
    /// Short name of this indicator (e.g., "rsi", "ema20").
    fn name(&self) -> &str;

    /// Number of prices needed before the output stops being a default or seed-only value.
    fn required_values(&self) -> usize;

    /// Calculate indicator values from prices.
    ///
    /// The output may be shorter than the input depending on the indicator's
    /// lookback; its last element always corresponds to the last price.
    fn calculate(&self, prices: &[f64]) -> Vec<f64>;

    /// Most recent indicator value, if any.
    fn latest(&self, prices: &[f64]) -> Option<f64> {
        self.calculate(prices).last().copied()
    }
}

/// Extract close prices from a slice of candles.
pub fn close_prices(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Round to a fixed number of decimal places.
pub fn round_dp(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
