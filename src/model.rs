use std::fmt;

use chrono::NaiveDate;
use error_stack::{Report, bail};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Upstream market-data source a candle series was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "Yahoo Finance")]
    Yahoo,
    #[serde(rename = "Binance")]
    Binance,
}

impl ProviderKind {
    /// Parse a config-format string (`"yahoo"` | `"binance"`).
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "yahoo" => Some(Self::Yahoo),
            "binance" => Some(Self::Binance),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yahoo => write!(f, "Yahoo Finance"),
            Self::Binance => write!(f, "Binance"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Crypto,
    Stock,
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crypto => write!(f, "crypto"),
            Self::Stock => write!(f, "stock"),
        }
    }
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A chronological candle series that is long enough to analyze.
///
/// Date ordering and price positivity are the provider's responsibility;
/// only the length is checked here.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn validate(
        candles: Vec<Candle>,
        min_candles: usize,
    ) -> Result<Self, Report<AnalysisError>> {
        if candles.len() < min_candles {
            bail!(AnalysisError::InsufficientData {
                required: min_candles,
                available: candles.len(),
            });
        }
        Ok(Self { candles })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Close prices in series order.
    pub fn closes(&self) -> Vec<f64> {
        crate::indicator::close_prices(&self.candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_candles(n: usize) -> Vec<Candle> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| Candle {
                date: start + chrono::Duration::days(i as i64),
                open: 10.0,
                high: 10.0,
                low: 10.0,
                close: 10.0,
                volume: 0.0,
            })
            .collect()
    }

    #[test]
    fn series_below_minimum_rejected() {
        let err = CandleSeries::validate(flat_candles(29), 30).unwrap_err();
        assert!(matches!(
            err.current_context(),
            AnalysisError::InsufficientData {
                required: 30,
                available: 29
            }
        ));
    }

    #[test]
    fn series_at_minimum_accepted() {
        let series = CandleSeries::validate(flat_candles(30), 30).unwrap();
        assert_eq!(series.len(), 30);
        assert_eq!(series.closes().len(), 30);
    }

    #[test]
    fn empty_series_rejected() {
        assert!(CandleSeries::validate(Vec::new(), 30).is_err());
    }

    #[test]
    fn provider_kind_from_str() {
        assert_eq!(ProviderKind::from_str("yahoo"), Some(ProviderKind::Yahoo));
        assert_eq!(ProviderKind::from_str("binance"), Some(ProviderKind::Binance));
        assert_eq!(ProviderKind::from_str("upbit"), None);
    }

    #[test]
    fn provider_kind_serializes_as_source_label() {
        let json = serde_json::to_string(&ProviderKind::Yahoo).unwrap();
        assert_eq!(json, "\"Yahoo Finance\"");
        assert_eq!(ProviderKind::Binance.to_string(), "Binance");
    }

    #[test]
    fn asset_class_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AssetClass::Crypto).unwrap(),
            "\"crypto\""
        );
        assert_eq!(AssetClass::Stock.to_string(), "stock");
    }
}
