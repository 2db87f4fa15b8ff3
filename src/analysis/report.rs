use chrono::{DateTime, SecondsFormat, Utc};
use derive_more::Display;
use serde::{Serialize, Serializer};

use crate::analysis::trend::TrendResult;
use crate::indicator::macd::MacdResult;

/// Technical-analysis report for one symbol.
///
/// Field names are the JSON contract consumed by the API and dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub symbol: String,
    pub current_price: f64,
    pub price_change: f64,
    pub price_change_pct: f64,
    pub trend: TrendResult,
    pub ema: EmaSnapshot,
    pub rsi: RsiReading,
    pub macd: MacdReading,
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
    pub data_points: usize,
    #[serde(serialize_with = "iso_millis")]
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmaSnapshot {
    pub ema20: f64,
    pub ema50: f64,
    pub ema200: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RsiReading {
    pub value: f64,
    pub signal: RsiSignal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdReading {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub signal_interpretation: MacdSignal,
}

impl MacdReading {
    pub fn new(result: MacdResult) -> Self {
        Self {
            macd: result.macd,
            signal: result.signal,
            histogram: result.histogram,
            signal_interpretation: MacdSignal::from_reading(&result),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Bullish,
    Bearish,
    Neutral,
}

impl RsiSignal {
    pub fn from_value(rsi: f64) -> Self {
        if rsi > 70.0 {
            Self::Overbought
        } else if rsi < 30.0 {
            Self::Oversold
        } else if rsi > 60.0 {
            Self::Bullish
        } else if rsi < 40.0 {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum MacdSignal {
    #[display("Strong Buy")]
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Buy,
    #[display("Strong Sell")]
    #[serde(rename = "Strong Sell")]
    StrongSell,
    Sell,
    Neutral,
}

impl MacdSignal {
    pub fn from_reading(reading: &MacdResult) -> Self {
        let (macd, histogram) = (reading.macd, reading.histogram);
        if histogram > 0.0 && macd > 0.0 {
            Self::StrongBuy
        } else if histogram > 0.0 {
            Self::Buy
        } else if histogram < 0.0 && macd < 0.0 {
            Self::StrongSell
        } else if histogram < 0.0 {
            Self::Sell
        } else {
            Self::Neutral
        }
    }
}

fn iso_millis<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
}
