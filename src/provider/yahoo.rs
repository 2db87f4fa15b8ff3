use std::time::Duration;

use chrono::{DateTime, Utc};
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::ProvidersConfig;
use crate::error::ProviderError;
use crate::model::{Candle, ProviderKind};
use crate::provider::DataProvider;

const PROVIDER: &str = "yahoo";
// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; market-insight/0.1)";

pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
    history_days: i64,
}

impl YahooProvider {
    pub fn new(config: &ProvidersConfig) -> Result<Self, Report<ProviderError>> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .change_context(ProviderError::Request {
                provider: PROVIDER.into(),
            })?;
        Ok(Self {
            client,
            base_url: config.yahoo_base_url.trim_end_matches('/').to_owned(),
            history_days: config.history_days,
        })
    }
}

impl DataProvider for YahooProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Yahoo
    }

    fn fetch_candles(
        &self,
        symbol: &str,
    ) -> BoxFuture<'_, Result<Vec<Candle>, Report<ProviderError>>> {
        let symbol = symbol.to_owned();
        Box::pin(async move {
            let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
            let end = Utc::now();
            let start = end - chrono::Duration::days(self.history_days);

            let period1 = start.timestamp().to_string();
            let period2 = end.timestamp().to_string();
            let params = [
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
            ];

            let response = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .change_context(ProviderError::Request {
                    provider: PROVIDER.into(),
                })
                .attach_with(|| format!("url: {url}"))?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(Report::new(ProviderError::NotFound {
                    provider: PROVIDER.into(),
                    symbol,
                }));
            }
            if !status.is_success() {
                return Err(Report::new(ProviderError::Request {
                    provider: PROVIDER.into(),
                })
                .attach(format!("HTTP status: {status}")));
            }

            let body: ChartResponse =
                response
                    .json()
                    .await
                    .change_context(ProviderError::ResponseParse {
                        provider: PROVIDER.into(),
                    })?;

            let candles = body.into_candles()?;
            if candles.is_empty() {
                return Err(Report::new(ProviderError::NotFound {
                    provider: PROVIDER.into(),
                    symbol,
                }));
            }

            info!(
                symbol = %symbol,
                fetched = candles.len(),
                "yahoo candle fetch complete"
            );

            Ok(candles)
        })
    }
}

// ── REST response types ───────────────────────────────────────────────────────

/// `{ "chart": { "result": [ ... ], "error": null } }`
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    /// Bar open times (s epoch). Absent when the range holds no bars.
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

/// Column-oriented OHLCV; any cell may be `null` for halted or partial days.
#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Rows missing any price are dropped; a missing volume counts as zero.
    fn into_candles(self) -> Result<Vec<Candle>, Report<ProviderError>> {
        if let Some(error) = self.chart.error {
            debug!(code = %error.code, description = ?error.description, "yahoo chart error");
            return Ok(Vec::new());
        }

        let Some(result) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(Vec::new());
        };
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .unwrap_or_default();

        let cell = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

        let mut candles = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let (Some(open), Some(high), Some(low), Some(close)) = (
                cell(&quote.open, i),
                cell(&quote.high, i),
                cell(&quote.low, i),
                cell(&quote.close, i),
            ) else {
                continue;
            };

            let date = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| {
                    Report::new(ProviderError::ResponseParse {
                        provider: PROVIDER.into(),
                    })
                    .attach(format!("timestamp out of range: {ts}"))
                })?
                .date_naive();

            candles.push(Candle {
                date,
                open,
                high,
                low,
                close,
                volume: cell(&quote.volume, i).unwrap_or(0.0),
            });
        }

        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn chart_response_parses_into_candles() {
        let json = r#"{
            "chart": {
                "result": [{
                    "meta": { "symbol": "AAPL" },
                    "timestamp": [1704205800, 1704292200, 1704378600],
                    "indicators": {
                        "quote": [{
                            "open":   [187.15, null, 182.15],
                            "high":   [188.44, 185.88, 183.09],
                            "low":    [183.89, 183.43, 180.88],
                            "close":  [185.64, 184.25, 181.91],
                            "volume": [82488700, 58414500, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let response: ChartResponse = serde_json::from_str(json).unwrap();
        let candles = response.into_candles().unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(candles[0].close, 185.64);
        assert_eq!(candles[0].volume, 82488700.0);
        assert_eq!(candles[1].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(candles[1].volume, 0.0);
    }

    #[test]
    fn chart_error_yields_no_candles() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }"#;
        let response: ChartResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_candles().unwrap().is_empty());
    }

    #[test]
    fn result_without_timestamps_yields_no_candles() {
        let json = r#"{
            "chart": {
                "result": [{ "indicators": { "quote": [{}] } }],
                "error": null
            }
        }"#;
        let response: ChartResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_candles().unwrap().is_empty());
    }

    /// Integration test: requires network access. Run with `cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn integration_fetch_candles() {
        let provider = YahooProvider::new(&ProvidersConfig::default()).unwrap();
        let candles = provider.fetch_candles("AAPL").await.unwrap();
        assert!(candles.len() >= 30);
    }
}
