use std::time::Duration;

use chrono::DateTime;
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::info;

use crate::config::ProvidersConfig;
use crate::error::ProviderError;
use crate::model::{Candle, ProviderKind};
use crate::provider::DataProvider;

const PROVIDER: &str = "binance";

pub struct BinanceProvider {
    client: reqwest::Client,
    base_url: String,
    limit: usize,
}

impl BinanceProvider {
    pub fn new(config: &ProvidersConfig) -> Result<Self, Report<ProviderError>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .change_context(ProviderError::Request {
                provider: PROVIDER.into(),
            })?;
        Ok(Self {
            client,
            base_url: config.binance_base_url.trim_end_matches('/').to_owned(),
            limit: config.binance_limit,
        })
    }
}

/// Map a dashboard symbol (`BTC-USD`, `eth/usdt`) onto a USDT spot pair.
pub fn usdt_pair(symbol: &str) -> String {
    let clean = symbol.to_uppercase().replacen('-', "", 1).replacen('/', "", 1);
    if clean.contains("USDT") {
        clean
    } else {
        format!("{}USDT", clean.replacen("USD", "", 1))
    }
}

impl DataProvider for BinanceProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Binance
    }

    fn fetch_candles(
        &self,
        symbol: &str,
    ) -> BoxFuture<'_, Result<Vec<Candle>, Report<ProviderError>>> {
        let pair = usdt_pair(symbol);
        Box::pin(async move {
            let url = format!("{}/api/v3/klines", self.base_url);
            let limit_str = self.limit.to_string();
            let params = [
                ("symbol", pair.as_str()),
                ("interval", "1d"),
                ("limit", limit_str.as_str()),
            ];

            let response = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .change_context(ProviderError::Request {
                    provider: PROVIDER.into(),
                })?;

            let status = response.status();
            // Unknown pairs come back as 400 {"code":-1121,"msg":"Invalid symbol."}
            if status == StatusCode::BAD_REQUEST {
                let body = response.text().await.unwrap_or_default();
                return Err(Report::new(ProviderError::NotFound {
                    provider: PROVIDER.into(),
                    symbol: pair,
                })
                .attach(format!("response: {body}")));
            }
            if !status.is_success() {
                return Err(Report::new(ProviderError::Request {
                    provider: PROVIDER.into(),
                })
                .attach(format!("HTTP status: {status}")));
            }

            let raw: Vec<BinanceKlineRow> =
                response
                    .json()
                    .await
                    .change_context(ProviderError::ResponseParse {
                        provider: PROVIDER.into(),
                    })?;

            if raw.is_empty() {
                return Err(Report::new(ProviderError::NotFound {
                    provider: PROVIDER.into(),
                    symbol: pair,
                }));
            }

            info!(pair = %pair, fetched = raw.len(), "binance candle fetch complete");

            let candles = raw
                .into_iter()
                .map(BinanceKlineRow::into_candle)
                .collect::<Result<Vec<_>, _>>()?;

            Ok(candles)
        })
    }
}

// ── REST response types ───────────────────────────────────────────────────────

/// Binance kline row: 12-element array
/// [open_time, open, high, low, close, volume, close_time, ...]
#[derive(Debug, Deserialize)]
struct BinanceKlineRow(
    i64,                        // 0: open_time (ms)
    String,                     // 1: open
    String,                     // 2: high
    String,                     // 3: low
    String,                     // 4: close
    String,                     // 5: volume
    #[allow(dead_code)] i64,    // 6: close_time
    #[allow(dead_code)] String, // 7: quote asset volume
    #[allow(dead_code)] i64,    // 8: number of trades
    #[allow(dead_code)] String, // 9: taker buy base volume
    #[allow(dead_code)] String, // 10: taker buy quote volume
    #[allow(dead_code)] String, // 11: ignore
);

impl BinanceKlineRow {
    fn into_candle(self) -> Result<Candle, Report<ProviderError>> {
        let parse_f64 = |s: &str| -> Result<f64, Report<ProviderError>> {
            s.parse::<f64>()
                .change_context(ProviderError::ResponseParse {
                    provider: PROVIDER.into(),
                })
                .attach_with(|| format!("value: {s}"))
        };

        let date = DateTime::from_timestamp_millis(self.0)
            .ok_or_else(|| {
                Report::new(ProviderError::ResponseParse {
                    provider: PROVIDER.into(),
                })
                .attach(format!("open time out of range: {}", self.0))
            })?
            .date_naive();

        Ok(Candle {
            date,
            open: parse_f64(&self.1)?,
            high: parse_f64(&self.2)?,
            low: parse_f64(&self.3)?,
            close: parse_f64(&self.4)?,
            volume: parse_f64(&self.5)?,
        })
    }
}
