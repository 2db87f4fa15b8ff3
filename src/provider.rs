pub mod binance;
pub mod yahoo;

use std::time::Duration;

use error_stack::{Report, bail};
use futures::future::BoxFuture;
use tokio::time::sleep;
use tracing::warn;

use crate::config::ProvidersConfig;
use crate::error::ProviderError;
use crate::model::{AssetClass, Candle, ProviderKind};

const MAX_SYMBOL_LEN: usize = 20;
const INITIAL_BACKOFF_MS: u64 = 500;
const MAX_BACKOFF_SECS: u64 = 8;

/// Source of daily candles for a symbol.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn DataProvider`).
pub trait DataProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Fetch daily candles, oldest first.
    fn fetch_candles(&self, symbol: &str)
    -> BoxFuture<'_, Result<Vec<Candle>, Report<ProviderError>>>;
}

/// Trim and upper-case a user-supplied symbol.
pub fn normalize_symbol(raw: &str) -> Result<String, Report<ProviderError>> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() || symbol.chars().count() > MAX_SYMBOL_LEN {
        bail!(ProviderError::InvalidSymbol {
            symbol: raw.to_owned(),
        });
    }
    Ok(symbol)
}

/// Crypto pairs are written with a dash (`BTC-USD`); plain tickers are stocks.
pub fn is_crypto(symbol: &str) -> bool {
    symbol.contains('-')
}

pub fn asset_class(symbol: &str) -> AssetClass {
    if is_crypto(symbol) {
        AssetClass::Crypto
    } else {
        AssetClass::Stock
    }
}

/// Provider that serves `asset`. Stocks always come from Yahoo.
pub fn source_for(asset: AssetClass, config: &ProvidersConfig) -> ProviderKind {
    match asset {
        AssetClass::Stock => ProviderKind::Yahoo,
        AssetClass::Crypto => {
            ProviderKind::from_str(&config.crypto_source).unwrap_or(ProviderKind::Yahoo)
        }
    }
}

pub fn build_provider(
    kind: ProviderKind,
    config: &ProvidersConfig,
) -> Result<Box<dyn DataProvider>, Report<ProviderError>> {
    let provider: Box<dyn DataProvider> = match kind {
        ProviderKind::Yahoo => Box::new(yahoo::YahooProvider::new(config)?),
        ProviderKind::Binance => Box::new(binance::BinanceProvider::new(config)?),
    };
    Ok(provider)
}

/// Fetch candles, retrying transport failures with exponential backoff.
///
/// Missing symbols and malformed responses are returned immediately.
pub async fn fetch_with_retry(
    provider: &dyn DataProvider,
    symbol: &str,
    max_retries: u32,
) -> Result<Vec<Candle>, Report<ProviderError>> {
    let mut backoff = Duration::from_millis(INITIAL_BACKOFF_MS);
    let mut attempt = 0;

    loop {
        match provider.fetch_candles(symbol).await {
            Ok(candles) => return Ok(candles),
            Err(e)
                if attempt < max_retries
                    && matches!(e.current_context(), ProviderError::Request { .. }) =>
            {
                attempt += 1;
                warn!(
                    provider = %provider.kind(),
                    symbol,
                    attempt,
                    error = %e,
                    "candle fetch failed, retrying..."
                );
                sleep(backoff).await;
                backoff = (backoff * 2).min(Duration::from_secs(MAX_BACKOFF_SECS));
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FlakyProvider {
        failures: usize,
        calls: AtomicUsize,
        error: fn() -> ProviderError,
    }

    impl DataProvider for FlakyProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Yahoo
        }

        fn fetch_candles(
            &self,
            _symbol: &str,
        ) -> BoxFuture<'_, Result<Vec<Candle>, Report<ProviderError>>> {
            Box::pin(async move {
                let call = self.calls.fetch_add(1, Ordering::SeqCst);
                if call < self.failures {
                    return Err(Report::new((self.error)()));
                }
                Ok(Vec::<Candle>::new())
            })
        }
    }

    fn request_error() -> ProviderError {
        ProviderError::Request {
            provider: "test".into(),
        }
    }

    fn not_found() -> ProviderError {
        ProviderError::NotFound {
            provider: "test".into(),
            symbol: "NOPE".into(),
        }
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_symbol("  btc-usd ").unwrap(), "BTC-USD");
        assert_eq!(normalize_symbol("aapl").unwrap(), "AAPL");
    }

    #[test]
    fn normalize_rejects_empty_and_long_symbols() {
        assert!(normalize_symbol("   ").is_err());
        assert!(normalize_symbol("ABCDEFGHIJKLMNOPQRSTU").is_err());
        assert!(normalize_symbol("ABCDEFGHIJKLMNOPQRST").is_ok());
    }

    #[test]
    fn dash_marks_crypto() {
        assert!(is_crypto("BTC-USD"));
        assert!(!is_crypto("AAPL"));
        assert_eq!(asset_class("ETH-USD"), AssetClass::Crypto);
        assert_eq!(asset_class("MSFT"), AssetClass::Stock);
    }

    #[test]
    fn stocks_always_use_yahoo() {
        let config = ProvidersConfig {
            crypto_source: "binance".into(),
            ..ProvidersConfig::default()
        };
        assert_eq!(source_for(AssetClass::Stock, &config), ProviderKind::Yahoo);
        assert_eq!(
            source_for(AssetClass::Crypto, &config),
            ProviderKind::Binance
        );
        assert_eq!(
            source_for(AssetClass::Crypto, &ProvidersConfig::default()),
            ProviderKind::Yahoo
        );
    }

    #[tokio::test]
    async fn retries_request_failures() {
        let provider = FlakyProvider {
            failures: 1,
            calls: AtomicUsize::new(0),
            error: request_error,
        };
        assert!(fetch_with_retry(&provider, "AAPL", 1).await.is_ok());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let provider = FlakyProvider {
            failures: 5,
            calls: AtomicUsize::new(0),
            error: request_error,
        };
        assert!(fetch_with_retry(&provider, "AAPL", 0).await.is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let provider = FlakyProvider {
            failures: 1,
            calls: AtomicUsize::new(0),
            error: not_found,
        };
        let err = fetch_with_retry(&provider, "NOPE", 3).await.unwrap_err();
        assert!(matches!(err.current_context(), ProviderError::NotFound { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
