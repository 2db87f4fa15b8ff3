use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::ProviderKind;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_min_candles() -> usize {
    30
}

fn default_rsi_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_pivot_window() -> usize {
    2
}

fn default_cluster_tolerance() -> f64 {
    0.02
}

fn default_max_levels() -> usize {
    3
}

fn default_crypto_source() -> String {
    "yahoo".into()
}

fn default_history_days() -> i64 {
    180
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_yahoo_base_url() -> String {
    "https://query1.finance.yahoo.com".into()
}

fn default_binance_base_url() -> String {
    "https://api.binance.com".into()
}

fn default_binance_limit() -> usize {
    180
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// Tuning of the indicator pipeline. Defaults reproduce the published report.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_min_candles")]
    pub min_candles: usize,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
    /// Candles on each side a pivot must beat.
    #[serde(default = "default_pivot_window")]
    pub pivot_window: usize,
    /// Relative distance under which pivot prices share a cluster.
    #[serde(default = "default_cluster_tolerance")]
    pub cluster_tolerance: f64,
    #[serde(default = "default_max_levels")]
    pub max_levels: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_candles: default_min_candles(),
            rsi_period: default_rsi_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            pivot_window: default_pivot_window(),
            cluster_tolerance: default_cluster_tolerance(),
            max_levels: default_max_levels(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Source for crypto symbols: `"yahoo"` | `"binance"`. Stocks always use Yahoo.
    #[serde(default = "default_crypto_source")]
    pub crypto_source: String,
    /// Daily history requested from Yahoo.
    #[serde(default = "default_history_days")]
    pub history_days: i64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,
    #[serde(default = "default_binance_base_url")]
    pub binance_base_url: String,
    /// Daily klines requested from Binance (max 1000).
    #[serde(default = "default_binance_limit")]
    pub binance_limit: usize,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            crypto_source: default_crypto_source(),
            history_days: default_history_days(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            yahoo_base_url: default_yahoo_base_url(),
            binance_base_url: default_binance_base_url(),
            binance_limit: default_binance_limit(),
        }
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const VALID_LOG_FORMATS: &[&str] = &["text", "json"];

pub fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_general(&config.general)?;
    validate_periods(&config.analysis)?;
    validate_levels(&config.analysis)?;
    validate_providers(&config.providers)?;
    Ok(())
}

fn invalid(field: String) -> Report<ConfigError> {
    Report::new(ConfigError::Validation { field })
}

fn validate_general(general: &GeneralConfig) -> Result<(), Report<ConfigError>> {
    if !VALID_LOG_FORMATS.contains(&general.log_format.as_str()) {
        return Err(invalid(format!(
            "general.log_format \"{}\" is not one of {VALID_LOG_FORMATS:?}",
            general.log_format
        )));
    }
    Ok(())
}

fn validate_periods(analysis: &AnalysisConfig) -> Result<(), Report<ConfigError>> {
    let periods = [
        ("rsi_period", analysis.rsi_period),
        ("macd_fast", analysis.macd_fast),
        ("macd_slow", analysis.macd_slow),
        ("macd_signal", analysis.macd_signal),
    ];
    for (name, value) in periods {
        if value == 0 {
            return Err(invalid(format!("analysis.{name} must be > 0")));
        }
    }

    if analysis.macd_fast >= analysis.macd_slow {
        return Err(invalid(format!(
            "analysis.macd_fast ({}) must be < analysis.macd_slow ({})",
            analysis.macd_fast, analysis.macd_slow
        )));
    }

    if analysis.min_candles < 2 {
        return Err(invalid("analysis.min_candles must be >= 2".into()));
    }
    Ok(())
}

fn validate_levels(analysis: &AnalysisConfig) -> Result<(), Report<ConfigError>> {
    if analysis.pivot_window == 0 {
        return Err(invalid("analysis.pivot_window must be > 0".into()));
    }
    if !(analysis.cluster_tolerance > 0.0 && analysis.cluster_tolerance < 1.0) {
        return Err(invalid(format!(
            "analysis.cluster_tolerance {} must be in (0, 1)",
            analysis.cluster_tolerance
        )));
    }
    if analysis.max_levels == 0 {
        return Err(invalid("analysis.max_levels must be > 0".into()));
    }
    Ok(())
}

fn validate_providers(providers: &ProvidersConfig) -> Result<(), Report<ConfigError>> {
    if ProviderKind::from_str(&providers.crypto_source).is_none() {
        return Err(invalid(format!(
            "providers.crypto_source \"{}\" must be \"yahoo\" or \"binance\"",
            providers.crypto_source
        )));
    }
    if providers.history_days <= 0 {
        return Err(invalid("providers.history_days must be > 0".into()));
    }
    if providers.binance_limit == 0 || providers.binance_limit > 1000 {
        return Err(invalid(format!(
            "providers.binance_limit {} must be in 1..=1000",
            providers.binance_limit
        )));
    }
    if providers.request_timeout_secs == 0 {
        return Err(invalid("providers.request_timeout_secs must be > 0".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        toml::from_str(toml).expect("parse failed")
    }

    #[test]
    fn valid_full_config_parses() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "json"

[analysis]
min_candles = 60
rsi_period = 10
macd_fast = 8
macd_slow = 21
macd_signal = 5
pivot_window = 3
cluster_tolerance = 0.015
max_levels = 4

[providers]
crypto_source = "binance"
history_days = 365
request_timeout_secs = 5
max_retries = 0
yahoo_base_url = "http://localhost:8080"
binance_base_url = "http://localhost:8081"
binance_limit = 500
"#;
        let config = parse(toml);
        assert!(validate(&config).is_ok());
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.analysis.min_candles, 60);
        assert_eq!(config.analysis.macd_slow, 21);
        assert_eq!(config.analysis.cluster_tolerance, 0.015);
        assert_eq!(config.providers.crypto_source, "binance");
        assert_eq!(config.providers.binance_limit, 500);
    }

    #[test]
    fn defaults_applied_when_fields_omitted() {
        let config = parse("");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "text");
        assert_eq!(config.analysis.min_candles, 30);
        assert_eq!(config.analysis.rsi_period, 14);
        assert_eq!(
            (
                config.analysis.macd_fast,
                config.analysis.macd_slow,
                config.analysis.macd_signal
            ),
            (12, 26, 9)
        );
        assert_eq!(config.analysis.pivot_window, 2);
        assert_eq!(config.analysis.cluster_tolerance, 0.02);
        assert_eq!(config.analysis.max_levels, 3);
        assert_eq!(config.providers.crypto_source, "yahoo");
        assert_eq!(config.providers.history_days, 180);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn default_impl_matches_empty_file() {
        let parsed = parse("");
        let built = AppConfig::default();
        assert_eq!(parsed.analysis.min_candles, built.analysis.min_candles);
        assert_eq!(parsed.providers.yahoo_base_url, built.providers.yahoo_base_url);
        assert_eq!(parsed.general.log_format, built.general.log_format);
    }

    #[test]
    fn macd_fast_not_below_slow_rejected() {
        let config = parse(
            r#"
[analysis]
macd_fast = 26
macd_slow = 26
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_period_rejected() {
        let config = parse(
            r#"
[analysis]
rsi_period = 0
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn tolerance_out_of_range_rejected() {
        let config = parse(
            r#"
[analysis]
cluster_tolerance = 1.5
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn unknown_crypto_source_rejected() {
        let config = parse(
            r#"
[providers]
crypto_source = "upbit"
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn unknown_log_format_rejected() {
        let config = parse(
            r#"
[general]
log_format = "xml"
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn min_candles_below_two_rejected() {
        let config = parse(
            r#"
[analysis]
min_candles = 1
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load(Path::new("/nonexistent/market-insight.toml")).unwrap_err();
        assert!(matches!(err.current_context(), ConfigError::ReadFile));
    }
}
