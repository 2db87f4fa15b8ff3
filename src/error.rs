use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum ProviderError {
    #[display("invalid symbol \"{symbol}\"")]
    InvalidSymbol { symbol: String },
    #[display("no data found for {symbol} on {provider}")]
    NotFound { provider: String, symbol: String },
    #[display("request to {provider} failed")]
    Request { provider: String },
    #[display("failed to parse response from {provider}")]
    ResponseParse { provider: String },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

#[derive(Debug, Display, Error)]
pub enum AnalysisError {
    #[display("insufficient data for analysis: need {required} candles, got {available}")]
    InsufficientData { required: usize, available: usize },
}

#[derive(Debug, Display, Error)]
pub enum PresentError {
    #[display("failed to render report")]
    Render,
}
