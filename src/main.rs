mod analysis;
mod config;
mod error;
mod indicator;
mod model;
mod presenter;
mod provider;

use std::path::Path;

use clap::{Parser, ValueEnum};
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use analysis::Analyzer;
use config::AppConfig;
use presenter::json::JsonPresenter;
use presenter::text::TextPresenter;
use presenter::{AnalysisEnvelope, Presenter};

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("market data error")]
    Provider,
    #[display("analysis error")]
    Analysis,
    #[display("output error")]
    Present,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "market-insight",
    about = "Technical analysis report for a stock or crypto symbol"
)]
struct Cli {
    /// Ticker (`AAPL`) or crypto pair (`BTC-USD`)
    symbol: String,

    /// Path to the TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Indent JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load(Path::new(path)).change_context(AppError::Config)?,
        None => AppConfig::default(),
    };

    init_tracing(&config);

    let symbol = provider::normalize_symbol(&cli.symbol).change_context(AppError::Provider)?;
    let asset_class = provider::asset_class(&symbol);
    let source = provider::source_for(asset_class, &config.providers);
    info!(symbol = %symbol, asset = %asset_class, source = %source, "analyzing");

    let data_provider =
        provider::build_provider(source, &config.providers).change_context(AppError::Provider)?;
    let candles =
        provider::fetch_with_retry(data_provider.as_ref(), &symbol, config.providers.max_retries)
            .await
            .change_context(AppError::Provider)?;

    let analyzer = Analyzer::new(&config.analysis).change_context(AppError::Config)?;
    let report = analyzer
        .analyze(candles, &symbol)
        .change_context(AppError::Analysis)
        .attach_with(|| format!("symbol: {symbol}, source: {source}"))?;

    let envelope = AnalysisEnvelope {
        report,
        source,
        asset_class,
    };
    let presenter: Box<dyn Presenter> = match cli.format {
        OutputFormat::Text => Box::new(TextPresenter),
        OutputFormat::Json => Box::new(JsonPresenter { pretty: cli.pretty }),
    };
    let rendered = presenter
        .render(&envelope)
        .change_context(AppError::Present)?;
    println!("{rendered}");

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
