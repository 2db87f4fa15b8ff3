pub mod levels;
pub mod report;
pub mod trend;

use chrono::{DateTime, Utc};
use error_stack::Report;
use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, IndicatorError};
use crate::indicator::ema::Ema;
use crate::indicator::macd::Macd;
use crate::indicator::rsi::Rsi;
use crate::indicator::{Indicator, round_dp};
use crate::model::{Candle, CandleSeries};

use levels::LevelDetector;
use report::{AnalysisReport, EmaSnapshot, MacdReading, RsiReading, RsiSignal};

/// Periods of the moving averages published in the report.
const EMA_PERIODS: [usize; 3] = [20, 50, 200];

/// Runs the full indicator pipeline over one candle series.
///
/// Holds no per-call state, so one analyzer can serve any number of
/// concurrent analyses.
pub struct Analyzer {
    min_candles: usize,
    emas: [Ema; 3],
    rsi: Rsi,
    macd: Macd,
    levels: LevelDetector,
}

impl Analyzer {
    pub fn new(config: &AnalysisConfig) -> Result<Self, Report<IndicatorError>> {
        let [fast, mid, slow] = EMA_PERIODS;
        Ok(Self {
            // the price change needs a previous close
            min_candles: config.min_candles.max(2),
            emas: [Ema::new(fast)?, Ema::new(mid)?, Ema::new(slow)?],
            rsi: Rsi::new(config.rsi_period)?,
            macd: Macd::new(config.macd_fast, config.macd_slow, config.macd_signal)?,
            levels: LevelDetector::new(
                config.pivot_window,
                config.cluster_tolerance,
                config.max_levels,
            ),
        })
    }

    pub fn analyze(
        &self,
        candles: Vec<Candle>,
        symbol: &str,
    ) -> Result<AnalysisReport, Report<AnalysisError>> {
        self.analyze_at(candles, symbol, Utc::now())
    }

    /// Same as [`Analyzer::analyze`] with an explicit generation timestamp.
    pub fn analyze_at(
        &self,
        candles: Vec<Candle>,
        symbol: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<AnalysisReport, Report<AnalysisError>> {
        let series = CandleSeries::validate(candles, self.min_candles)?;
        let closes = series.closes();
        self.log_warmup(symbol, closes.len());

        let current = closes[closes.len() - 1];
        let previous = closes[closes.len() - 2];
        let price_change = current - previous;
        if previous == 0.0 {
            warn!(symbol, "previous close is zero; percentage change is not finite");
        }
        let price_change_pct = price_change / previous * 100.0;

        let [ema20, ema50, ema200] = self.emas.each_ref().map(|ema| ema.latest(&closes));
        let rsi = self.rsi.value(&closes);
        let macd = self.macd.evaluate(&closes);
        let levels = self.levels.detect(series.candles());
        let trend = trend::classify(
            current,
            ema20.unwrap_or(current),
            ema50.unwrap_or(current),
            ema200.unwrap_or(current),
        );

        debug!(
            symbol,
            candles = series.len(),
            ema20,
            ema50,
            ema200,
            rsi,
            macd = macd.macd,
            macd_signal = macd.signal,
            supports = levels.support.len(),
            resistances = levels.resistance.len(),
            trend = %trend.direction,
            "analysis complete"
        );

        Ok(AnalysisReport {
            symbol: symbol.to_owned(),
            current_price: round_dp(current, 2),
            price_change: round_dp(price_change, 2),
            price_change_pct: round_dp(price_change_pct, 2),
            trend,
            ema: EmaSnapshot {
                ema20: round_dp(ema20.unwrap_or(0.0), 2),
                ema50: round_dp(ema50.unwrap_or(0.0), 2),
                ema200: round_dp(ema200.unwrap_or(0.0), 2),
            },
            rsi: RsiReading {
                value: round_dp(rsi, 2),
                signal: RsiSignal::from_value(rsi),
            },
            macd: MacdReading::new(macd),
            support: levels.support,
            resistance: levels.resistance,
            data_points: series.len(),
            last_updated: generated_at,
        })
    }

    fn indicators(&self) -> impl Iterator<Item = &dyn Indicator> {
        self.emas
            .iter()
            .map(|ema| ema as &dyn Indicator)
            .chain([&self.rsi as &dyn Indicator, &self.macd as &dyn Indicator])
    }

    /// Short series still produce a report; the affected values lean on their seeds.
    fn log_warmup(&self, symbol: &str, available: usize) {
        for indicator in self.indicators() {
            let required = indicator.required_values();
            if available < required {
                debug!(
                    symbol,
                    indicator = indicator.name(),
                    required,
                    available,
                    "indicator not fully warmed up"
                );
            }
        }
    }
}
