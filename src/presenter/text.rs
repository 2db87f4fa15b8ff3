use std::fmt::{self, Write};

use error_stack::{Report, ResultExt};

use crate::error::PresentError;
use crate::presenter::{AnalysisEnvelope, Presenter};

/// Human-readable summary for the terminal.
pub struct TextPresenter;

fn join_levels(levels: &[f64]) -> String {
    if levels.is_empty() {
        return "none".into();
    }
    levels
        .iter()
        .map(|l| format!("{l:.2}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_summary(out: &mut String, envelope: &AnalysisEnvelope) -> fmt::Result {
    let r = &envelope.report;
    writeln!(
        out,
        "{} ({}, {}, {} candles)",
        r.symbol, envelope.asset_class, envelope.source, r.data_points
    )?;
    writeln!(
        out,
        "  Price      {:.2}  {:+.2} ({:+.2}%)",
        r.current_price, r.price_change, r.price_change_pct
    )?;
    writeln!(out, "  Trend      {} ({})", r.trend.direction, r.trend.strength)?;
    writeln!(
        out,
        "  EMA        20: {:.2}  50: {:.2}  200: {:.2}",
        r.ema.ema20, r.ema.ema50, r.ema.ema200
    )?;
    writeln!(out, "  RSI        {:.2} {}", r.rsi.value, r.rsi.signal)?;
    writeln!(
        out,
        "  MACD       {:.4}  signal {:.4}  hist {:.4}  {}",
        r.macd.macd, r.macd.signal, r.macd.histogram, r.macd.signal_interpretation
    )?;
    writeln!(out, "  Support    {}", join_levels(&r.support))?;
    writeln!(out, "  Resistance {}", join_levels(&r.resistance))?;
    write!(out, "  Updated    {}", r.last_updated.to_rfc3339())
}

impl Presenter for TextPresenter {
    fn render(&self, envelope: &AnalysisEnvelope) -> Result<String, Report<PresentError>> {
        let mut out = String::new();
        write_summary(&mut out, envelope)
            .change_context(PresentError::Render)
            .attach_with(|| format!("symbol: {}", envelope.report.symbol))?;
        Ok(out)
    }
}
