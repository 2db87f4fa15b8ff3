pub mod json;
pub mod text;

use error_stack::Report;
use serde::Serialize;

use crate::analysis::report::AnalysisReport;
use crate::error::PresentError;
use crate::model::{AssetClass, ProviderKind};

/// A report together with where its candles came from.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisEnvelope {
    #[serde(flatten)]
    pub report: AnalysisReport,
    pub source: ProviderKind,
    #[serde(rename = "type")]
    pub asset_class: AssetClass,
}

/// Renders an analysis for display or transport.
pub trait Presenter: Send + Sync {
    fn render(&self, envelope: &AnalysisEnvelope) -> Result<String, Report<PresentError>>;
}
