use error_stack::{Report, ResultExt};

use crate::error::PresentError;
use crate::presenter::{AnalysisEnvelope, Presenter};

/// Emits the report in its JSON wire shape.
pub struct JsonPresenter {
    pub pretty: bool,
}

impl Presenter for JsonPresenter {
    fn render(&self, envelope: &AnalysisEnvelope) -> Result<String, Report<PresentError>> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(envelope)
        } else {
            serde_json::to_string(envelope)
        };
        rendered
            .change_context(PresentError::Render)
            .attach_with(|| format!("symbol: {}", envelope.report.symbol))
    }
}
