use crate::model::ReportData;
use crate::render::Plotter;

/// Pretty-printed report data for external plotting tools.
pub struct JsonPlotter;

impl Plotter for JsonPlotter {
    fn render(&self, data: &ReportData) -> anyhow::Result<String> {
        let mut out = serde_json::to_string_pretty(data)?;
        out.push('\n');
        Ok(out)
    }
}
