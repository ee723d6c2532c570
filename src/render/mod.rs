//! Output side: everything that turns [`ReportData`] into a file.

pub mod html;
pub mod json;

use crate::model::ReportData;
use anyhow::Context;
use std::path::Path;

pub use html::HtmlPlotter;
pub use json::JsonPlotter;

/// Chart renderer for a finished report.
pub trait Plotter {
    fn render(&self, data: &ReportData) -> anyhow::Result<String>;
}

/// `.json` gets the raw report, anything else the HTML chart page.
pub fn plotter_for(path: &Path) -> Box<dyn Plotter> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Box::new(JsonPlotter)
    } else {
        Box::new(HtmlPlotter)
    }
}

pub fn write_report(path: &Path, data: &ReportData) -> anyhow::Result<()> {
    let rendered = plotter_for(path).render(data)?;
    std::fs::write(path, rendered).with_context(|| format!("write report {}", path.display()))?;
    Ok(())
}
