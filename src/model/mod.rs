//! Report model: aligned series + time axis + per-metric statistics, in the
//! shape handed to the plot renderer.

use crate::snapshot::{SlicedSeries, SnapshotQuery};
use crate::stats::{self, Summary, Variance};
use log::warn;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MetricSeries {
    pub name: String,
    pub unit: String,
    /// One value per slice; NaN (serialized as null) where the entity was absent.
    pub values: Vec<f64>,
    /// Statistics over the finite values only.
    pub summary: Summary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub title: String,
    pub entity: String,
    pub header: String,
    pub time_slice_duration: f64,
    pub slices: usize,
    pub missing_slices: usize,
    pub times: Vec<f64>,
    pub metrics: Vec<MetricSeries>,
}

/// Build report data from a parsed log.
pub fn build_report_data(
    query: &SnapshotQuery,
    parsed: SlicedSeries,
    time_slice_duration: f64,
    variance: Variance,
) -> ReportData {
    let names: Vec<&str> = query.metrics.iter().map(|m| m.name()).collect();
    let title = format!("CPU {} {} over Time", query.entity, names.join(" and "));

    if parsed.slices > 0 && parsed.missing == parsed.slices {
        warn!(
            "entity {:?} does not appear in any of the {} slices",
            query.entity, parsed.slices
        );
    }

    let times = parsed.times(time_slice_duration);

    let metrics = parsed
        .metrics
        .iter()
        .zip(parsed.series)
        .map(|(metric, values)| {
            let finite = stats::finite(&values);
            if let Err(e) = stats::std_dev(&finite, variance) {
                warn!("{}: {}", metric.name(), e);
            }
            let summary = stats::summarize(&finite, variance);
            MetricSeries {
                name: metric.name().to_string(),
                unit: metric.unit().to_string(),
                values,
                summary,
            }
        })
        .collect();

    ReportData {
        title,
        entity: query.entity.clone(),
        header: query.header.clone(),
        time_slice_duration,
        slices: parsed.slices,
        missing_slices: parsed.missing,
        times,
        metrics,
    }
}
