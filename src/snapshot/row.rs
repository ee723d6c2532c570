use crate::snapshot::error::SnapshotError;

/// Header line turbostat prints at the top of every sampling interval when run
/// with `--show CPU,Avg_MHz,Busy%,Bzy_MHz`.
pub const TURBOSTAT_HEADER: &str = "CPU\tAvg_MHz\tBusy%\tBzy_MHz";

/// Number of tab-separated fields in a well-formed data row.
pub const FIELDS_PER_ROW: usize = 4;

/// A metric column of a turbostat data row. The discriminant is the field index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    AvgMhz = 1,
    BusyPercent = 2,
    BzyMhz = 3,
}

impl Metric {
    pub fn column(self) -> usize {
        self as usize
    }

    /// Column name as it appears in the header.
    pub fn name(self) -> &'static str {
        match self {
            Metric::AvgMhz => "Avg_MHz",
            Metric::BusyPercent => "Busy%",
            Metric::BzyMhz => "Bzy_MHz",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::AvgMhz | Metric::BzyMhz => "MHz",
            Metric::BusyPercent => "%",
        }
    }
}

impl TryFrom<usize> for Metric {
    type Error = SnapshotError;

    fn try_from(column: usize) -> Result<Self, Self::Error> {
        match column {
            1 => Ok(Metric::AvgMhz),
            2 => Ok(Metric::BusyPercent),
            3 => Ok(Metric::BzyMhz),
            other => Err(SnapshotError::InvalidColumn(other)),
        }
    }
}

/// What to pull out of a snapshot log: which blocks, which entity, which columns.
#[derive(Debug, Clone)]
pub struct SnapshotQuery {
    pub header: String,
    pub entity: String,
    pub metrics: Vec<Metric>,
}

impl SnapshotQuery {
    /// Query against the default turbostat header.
    pub fn new(entity: impl Into<String>, metrics: Vec<Metric>) -> Result<Self, SnapshotError> {
        if metrics.is_empty() {
            return Err(SnapshotError::NoMetrics);
        }
        Ok(Self {
            header: TURBOSTAT_HEADER.to_string(),
            entity: entity.into(),
            metrics,
        })
    }

    /// Build a query from raw field indices (1..=3).
    pub fn from_columns(entity: impl Into<String>, columns: &[usize]) -> Result<Self, SnapshotError> {
        let metrics = columns
            .iter()
            .map(|&c| Metric::try_from(c))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entity, metrics)
    }

    /// Replace the block header. Lines are compared after trimming, so the header is too.
    pub fn with_header(mut self, header: &str) -> Result<Self, SnapshotError> {
        let header = header.trim();
        if header.is_empty() {
            return Err(SnapshotError::EmptyHeader);
        }
        self.header = header.to_string();
        Ok(self)
    }
}

/// Parser output: one aligned series per requested metric.
///
/// Every series has exactly `slices` elements, one per header seen. Slices
/// where the entity was absent hold `f64::NAN`.
#[derive(Debug, Clone)]
pub struct SlicedSeries {
    pub metrics: Vec<Metric>,
    pub series: Vec<Vec<f64>>,
    pub slices: usize,
    pub missing: usize,
}

impl SlicedSeries {
    #[cfg(test)]
    pub fn get(&self, metric: Metric) -> Option<&[f64]> {
        self.metrics
            .iter()
            .position(|&m| m == metric)
            .map(|idx| self.series[idx].as_slice())
    }

    /// Time coordinate of each slice: `index * duration`.
    pub fn times(&self, duration: f64) -> Vec<f64> {
        (0..self.slices).map(|idx| idx as f64 * duration).collect()
    }
}
