use std::num::ParseFloatError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot log {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row for the selected entity had the right shape but a non-numeric metric.
    #[error("line {line}: {metric} value {value:?} is not a number")]
    MalformedNumber {
        line: usize,
        metric: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("no metric columns requested")]
    NoMetrics,

    #[error("column {0} is not a metric column (expected 1..=3)")]
    InvalidColumn(usize),

    #[error("block header must not be empty")]
    EmptyHeader,
}

impl SnapshotError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}
