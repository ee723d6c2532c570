//! Single-column reader for flat numeric logs (one sample per line, optionally
//! several whitespace or tab separated fields).
//!
//! Lines whose selected field is missing or not a number are skipped: headers,
//! comments and truncated tail lines are expected in this kind of log.

use log::{debug, trace};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColumnError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// Values of field `column` (zero-based) from every line that has one.
pub fn read_column(text: &str, column: usize) -> Result<Vec<f64>, ColumnError> {
    let sep = Regex::new(r"[ \t]+")?;

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value = sep
            .split(line)
            .nth(column)
            .and_then(|field| field.parse::<f64>().ok());
        match value {
            Some(v) => out.push(v),
            None => {
                trace!("line {}: no numeric field {}", lineno + 1, column);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        debug!("skipped {} lines without a numeric field {}", skipped, column);
    }
    Ok(out)
}

pub fn read_column_file(path: impl AsRef<Path>, column: usize) -> Result<Vec<f64>, ColumnError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ColumnError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_column(&text, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn one_number_per_line_skips_junk() {
        let text = "12.5\nn/a\n\n7\n  3.5  \n";
        assert_eq!(read_column(text, 0).unwrap(), vec![12.5, 7.0, 3.5]);
    }

    #[test]
    fn picks_requested_field_across_tabs_and_spaces() {
        let text = "time\tpoints\tavg_us\ttasks\n100\t4\t12.0\t9\n101  5   14.5 10\n102\t6\n";
        assert_eq!(read_column(text, 2).unwrap(), vec![12.0, 14.5]);
    }

    #[test]
    fn nothing_numeric_is_empty_not_error() {
        assert!(read_column("a\nb\n", 0).unwrap().is_empty());
    }

    #[test]
    fn reads_file_and_reports_missing_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1\n2\n3").unwrap();
        assert_eq!(read_column_file(file.path(), 0).unwrap(), vec![1.0, 2.0, 3.0]);

        let dir = tempfile::tempdir().unwrap();
        let err = read_column_file(dir.path().join("nope.txt"), 0).unwrap_err();
        assert!(matches!(err, ColumnError::Read { .. }));
    }
}
