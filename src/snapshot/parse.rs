use crate::snapshot::error::SnapshotError;
use crate::snapshot::row::{FIELDS_PER_ROW, Metric, SlicedSeries, SnapshotQuery};
use log::{debug, info, trace};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first header.
    Outside,
    /// Inside a block; `found` is set once the entity's row has been taken.
    Inside { found: bool },
}

/// Line-at-a-time snapshot parser.
///
/// Every header opens a slice, and every slice gets exactly one value per
/// metric: the entity's first row in that block, or NaN when the block closes
/// without one.
pub struct SnapshotScanner<'q> {
    query: &'q SnapshotQuery,
    state: State,
    lineno: usize,
    series: Vec<Vec<f64>>,
    slices: usize,
    missing: usize,
}

impl<'q> SnapshotScanner<'q> {
    pub fn new(query: &'q SnapshotQuery) -> Self {
        Self {
            query,
            state: State::Outside,
            lineno: 0,
            series: vec![Vec::new(); query.metrics.len()],
            slices: 0,
            missing: 0,
        }
    }

    pub fn feed_line(&mut self, raw: &str) -> Result<(), SnapshotError> {
        self.lineno += 1;
        let line = raw.trim();

        if line == self.query.header {
            self.close_block();
            self.state = State::Inside { found: false };
            self.slices += 1;
            return Ok(());
        }

        let State::Inside { found } = self.state else {
            return Ok(());
        };

        if line.is_empty() {
            return Ok(());
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != FIELDS_PER_ROW {
            trace!(
                "line {}: skipping row with {} fields",
                self.lineno,
                fields.len()
            );
            return Ok(());
        }

        if fields[0] != self.query.entity {
            return Ok(());
        }

        if found {
            debug!(
                "line {}: duplicate row for entity {:?} in slice {}, keeping the first",
                self.lineno,
                self.query.entity,
                self.slices - 1
            );
            return Ok(());
        }

        // Parse every field before pushing so a bad row leaves the series aligned.
        let values = self
            .query
            .metrics
            .iter()
            .map(|&metric| parse_metric(fields[metric.column()], metric, self.lineno))
            .collect::<Result<Vec<f64>, _>>()?;

        for (out, value) in self.series.iter_mut().zip(values) {
            out.push(value);
        }
        self.state = State::Inside { found: true };
        Ok(())
    }

    fn close_block(&mut self) {
        if self.state == (State::Inside { found: false }) {
            for out in &mut self.series {
                out.push(f64::NAN);
            }
            self.missing += 1;
        }
    }

    /// Close the open block (if any) and hand back the aligned series.
    pub fn finish(mut self) -> SlicedSeries {
        self.close_block();
        SlicedSeries {
            metrics: self.query.metrics.clone(),
            series: self.series,
            slices: self.slices,
            missing: self.missing,
        }
    }
}

fn parse_metric(field: &str, metric: Metric, line: usize) -> Result<f64, SnapshotError> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|source| SnapshotError::MalformedNumber {
            line,
            metric: metric.name(),
            value: field.to_string(),
            source,
        })
}

/// Parse a whole snapshot log held in memory.
pub fn parse_snapshots(text: &str, query: &SnapshotQuery) -> Result<SlicedSeries, SnapshotError> {
    let mut scanner = SnapshotScanner::new(query);
    for line in text.lines() {
        scanner.feed_line(line)?;
    }
    Ok(scanner.finish())
}

/// Read a snapshot log from disk and parse it.
pub fn parse_snapshot_file(
    path: impl AsRef<Path>,
    query: &SnapshotQuery,
) -> Result<SlicedSeries, SnapshotError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| SnapshotError::read(path, e))?;
    let parsed = parse_snapshots(&text, query)?;
    info!(
        "{}: {} slices, entity {:?} missing from {}",
        path.display(),
        parsed.slices,
        query.entity,
        parsed.missing
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::row::TURBOSTAT_HEADER;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn busy_and_bzy(entity: &str) -> SnapshotQuery {
        SnapshotQuery::new(entity, vec![Metric::BusyPercent, Metric::BzyMhz]).unwrap()
    }

    fn log_of(blocks: &[&[&str]]) -> String {
        let mut out = String::new();
        for rows in blocks {
            out.push_str(TURBOSTAT_HEADER);
            out.push('\n');
            for row in *rows {
                out.push_str(row);
                out.push('\n');
            }
        }
        out
    }

    #[test]
    fn entity_missing_from_second_block_gets_sentinel() {
        let text = "CPU\tAvg_MHz\tBusy%\tBzy_MHz\n0\t1000\t50.0\t2000\nCPU\tAvg_MHz\tBusy%\tBzy_MHz\n1\t1000\t75.0\t2500\n";
        let parsed = parse_snapshots(text, &busy_and_bzy("0")).unwrap();

        let busy = parsed.get(Metric::BusyPercent).unwrap();
        let bzy = parsed.get(Metric::BzyMhz).unwrap();
        assert_eq!(busy.len(), 2);
        assert_eq!(busy[0], 50.0);
        assert!(busy[1].is_nan());
        assert_eq!(bzy[0], 2000.0);
        assert!(bzy[1].is_nan());
        assert_eq!(parsed.times(1.0), vec![0.0, 1.0]);
        assert_eq!(parsed.missing, 1);
    }

    #[test]
    fn no_headers_yields_empty_series() {
        let text = "0\t1000\t50.0\t2000\n1\t1000\t75.0\t2500\n";
        let parsed = parse_snapshots(text, &busy_and_bzy("0")).unwrap();
        assert_eq!(parsed.slices, 0);
        assert!(parsed.series.iter().all(|s| s.is_empty()));
        assert!(parsed.times(0.5).is_empty());
    }

    #[test]
    fn back_to_back_headers_make_an_empty_slice() {
        let text = log_of(&[&[], &["0\t900\t10.0\t1800"]]);
        let parsed = parse_snapshots(&text, &busy_and_bzy("0")).unwrap();
        let busy = parsed.get(Metric::BusyPercent).unwrap();
        assert_eq!(busy.len(), 2);
        assert!(busy[0].is_nan());
        assert_eq!(busy[1], 10.0);
    }

    #[test]
    fn entity_in_every_block_has_no_sentinels() {
        let text = log_of(&[
            &["-\t1200\t40.0\t3000", "0\t1100\t30.0\t2900", "1\t1300\t50.0\t3100"],
            &["-\t1200\t40.0\t3000", "1\t1300\t50.0\t3100", "0\t1000\t20.0\t2800"],
            &["0\t900\t10.0\t2700"],
        ]);
        let parsed = parse_snapshots(&text, &busy_and_bzy("0")).unwrap();
        assert_eq!(parsed.missing, 0);
        assert_eq!(parsed.get(Metric::BusyPercent).unwrap(), &[30.0, 20.0, 10.0]);
        assert_eq!(parsed.get(Metric::BzyMhz).unwrap(), &[2900.0, 2800.0, 2700.0]);
    }

    #[test]
    fn unknown_entity_is_all_sentinels_with_full_length() {
        let text = log_of(&[&["0\t1\t2\t3"], &["1\t1\t2\t3"], &[]]);
        let parsed = parse_snapshots(&text, &busy_and_bzy("7")).unwrap();
        assert_eq!(parsed.slices, 3);
        assert_eq!(parsed.missing, 3);
        for series in &parsed.series {
            assert_eq!(series.len(), 3);
            assert!(series.iter().all(|v| v.is_nan()));
        }
    }

    #[test]
    fn malformed_rows_do_not_change_slice_count() {
        let text = log_of(&[
            &["0\t1000", "garbage", "0\t1000\t50.0\t2000\textra", "0\t1000\t55.0\t2100"],
            &["0\t1000\t60.0"],
        ]);
        let parsed = parse_snapshots(&text, &busy_and_bzy("0")).unwrap();
        let busy = parsed.get(Metric::BusyPercent).unwrap();
        assert_eq!(busy.len(), 2);
        assert_eq!(busy[0], 55.0);
        assert!(busy[1].is_nan());
    }

    #[test]
    fn lines_before_first_header_are_ignored() {
        let text = format!(
            "turbostat version 2024.05.10\n0\t1\t99.0\t1\n{}",
            log_of(&[&["0\t1000\t12.5\t2000"]])
        );
        let parsed = parse_snapshots(&text, &busy_and_bzy("0")).unwrap();
        assert_eq!(parsed.get(Metric::BusyPercent).unwrap(), &[12.5]);
    }

    #[test]
    fn blank_lines_and_crlf_are_tolerated() {
        let text = "\r\nCPU\tAvg_MHz\tBusy%\tBzy_MHz\r\n\r\n0\t1000\t50.0\t2000\r\n\n\n";
        let parsed = parse_snapshots(text, &busy_and_bzy("0")).unwrap();
        assert_eq!(parsed.slices, 1);
        assert_eq!(parsed.get(Metric::BusyPercent).unwrap(), &[50.0]);
    }

    #[test]
    fn duplicate_rows_keep_the_first() {
        let text = log_of(&[&["0\t1000\t50.0\t2000", "0\t1000\t70.0\t2200"]]);
        let parsed = parse_snapshots(&text, &busy_and_bzy("0")).unwrap();
        assert_eq!(parsed.get(Metric::BusyPercent).unwrap(), &[50.0]);
    }

    #[test]
    fn entity_match_is_exact() {
        let text = log_of(&[&["10\t1000\t50.0\t2000", "1\t1000\t20.0\t1500"]]);
        let parsed = parse_snapshots(&text, &busy_and_bzy("1")).unwrap();
        assert_eq!(parsed.get(Metric::BusyPercent).unwrap(), &[20.0]);
    }

    #[test]
    fn non_numeric_metric_on_matched_row_is_fatal() {
        let text = log_of(&[&["0\t1000\tbusy\t2000"]]);
        let err = parse_snapshots(&text, &busy_and_bzy("0")).unwrap_err();
        match err {
            SnapshotError::MalformedNumber { line, metric, value, .. } => {
                assert_eq!(line, 2);
                assert_eq!(metric, "Busy%");
                assert_eq!(value, "busy");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_metric_on_other_entity_is_ignored() {
        let text = log_of(&[&["1\t1000\tbusy\t2000", "0\t1000\t5.0\t2000"]]);
        let parsed = parse_snapshots(&text, &busy_and_bzy("0")).unwrap();
        assert_eq!(parsed.get(Metric::BusyPercent).unwrap(), &[5.0]);
    }

    #[test]
    fn single_metric_and_custom_header() {
        let query = SnapshotQuery::from_columns("0", &[1])
            .unwrap()
            .with_header("Core\tAvg_MHz\tBusy%\tBzy_MHz")
            .unwrap();
        let text = "Core\tAvg_MHz\tBusy%\tBzy_MHz\n0\t800\t5.0\t1600\nCPU\tAvg_MHz\tBusy%\tBzy_MHz\n0\t900\t6.0\t1700\n";
        let parsed = parse_snapshots(text, &query).unwrap();
        assert_eq!(parsed.series, vec![vec![800.0]]);
        assert_eq!(parsed.slices, 1);
    }

    #[test]
    fn query_rejects_bad_columns() {
        assert!(matches!(
            SnapshotQuery::from_columns("0", &[0]),
            Err(SnapshotError::InvalidColumn(0))
        ));
        assert!(matches!(
            SnapshotQuery::from_columns("0", &[2, 4]),
            Err(SnapshotError::InvalidColumn(4))
        ));
        assert!(matches!(
            SnapshotQuery::from_columns("0", &[]),
            Err(SnapshotError::NoMetrics)
        ));
        assert!(matches!(
            busy_and_bzy("0").with_header("   "),
            Err(SnapshotError::EmptyHeader)
        ));
    }

    #[test]
    fn times_scale_with_duration() {
        let text = log_of(&[&[], &[], &[], &[]]);
        let parsed = parse_snapshots(&text, &busy_and_bzy("0")).unwrap();
        assert_eq!(parsed.times(0.25), vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn scanner_matches_whole_text_parse() {
        let text = log_of(&[&["0\t1000\t50.0\t2000"], &["1\t1\t1\t1"], &["0\t1\t2\t3"]]);
        let query = busy_and_bzy("0");

        let mut scanner = SnapshotScanner::new(&query);
        for line in text.lines() {
            scanner.feed_line(line).unwrap();
        }
        let streamed = scanner.finish();
        let whole = parse_snapshots(&text, &query).unwrap();

        assert_eq!(streamed.slices, whole.slices);
        assert_eq!(streamed.missing, whole.missing);
        assert_eq!(format!("{:?}", streamed.series), format!("{:?}", whole.series));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", log_of(&[&["0\t1000\t42.0\t2000"]])).unwrap();

        let parsed = parse_snapshot_file(file.path(), &busy_and_bzy("0")).unwrap();
        assert_eq!(parsed.get(Metric::BusyPercent).unwrap(), &[42.0]);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.dat");
        let err = parse_snapshot_file(&path, &busy_and_bzy("0")).unwrap_err();
        assert!(matches!(err, SnapshotError::Read { .. }));
        assert!(err.to_string().contains("absent.dat"));
    }
}
