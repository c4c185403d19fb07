//! Coordinate CSV parsing.
//!
//! Input is plain `latitude,longitude,depth` text. The first line is a header
//! and is dropped unread, lines with fewer than three fields are ignored, and
//! an empty field stands for `0.0`.

use crate::domain::model::{CoordinateRecord, MalformedRecordPolicy};
use crate::utils::error::{PlotError, Result};

const COLUMNS: [&str; 3] = ["latitude", "longitude", "depth"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBatch {
    pub records: Vec<CoordinateRecord>,
    /// Lines dropped under [`MalformedRecordPolicy::Skip`].
    pub skipped: usize,
}

/// Parses one data line. `line_number` is 1-based and only used for errors.
///
/// Returns `Ok(None)` when the line has fewer than three comma-separated fields.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<CoordinateRecord>> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < COLUMNS.len() {
        return Ok(None);
    }

    let latitude = parse_field(fields[0], COLUMNS[0], line_number)?;
    let longitude = parse_field(fields[1], COLUMNS[1], line_number)?;
    let depth = parse_field(fields[2], COLUMNS[2], line_number)?;

    Ok(Some(CoordinateRecord::new(latitude, longitude, depth)))
}

fn parse_field(raw: &str, column: &'static str, line: usize) -> Result<f64> {
    if raw.is_empty() {
        return Ok(0.0);
    }

    let malformed = |reason: String| PlotError::RecordParseError {
        line,
        column,
        value: raw.to_string(),
        reason,
    };

    let value: f64 = raw.trim().parse().map_err(|e| malformed(format!("{}", e)))?;
    if !value.is_finite() {
        return Err(malformed("value is not finite".to_string()));
    }
    Ok(value)
}

/// Splits on `\n`, `\r\n` or a lone `\r`. A trailing terminator does not
/// start another line.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(|c: char| c == '\r' || c == '\n') {
            Some(end) => {
                let line = &rest[..end];
                let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[end + terminator..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}

/// Parses a whole file body, skipping the header line.
pub fn parse_records(text: &str, policy: MalformedRecordPolicy) -> Result<ParsedBatch> {
    let mut batch = ParsedBatch::default();

    // 第一行一律視為標題
    for (index, line) in split_lines(text).enumerate().skip(1) {
        match parse_line(line, index + 1) {
            Ok(Some(record)) => batch.records.push(record),
            Ok(None) => {
                tracing::trace!("Ignoring line {} with fewer than 3 fields", index + 1);
            }
            Err(e) => match policy {
                MalformedRecordPolicy::Abort => return Err(e),
                MalformedRecordPolicy::Skip => {
                    tracing::warn!("⚠️ Skipping line {}: {}", index + 1, e);
                    batch.skipped += 1;
                }
            },
        }
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_full_record() {
        let record = parse_line("10.5,20.25,0.3", 2).unwrap().unwrap();
        assert_eq!(record, CoordinateRecord::new(10.5, 20.25, 0.3));
    }

    #[test]
    fn test_parse_line_defaults_empty_fields_to_zero() {
        let record = parse_line(",-33.9,", 2).unwrap().unwrap();
        assert_eq!(record.latitude(), 0.0);
        assert_eq!(record.longitude(), -33.9);
        assert_eq!(record.depth(), 0.0);
    }

    #[test]
    fn test_parse_line_ignores_extra_columns() {
        let record = parse_line("1,2,3,station-7,", 2).unwrap().unwrap();
        assert_eq!(record, CoordinateRecord::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_parse_line_short_lines_produce_nothing() {
        assert_eq!(parse_line("", 2).unwrap(), None);
        assert_eq!(parse_line("10.5", 2).unwrap(), None);
        assert_eq!(parse_line("10.5,20.25", 2).unwrap(), None);
    }

    #[test]
    fn test_parse_line_reports_malformed_field() {
        let err = parse_line("10.5,east,0.3", 7).unwrap_err();
        match err {
            PlotError::RecordParseError {
                line,
                column,
                value,
                ..
            } => {
                assert_eq!(line, 7);
                assert_eq!(column, "longitude");
                assert_eq!(value, "east");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_line_whitespace_only_field_is_malformed() {
        assert!(parse_line("1, ,3", 2).is_err());
        assert_eq!(
            parse_line(" 1 ,2,3", 2).unwrap(),
            Some(CoordinateRecord::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn test_parse_line_rejects_non_finite_values() {
        assert!(parse_line("NaN,1,1", 2).is_err());
        assert!(parse_line("1,inf,1", 2).is_err());
    }

    #[test]
    fn test_parse_records_end_to_end() {
        let batch = parse_records(
            "lat,lon,depth\n10.5,20.25,0.3\n,,\n",
            MalformedRecordPolicy::Abort,
        )
        .unwrap();

        assert_eq!(
            batch.records,
            vec![
                CoordinateRecord::new(10.5, 20.25, 0.3),
                CoordinateRecord::new(0.0, 0.0, 0.0),
            ]
        );
        assert_eq!(batch.skipped, 0);
    }

    #[test]
    fn test_parse_records_always_skips_first_line() {
        let batch = parse_records("1.0,2.0,3.0\n4.0,5.0,6.0", MalformedRecordPolicy::Abort).unwrap();
        assert_eq!(batch.records, vec![CoordinateRecord::new(4.0, 5.0, 6.0)]);

        let batch = parse_records("\n4.0,5.0,6.0", MalformedRecordPolicy::Abort).unwrap();
        assert_eq!(batch.records.len(), 1);

        let batch = parse_records("garbage,,,", MalformedRecordPolicy::Abort).unwrap();
        assert!(batch.records.is_empty());
    }

    #[test]
    fn test_parse_records_accepts_crlf() {
        let batch = parse_records("a,b,c\r\n1,2,3\r\n", MalformedRecordPolicy::Abort).unwrap();
        assert_eq!(batch.records, vec![CoordinateRecord::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_parse_records_accepts_bare_carriage_returns() {
        let batch = parse_records(
            "lat,lon,depth\r10.5,20.25,0.3\r1,2,3\r",
            MalformedRecordPolicy::Abort,
        )
        .unwrap();
        assert_eq!(
            batch.records,
            vec![
                CoordinateRecord::new(10.5, 20.25, 0.3),
                CoordinateRecord::new(1.0, 2.0, 3.0),
            ]
        );
    }

    #[test]
    fn test_split_lines_handles_mixed_terminators() {
        let lines: Vec<&str> = split_lines("a\r\nb\rc\nd").collect();
        assert_eq!(lines, vec!["a", "b", "c", "d"]);

        let lines: Vec<&str> = split_lines("a\n\nb\r\n").collect();
        assert_eq!(lines, vec!["a", "", "b"]);

        assert_eq!(split_lines("").count(), 0);
    }

    #[test]
    fn test_parse_records_line_numbers_follow_carriage_returns() {
        let result = parse_records("h\r1,2,3\rx,2,3\r", MalformedRecordPolicy::Abort);
        assert!(matches!(
            result,
            Err(PlotError::RecordParseError { line: 3, .. })
        ));
    }

    #[test]
    fn test_parse_records_abort_policy_fails_batch() {
        let result = parse_records("h\n1,2,3\nx,2,3\n4,5,6", MalformedRecordPolicy::Abort);
        assert!(matches!(
            result,
            Err(PlotError::RecordParseError { line: 3, .. })
        ));
    }

    #[test]
    fn test_parse_records_skip_policy_counts_dropped_lines() {
        let batch = parse_records("h\n1,2,3\nx,2,3\n4,5,6", MalformedRecordPolicy::Skip).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.skipped, 1);
    }
}
