//! CSV loading into an in-memory period table.
//!
//! The file is read exactly once. Period labels, per-period series, and
//! per-row hour labels are all views over the same [`SeriesTable`].

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::Serialize;
use tempo_core::{InputConfig, TempoError};
use tracing::debug;

/// Options for reading a period table.
///
/// # Examples
///
/// ```
/// use tempo_series::table::LoadOptions;
///
/// let opts = LoadOptions::default();
/// assert_eq!(opts.delimiter, b',');
/// assert!(opts.trim);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Field delimiter byte (default: `,`).
    pub delimiter: u8,
    /// Trim whitespace around cells before parsing (default: true).
    pub trim: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: true,
        }
    }
}

impl From<&InputConfig> for LoadOptions {
    fn from(config: &InputConfig) -> Self {
        // Non-ASCII delimiters are rejected by `TempoConfig::validate`.
        let delimiter = u8::try_from(config.delimiter).unwrap_or(b',');
        Self {
            delimiter,
            trim: config.trim,
        }
    }
}

/// Commit counts per hour (rows) and per logged period (columns).
///
/// The first header cell is a label placeholder; the remaining header cells
/// name the periods. Each data row starts with an hour label followed by one
/// value per period.
///
/// # Examples
///
/// ```
/// use tempo_series::table::{LoadOptions, SeriesTable};
///
/// let csv = "hour,A,B,C\n0h,1,2,3\n1h,4,5,6\n";
/// let table = SeriesTable::from_reader(csv.as_bytes(), LoadOptions::default()).unwrap();
/// assert_eq!(table.periods(), ["A", "B", "C"]);
/// assert_eq!(table.hours(), ["0h", "1h"]);
/// assert_eq!(table.series(1), Some(&[2.0, 5.0][..]));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesTable {
    label: String,
    periods: Vec<String>,
    hours: Vec<String>,
    /// Column-major: `series[p][row]`.
    series: Vec<Vec<f64>>,
}

impl SeriesTable {
    /// Load a table from a CSV file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`TempoError::FileNotFound`] if `path` does not exist, and
    /// any error from [`SeriesTable::from_reader`].
    pub fn from_path(path: &Path, options: LoadOptions) -> Result<Self, TempoError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TempoError::FileNotFound(path.to_path_buf()),
            _ => TempoError::Io(e),
        })?;
        let table = Self::from_reader(file, options)?;
        debug!(
            path = %path.display(),
            periods = table.period_count(),
            rows = table.row_count(),
            "loaded period table"
        );
        Ok(table)
    }

    /// Load a table from any CSV byte stream.
    ///
    /// # Errors
    ///
    /// - [`TempoError::NoPeriods`] if the header has no period columns.
    /// - [`TempoError::RaggedRow`] if a row's width differs from the header,
    ///   including an empty line between data rows.
    /// - [`TempoError::InvalidNumber`] if a value cell is not numeric.
    /// - [`TempoError::Csv`] if the stream is not valid CSV.
    pub fn from_reader<R: Read>(mut reader: R, options: LoadOptions) -> Result<Self, TempoError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let blank = interior_blank_line(&bytes);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(options.delimiter)
            .trim(if options.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .from_reader(bytes.as_slice());

        let header = reader.headers().map_err(csv_error)?.clone();
        let width = header.len();
        if width < 2 {
            return Err(TempoError::NoPeriods);
        }
        // The csv reader skips empty lines, which would shift every later row.
        if let Some(line) = blank {
            return Err(TempoError::RaggedRow {
                line,
                expected: width,
                found: 0,
            });
        }

        let label = header.get(0).unwrap_or_default().to_string();
        let periods: Vec<String> = header.iter().skip(1).map(str::to_string).collect();
        let mut series: Vec<Vec<f64>> = vec![Vec::new(); periods.len()];
        let mut hours = Vec::new();

        for result in reader.records() {
            let record = result.map_err(csv_error)?;
            let line = record.position().map_or(0, |p| p.line());

            if record.len() != width {
                return Err(TempoError::RaggedRow {
                    line,
                    expected: width,
                    found: record.len(),
                });
            }

            hours.push(record.get(0).unwrap_or_default().to_string());
            for (column, cell) in record.iter().enumerate().skip(1) {
                let value = cell.parse::<f64>().map_err(|_| TempoError::InvalidNumber {
                    line,
                    column,
                    value: cell.to_string(),
                })?;
                series[column - 1].push(value);
            }
        }

        Ok(Self {
            label,
            periods,
            hours,
            series,
        })
    }

    /// Header placeholder above the hour labels.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Period labels, in column order.
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Hour labels, in row order.
    pub fn hours(&self) -> &[String] {
        &self.hours
    }

    /// Values for period `p` across all rows.
    pub fn series(&self, p: usize) -> Option<&[f64]> {
        self.series.get(p).map(Vec::as_slice)
    }

    /// Iterate over every period's series, in column order.
    pub fn iter_series(&self) -> impl Iterator<Item = &[f64]> {
        self.series.iter().map(Vec::as_slice)
    }

    /// Number of period columns.
    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    /// Number of data rows (time blocks).
    pub fn row_count(&self) -> usize {
        self.hours.len()
    }
}

/// 1-based line number of the first empty line followed by more content.
fn interior_blank_line(bytes: &[u8]) -> Option<u64> {
    let mut pending = None;
    let mut seen_content = false;
    for (number, line) in (1u64..).zip(bytes.split(|&b| b == b'\n')) {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            if seen_content && pending.is_none() {
                pending = Some(number);
            }
        } else if pending.is_some() {
            return pending;
        } else {
            seen_content = true;
        }
    }
    None
}

fn csv_error(err: csv::Error) -> TempoError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => TempoError::Io(e),
        _ => TempoError::Csv(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load(csv: &str) -> Result<SeriesTable, TempoError> {
        SeriesTable::from_reader(csv.as_bytes(), LoadOptions::default())
    }

    #[test]
    fn reads_periods_hours_and_series() {
        let table = load("hour,A,B,C\n0h,1,2,3\n1h,4,5,6\n").unwrap();
        assert_eq!(table.label(), "hour");
        assert_eq!(table.periods(), ["A", "B", "C"]);
        assert_eq!(table.hours(), ["0h", "1h"]);
        assert_eq!(table.series(0), Some(&[1.0, 4.0][..]));
        assert_eq!(table.series(2), Some(&[3.0, 6.0][..]));
        assert_eq!(table.series(3), None);
        assert_eq!(table.period_count(), 3);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn every_series_has_row_count_values() {
        let table = load("h,p1,p2\n00,1,2\n01,3,4\n02,5,6\n").unwrap();
        assert!(table.iter_series().all(|s| s.len() == table.row_count()));
    }

    #[test]
    fn hour_labels_are_not_parsed() {
        let table = load("hour,A\nten o'clock,7\n").unwrap();
        assert_eq!(table.hours(), ["ten o'clock"]);
    }

    #[test]
    fn header_only_gives_empty_series() {
        let table = load("hour,A,B\n").unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.series(0), Some(&[][..]));
    }

    #[test]
    fn non_numeric_cell_is_rejected() {
        let err = load("hour,A,B\n0h,1,x\n").unwrap_err();
        match err {
            TempoError::InvalidNumber {
                line,
                column,
                value,
            } => {
                assert_eq!(line, 2);
                assert_eq!(column, 2);
                assert_eq!(value, "x");
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn short_row_is_rejected() {
        let err = load("hour,A,B,C\n0h,1,2,3\n1h,4,5\n").unwrap_err();
        assert!(matches!(
            err,
            TempoError::RaggedRow {
                line: 3,
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn blank_line_between_rows_is_rejected() {
        let err = load("hour,A,B,C\n09:00,1,2,3\n\n10:00,4,5,6\n").unwrap_err();
        assert!(matches!(
            err,
            TempoError::RaggedRow {
                line: 3,
                expected: 4,
                found: 0
            }
        ));
    }

    #[test]
    fn blank_crlf_line_is_rejected() {
        let err = load("hour,A\r\n0h,1\r\n\r\n1h,2\r\n").unwrap_err();
        assert!(matches!(err, TempoError::RaggedRow { line: 3, found: 0, .. }));
    }

    #[test]
    fn trailing_blank_lines_are_ignored() {
        let table = load("hour,A,B\n0h,1,2\n1h,3,4\n\n\n").unwrap();
        assert_eq!(table.hours(), ["0h", "1h"]);
    }

    #[test]
    fn long_row_is_rejected() {
        let err = load("hour,A\n0h,1,2\n").unwrap_err();
        assert!(matches!(err, TempoError::RaggedRow { found: 3, .. }));
    }

    #[test]
    fn header_without_periods_is_rejected() {
        assert!(matches!(load("hour\n0h\n"), Err(TempoError::NoPeriods)));
        assert!(matches!(load(""), Err(TempoError::NoPeriods)));
    }

    #[test]
    fn whitespace_is_trimmed_by_default() {
        let table = load("hour, A , B\n0h, 1 ,  2\n").unwrap();
        assert_eq!(table.periods(), ["A", "B"]);
        assert_eq!(table.series(1), Some(&[2.0][..]));
    }

    #[test]
    fn untrimmed_whitespace_fails_to_parse() {
        let opts = LoadOptions {
            trim: false,
            ..LoadOptions::default()
        };
        let result = SeriesTable::from_reader("hour,A\n0h, 1\n".as_bytes(), opts);
        assert!(matches!(result, Err(TempoError::InvalidNumber { .. })));
    }

    #[test]
    fn custom_delimiter() {
        let opts = LoadOptions {
            delimiter: b';',
            ..LoadOptions::default()
        };
        let table = SeriesTable::from_reader("hour;A;B\n0h;1.5;2\n".as_bytes(), opts).unwrap();
        assert_eq!(table.series(0), Some(&[1.5][..]));
    }

    #[test]
    fn options_from_config() {
        let config = InputConfig {
            delimiter: '\t',
            trim: false,
        };
        let opts = LoadOptions::from(&config);
        assert_eq!(opts.delimiter, b'\t');
        assert!(!opts.trim);
    }

    #[test]
    fn from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "hour,A,B\n0h,1,2\n").unwrap();

        let table = SeriesTable::from_path(file.path(), LoadOptions::default()).unwrap();
        assert_eq!(table.periods(), ["A", "B"]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SeriesTable::from_path(
            Path::new("/nonexistent/commits.csv"),
            LoadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TempoError::FileNotFound(_)));
        assert!(err.to_string().contains("commits.csv"));
    }
}
