use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::aggregate::{Aggregate, AggregateMap};
use crate::constants::{DEFAULT_REPORT_PRECISION, REPORT_HEADER};
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportOptions {
    /// Digits after the decimal point for mean, min and max.
    pub precision: usize,
    /// Order rows by station name instead of map order.
    pub sorted: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { precision: DEFAULT_REPORT_PRECISION, sorted: false }
    }
}

/// Writes the `Station,Mean,Min,Max` table. Stations with no observations are
/// left out.
pub fn write_report<W: Write>(
    stations: &AggregateMap<'_>,
    options: ReportOptions,
    out: &mut W,
) -> io::Result<usize> {
    writeln!(out, "{REPORT_HEADER}")?;
    let mut rows = 0;
    if options.sorted {
        for (key, aggregate) in stations.sorted() {
            rows += write_row(out, key, &aggregate, options.precision)?;
        }
    } else {
        for (key, aggregate) in stations.iter() {
            rows += write_row(out, key, aggregate, options.precision)?;
        }
    }
    Ok(rows)
}

fn write_row<W: Write>(out: &mut W, key: &[u8], aggregate: &Aggregate, precision: usize) -> io::Result<usize> {
    let Some(mean) = aggregate.mean() else {
        return Ok(0);
    };
    writeln!(
        out,
        "{},{:.p$},{:.p$},{:.p$}",
        String::from_utf8_lossy(key),
        mean,
        aggregate.min,
        aggregate.max,
        p = precision
    )?;
    Ok(1)
}

/// Writes the report to `path`, replacing any existing file.
pub fn write_report_file(path: &Path, stations: &AggregateMap<'_>, options: ReportOptions) -> Result<usize> {
    let write_err = |source| Error::Write { path: path.to_path_buf(), source };
    let file = File::create(path).map_err(write_err)?;
    let mut out = BufWriter::new(file);
    let rows = write_report(stations, options, &mut out).map_err(write_err)?;
    out.flush().map_err(write_err)?;
    info!(path = %path.display(), rows, "report written");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AggregateMap<'static> {
        [(&b"B"[..], 2.5), (&b"A"[..], 1.0), (&b"A"[..], 3.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn sorted_report_renders_header_and_rows() {
        let mut out = Vec::new();
        let options = ReportOptions { precision: 1, sorted: true };
        let rows = write_report(&sample(), options, &mut out).unwrap();
        assert_eq!(rows, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Station,Mean,Min,Max\nA,2.0,1.0,3.0\nB,2.5,2.5,2.5\n"
        );
    }

    #[test]
    fn default_precision_is_six_digits() {
        let map: AggregateMap = [(&b"Oslo"[..], -0.5)].into_iter().collect();
        let mut out = Vec::new();
        write_report(&map, ReportOptions::default(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Station,Mean,Min,Max\nOslo,-0.500000,-0.500000,-0.500000\n"
        );
    }

    #[test]
    fn keys_with_delimiters_are_written_verbatim() {
        let map: AggregateMap = [(&b"a;b"[..], 1.0)].into_iter().collect();
        let mut out = Vec::new();
        write_report(&map, ReportOptions { precision: 1, sorted: false }, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("a;b,1.0,1.0,1.0\n"));
    }

    #[test]
    fn report_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = write_report_file(&path, &sample(), ReportOptions::default()).unwrap();
        assert_eq!(rows, 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Station,Mean,Min,Max\n"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn unwritable_path_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_report_file(&path, &sample(), ReportOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }
}
