//! Synthetic `station;temperature` input for benchmarks and tests.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::{Error, Result};

const DEFAULT_STATIONS: &[&str] = &[
    "Abidjan", "Accra", "Addis Ababa", "Alexandria", "Amsterdam", "Anchorage",
    "Athens", "Auckland", "Baghdad", "Bangkok", "Barcelona", "Beijing",
    "Belgrade", "Berlin", "Bogotá", "Boston", "Budapest", "Buenos Aires",
    "Cairo", "Cape Town", "Chicago", "Copenhagen", "Dakar", "Delhi", "Dhaka",
    "Dublin", "Hanoi", "Helsinki", "Istanbul", "Jakarta", "Karachi", "Kyiv",
    "Lagos", "Lima", "Lisbon", "London", "Madrid", "Manila", "Melbourne",
    "Mexico City", "Montreal", "Moscow", "Mumbai", "Nairobi", "Oslo", "Paris",
    "Prague", "Reykjavík", "Riga", "Rome", "Santiago", "Seoul", "Singapore",
    "St. John's", "Stockholm", "Sydney", "Tallinn", "Tokyo", "Toronto",
    "Vienna", "Warsaw", "Wellington", "Zürich",
];

/// Inclusive lower and exclusive upper temperature bound.
const TEMPERATURE_RANGE: (f64, f64) = (0.0, 40.0);

#[derive(Clone, Debug)]
pub struct GenerateOptions {
    pub rows: u64,
    pub stations: Vec<String>,
    pub seed: Option<u64>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            rows: 1_000_000,
            stations: DEFAULT_STATIONS.iter().map(|s| s.to_string()).collect(),
            seed: None,
        }
    }
}

/// Reads one station name per line, ignoring blank lines.
pub fn load_stations(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|source| Error::Open { path: path.to_path_buf(), source })?;
    let stations: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect();
    if stations.is_empty() {
        return Err(Error::InvalidConfig(format!("no station names in {}", path.display())));
    }
    Ok(stations)
}

/// Writes `options.rows` lines of `station;temperature` with one decimal.
pub fn generate<W: Write>(options: &GenerateOptions, out: &mut W) -> io::Result<()> {
    if options.stations.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "station list is empty"));
    }
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let (low, high) = TEMPERATURE_RANGE;
    for _ in 0..options.rows {
        let station = &options.stations[rng.random_range(0..options.stations.len())];
        let temperature: f64 = rng.random_range(low..high);
        writeln!(out, "{station};{temperature:.1}")?;
    }
    Ok(())
}

pub fn generate_file(path: &Path, options: &GenerateOptions) -> Result<()> {
    let write_err = |source| Error::Write { path: path.to_path_buf(), source };
    let file = File::create(path).map_err(write_err)?;
    let mut out = BufWriter::with_capacity(1 << 20, file);
    generate(options, &mut out).map_err(write_err)?;
    out.flush().map_err(write_err)?;
    info!(path = %path.display(), rows = options.rows, stations = options.stations.len(), "dataset generated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_line, Decoder};

    #[test]
    fn seeded_output_is_reproducible_and_parseable() {
        let options = GenerateOptions { rows: 500, seed: Some(7), ..GenerateOptions::default() };
        let mut first = Vec::new();
        let mut second = Vec::new();
        generate(&options, &mut first).unwrap();
        generate(&options, &mut second).unwrap();
        assert_eq!(first, second);

        let lines: Vec<&[u8]> = first.split(|&b| b == b'\n').filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 500);
        for line in lines {
            let record = parse_line(line, Decoder::FixedPoint).unwrap();
            assert!((0.0..=40.0).contains(&record.value));
        }
    }

    #[test]
    fn station_file_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations.txt");
        fs::write(&path, "Oslo\n\n  Bergen  \n").unwrap();
        assert_eq!(load_stations(&path).unwrap(), vec!["Oslo", "Bergen"]);
    }

    #[test]
    fn empty_station_list_is_rejected() {
        let options = GenerateOptions { stations: Vec::new(), ..GenerateOptions::default() };
        assert!(generate(&options, &mut Vec::new()).is_err());
    }
}
