use ahash::AHashMap;
use memchr::memchr_iter;
use tracing::{debug, warn};

use crate::constants::{NEWLINE, STATION_CAPACITY_HINT};
use crate::parse::{parse_line, Decoder};

/// Running statistics for one station.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aggregate {
    pub sum: f64,
    pub count: u64,
    pub min: f64,
    pub max: f64,
}

impl Default for Aggregate {
    fn default() -> Self {
        Self {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Aggregate {
    pub fn from_value(value: f64) -> Self {
        Self { sum: value, count: 1, min: value, max: value }
    }

    #[inline]
    pub fn record(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn merge(&mut self, other: &Aggregate) {
        self.sum += other.sum;
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Station name to statistics. Keys borrow from the input bytes.
#[derive(Clone, Debug, Default)]
pub struct AggregateMap<'a> {
    stations: AHashMap<&'a [u8], Aggregate>,
}

impl<'a> AggregateMap<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { stations: AHashMap::with_capacity(capacity) }
    }

    #[inline]
    pub fn record(&mut self, key: &'a [u8], value: f64) {
        match self.stations.get_mut(key) {
            Some(aggregate) => aggregate.record(value),
            None => {
                self.stations.insert(key, Aggregate::from_value(value));
            }
        }
    }

    /// Folds `other` into `self`; stations only in `other` move over unchanged.
    pub fn merge(&mut self, other: AggregateMap<'a>) {
        for (key, aggregate) in other.stations {
            self.stations
                .entry(key)
                .and_modify(|existing| existing.merge(&aggregate))
                .or_insert(aggregate);
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&Aggregate> {
        self.stations.get(key)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a [u8], &Aggregate)> + '_ {
        self.stations.iter().map(|(key, aggregate)| (*key, aggregate))
    }

    /// Entries ordered by key bytes.
    pub fn sorted(&self) -> Vec<(&'a [u8], Aggregate)> {
        let mut entries: Vec<_> = self.stations.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl<'a> FromIterator<(&'a [u8], f64)> for AggregateMap<'a> {
    fn from_iter<I: IntoIterator<Item = (&'a [u8], f64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.record(key, value);
        }
        map
    }
}

/// Folds any number of partial maps into one.
pub fn merge_all<'a>(maps: impl IntoIterator<Item = AggregateMap<'a>>) -> AggregateMap<'a> {
    maps.into_iter().fold(AggregateMap::new(), |mut total, map| {
        total.merge(map);
        total
    })
}

/// A partial map plus the line counters of the bytes it was built from.
#[derive(Clone, Debug, Default)]
pub struct ChunkOutcome<'a> {
    pub stations: AggregateMap<'a>,
    pub lines: u64,
    pub skipped: u64,
}

impl<'a> ChunkOutcome<'a> {
    pub fn absorb(&mut self, other: ChunkOutcome<'a>) {
        self.stations.merge(other.stations);
        self.lines += other.lines;
        self.skipped += other.skipped;
    }
}

/// Aggregates every line of `chunk`. Malformed lines are skipped and counted;
/// empty lines are ignored.
pub fn aggregate_chunk(chunk: &[u8], decoder: Decoder) -> ChunkOutcome<'_> {
    let mut outcome = ChunkOutcome {
        stations: AggregateMap::with_capacity(STATION_CAPACITY_HINT),
        ..ChunkOutcome::default()
    };

    let mut start = 0;
    for end in memchr_iter(NEWLINE, chunk) {
        process_line(&chunk[start..end], decoder, &mut outcome);
        start = end + 1;
    }
    if start < chunk.len() {
        process_line(&chunk[start..], decoder, &mut outcome);
    }

    if outcome.skipped > 0 {
        warn!(skipped = outcome.skipped, lines = outcome.lines, "skipped malformed lines");
    }
    outcome
}

#[inline]
fn process_line<'a>(line: &'a [u8], decoder: Decoder, outcome: &mut ChunkOutcome<'a>) {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.is_empty() {
        return;
    }
    outcome.lines += 1;
    match parse_line(line, decoder) {
        Ok(record) => outcome.stations.record(record.key, record.value),
        Err(err) => {
            if outcome.skipped == 0 {
                debug!(error = %err, line = %String::from_utf8_lossy(line), "first malformed line in chunk");
            }
            outcome.skipped += 1;
        }
    }
}
