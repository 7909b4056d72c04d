use std::time::Duration;

use tracing::info;

/// Timing and volume figures for one aggregation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub chunks: usize,
    pub bytes: u64,
    pub lines: u64,
    pub skipped: u64,
    pub stations: usize,
    pub min_chunk_ms: u64,
    pub max_chunk_ms: u64,
    pub wall_ms: u64,
}

impl RunStats {
    pub fn record_chunk(&mut self, bytes: usize, elapsed: Duration) {
        let ms = elapsed.as_millis() as u64;
        if self.chunks == 0 {
            self.min_chunk_ms = ms;
            self.max_chunk_ms = ms;
        } else {
            self.min_chunk_ms = self.min_chunk_ms.min(ms);
            self.max_chunk_ms = self.max_chunk_ms.max(ms);
        }
        self.chunks += 1;
        self.bytes += bytes as u64;
    }

    pub fn log(&self) {
        info!(
            chunks = self.chunks,
            bytes = self.bytes,
            lines = self.lines,
            skipped = self.skipped,
            stations = self.stations,
            min_chunk_ms = self.min_chunk_ms,
            max_chunk_ms = self.max_chunk_ms,
            wall_ms = self.wall_ms,
            "aggregation finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_timings_track_extremes() {
        let mut stats = RunStats::default();
        stats.record_chunk(10, Duration::from_millis(7));
        stats.record_chunk(20, Duration::from_millis(3));
        stats.record_chunk(5, Duration::from_millis(12));
        assert_eq!(stats.chunks, 3);
        assert_eq!(stats.bytes, 35);
        assert_eq!((stats.min_chunk_ms, stats.max_chunk_ms), (3, 12));
    }
}
