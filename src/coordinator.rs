use std::collections::BTreeMap;
use std::panic;
use std::time::{Duration, Instant};

use crossbeam_channel as channel;
use tracing::{debug, info};

use crate::aggregate::{aggregate_chunk, AggregateMap, ChunkOutcome};
use crate::config::Config;
use crate::constants::DISPATCH_WINDOW_PER_THREAD;
use crate::error::{Error, Result};
use crate::parse::Decoder;
use crate::planner::{plan_chunks, ChunkRange};
use crate::source::ByteSource;
use crate::stats::RunStats;

/// Final result of a run: the merged map and the run statistics behind it,
/// including line and skip counts.
#[derive(Debug)]
pub struct Aggregation<'a> {
    pub stations: AggregateMap<'a>,
    pub stats: RunStats,
}

impl<'a> Aggregation<'a> {
    fn finish(outcome: ChunkOutcome<'a>, mut stats: RunStats, started: Instant) -> Self {
        stats.lines = outcome.lines;
        stats.skipped = outcome.skipped;
        stats.stations = outcome.stations.len();
        stats.wall_ms = started.elapsed().as_millis() as u64;
        Self { stations: outcome.stations, stats }
    }
}

struct ChunkMessage<'a> {
    index: usize,
    range: ChunkRange,
    elapsed: Duration,
    result: std::thread::Result<ChunkOutcome<'a>>,
}

/// Aggregates `source` on a pool of `config.parallelism` workers.
///
/// Chunks are planned before any work starts, so an oversized record fails
/// the run without aggregating anything. Partial maps are folded on the
/// calling thread in chunk order; at most `parallelism * 2` chunks are in
/// flight or waiting to be folded at any time.
pub fn aggregate<'a>(source: &'a ByteSource, config: &Config) -> Result<Aggregation<'a>> {
    config.validate()?;
    let started = Instant::now();
    let bytes = source.as_bytes();
    let ranges = plan_chunks(bytes, config.chunk_size, config.max_record_len)?;
    info!(
        bytes = bytes.len(),
        chunks = ranges.len(),
        threads = config.parallelism,
        decoder = %config.decoder,
        "starting aggregation"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.parallelism)
        .thread_name(|i| format!("agg-worker-{i}"))
        .build()?;
    let window = config
        .parallelism
        .saturating_mul(DISPATCH_WINDOW_PER_THREAD)
        .max(1);
    let decoder = config.decoder;

    let (tx, rx) = channel::unbounded::<ChunkMessage<'a>>();
    let mut tx = Some(tx);
    let mut total = ChunkOutcome::default();
    let mut stats = RunStats::default();

    pool.in_place_scope(|scope| -> Result<()> {
        let mut pending = BTreeMap::new();
        let mut dispatched = 0;
        let mut merged = 0;

        while merged < ranges.len() {
            while dispatched < ranges.len() && dispatched - merged < window {
                let index = dispatched;
                let range = ranges[index];
                let Some(tx) = tx.clone() else { break };
                scope.spawn(move |_| {
                    let chunk_started = Instant::now();
                    let result =
                        panic::catch_unwind(|| aggregate_chunk(&bytes[range.as_range()], decoder));
                    let _ = tx.send(ChunkMessage {
                        index,
                        range,
                        elapsed: chunk_started.elapsed(),
                        result,
                    });
                });
                dispatched += 1;
            }
            if dispatched == ranges.len() {
                tx = None;
            }

            // Once every sender is gone, a disconnect means chunk `merged`
            // never reported back.
            let message = rx
                .recv()
                .map_err(|_| Error::WorkerPanicked { chunk: merged })?;
            pending.insert(message.index, message);

            while let Some(message) = pending.remove(&merged) {
                let outcome = message
                    .result
                    .map_err(|_| Error::WorkerPanicked { chunk: message.index })?;
                debug!(
                    chunk = message.index,
                    start = message.range.start,
                    end = message.range.end,
                    lines = outcome.lines,
                    stations = outcome.stations.len(),
                    elapsed_ms = message.elapsed.as_millis() as u64,
                    "chunk merged"
                );
                stats.record_chunk(message.range.len(), message.elapsed);
                total.absorb(outcome);
                merged += 1;
            }
        }
        Ok(())
    })?;

    let aggregation = Aggregation::finish(total, stats, started);
    aggregation.stats.log();
    Ok(aggregation)
}

/// Aggregates all of `bytes` in one pass on the calling thread.
pub fn aggregate_sequential(bytes: &[u8], decoder: Decoder) -> Aggregation<'_> {
    let started = Instant::now();
    let outcome = aggregate_chunk(bytes, decoder);
    let mut stats = RunStats::default();
    if !bytes.is_empty() {
        stats.record_chunk(bytes.len(), started.elapsed());
    }
    Aggregation::finish(outcome, stats, started)
}
