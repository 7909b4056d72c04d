//! Parallel per-station min/mean/max over `station;value` files.
//!
//! The input is memory-mapped, split into newline-aligned chunks, reduced to
//! one partial map per chunk on a worker pool, and folded into a final map.

pub mod aggregate;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod error;
pub mod generate;
pub mod parse;
pub mod planner;
pub mod report;
pub mod source;
pub mod stats;

pub use aggregate::{aggregate_chunk, merge_all, Aggregate, AggregateMap, ChunkOutcome};
pub use config::Config;
pub use coordinator::{aggregate, aggregate_sequential, Aggregation};
pub use error::{Error, Result};
pub use parse::{parse_line, Decoder, ParseError, Record};
pub use planner::{plan_chunks, ChunkPlanner, ChunkRange};
pub use report::{write_report, write_report_file, ReportOptions};
pub use source::ByteSource;
