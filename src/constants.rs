//! Default values and environment variable names for run tuning.

pub const ENV_CHUNK_SIZE: &str = "BRC_CHUNK_SIZE";
pub const ENV_THREADS: &str = "BRC_THREADS";
pub const ENV_MAX_RECORD_LEN: &str = "BRC_MAX_RECORD_LEN";

/// Target bytes handed to one worker task.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024 * 1024;
/// Longest line the planner will look past when aligning a chunk end.
pub const DEFAULT_MAX_RECORD_LEN: usize = 1024;
/// Outstanding chunks allowed per worker thread before the coordinator waits.
pub const DISPATCH_WINDOW_PER_THREAD: usize = 2;
/// Initial capacity of a per-chunk map; station sets are small and repetitive.
pub const STATION_CAPACITY_HINT: usize = 1024;

pub const REPORT_HEADER: &str = "Station,Mean,Min,Max";
pub const DEFAULT_REPORT_PRECISION: usize = 6;

pub const DELIMITER: u8 = b';';
pub const NEWLINE: u8 = b'\n';
