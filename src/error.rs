use std::fmt;
use std::io;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fatal failures of an aggregation run.
///
/// Malformed lines are not represented here: they are skipped and counted by
/// the chunk aggregator and never abort a run.
#[derive(Debug)]
pub enum Error {
    /// The input file could not be opened or mapped.
    Open { path: PathBuf, source: io::Error },
    /// No newline within `margin` bytes of a requested chunk end.
    BoundaryNotFound { offset: usize, margin: usize },
    /// The report could not be written.
    Write { path: PathBuf, source: io::Error },
    InvalidConfig(String),
    ThreadPool(rayon::ThreadPoolBuildError),
    /// A worker panicked while aggregating the chunk with this index.
    WorkerPanicked { chunk: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "cannot open input {}: {source}", path.display())
            }
            Self::BoundaryNotFound { offset, margin } => write!(
                f,
                "no line boundary within {margin} bytes of offset {offset}; \
                 a record is longer than the configured maximum"
            ),
            Self::Write { path, source } => {
                write!(f, "cannot write report {}: {source}", path.display())
            }
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::ThreadPool(err) => write!(f, "cannot build worker pool: {err}"),
            Self::WorkerPanicked { chunk } => write!(f, "worker panicked on chunk {chunk}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Write { source, .. } => Some(source),
            Self::ThreadPool(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err)
    }
}
