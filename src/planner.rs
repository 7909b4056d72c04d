use std::ops::Range;

use memchr::{memchr, memrchr};

use crate::constants::NEWLINE;
use crate::error::{Error, Result};

/// Half-open byte range `[start, end)` that begins and ends on line boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRange {
    pub start: usize,
    pub end: usize,
}

impl ChunkRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Lazily splits a buffer into newline-aligned chunks of roughly `target` bytes.
///
/// Each proposed end is pulled back to the nearest newline within `margin`
/// bytes. When the record starting the chunk is itself longer than `target`,
/// the end is pushed forward instead, up to `margin` bytes past the start.
pub struct ChunkPlanner<'a> {
    bytes: &'a [u8],
    target: usize,
    margin: usize,
    offset: usize,
    failed: bool,
}

impl<'a> ChunkPlanner<'a> {
    pub fn new(bytes: &'a [u8], target: usize, margin: usize) -> Result<Self> {
        if target == 0 || margin == 0 {
            return Err(Error::InvalidConfig(
                "chunk size and record margin must be positive".into(),
            ));
        }
        Ok(Self { bytes, target, margin, offset: 0, failed: false })
    }

    fn next_end(&self) -> Result<usize> {
        let len = self.bytes.len();
        let candidate = self.offset.saturating_add(self.target).min(len);
        if candidate == len {
            return Ok(len);
        }

        let floor = candidate.saturating_sub(self.margin).max(self.offset);
        if let Some(pos) = memrchr(NEWLINE, &self.bytes[floor..candidate]) {
            return Ok(floor + pos + 1);
        }

        if floor == self.offset {
            let ceiling = self.offset.saturating_add(self.margin).min(len);
            if candidate < ceiling {
                if let Some(pos) = memchr(NEWLINE, &self.bytes[candidate..ceiling]) {
                    return Ok(candidate + pos + 1);
                }
            }
            if ceiling == len {
                return Ok(len);
            }
        }

        Err(Error::BoundaryNotFound { offset: candidate, margin: self.margin })
    }
}

impl Iterator for ChunkPlanner<'_> {
    type Item = Result<ChunkRange>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }
        match self.next_end() {
            Ok(end) => {
                let range = ChunkRange { start: self.offset, end };
                self.offset = end;
                Some(Ok(range))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Plans every chunk up front, failing before any work if a boundary is missing.
pub fn plan_chunks(bytes: &[u8], target: usize, margin: usize) -> Result<Vec<ChunkRange>> {
    ChunkPlanner::new(bytes, target, margin)?.collect()
}
