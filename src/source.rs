use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use crate::error::{Error, Result};

enum Backing {
    Mapped(Mmap),
    Owned(Box<[u8]>),
}

/// Read-only view of the input bytes, shared by every worker for the whole run.
pub struct ByteSource {
    path: Option<PathBuf>,
    backing: Backing,
}

impl ByteSource {
    /// Memory-maps `path`. Empty files are held as an empty buffer instead.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let open_err = |source| Error::Open { path: path.to_path_buf(), source };
        let file = File::open(path).map_err(open_err)?;
        let len = file.metadata().map_err(open_err)?.len();
        let backing = if len == 0 {
            Backing::Owned(Box::default())
        } else {
            // SAFETY: the mapping is read-only and the input is treated as
            // immutable for the lifetime of the run.
            let mmap = unsafe { Mmap::map(&file) }.map_err(open_err)?;
            #[cfg(unix)]
            if let Err(err) = mmap.advise(memmap2::Advice::Sequential) {
                debug!(error = %err, "madvise(sequential) failed");
            }
            Backing::Mapped(mmap)
        };
        debug!(path = %path.display(), bytes = len, "input mapped");
        Ok(Self { path: Some(path.to_path_buf()), backing })
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: None,
            backing: Backing::Owned(bytes.into().into_boxed_slice()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(mmap) => &mmap[..],
            Backing::Owned(bytes) => &bytes[..],
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
