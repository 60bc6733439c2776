//! Store - Append-Only Record File
//!
//! The store is a file of length-prefixed frames written in append order:
//!
//! ```text
//! ┌──────────────┬─────────────┬──────────────┬─────────────┬────
//! │ len (8, BE)  │ frame bytes │ len (8, BE)  │ frame bytes │ ...
//! └──────────────┴─────────────┴──────────────┴─────────────┴────
//! ```
//!
//! It never interprets frame bytes; the segment owns the record codec. The
//! file has no header and no trailer, so `size` (total bytes written,
//! prefixes included) is recovered from file metadata on reopen and every
//! position handed out by `append` stays valid across restarts.
//!
//! Appends go through a buffered writer so small frames coalesce into one
//! syscall; reads flush the buffer first so they always observe every prior
//! append.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::os::unix::fs::FileExt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::error::Result;

/// Width of the big-endian length prefix
pub(crate) const LEN_WIDTH: u64 = 8;

const WRITE_BUF_CAPACITY: usize = 8 * 1024;

/// Append-only, length-prefixed record file
#[derive(Debug)]
pub(crate) struct Store {
    inner: Mutex<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    writer: BufWriter<File>,
    /// Total bytes written, length prefixes included
    size: u64,
}

impl Store {
    /// Wrap a file opened read-write with append semantics
    pub(crate) fn open(file: File) -> Result<Self> {
        let size = file.metadata()?.len();
        Ok(Self {
            inner: Mutex::new(StoreInner {
                writer: BufWriter::with_capacity(WRITE_BUF_CAPACITY, file),
                size,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // The inner state is a flat buffer and a counter, valid even if a
        // writer panicked mid-operation
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a frame, returning the bytes written and the position of its
    /// length prefix
    pub(crate) fn append(&self, bytes: &[u8]) -> Result<(u64, u64)> {
        let mut inner = self.lock();
        let pos = inner.size;

        let len = bytes.len() as u64;
        inner.writer.write_all(&len.to_be_bytes())?;
        inner.writer.write_all(bytes)?;

        let written = LEN_WIDTH + len;
        inner.size += written;
        Ok((written, pos))
    }

    /// Read the frame whose length prefix starts at `pos`
    pub(crate) fn read(&self, pos: u64) -> Result<Bytes> {
        let mut inner = self.lock();
        inner.writer.flush()?;

        let file = inner.writer.get_ref();
        let mut len_buf = [0u8; LEN_WIDTH as usize];
        file.read_exact_at(&mut len_buf, pos)?;
        let len = u64::from_be_bytes(len_buf);

        let mut frame = vec![0u8; len as usize];
        file.read_exact_at(&mut frame, pos + LEN_WIDTH)?;
        Ok(Bytes::from(frame))
    }

    /// Raw positioned read for whole-log streaming; no framing interpreted.
    /// Returns 0 at or past the end of the written region.
    pub(crate) fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let mut inner = self.lock();
        inner.writer.flush()?;

        if offset >= inner.size {
            return Ok(0);
        }
        let limit = (inner.size - offset).min(buf.len() as u64) as usize;
        inner.writer.get_ref().read_at(&mut buf[..limit], offset)
    }

    /// Total bytes written, length prefixes included
    pub(crate) fn size(&self) -> u64 {
        self.lock().size
    }

    /// Flush buffered writes and sync the file to stable storage
    pub(crate) fn close(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.writer.flush()?;
        inner.writer.get_ref().sync_all()?;
        Ok(())
    }
}
