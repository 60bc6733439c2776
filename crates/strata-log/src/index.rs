//! Index - Memory-Mapped Offset Table
//!
//! The index translates a record's offset within a segment to the byte
//! position of its frame in the companion store. Entries are fixed-width so
//! entry `k` always lives at byte `k * 12`:
//!
//! ```text
//! ┌──────────────────────────┬──────────────────────┐
//! │ relative offset (4, BE)  │ store position (8, BE) │
//! └──────────────────────────┴──────────────────────┘
//! ```
//!
//! ## Creation protocol
//!
//! On open the file is stat'd to capture the live `size`, then pre-extended
//! to `max_index_bytes` and mapped read-write shared. Pre-sizing means the
//! mapping never has to be remapped while the segment is active.
//!
//! ## Close protocol
//!
//! Close flushes the mapping, syncs the file, then truncates it down to the
//! live `size`. The truncation matters: reopen derives `size` from the file
//! length, so without it a reopened index would count the zero padding as
//! valid entries. The ordering (mmap sync, file sync, truncate, close) is
//! load-bearing for crash durability of the tail entries.

use std::fs::File;

use memmap2::MmapMut;

use crate::error::{Error, Result};

const OFF_WIDTH: u64 = 4;
const POS_WIDTH: u64 = 8;
/// Width of one (relative offset, position) entry
pub(crate) const ENTRY_WIDTH: u64 = OFF_WIDTH + POS_WIDTH;

/// Memory-mapped offset→position table for one segment
#[derive(Debug)]
pub(crate) struct Index {
    file: File,
    mmap: MmapMut,
    /// Bytes of live entries; everything beyond is zero padding
    size: u64,
}

impl Index {
    /// Open an index over `file`, pre-extending it to `max_index_bytes`
    pub(crate) fn open(file: File, max_index_bytes: u64) -> Result<Self> {
        let size = file.metadata()?.len();
        file.set_len(max_index_bytes)?;

        // SAFETY: the file is open read-write, stays owned by this Index for
        // the mapping's lifetime, and the log directory is exclusive to one
        // process, so no external mutation invalidates the mapping.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self { file, mmap, size })
    }

    /// Read entry `n`, returning its relative offset and store position
    pub(crate) fn read(&self, n: u32) -> Result<(u32, u64)> {
        if self.size == 0 {
            return Err(Error::IndexEmpty);
        }

        let pos = n as u64 * ENTRY_WIDTH;
        if self.size < pos + ENTRY_WIDTH {
            return Err(Error::IndexEmpty);
        }

        let entry = &self.mmap[pos as usize..(pos + ENTRY_WIDTH) as usize];
        let relative = u32::from_be_bytes(entry[..OFF_WIDTH as usize].try_into().unwrap());
        let position = u64::from_be_bytes(entry[OFF_WIDTH as usize..].try_into().unwrap());
        Ok((relative, position))
    }

    /// Read the last live entry
    pub(crate) fn last_entry(&self) -> Result<(u32, u64)> {
        if self.size == 0 {
            return Err(Error::IndexEmpty);
        }
        self.read((self.size / ENTRY_WIDTH - 1) as u32)
    }

    /// Append an entry at the live tail
    pub(crate) fn write(&mut self, relative: u32, position: u64) -> Result<()> {
        if self.is_full() {
            return Err(Error::IndexFull);
        }

        let at = self.size as usize;
        self.mmap[at..at + OFF_WIDTH as usize].copy_from_slice(&relative.to_be_bytes());
        self.mmap[at + OFF_WIDTH as usize..at + ENTRY_WIDTH as usize]
            .copy_from_slice(&position.to_be_bytes());
        self.size += ENTRY_WIDTH;
        Ok(())
    }

    /// True when the mapping has no room for another entry
    pub(crate) fn is_full(&self) -> bool {
        (self.mmap.len() as u64) < self.size + ENTRY_WIDTH
    }

    /// Bytes of live entries
    pub(crate) fn size(&self) -> u64 {
        self.size
    }

    /// Sync the mapping, sync the file, truncate it to the live size
    pub(crate) fn close(self) -> Result<()> {
        let Index { file, mmap, size } = self;

        mmap.flush()?;
        file.sync_all()?;
        // Unmap before shrinking so no mapped page points past EOF
        drop(mmap);
        file.set_len(size)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::path::Path;
    use tempfile::TempDir;

    const MAX_INDEX_BYTES: u64 = 1024;

    fn open_index(path: &Path, max_index_bytes: u64) -> Index {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .unwrap();
        Index::open(file, max_index_bytes).unwrap()
    }

    // ---------------------------------------------------------------
    // Empty index
    // ---------------------------------------------------------------

    #[test]
    fn test_read_empty_fails() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir.path().join("empty.index"), MAX_INDEX_BYTES);

        assert!(matches!(index.read(0), Err(Error::IndexEmpty)));
        assert!(matches!(index.last_entry(), Err(Error::IndexEmpty)));
    }

    #[test]
    fn test_open_pre_extends_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("extent.index");
        let _index = open_index(&path, MAX_INDEX_BYTES);

        assert_eq!(std::fs::metadata(&path).unwrap().len(), MAX_INDEX_BYTES);
    }

    // ---------------------------------------------------------------
    // Write / read
    // ---------------------------------------------------------------

    #[test]
    fn test_write_read_entries() {
        let dir = TempDir::new().unwrap();
        let mut index = open_index(&dir.path().join("rw.index"), MAX_INDEX_BYTES);

        let entries = [(0u32, 0u64), (1, 19), (2, 38)];
        for (relative, position) in entries {
            index.write(relative, position).unwrap();
        }

        for (n, (relative, position)) in entries.into_iter().enumerate() {
            assert_eq!(index.read(n as u32).unwrap(), (relative, position));
        }
        assert_eq!(index.last_entry().unwrap(), (2, 38));
        assert_eq!(index.size(), 3 * ENTRY_WIDTH);
    }

    #[test]
    fn test_read_past_live_region_fails() {
        let dir = TempDir::new().unwrap();
        let mut index = open_index(&dir.path().join("past.index"), MAX_INDEX_BYTES);
        index.write(0, 0).unwrap();

        // Entry 1 is zero padding, not a live entry
        assert!(matches!(index.read(1), Err(Error::IndexEmpty)));
        assert!(matches!(index.read(100), Err(Error::IndexEmpty)));
    }

    // ---------------------------------------------------------------
    // Full index
    // ---------------------------------------------------------------

    #[test]
    fn test_write_full_fails() {
        let dir = TempDir::new().unwrap();
        let mut index = open_index(&dir.path().join("full.index"), 2 * ENTRY_WIDTH);

        index.write(0, 0).unwrap();
        assert!(!index.is_full());
        index.write(1, 19).unwrap();
        assert!(index.is_full());
        assert!(matches!(index.write(2, 38), Err(Error::IndexFull)));

        // The failed write must not advance the live size
        assert_eq!(index.size(), 2 * ENTRY_WIDTH);
        assert_eq!(index.last_entry().unwrap(), (1, 19));
    }

    // ---------------------------------------------------------------
    // Close / reopen
    // ---------------------------------------------------------------

    #[test]
    fn test_close_truncates_to_live_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("close.index");

        let mut index = open_index(&path, MAX_INDEX_BYTES);
        index.write(0, 0).unwrap();
        index.write(1, 19).unwrap();
        index.close().unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 2 * ENTRY_WIDTH);
    }

    #[test]
    fn test_reopen_recovers_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reopen.index");

        {
            let mut index = open_index(&path, MAX_INDEX_BYTES);
            index.write(0, 0).unwrap();
            index.write(1, 19).unwrap();
            index.write(2, 38).unwrap();
            index.close().unwrap();
        }

        let index = open_index(&path, MAX_INDEX_BYTES);
        assert_eq!(index.size(), 3 * ENTRY_WIDTH);
        assert_eq!(index.last_entry().unwrap(), (2, 38));
        assert_eq!(index.read(1).unwrap(), (1, 19));
    }
}
