//! Segment - Store + Index Under One Base Offset
//!
//! A segment binds a store file and an index file that share a base offset,
//! named `<base_offset>.store` and `<base_offset>.index` in the log
//! directory. The base offset is the absolute offset of the segment's first
//! record; `next_offset` is where the next append lands, so the segment
//! covers `base_offset..next_offset`.
//!
//! Only the log's active (tail) segment accepts appends; earlier segments
//! are immutable until removed. On open, `next_offset` is recovered from the
//! index's last entry - an empty index means a fresh segment starting at the
//! base offset.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use strata_core::Record;

use crate::config::LogConfig;
use crate::error::{Error, Result};
use crate::index::Index;
use crate::store::Store;

/// One store+index pair of the log
#[derive(Debug)]
pub(crate) struct Segment {
    store: Arc<Store>,
    index: Index,
    base_offset: u64,
    next_offset: u64,
    config: LogConfig,
    store_path: PathBuf,
    index_path: PathBuf,
}

impl Segment {
    /// Open or create the segment with the given base offset in `dir`
    pub(crate) fn open(dir: &Path, base_offset: u64, config: &LogConfig) -> Result<Self> {
        let store_path = dir.join(format!("{base_offset}.store"));
        let index_path = dir.join(format!("{base_offset}.index"));

        let store_file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&store_path)?;
        let store = Arc::new(Store::open(store_file)?);

        let index_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&index_path)?;
        let index = Index::open(index_file, config.max_index_bytes)?;

        let next_offset = match index.last_entry() {
            Ok((relative, _)) => base_offset + relative as u64 + 1,
            // Empty index: fresh segment, next append is the first record
            Err(Error::IndexEmpty) => base_offset,
            Err(e) => return Err(e),
        };

        debug!(
            dir = %dir.display(),
            base_offset,
            next_offset,
            "segment opened"
        );

        Ok(Self {
            store,
            index,
            base_offset,
            next_offset,
            config: config.clone(),
            store_path,
            index_path,
        })
    }

    /// Stamp the record with the next offset, persist it, and return the
    /// stamped offset
    pub(crate) fn append(&mut self, mut record: Record) -> Result<u64> {
        let offset = self.next_offset;
        record.offset = offset;

        let frame = record.encode();
        let (_, position) = self.store.append(&frame)?;
        self.index
            .write((offset - self.base_offset) as u32, position)?;

        self.next_offset += 1;
        Ok(offset)
    }

    /// Read the record at the given absolute offset
    pub(crate) fn read(&self, offset: u64) -> Result<Record> {
        let relative = offset
            .checked_sub(self.base_offset)
            .ok_or(Error::OffsetOutOfRange { offset })?;
        let (_, position) = self.index.read(relative as u32)?;
        let frame = self.store.read(position)?;
        Ok(Record::decode(&frame)?)
    }

    /// True when either file has reached its configured limit. The store
    /// condition dominates for large payloads, the index conditions for many
    /// small ones.
    pub(crate) fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.max_store_bytes
            || self.index.size() >= self.config.max_index_bytes
            || self.index.is_full()
    }

    pub(crate) fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Absolute offset of the next append; equals base_offset plus the
    /// number of records in the segment
    pub(crate) fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Shared handle to the store, for whole-log readers that outlive the
    /// segment list snapshot
    pub(crate) fn store_handle(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    /// Close the index (sync + truncate) and then the store
    pub(crate) fn close(self) -> Result<()> {
        let Segment { store, index, .. } = self;
        index.close()?;
        store.close()?;
        Ok(())
    }

    /// Close, then delete both files
    pub(crate) fn remove(self) -> Result<()> {
        let store_path = self.store_path.clone();
        let index_path = self.index_path.clone();
        self.close()?;

        fs::remove_file(index_path)?;
        fs::remove_file(store_path)?;
        Ok(())
    }
}
