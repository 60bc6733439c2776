//! Log - Ordered Segments With One Active Tail
//!
//! The log owns a directory of segments sorted by ascending base offset.
//! The last segment is the *active* one and the only one that accepts
//! appends; when it fills up (store or index limit), the log rolls over to a
//! fresh segment whose base offset continues where the old tail ended.
//!
//! ## Directory recovery
//!
//! Opening a directory scans it for `<base_offset>.store` /
//! `<base_offset>.index` pairs. Base offsets are collected into an ordered
//! set keyed on the parsed file stem - both files of a pair parse to the
//! same offset, so the set also deduplicates a half-created pair left by a
//! crash between file creations. An empty directory gets its first segment
//! at the configured initial offset.
//!
//! ## Coordination
//!
//! One reader-writer lock guards the segment list. Appends, truncation,
//! close, remove and reset take it exclusively; reads, offset queries and
//! reader construction share it. Segments other than the active one are
//! immutable between writer-lock windows, so no per-segment lock is needed.
//!
//! ## Truncation
//!
//! `truncate(lowest)` drops every segment whose records all sit at or below
//! the watermark - that is, every segment with `next_offset <= lowest + 1` -
//! in base-offset order. Reads for offsets that belonged to removed segments
//! fail with `OffsetOutOfRange`.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use strata_core::Record;

use crate::config::LogConfig;
use crate::error::{Error, Result};
use crate::reader::LogReader;
use crate::segment::Segment;

/// A durable, append-only commit log over a directory of segments
#[derive(Debug)]
pub struct Log {
    dir: PathBuf,
    config: LogConfig,
    segments: RwLock<Vec<Segment>>,
}

impl Log {
    /// Open the log in `dir`, recovering any existing segments. The
    /// directory is created if absent; zero byte limits in the config are
    /// replaced with the defaults.
    pub fn open(dir: impl AsRef<Path>, config: LogConfig) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let config = config.normalized();

        let segments = Self::setup(&dir, &config)?;
        info!(
            dir = %dir.display(),
            segments = segments.len(),
            "log opened"
        );

        Ok(Self {
            dir,
            config,
            segments: RwLock::new(segments),
        })
    }

    /// Scan `dir` and open a segment per recovered base offset, ascending;
    /// create the first segment when the directory holds none.
    fn setup(dir: &Path, config: &LogConfig) -> Result<Vec<Segment>> {
        fs::create_dir_all(dir)?;

        let mut base_offsets = BTreeSet::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match stem.parse::<u64>() {
                Ok(base_offset) => {
                    base_offsets.insert(base_offset);
                }
                Err(_) => warn!(
                    file = %path.display(),
                    "skipping foreign file in log directory"
                ),
            }
        }

        let mut segments = Vec::with_capacity(base_offsets.len().max(1));
        for base_offset in base_offsets {
            segments.push(Segment::open(dir, base_offset, config)?);
        }
        if segments.is_empty() {
            segments.push(Segment::open(dir, config.initial_offset, config)?);
        }
        Ok(segments)
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Vec<Segment>> {
        // Segment state is only reachable through this lock; a panicked
        // writer leaves nothing half-updated that a reader could misread
        self.segments.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Vec<Segment>> {
        self.segments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a record, rolling over to a fresh segment first when the
    /// active one is full. Returns the stamped offset.
    pub fn append(&self, record: Record) -> Result<u64> {
        let mut segments = self.write_lock();
        let active = segments.last().ok_or(Error::Closed)?;

        if active.is_maxed() {
            let base_offset = Self::highest(&segments) + 1;
            debug!(base_offset, "active segment maxed, rolling over");
            segments.push(Segment::open(&self.dir, base_offset, &self.config)?);
        }

        let active = segments.last_mut().expect("log keeps at least one segment");
        active.append(record)
    }

    /// Read the record at `offset`
    pub fn read(&self, offset: u64) -> Result<Record> {
        let segments = self.read_lock();
        let segment = segments
            .iter()
            .find(|s| s.base_offset() <= offset && offset < s.next_offset())
            .ok_or(Error::OffsetOutOfRange { offset })?;
        segment.read(offset)
    }

    /// Offset of the oldest retained record
    pub fn lowest_offset(&self) -> Result<u64> {
        let segments = self.read_lock();
        let first = segments.first().ok_or(Error::Closed)?;
        Ok(first.base_offset())
    }

    /// Offset of the newest record; 0 for an empty log starting at 0
    pub fn highest_offset(&self) -> Result<u64> {
        let segments = self.read_lock();
        if segments.is_empty() {
            return Err(Error::Closed);
        }
        Ok(Self::highest(&segments))
    }

    fn highest(segments: &[Segment]) -> u64 {
        let next = segments.last().map_or(0, Segment::next_offset);
        next.saturating_sub(1)
    }

    /// Remove every segment whose records all sit at or below `lowest`,
    /// oldest first
    pub fn truncate(&self, lowest: u64) -> Result<()> {
        let mut segments = self.write_lock();

        let mut retained = Vec::with_capacity(segments.len());
        let mut removed = 0usize;
        for segment in segments.drain(..) {
            if segment.next_offset() <= lowest.saturating_add(1) {
                segment.remove()?;
                removed += 1;
            } else {
                retained.push(segment);
            }
        }
        *segments = retained;

        info!(lowest, removed, "truncated log");
        Ok(())
    }

    /// Byte stream over the concatenated store files in base-offset order.
    /// The stream covers a consistent prefix as of this call; appends and
    /// truncations afterwards do not invalidate it.
    pub fn reader(&self) -> LogReader {
        let segments = self.read_lock();
        LogReader::new(segments.iter().map(Segment::store_handle).collect())
    }

    /// Close every segment (sync, truncate indexes, release files)
    pub fn close(&self) -> Result<()> {
        let mut segments = self.write_lock();
        Self::close_segments(&mut segments)
    }

    /// Close the log and delete its directory
    pub fn remove(&self) -> Result<()> {
        let mut segments = self.write_lock();
        Self::close_segments(&mut segments)?;

        info!(dir = %self.dir.display(), "removing log directory");
        fs::remove_dir_all(&self.dir)?;
        Ok(())
    }

    /// Delete all data and start over as an empty log
    pub fn reset(&self) -> Result<()> {
        let mut segments = self.write_lock();
        Self::close_segments(&mut segments)?;
        fs::remove_dir_all(&self.dir)?;

        *segments = Self::setup(&self.dir, &self.config)?;
        info!(dir = %self.dir.display(), "log reset");
        Ok(())
    }

    fn close_segments(segments: &mut Vec<Segment>) -> Result<()> {
        // Close every segment even if one fails; bailing out early would let
        // the rest drop without their sync-and-truncate close path
        let mut first_err = None;
        for segment in segments.drain(..) {
            if let Err(e) = segment.close() {
                warn!(error = %e, "failed to close segment");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Directory this log owns
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Effective configuration (zero limits already normalized)
    pub fn config(&self) -> &LogConfig {
        &self.config
    }
}
