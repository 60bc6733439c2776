//! Strata Log Engine
//!
//! This crate implements the on-disk commit log for strata - a durable,
//! append-only, single-writer/many-reader storage engine with random read
//! access by offset.
//!
//! ## Architecture Overview
//!
//! Four layers, leaves first:
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ Log                                           │
//! │ - ordered segments, one active tail           │
//! │ - rollover, truncation, whole-log reader      │
//! ├───────────────────────────────────────────────┤
//! │ Segment (one per base offset)                 │
//! │ - binds a store and an index                  │
//! │ - stamps offsets, frames records              │
//! ├───────────────────────┬───────────────────────┤
//! │ Store                 │ Index                 │
//! │ - <base>.store        │ - <base>.index        │
//! │ - length-prefixed     │ - mmap'd fixed-width  │
//! │   record frames       │   offset→position     │
//! └───────────────────────┴───────────────────────┘
//! ```
//!
//! Appends flow down the left side (bytes into the store, an entry into the
//! index); reads resolve an offset to its segment, then through the index to
//! a byte position in the store.
//!
//! ## Concurrency
//!
//! Operations block on disk I/O and are coordinated by a single
//! reader-writer lock at the [`Log`] level: appends, truncation, close,
//! remove and reset take it exclusively; reads, offset queries and reader
//! construction share it. Exactly one process may own a log directory at a
//! time - the engine does no cross-process locking.
//!
//! ## Usage
//!
//! ```ignore
//! use strata_log::{Log, LogConfig, Record};
//!
//! let log = Log::open("./data/orders-0", LogConfig::default())?;
//!
//! let offset = log.append(Record::new("hello world"))?;
//! let record = log.read(offset)?;
//! assert_eq!(record.value, "hello world");
//!
//! log.truncate(offset)?; // drop segments at or below the watermark
//! log.close()?;
//! ```

pub mod config;
pub mod error;
pub mod log;
pub mod reader;

mod index;
mod segment;
mod store;

pub use config::LogConfig;
pub use error::{Error, Result};
pub use log::Log;
pub use reader::LogReader;
pub use strata_core::Record;
