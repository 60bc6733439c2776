//! Log Engine Error Types
//!
//! ## Error Categories
//!
//! ### I/O
//! - `Io`: surfaced unchanged from the file system or mmap; fatal for the
//!   operation, not for the log
//!
//! ### Index sentinels
//! - `IndexEmpty`: read-side - the index has no entry at the requested slot.
//!   Expected once per segment lifetime, at open, where it means "fresh
//!   segment"
//! - `IndexFull`: write-side - no room for another entry. The rollover
//!   signal; the log handles it before the next append ever sees it
//!
//! ### Lookup
//! - `OffsetOutOfRange`: no segment covers the requested offset. Carries the
//!   offset so outer layers can map it to a client-visible status
//!
//! ### Codec
//! - `Codec`: record frame encode/decode failure; the log neither appends
//!   nor advances its offset counter
//!
//! All operations return `Result<T>`, aliased to `Result<T, Error>`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index has no entry at the requested slot")]
    IndexEmpty,

    #[error("index has no room for another entry")]
    IndexFull,

    #[error("offset out of range: {offset}")]
    OffsetOutOfRange { offset: u64 },

    #[error("log has no open segments")]
    Closed,

    #[error("record codec error: {0}")]
    Codec(#[from] strata_core::Error),
}
