//! Codec Error Types
//!
//! Errors that can occur while encoding or decoding record frames. Encoding
//! never fails; both variants come from the decode path, which parses bytes
//! read back from disk.
//!
//! All fallible functions in this crate return `Result<T>`, aliased to
//! `Result<T, Error>`, so callers can propagate with `?`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("record frame truncated")]
    TruncatedFrame,

    #[error("varint exceeds 64 bits")]
    VarintOverflow,
}

pub type Result<T> = std::result::Result<T, Error>;
