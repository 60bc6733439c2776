//! Record Data Structure
//!
//! The fundamental unit of data in strata: an opaque byte payload plus the
//! offset the log stamps onto it at append time.
//!
//! ## Structure
//! - **offset**: unique, monotonically increasing position in the log;
//!   assigned by the log, any caller-supplied value is overwritten
//! - **value**: the actual payload (arbitrary bytes)
//!
//! ## Framing
//! Records cross the store boundary as a compact binary frame that is stable
//! across restarts:
//!
//! ```text
//! ┌────────────────┬──────────────────┬─────────────┐
//! │ offset         │ value length     │ value       │
//! │ (varint u64)   │ (varint u64)     │ (N bytes)   │
//! └────────────────┴──────────────────┴─────────────┘
//! ```
//!
//! Encoding is infallible. Decoding validates that the frame carries as many
//! payload bytes as its length field claims.
//!
//! ## Design Decisions
//! - Uses `bytes::Bytes` for zero-copy slicing and cheap clones
//! - Implements `Serialize`/`Deserialize` for outer layers that ship records
//!   over other transports

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::varint;

/// A single record in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Offset of this record in the log; stamped on append
    pub offset: u64,

    /// Value (payload)
    pub value: Bytes,
}

impl Record {
    /// Create a record awaiting an offset from the log
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            offset: 0,
            value: value.into(),
        }
    }

    /// Encode this record into its binary frame
    pub fn encode(&self) -> Bytes {
        // Two varints are at most 10 bytes each
        let mut buf = BytesMut::with_capacity(20 + self.value.len());
        varint::encode_u64(&mut buf, self.offset);
        varint::encode_u64(&mut buf, self.value.len() as u64);
        buf.put_slice(&self.value);
        buf.freeze()
    }

    /// Decode a record from its binary frame
    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        let offset = varint::decode_u64(&mut buf)?;
        let len = varint::decode_u64(&mut buf)? as usize;
        if buf.len() < len {
            return Err(Error::TruncatedFrame);
        }

        Ok(Self {
            offset,
            value: Bytes::copy_from_slice(&buf[..len]),
        })
    }
}
