//! Variable-length Integer Encoding (Varint)
//!
//! Unsigned varints as used by the record frame: each byte carries 7 bits of
//! payload and one continuation bit, so small numbers (0-127) take a single
//! byte instead of 8. Offsets and payload lengths are almost always small,
//! which keeps the per-record framing overhead to a couple of bytes.
//!
//! Decoding is fallible because it runs over bytes read back from disk: a
//! frame cut short mid-varint yields [`Error::TruncatedFrame`], and a
//! continuation chain past 64 bits yields [`Error::VarintOverflow`].

use bytes::{Buf, BufMut};

use crate::error::{Error, Result};

/// Encode an unsigned integer as a varint
pub fn encode_u64(buf: &mut impl BufMut, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;

        if value != 0 {
            byte |= 0x80; // Set continuation bit
        }

        buf.put_u8(byte);

        if value == 0 {
            break;
        }
    }
}

/// Decode a varint to an unsigned integer
pub fn decode_u64(buf: &mut impl Buf) -> Result<u64> {
    let mut value: u64 = 0;
    let mut shift = 0;

    loop {
        if !buf.has_remaining() {
            return Err(Error::TruncatedFrame);
        }
        if shift >= 64 {
            return Err(Error::VarintOverflow);
        }

        let byte = buf.get_u8();
        value |= ((byte & 0x7F) as u64) << shift;

        if (byte & 0x80) == 0 {
            break;
        }

        shift += 7;
    }

    Ok(value)
}
