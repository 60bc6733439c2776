//! Whole-Log Byte Reader
//!
//! [`LogReader`] streams the concatenation of every segment's store file,
//! oldest first, each from byte 0. Consumers that want records back replay
//! the store's length-prefix framing over the stream.
//!
//! The reader holds shared handles to the stores it snapshotted, so it keeps
//! working even if a later truncation deletes the underlying files.

use std::io::{self, Read};
use std::sync::Arc;

use crate::store::Store;

/// `std::io::Read` over the log's store files in base-offset order
pub struct LogReader {
    stores: Vec<Arc<Store>>,
    current: usize,
    pos: u64,
}

impl LogReader {
    pub(crate) fn new(stores: Vec<Arc<Store>>) -> Self {
        Self {
            stores,
            current: 0,
            pos: 0,
        }
    }
}

impl Read for LogReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while let Some(store) = self.stores.get(self.current) {
            let n = store.read_at(buf, self.pos)?;
            if n == 0 {
                // This store is exhausted; move to the next one
                self.current += 1;
                self.pos = 0;
                continue;
            }
            self.pos += n as u64;
            return Ok(n);
        }
        Ok(0)
    }
}
