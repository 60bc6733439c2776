//! Log Configuration
//!
//! Controls how segments are sized and where an empty log starts:
//!
//! - **max_store_bytes**: roll the active segment when its store file
//!   reaches this size (default: 1024)
//! - **max_index_bytes**: roll when the index reaches this size; also the
//!   on-disk extent of an open index file (default: 1024)
//! - **initial_offset**: base offset for the first segment of an empty
//!   directory (default: 0)
//!
//! The store condition dominates for large payloads; the index conditions
//! dominate for many small payloads (each record costs a fixed 12 index
//! bytes).
//!
//! ## Usage
//!
//! ```ignore
//! use strata_log::LogConfig;
//!
//! // Production-ish sizing
//! let config = LogConfig {
//!     max_store_bytes: 64 * 1024 * 1024,
//!     max_index_bytes: 8 * 1024 * 1024,
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Maximum store file size in bytes before rolling (default: 1024)
    #[serde(default = "default_max_store_bytes")]
    pub max_store_bytes: u64,

    /// Maximum index size in bytes; also the on-disk extent of an open
    /// index file (default: 1024)
    #[serde(default = "default_max_index_bytes")]
    pub max_index_bytes: u64,

    /// Base offset for the first segment of an empty directory (default: 0)
    #[serde(default)]
    pub initial_offset: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_store_bytes: default_max_store_bytes(),
            max_index_bytes: default_max_index_bytes(),
            initial_offset: 0,
        }
    }
}

impl LogConfig {
    /// Replace zero byte limits with the defaults
    pub(crate) fn normalized(mut self) -> Self {
        if self.max_store_bytes == 0 {
            self.max_store_bytes = default_max_store_bytes();
        }
        if self.max_index_bytes == 0 {
            self.max_index_bytes = default_max_index_bytes();
        }
        self
    }
}

fn default_max_store_bytes() -> u64 {
    1024
}

fn default_max_index_bytes() -> u64 {
    1024
}
