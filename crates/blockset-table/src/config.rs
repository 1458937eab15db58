use blockset_types::multicodec;
use serde::{Deserialize, Serialize};

/// Configuration for a [`BlockTable`](crate::BlockTable).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Codec recorded for blocks added with [`add_raw`](crate::BlockTable::add_raw).
    pub default_codec: u64,
    /// Run a full [`verify`](crate::BlockTable::verify) after every new entry.
    ///
    /// This turns each insertion into an O(n) walk; meant for debugging.
    pub verify_on_insert: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_codec: multicodec::RAW,
            verify_on_insert: false,
        }
    }
}

impl TableConfig {
    /// Default configuration with per-insert verification switched on.
    pub fn paranoid() -> Self {
        Self {
            verify_on_insert: true,
            ..Default::default()
        }
    }
}
