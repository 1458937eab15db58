use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::TableConfig;
use crate::entry::Entry;
use crate::error::{TableError, TableResult};
use crate::table::BlockTable;

/// Captured table state: summary metadata plus every entry in table order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub digest_size: usize,
    pub block_offset: u64,
    pub largest_block: u64,
    pub entries: Vec<Entry>,
}

impl TableSnapshot {
    /// Serialize with bincode.
    pub fn to_bytes(&self) -> TableResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| TableError::Serialization(e.to_string()))
    }

    /// Deserialize from bincode.
    pub fn from_bytes(data: &[u8]) -> TableResult<Self> {
        bincode::deserialize(data).map_err(|e| TableError::Serialization(e.to_string()))
    }
}

impl TableSnapshot {
    /// Summary fields must be exactly what the entries imply.
    fn check_metadata(&self) -> TableResult<()> {
        let digest_size = self.entries.iter().map(|e| e.digest.len()).max().unwrap_or(0);
        let largest_block = self
            .entries
            .iter()
            .map(|e| e.placement.length)
            .max()
            .unwrap_or(0);
        let block_offset = self
            .entries
            .iter()
            .try_fold(0u64, |sum, e| sum.checked_add(e.placement.length))
            .ok_or_else(|| TableError::Corrupt("block region size overflows u64".into()))?;

        let mismatch = |field: &str, claimed: u64, actual: u64| {
            warn!(field, claimed, actual, "snapshot metadata mismatch");
            Err(TableError::Corrupt(format!(
                "snapshot {field} is {claimed}, entries imply {actual}"
            )))
        };
        if self.digest_size != digest_size {
            return mismatch("digest_size", self.digest_size as u64, digest_size as u64);
        }
        if self.block_offset != block_offset {
            return mismatch("block_offset", self.block_offset, block_offset);
        }
        if self.largest_block != largest_block {
            return mismatch("largest_block", self.largest_block, largest_block);
        }
        Ok(())
    }
}

impl BlockTable {
    /// Capture the current state. Buffers are shared, not copied.
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            digest_size: self.digest_size,
            block_offset: self.block_offset,
            largest_block: self.largest_block,
            entries: self.entries.clone(),
        }
    }

    /// Rehydrate a table from a snapshot.
    ///
    /// The entry count and the summary metadata are checked against the
    /// entries. Ordering is not; call [`verify`](Self::verify) before relying
    /// on a snapshot from an untrusted source.
    pub fn from_snapshot(snapshot: TableSnapshot, config: TableConfig) -> TableResult<Self> {
        let mut table = Self::with_config(config);
        table.ensure_capacity(snapshot.entries.len() as u64)?;
        snapshot.check_metadata()?;
        debug!(entries = snapshot.entries.len(), "rehydrated table");

        table.entries = snapshot.entries;
        table.digest_size = snapshot.digest_size;
        table.block_offset = snapshot.block_offset;
        table.largest_block = snapshot.largest_block;
        Ok(table)
    }
}
