//! Structural self-checks for a [`BlockTable`].

use std::cmp::Ordering;

use tracing::warn;

use crate::error::{TableError, TableResult};
use crate::table::BlockTable;

impl BlockTable {
    /// Check that entries are strictly increasing by digest and that search
    /// finds every stored entry.
    ///
    /// Ordering and uniqueness are checked across the whole table before any
    /// lookup runs, since the crawl assumes a sorted table and would
    /// otherwise report a misplaced entry as missing.
    pub fn verify(&self) -> TableResult<()> {
        for (position, pair) in self.entries.windows(2).enumerate() {
            let position = position + 1;
            match pair[1].digest.cmp(&pair[0].digest) {
                Ordering::Greater => {}
                Ordering::Less => {
                    warn!(position, digest = %pair[1].digest.short_hex(), "entry out of order");
                    return Err(TableError::OrderingViolation { position });
                }
                Ordering::Equal => {
                    warn!(position, digest = %pair[1].digest.short_hex(), "duplicate entry");
                    return Err(TableError::DuplicateEntry { position });
                }
            }
        }

        for (position, entry) in self.entries.iter().enumerate() {
            if !self.has(entry.digest.as_bytes()) {
                warn!(position, digest = %entry.digest.short_hex(), "inclusion check failed");
                return Err(TableError::InclusionViolation { position });
            }
        }
        Ok(())
    }
}
