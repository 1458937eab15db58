use blockset_crypto::ContentHasher;
use blockset_types::Digest;

use crate::entry::Block;
use crate::error::{TableError, TableResult};
use crate::table::{BlockTable, Inserted};

/// Inserts blocks only after checking that their payload hashes to the
/// digest they are offered under.
///
/// [`BlockTable::insert`] is the unchecked path for trusted producers; this
/// wrapper is the one to hand to anything that receives blocks from a peer.
pub struct VerifyingIngester<'a> {
    table: &'a mut BlockTable,
    hasher: ContentHasher,
}

impl<'a> VerifyingIngester<'a> {
    pub fn new(table: &'a mut BlockTable) -> Self {
        Self {
            table,
            hasher: ContentHasher::new(),
        }
    }

    /// Verify and insert one block.
    pub fn ingest(&mut self, digest: Digest, block: Block) -> TableResult<Inserted> {
        if let Some(descriptor) = &block.descriptor {
            if descriptor.hash != ContentHasher::CODE {
                return Err(TableError::DescriptorMismatch(format!(
                    "hash function 0x{:x} cannot be checked with BLAKE3",
                    descriptor.hash
                )));
            }
            if descriptor.digest_len != digest.len() as u64 {
                return Err(TableError::DescriptorMismatch(format!(
                    "descriptor claims {}-byte digest, got {}",
                    descriptor.digest_len,
                    digest.len()
                )));
            }
        }

        let computed = self.hasher.hash(&block.payload);
        if computed != digest {
            return Err(TableError::DigestMismatch {
                expected: digest.to_hex(),
                computed: computed.to_hex(),
            });
        }
        self.table.insert(digest, block)
    }

    /// The table being filled.
    pub fn table(&self) -> &BlockTable {
        self.table
    }
}
