//! The digest-ordered block table.
//!
//! [`BlockTable`] keeps its entries in a `Vec` sorted by digest. Lookups do
//! not bisect: they read the leading bytes of the query to predict where it
//! should sit, then crawl toward it one slot at a time. For uniformly
//! distributed digests the prediction lands close to the answer; skewed or
//! adversarial digests degrade to a linear crawl.

use std::cmp::{max, Ordering};

use blockset_crypto::ContentHasher;
use blockset_types::{Digest, WidthClass};
use bytes::Bytes;
use tracing::{debug, trace};

use crate::config::TableConfig;
use crate::entry::{Block, Entry, Placement};
use crate::error::{TableError, TableResult};

/// Outcome of [`BlockTable::find`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lookup {
    /// Index of the match, or where the digest would be inserted.
    pub position: usize,
    /// `true` only for a byte-for-byte, same-length match.
    pub exact: bool,
    /// Number of entries visited by the crawl.
    pub steps: usize,
}

/// Outcome of [`BlockTable::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inserted {
    /// A new entry was spliced in.
    New { position: usize, placement: Placement },
    /// The digest was already present; nothing changed.
    Duplicate { position: usize },
}

impl Inserted {
    /// Returns `true` if the table grew.
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New { .. })
    }

    /// Position of the digest after the call.
    pub fn position(&self) -> usize {
        match self {
            Self::New { position, .. } | Self::Duplicate { position } => *position,
        }
    }
}

/// In-memory, digest-ordered index of blocks.
///
/// `insert` trusts its caller: it never checks that a payload hashes to the
/// digest it is filed under. Use [`BlockTable::add`] to let the table hash
/// the payload itself, or [`VerifyingIngester`](crate::VerifyingIngester)
/// to check externally supplied digests.
///
/// Digest and payload buffers are shared [`Bytes`] and are never copied.
pub struct BlockTable {
    pub(crate) entries: Vec<Entry>,
    pub(crate) digest_size: usize,
    pub(crate) block_offset: u64,
    pub(crate) largest_block: u64,
    pub(crate) config: TableConfig,
    pub(crate) hasher: ContentHasher,
}

impl std::fmt::Debug for BlockTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockTable")
            .field("entries", &self.entries.len())
            .field("digest_size", &self.digest_size)
            .field("block_offset", &self.block_offset)
            .field("largest_block", &self.largest_block)
            .finish()
    }
}

impl Default for BlockTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockTable {
    /// Create an empty table with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    /// Create an empty table.
    pub fn with_config(config: TableConfig) -> Self {
        Self {
            entries: Vec::new(),
            digest_size: 0,
            block_offset: 0,
            largest_block: 0,
            config,
            hasher: ContentHasher::new(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest digest seen so far.
    pub fn digest_size(&self) -> usize {
        self.digest_size
    }

    /// Total size of the block region, and the offset the next block gets.
    pub fn block_offset(&self) -> u64 {
        self.block_offset
    }

    /// Largest framed block seen so far.
    pub fn largest_block(&self) -> u64 {
        self.largest_block
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// All entries in digest order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// All digests in table order.
    pub fn digests(&self) -> impl Iterator<Item = &Digest> + '_ {
        self.entries.iter().map(|entry| &entry.digest)
    }

    /// The digest stored at `position`.
    pub fn digest_at(&self, position: usize) -> Option<&Digest> {
        self.entries.get(position).map(|entry| &entry.digest)
    }

    /// The entry for `digest`, if present.
    pub fn get(&self, digest: &[u8]) -> Option<&Entry> {
        let lookup = self.find(digest);
        lookup.exact.then(|| &self.entries[lookup.position])
    }

    /// Membership test.
    pub fn has(&self, digest: &[u8]) -> bool {
        self.find(digest).exact
    }

    /// Locate `digest`, or the position that would keep the table sorted if
    /// it were inserted there.
    pub fn find(&self, digest: &[u8]) -> Lookup {
        let len = self.entries.len();
        if len == 0 {
            return Lookup {
                position: 0,
                exact: false,
                steps: 0,
            };
        }
        // Insertion and rehydration keep `len` within the 32-bit class.
        let class = WidthClass::classify(len as u64).unwrap_or(WidthClass::U32);

        let mut offset = class.predict(digest, len);
        let mut open_less = true;
        let mut open_greater = true;
        let mut steps = 1;
        let mut i = 0;

        let done = |position: usize, exact: bool, steps: usize| Lookup {
            position,
            exact,
            steps,
        };

        loop {
            let current = self.entries[offset].digest.as_bytes();
            let direction = match (digest.get(i), current.get(i)) {
                (Some(q), Some(c)) if q == c => {
                    i += 1;
                    continue;
                }
                (Some(q), Some(c)) => q.cmp(c),
                (None, None) => return done(offset, true, steps),
                // The query is a strict prefix of the current digest.
                (None, Some(_)) => Ordering::Less,
                // The current digest is a strict prefix of the query.
                (Some(_), None) => Ordering::Greater,
            };

            if direction == Ordering::Less {
                open_greater = false;
                if !open_less {
                    return done(offset, false, steps);
                }
                if offset == 0 {
                    return done(0, false, steps);
                }
                offset -= 1;
            } else {
                open_less = false;
                if !open_greater || offset == len - 1 {
                    return done(offset + 1, false, steps);
                }
                offset += 1;
            }
            steps += 1;
            i = 0;
        }
    }

    /// Insert a block under `digest`. Inserting a digest that is already
    /// present is a no-op.
    ///
    /// The payload is not checked against the digest.
    pub fn insert(&mut self, digest: Digest, block: Block) -> TableResult<Inserted> {
        let lookup = self.find(digest.as_bytes());
        if lookup.exact {
            trace!(digest = %digest.short_hex(), "duplicate insert ignored");
            return Ok(Inserted::Duplicate {
                position: lookup.position,
            });
        }

        self.ensure_capacity(self.entries.len() as u64 + 1)?;
        let framed = block.framed_len()?;
        let previous = (self.digest_size, self.largest_block, self.block_offset);

        self.digest_size = max(self.digest_size, digest.len());
        self.largest_block = max(self.largest_block, framed);

        let placement = Placement {
            offset: self.block_offset,
            length: framed,
        };
        debug!(
            digest = %digest.short_hex(),
            position = lookup.position,
            offset = placement.offset,
            len = placement.length,
            steps = lookup.steps,
            "inserted block"
        );
        self.entries.insert(
            lookup.position,
            Entry {
                digest,
                block,
                placement,
            },
        );
        self.block_offset += framed;

        if self.config.verify_on_insert {
            if let Err(err) = self.verify() {
                // Leave the table exactly as it was before the call.
                self.entries.remove(lookup.position);
                (self.digest_size, self.largest_block, self.block_offset) = previous;
                return Err(err);
            }
        }
        Ok(Inserted::New {
            position: lookup.position,
            placement,
        })
    }

    /// Hash `data` and insert it with a BLAKE3 descriptor for `codec`.
    pub fn add(&mut self, data: impl Into<Bytes>, codec: u64) -> TableResult<(Digest, Inserted)> {
        let payload = data.into();
        let digest = self.hasher.hash(&payload);
        let block = Block::with_descriptor(payload, self.hasher.descriptor(codec));
        let inserted = self.insert(digest.clone(), block)?;
        Ok((digest, inserted))
    }

    /// [`add`](Self::add) with the configured default codec.
    pub fn add_raw(&mut self, data: impl Into<Bytes>) -> TableResult<(Digest, Inserted)> {
        let codec = self.config.default_codec;
        self.add(data, codec)
    }

    pub(crate) fn ensure_capacity(&self, count: u64) -> TableResult<()> {
        WidthClass::classify(count)
            .map(|_| ())
            .ok_or(TableError::CapacityExceeded { count })
    }
}
