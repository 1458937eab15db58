//! Binary encoding of a [`BlockTable`].
//!
//! Layout:
//!
//! ```text
//! [32 bytes: header, four big-endian u64s]
//!     digest_size | block_offset | largest_block | entry_count
//! [table vector: one record per entry, digest order]
//!     digest bytes | varint offset | varint length
//! [block vector: one frame per entry, offset order]
//!     varint version | varint codec | varint hash | varint digest_len
//!     | varint payload_len | payload
//! ```
//!
//! The first four frame fields are a complete CIDv1 prefix, version included,
//! so the default raw/BLAKE3 prefix is exactly 4 bytes and every frame is
//! exactly its placement's length.
//!
//! Block frames follow allocation order, which generally differs from digest
//! order, so the block vector is assembled from an explicit offset ordering.

use blockset_types::{varint, BlockDescriptor, Digest};
use tracing::debug;

use crate::entry::{Entry, Placement};
use crate::error::{TableError, TableResult};
use crate::table::BlockTable;

/// Size of the fixed header.
pub const HEADER_LEN: usize = 32;

/// Summary fields written ahead of the table vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub digest_size: u64,
    pub block_offset: u64,
    pub largest_block: u64,
    pub entry_count: u64,
}

impl Header {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        let fields = [
            self.digest_size,
            self.block_offset,
            self.largest_block,
            self.entry_count,
        ];
        for (chunk, field) in buf.chunks_exact_mut(8).zip(fields) {
            chunk.copy_from_slice(&field.to_be_bytes());
        }
        buf
    }

    /// Parse a header from the front of `data`.
    pub fn from_bytes(data: &[u8]) -> TableResult<Self> {
        let header = data
            .get(..HEADER_LEN)
            .ok_or_else(|| TableError::Corrupt(format!("header truncated: {} bytes", data.len())))?;
        let mut fields = header.chunks_exact(8).map(|chunk| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            u64::from_be_bytes(word)
        });
        let mut next = || fields.next().unwrap_or_default();
        Ok(Self {
            digest_size: next(),
            block_offset: next(),
            largest_block: next(),
            entry_count: next(),
        })
    }
}

/// Table and block vectors produced by [`BlockTable::encode_vector`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedVectors {
    pub table: Vec<u8>,
    /// Empty unless blocks were requested.
    pub blocks: Vec<u8>,
}

impl BlockTable {
    /// Current header fields.
    pub fn header(&self) -> Header {
        Header {
            digest_size: self.digest_size as u64,
            block_offset: self.block_offset,
            largest_block: self.largest_block,
            entry_count: self.entries.len() as u64,
        }
    }

    pub fn encode_header(&self) -> [u8; HEADER_LEN] {
        self.header().to_bytes()
    }

    /// Encode the table vector and, if `include_blocks`, the block vector.
    pub fn encode_vector(&self, include_blocks: bool) -> TableResult<EncodedVectors> {
        let mut table = Vec::with_capacity(
            self.entries
                .iter()
                .map(|entry| entry.digest.len() + 2 * varint::MAX_LEN)
                .sum(),
        );
        for entry in &self.entries {
            table.extend_from_slice(entry.digest.as_bytes());
            varint::encode_into(&mut table, entry.placement.offset);
            varint::encode_into(&mut table, entry.placement.length);
        }

        let blocks = if include_blocks {
            self.encode_blocks()?
        } else {
            Vec::new()
        };

        debug!(
            entries = self.entries.len(),
            table_len = table.len(),
            blocks_len = blocks.len(),
            "encoded table"
        );
        Ok(EncodedVectors { table, blocks })
    }

    /// Header, table vector and block vector concatenated.
    pub fn encode(&self) -> TableResult<Vec<u8>> {
        let EncodedVectors { table, blocks } = self.encode_vector(true)?;
        let mut out = Vec::with_capacity(HEADER_LEN + table.len() + blocks.len());
        out.extend_from_slice(&self.encode_header());
        out.extend_from_slice(&table);
        out.extend_from_slice(&blocks);
        Ok(out)
    }

    /// BLAKE3 of the table vector alone.
    pub fn table_digest(&self) -> TableResult<Digest> {
        let EncodedVectors { table, .. } = self.encode_vector(false)?;
        Ok(self.hasher.hash(&table))
    }

    /// BLAKE3 of every digest concatenated in table order.
    pub fn digests_digest(&self) -> Digest {
        self.hasher.hash_vector(self.digests().map(|d| d.as_bytes()))
    }

    fn encode_blocks(&self) -> TableResult<Vec<u8>> {
        let mut by_offset: Vec<&Entry> = self.entries.iter().collect();
        by_offset.sort_unstable_by_key(|entry| entry.placement.offset);

        let mut blocks = Vec::with_capacity(
            self.entries
                .iter()
                .map(|entry| entry.block.payload.len() + 3 * varint::MAX_LEN)
                .sum(),
        );
        for entry in by_offset {
            let start = blocks.len() as u64;
            if start != entry.placement.offset {
                return Err(TableError::Corrupt(format!(
                    "block {} placed at {}, region is at {start}",
                    entry.digest.short_hex(),
                    entry.placement.offset
                )));
            }
            entry.block.write_frame(&mut blocks)?;
            let written = blocks.len() as u64 - start;
            if written != entry.placement.length {
                return Err(TableError::Corrupt(format!(
                    "block {} framed to {written} bytes, placement says {}",
                    entry.digest.short_hex(),
                    entry.placement.length
                )));
            }
        }
        Ok(blocks)
    }
}

/// Decode the block frame at `placement` in an encoded block vector.
///
/// Returns the frame's descriptor and a view of its payload.
pub fn read_block(blocks: &[u8], placement: Placement) -> TableResult<(BlockDescriptor, &[u8])> {
    let frame = usize::try_from(placement.offset)
        .ok()
        .zip(usize::try_from(placement.length).ok())
        .and_then(|(start, len)| blocks.get(start..start.checked_add(len)?))
        .ok_or_else(|| {
            TableError::Corrupt(format!(
                "placement {}+{} outside {}-byte block vector",
                placement.offset,
                placement.length,
                blocks.len()
            ))
        })?;

    let (descriptor, mut pos) = BlockDescriptor::read_prefix(frame)?;
    let (payload_len, used) = varint::decode(&frame[pos..])?;
    pos += used;

    let payload = &frame[pos..];
    if payload.len() as u64 != payload_len {
        return Err(TableError::Corrupt(format!(
            "payload length {payload_len} does not fill {}-byte frame",
            placement.length
        )));
    }
    Ok((descriptor, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Block;
    use blockset_crypto::ContentHasher;
    use blockset_types::multicodec;

    fn digest(first: u8) -> Digest {
        Digest::from([first; 32])
    }

    fn sample() -> BlockTable {
        let mut table = BlockTable::new();
        table.insert(digest(0x10), Block::new(&b"ten"[..])).unwrap();
        table.insert(digest(0x05), Block::new(&b"five"[..])).unwrap();
        table
            .insert(
                digest(0x20),
                Block::with_descriptor(&b"twenty"[..], BlockDescriptor::blake3(multicodec::DAG_JSON)),
            )
            .unwrap();
        table
    }

    #[test]
    fn header_fields_in_order() {
        let table = sample();
        let bytes = table.encode_header();
        assert_eq!(u64::from_be_bytes(bytes[0..8].try_into().unwrap()), 32);
        assert_eq!(
            u64::from_be_bytes(bytes[8..16].try_into().unwrap()),
            table.block_offset()
        );
        assert_eq!(
            u64::from_be_bytes(bytes[16..24].try_into().unwrap()),
            table.largest_block()
        );
        assert_eq!(u64::from_be_bytes(bytes[24..32].try_into().unwrap()), 3);
        assert_eq!(Header::from_bytes(&bytes).unwrap(), table.header());
    }

    #[test]
    fn buffer_sizing_ignores_summary_fields() {
        let mut table = sample();
        let expected = table.encode_vector(true).unwrap();
        table.digest_size = usize::MAX / 2;
        table.block_offset = u64::MAX;

        assert_eq!(table.encode_vector(true).unwrap(), expected);
        assert!(table.table_digest().is_ok());
    }

    #[test]
    fn header_truncated() {
        let err = Header::from_bytes(&[0u8; 31]).unwrap_err();
        assert!(matches!(err, TableError::Corrupt(_)));
    }

    #[test]
    fn empty_table_encodes_header_only() {
        let table = BlockTable::new();
        let out = table.encode().unwrap();
        assert_eq!(out, vec![0u8; HEADER_LEN]);
    }

    #[test]
    fn table_vector_records() {
        let table = sample();
        let vectors = table.encode_vector(false).unwrap();
        assert!(vectors.blocks.is_empty());

        // "ten" placed first: 3 + 1 + 4 = 8 bytes at 0.
        // "five" second: 4 + 1 + 4 = 9 bytes at 8.
        // "twenty" third: 6 + 1 + 5 = 12 bytes at 17.
        let mut expected = Vec::new();
        expected.extend_from_slice(&[0x05; 32]);
        expected.extend_from_slice(&[8, 9]);
        expected.extend_from_slice(&[0x10; 32]);
        expected.extend_from_slice(&[0, 8]);
        expected.extend_from_slice(&[0x20; 32]);
        expected.extend_from_slice(&[17, 12]);
        assert_eq!(vectors.table, expected);
    }

    #[test]
    fn block_vector_follows_offsets() {
        let table = sample();
        let vectors = table.encode_vector(true).unwrap();
        assert_eq!(vectors.blocks.len() as u64, table.block_offset());

        assert_eq!(&vectors.blocks[..8], &[0x01, 0x55, 0x1e, 0x20, 3, b't', b'e', b'n']);
        for entry in table.entries() {
            let (descriptor, payload) = read_block(&vectors.blocks, entry.placement).unwrap();
            assert_eq!(descriptor, entry.block.effective_descriptor());
            assert_eq!(payload, &entry.block.payload[..]);
        }
    }

    #[test]
    fn encode_concatenates() {
        let table = sample();
        let vectors = table.encode_vector(true).unwrap();
        let out = table.encode().unwrap();
        assert_eq!(&out[..HEADER_LEN], &table.encode_header());
        assert_eq!(
            &out[HEADER_LEN..HEADER_LEN + vectors.table.len()],
            &vectors.table[..]
        );
        assert_eq!(&out[HEADER_LEN + vectors.table.len()..], &vectors.blocks[..]);
    }

    #[test]
    fn read_block_out_of_range() {
        let err = read_block(&[0u8; 4], Placement { offset: 2, length: 8 }).unwrap_err();
        assert!(matches!(err, TableError::Corrupt(_)));
        let err = read_block(&[0u8; 4], Placement { offset: u64::MAX, length: 8 }).unwrap_err();
        assert!(matches!(err, TableError::Corrupt(_)));
    }

    #[test]
    fn read_block_short_payload() {
        let mut frame = Vec::new();
        BlockDescriptor::default().write_prefix(&mut frame).unwrap();
        frame.extend_from_slice(&[5, b'a', b'b']);
        let placement = Placement { offset: 0, length: frame.len() as u64 };
        let err = read_block(&frame, placement).unwrap_err();
        assert!(matches!(err, TableError::Corrupt(_)));
    }

    #[test]
    fn digest_commitments() {
        let table = sample();
        let vectors = table.encode_vector(false).unwrap();
        let hasher = ContentHasher::new();
        assert_eq!(table.table_digest().unwrap(), hasher.hash(&vectors.table));

        let mut concatenated = Vec::new();
        for first in [0x05, 0x10, 0x20] {
            concatenated.extend_from_slice(&[first; 32]);
        }
        assert_eq!(table.digests_digest(), hasher.hash(&concatenated));
    }

    #[test]
    fn table_digest_ignores_payloads() {
        let mut a = BlockTable::new();
        let mut b = BlockTable::new();
        a.insert(digest(1), Block::new(&b"xyz"[..])).unwrap();
        b.insert(digest(1), Block::new(&b"abc"[..])).unwrap();
        assert_eq!(a.table_digest().unwrap(), b.table_digest().unwrap());
    }
}
