use blockset_types::{varint, BlockDescriptor, Digest, TypeResult, DEFAULT_PREFIX_LEN};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A block payload and the descriptor used to frame it in the block region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Opaque payload bytes.
    pub payload: Bytes,
    /// Framing descriptor. `None` frames with [`BlockDescriptor::default`].
    pub descriptor: Option<BlockDescriptor>,
}

impl Block {
    /// A block framed with the default descriptor.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            descriptor: None,
        }
    }

    /// A block with an explicit descriptor.
    pub fn with_descriptor(payload: impl Into<Bytes>, descriptor: BlockDescriptor) -> Self {
        Self {
            payload: payload.into(),
            descriptor: Some(descriptor),
        }
    }

    /// The descriptor written ahead of the payload.
    pub fn effective_descriptor(&self) -> BlockDescriptor {
        self.descriptor.unwrap_or_default()
    }

    /// Bytes this block occupies in the block region:
    /// prefix, payload length varint, payload.
    pub fn framed_len(&self) -> TypeResult<u64> {
        let prefix = match &self.descriptor {
            None => DEFAULT_PREFIX_LEN,
            Some(descriptor) => descriptor.prefix_len()?,
        };
        let payload = self.payload.len() as u64;
        Ok(payload + varint::encoding_length(payload) as u64 + prefix as u64)
    }

    /// Append the framed block to `buf`.
    pub fn write_frame(&self, buf: &mut Vec<u8>) -> TypeResult<()> {
        self.effective_descriptor().write_prefix(buf)?;
        varint::encode_into(buf, self.payload.len() as u64);
        buf.extend_from_slice(&self.payload);
        Ok(())
    }
}

/// Where a block's frame sits in the block region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub offset: u64,
    pub length: u64,
}

/// One indexed block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Sort and search key.
    pub digest: Digest,
    pub block: Block,
    /// Assigned once at insertion; later insertions never move it.
    pub placement: Placement,
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockset_types::multicodec;

    #[test]
    fn framed_len_without_descriptor() {
        let block = Block::new(vec![0u8; 10]);
        assert_eq!(block.framed_len().unwrap(), 10 + 1 + 4);
    }

    #[test]
    fn framed_len_counts_wide_length_varint() {
        let block = Block::new(vec![0u8; 200]);
        assert_eq!(block.framed_len().unwrap(), 200 + 2 + 4);
    }

    #[test]
    fn framed_len_with_descriptor() {
        let block = Block::with_descriptor(
            Bytes::from_static(b"{}"),
            BlockDescriptor::blake3(multicodec::DAG_JSON),
        );
        assert_eq!(block.framed_len().unwrap(), 2 + 1 + 5);
    }

    #[test]
    fn frame_length_matches_framed_len() {
        for block in [
            Block::new(vec![1u8; 300]),
            Block::with_descriptor(vec![2u8; 5], BlockDescriptor::blake3(multicodec::DAG_CBOR)),
            Block::new(Bytes::new()),
        ] {
            let mut buf = Vec::new();
            block.write_frame(&mut buf).unwrap();
            assert_eq!(buf.len() as u64, block.framed_len().unwrap());
        }
    }

    #[test]
    fn unsupported_descriptor_rejected() {
        let descriptor = BlockDescriptor {
            version: 0,
            ..BlockDescriptor::default()
        };
        let block = Block::with_descriptor(vec![0u8; 4], descriptor);
        assert!(block.framed_len().is_err());
        assert!(block.write_frame(&mut Vec::new()).is_err());
    }
}
