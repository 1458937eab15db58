use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::varint;

/// Multicodec table entries used by block descriptors.
pub mod multicodec {
    /// CID version 1, the only self-describing version.
    pub const CIDV1: u64 = 0x01;
    /// Raw binary payload.
    pub const RAW: u64 = 0x55;
    /// MerkleDAG protobuf.
    pub const DAG_PB: u64 = 0x70;
    /// MerkleDAG CBOR.
    pub const DAG_CBOR: u64 = 0x71;
    /// MerkleDAG JSON.
    pub const DAG_JSON: u64 = 0x0129;
    /// SHA2-256 multihash.
    pub const SHA2_256: u64 = 0x12;
    /// BLAKE3 multihash.
    pub const BLAKE3: u64 = 0x1e;
}

/// Length of the prefix written for a block that carries no descriptor.
///
/// This is the encoded length of [`BlockDescriptor::default`].
pub const DEFAULT_PREFIX_LEN: usize = 4;

/// Self-describing prefix framing a block payload, shaped like a CIDv1:
/// `version ‖ codec ‖ hash function ‖ digest length`, each a varint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub version: u64,
    pub codec: u64,
    pub hash: u64,
    pub digest_len: u64,
}

impl BlockDescriptor {
    /// A CIDv1 descriptor.
    pub const fn new(codec: u64, hash: u64, digest_len: u64) -> Self {
        Self {
            version: multicodec::CIDV1,
            codec,
            hash,
            digest_len,
        }
    }

    /// A CIDv1 descriptor for a 32-byte BLAKE3 digest.
    pub const fn blake3(codec: u64) -> Self {
        Self::new(codec, multicodec::BLAKE3, 32)
    }

    /// Encoded prefix length.
    ///
    /// Only CIDv1 prefixes have a defined framing. Any other version is
    /// rejected rather than producing a malformed block region.
    pub fn prefix_len(&self) -> TypeResult<usize> {
        self.ensure_supported()?;
        Ok(varint::encoding_length(self.version)
            + varint::encoding_length(self.codec)
            + varint::encoding_length(self.hash)
            + varint::encoding_length(self.digest_len))
    }

    /// Append the encoded prefix to `buf`.
    pub fn write_prefix(&self, buf: &mut Vec<u8>) -> TypeResult<()> {
        self.ensure_supported()?;
        varint::encode_into(buf, self.version);
        varint::encode_into(buf, self.codec);
        varint::encode_into(buf, self.hash);
        varint::encode_into(buf, self.digest_len);
        Ok(())
    }

    /// Decode a prefix from the front of `data`. Returns (descriptor, bytes_consumed).
    pub fn read_prefix(data: &[u8]) -> TypeResult<(Self, usize)> {
        let mut pos = 0;
        let mut next = || -> TypeResult<u64> {
            let (value, used) = varint::decode(&data[pos..])?;
            pos += used;
            Ok(value)
        };
        let descriptor = Self {
            version: next()?,
            codec: next()?,
            hash: next()?,
            digest_len: next()?,
        };
        descriptor.ensure_supported()?;
        Ok((descriptor, pos))
    }

    fn ensure_supported(&self) -> TypeResult<()> {
        if self.version != multicodec::CIDV1 {
            return Err(TypeError::NotImplemented(format!(
                "block framing for CID version {}",
                self.version
            )));
        }
        Ok(())
    }
}

impl Default for BlockDescriptor {
    /// Raw codec, 32-byte BLAKE3 digest.
    fn default() -> Self {
        Self::blake3(multicodec::RAW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prefix_is_four_bytes() {
        let descriptor = BlockDescriptor::default();
        assert_eq!(descriptor.prefix_len().unwrap(), DEFAULT_PREFIX_LEN);

        let mut buf = Vec::new();
        descriptor.write_prefix(&mut buf).unwrap();
        assert_eq!(buf, vec![0x01, 0x55, 0x1e, 0x20]);
    }

    #[test]
    fn wide_codec_grows_prefix() {
        let descriptor = BlockDescriptor::blake3(multicodec::DAG_JSON);
        assert_eq!(descriptor.prefix_len().unwrap(), 5);
    }

    #[test]
    fn read_prefix_roundtrip() {
        let descriptor = BlockDescriptor::new(multicodec::DAG_CBOR, multicodec::SHA2_256, 32);
        let mut buf = Vec::new();
        descriptor.write_prefix(&mut buf).unwrap();
        buf.extend_from_slice(b"payload");

        let (parsed, used) = BlockDescriptor::read_prefix(&buf).unwrap();
        assert_eq!(parsed, descriptor);
        assert_eq!(used, descriptor.prefix_len().unwrap());
    }

    #[test]
    fn non_v1_rejected() {
        let descriptor = BlockDescriptor {
            version: 0,
            ..BlockDescriptor::default()
        };
        assert!(matches!(
            descriptor.prefix_len(),
            Err(TypeError::NotImplemented(_))
        ));
        assert!(matches!(
            descriptor.write_prefix(&mut Vec::new()),
            Err(TypeError::NotImplemented(_))
        ));
    }

    #[test]
    fn read_prefix_truncated() {
        let err = BlockDescriptor::read_prefix(&[0x01, 0x55]).unwrap_err();
        assert_eq!(err, TypeError::VarintTruncated);
    }
}
