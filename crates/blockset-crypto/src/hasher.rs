use blockset_types::{multicodec, BlockDescriptor, Digest};

/// BLAKE3 content hasher.
///
/// Produces plain (not domain-separated) 32-byte BLAKE3 digests so that block
/// digests match the multihash named in their [`BlockDescriptor`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentHasher;

impl ContentHasher {
    /// Multihash code of the digests this hasher produces.
    pub const CODE: u64 = multicodec::BLAKE3;
    /// Output length in bytes.
    pub const DIGEST_LEN: usize = blake3::OUT_LEN;

    pub const fn new() -> Self {
        Self
    }

    /// Hash a single buffer.
    pub fn hash(&self, data: &[u8]) -> Digest {
        Digest::from(*blake3::hash(data).as_bytes())
    }

    /// Hash the concatenation of several buffers without materializing it.
    pub fn hash_vector<I, B>(&self, parts: I) -> Digest
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part.as_ref());
        }
        Digest::from(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected digest.
    pub fn verify(&self, data: &[u8], expected: &Digest) -> bool {
        self.hash(data) == *expected
    }

    /// Descriptor for a block hashed by this hasher.
    pub fn descriptor(&self, codec: u64) -> BlockDescriptor {
        BlockDescriptor::new(codec, Self::CODE, Self::DIGEST_LEN as u64)
    }
}
