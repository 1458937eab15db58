//! Error types for the table crate.

use blockset_types::TypeError;

/// Errors that can occur during table operations.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The entry count no longer fits the 32-bit width class.
    #[error("table capacity exceeded: {count} entries")]
    CapacityExceeded { count: u64 },

    /// An entry sorts before its predecessor.
    #[error("entry at position {position} is out of order")]
    OrderingViolation { position: usize },

    /// An entry repeats its predecessor's digest.
    #[error("duplicate entry at position {position}")]
    DuplicateEntry { position: usize },

    /// Search cannot find an entry that is stored in the table.
    #[error("entry at position {position} failed inclusion check")]
    InclusionViolation { position: usize },

    /// The requested block framing has no defined encoding.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A payload does not hash to the digest it was offered under.
    #[error("digest mismatch: expected {expected}, computed {computed}")]
    DigestMismatch { expected: String, computed: String },

    /// A block descriptor disagrees with the hasher that checked it.
    #[error("descriptor mismatch: {0}")]
    DescriptorMismatch(String),

    /// Encoded data or a snapshot is internally inconsistent.
    #[error("corrupt table data: {0}")]
    Corrupt(String),

    /// Snapshot serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A lower-level type operation failed.
    #[error(transparent)]
    Type(TypeError),
}

impl From<TypeError> for TableError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::NotImplemented(what) => Self::NotImplemented(what),
            other => Self::Type(other),
        }
    }
}

/// Convenience alias for table results.
pub type TableResult<T> = Result<T, TableError>;
