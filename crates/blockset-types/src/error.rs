use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("varint overflows 64 bits")]
    VarintOverflow,

    #[error("truncated varint")]
    VarintTruncated,

    #[error("not implemented: {0}")]
    NotImplemented(String),
}

pub type TypeResult<T> = Result<T, TypeError>;
