//! Content hashing for blockset.
//!
//! Wraps BLAKE3 for block digests and for commitments over sequences of byte
//! buffers. No custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
