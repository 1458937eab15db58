//! Digest-ordered block table for blockset.
//!
//! The in-memory build stage of a content-addressed block archive: blocks are
//! filed under their digest in a dense sorted table, deduplicated on insert,
//! and encoded into a `header + table + blocks` layout.
//!
//! # Architecture
//!
//! - **[`BlockTable`]**: sorted entries, predictive `find`, `insert`, `add`
//! - **Encoder**: 32-byte [`Header`], table vector, block vector, digests
//! - **Verification**: ordering, uniqueness and search self-consistency
//! - **[`VerifyingIngester`]**: hash-checked insertion for untrusted input
//! - **[`TableSnapshot`]**: capture and rehydrate table state
//!
//! A table is single-writer: mutation takes `&mut self`, and there is no
//! internal locking. Build it, then share it read-only.

pub mod config;
pub mod encode;
pub mod entry;
pub mod error;
pub mod ingest;
pub mod snapshot;
pub mod table;
pub mod verify;

pub use config::TableConfig;
pub use encode::{read_block, EncodedVectors, Header, HEADER_LEN};
pub use entry::{Block, Entry, Placement};
pub use error::{TableError, TableResult};
pub use ingest::VerifyingIngester;
pub use snapshot::TableSnapshot;
pub use table::{BlockTable, Inserted, Lookup};
