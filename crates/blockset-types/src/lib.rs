//! Foundation types for blockset.
//!
//! blockset is a content-addressed block index: a dense table of blocks kept
//! sorted by digest, searchable with a predictive crawl and encodable into a
//! compact `header + table + blocks` layout. This crate holds the small value
//! types every other blockset crate depends on.
//!
//! # Key Types
//!
//! - [`Digest`] — Content digest used as the table's sort key
//! - [`BlockDescriptor`] — CIDv1-shaped framing prefix for a block payload
//! - [`WidthClass`] — 8/16/32-bit size class driving the search seed
//! - [`varint`] — Unsigned LEB128 encoding for offsets and lengths

pub mod descriptor;
pub mod digest;
pub mod error;
pub mod varint;
pub mod width;

pub use descriptor::{multicodec, BlockDescriptor, DEFAULT_PREFIX_LEN};
pub use digest::Digest;
pub use error::{TypeError, TypeResult};
pub use width::WidthClass;
