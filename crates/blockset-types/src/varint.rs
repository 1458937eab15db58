//! Unsigned LEB128 varints, the same encoding multiformats uses for CID
//! prefixes.
//!
//! Each byte carries seven value bits, least significant group first; the high
//! bit is set on every byte except the last.

use crate::error::{TypeError, TypeResult};

/// Longest possible encoding of a `u64`.
pub const MAX_LEN: usize = 10;

/// Number of bytes `encode` produces for `value`.
pub fn encoding_length(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    if bits == 0 {
        1
    } else {
        bits.div_ceil(7)
    }
}

/// Encode `value` into a fresh buffer.
pub fn encode(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoding_length(value));
    encode_into(&mut buf, value);
    buf
}

/// Append the encoding of `value` to `buf`.
pub fn encode_into(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decode a varint from the front of `data`. Returns (value, bytes_consumed).
pub fn decode(data: &[u8]) -> TypeResult<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    for (i, &byte) in data.iter().enumerate() {
        let low = (byte & 0x7F) as u64;
        // The tenth byte may only contribute the top bit.
        if shift == 63 && low > 1 {
            return Err(TypeError::VarintOverflow);
        }
        value |= low << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
        if shift > 63 {
            return Err(TypeError::VarintOverflow);
        }
    }
    Err(TypeError::VarintTruncated)
}
