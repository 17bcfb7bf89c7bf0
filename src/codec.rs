//! Byte helpers for keys and bucket names
//!
//! ## Sorted Index Layout
//! ```text
//! forward bucket:  0x14 ‖ name
//!     key   = sort_key (8, big-endian) ‖ primary_key
//!     value = payload
//!
//! reverse bucket:  0x15 ‖ name
//!     key   = primary_key
//!     value = sort_key (8, big-endian) ‖ primary_key
//! ```
//!
//! The composite key has no separator, so a sort key is always exactly
//! [`SORT_KEY_LEN`] bytes. That width is part of the on-disk format.

use crate::error::{KvError, Result};

/// Width of every sort key
pub const SORT_KEY_LEN: usize = 8;

/// Bucket-name prefix of a sorted index's forward bucket
pub const FORWARD_PREFIX: u8 = 0x14;

/// Bucket-name prefix of a sorted index's reverse bucket
pub const REVERSE_PREFIX: u8 = 0x15;

/// Encode a u64 as 8 big-endian bytes
pub fn u64_to_bytes(v: u64) -> Vec<u8> {
    v.to_be_bytes().to_vec()
}

/// Decode 8 big-endian bytes; empty input decodes to 0
pub fn bytes_to_u64(bytes: &[u8]) -> Result<u64> {
    if bytes.is_empty() {
        return Ok(0);
    }
    let raw: [u8; 8] = bytes.try_into().map_err(|_| {
        KvError::InvalidArgument(format!("expected 8 bytes for u64, got {}", bytes.len()))
    })?;
    Ok(u64::from_be_bytes(raw))
}

/// Concatenate byte slices with no separator
pub fn bytes_concat(parts: &[&[u8]]) -> Vec<u8> {
    let total: usize = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(total);
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

/// Join bucket name parts with `_`
pub fn bucket_name_concat(parts: &[&[u8]]) -> Vec<u8> {
    parts.join(&b'_')
}

/// Name of the forward bucket backing sorted index `name`
pub fn forward_bucket(name: &[u8]) -> Vec<u8> {
    bytes_concat(&[&[FORWARD_PREFIX], name])
}

/// Name of the reverse bucket backing sorted index `name`
pub fn reverse_bucket(name: &[u8]) -> Vec<u8> {
    bytes_concat(&[&[REVERSE_PREFIX], name])
}

/// Build `sort_key ‖ primary_key`
pub fn composite_key(sort_key: &[u8], primary_key: &[u8]) -> Vec<u8> {
    bytes_concat(&[sort_key, primary_key])
}

/// Leading sort key of a composite key, `None` if it is too short
pub fn sort_key_of(composite: &[u8]) -> Option<&[u8]> {
    composite.get(..SORT_KEY_LEN)
}

/// Primary key of a composite key, `None` if it is too short
pub fn primary_key_of(composite: &[u8]) -> Option<&[u8]> {
    composite.get(SORT_KEY_LEN..)
}
