// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Serialized Roaring bitmap storage format: an 8-byte magic, a 4-byte
//! version, and a 4-byte reserved flags word ahead of the library's own
//! portable serialization (spec §4.8).

use roaring::RoaringBitmap;
use thiserror::Error;

const MAGIC: &[u8; 8] = b"GMCACHE\0";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("bitmap blob is too short to hold the {HEADER_LEN}-byte header")]
    Truncated,
    #[error("bad magic bytes")]
    BadMagic,
    #[error("unsupported cache bitmap version {0}")]
    UnsupportedVersion(u32),
    #[error("roaring bitmap deserialization failed: {0}")]
    Roaring(String),
}

/// Serialize a bitmap with the git-mind header.
pub fn serialize(bitmap: &RoaringBitmap) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + bitmap.serialized_size());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    bitmap
        .serialize_into(&mut out)
        .expect("serializing into a Vec<u8> is infallible");
    out
}

/// Parse a header-prefixed bitmap blob. Unknown flag bits are logged at
/// warning level but do not fail decoding.
pub fn deserialize(blob: &[u8]) -> Result<RoaringBitmap, Error> {
    if blob.len() < HEADER_LEN {
        return Err(Error::Truncated);
    }
    let (header, body) = blob.split_at(HEADER_LEN);
    if &header[..8] != MAGIC {
        return Err(Error::BadMagic);
    }
    let version = u32::from_le_bytes(header[8..12].try_into().unwrap());
    if version != VERSION {
        return Err(Error::UnsupportedVersion(version));
    }
    let flags = u32::from_le_bytes(header[12..16].try_into().unwrap());
    if flags != 0 {
        tracing::warn!(event = "cache_bitmap_unknown_flags", flags);
    }
    RoaringBitmap::deserialize_from(body).map_err(|e| Error::Roaring(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_a_populated_bitmap() {
        let mut bitmap = RoaringBitmap::new();
        bitmap.insert(1);
        bitmap.insert(1_000_000);
        let blob = serialize(&bitmap);
        let decoded = deserialize(&blob).unwrap();
        assert_eq!(decoded, bitmap);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut blob = serialize(&RoaringBitmap::new());
        blob[0] = b'X';
        assert_eq!(deserialize(&blob), Err(Error::BadMagic));
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut blob = serialize(&RoaringBitmap::new());
        blob[8..12].copy_from_slice(&99u32.to_le_bytes());
        assert_eq!(deserialize(&blob), Err(Error::UnsupportedVersion(99)));
    }

    #[test]
    fn rejects_truncated_blob() {
        assert_eq!(deserialize(&[0u8; 4]), Err(Error::Truncated));
    }
}
