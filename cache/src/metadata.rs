// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Cache metadata: a fixed-size binary struct serialized as the prefix of
//! a cache commit's message (spec §3 "Cache metadata", §4.9 step 6). The
//! branch isn't part of the wire struct — it's recoverable from the cache
//! ref's own name (`refs/gitmind/cache/<branch>/<epoch>`) — so the struct
//! stays truly fixed-size rather than carrying a variable-length tail.

use thiserror::Error;

use gitmind_oid::Oid;

const MAGIC: &[u8; 8] = b"GMCMETA\0";
pub const VERSION: u32 = 1;
pub const DEFAULT_SHARD_BITS: u32 = 8;
pub const WIRE_LEN: usize = 73;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("cache metadata blob is too short ({0} bytes, need {WIRE_LEN})")]
    Truncated(usize),
    #[error("bad magic bytes")]
    BadMagic,
    #[error("unsupported cache metadata version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid journal tip oid length {0}")]
    BadOidLength(u8),
}

/// In-memory cache metadata, addressed by the branch it was built for
/// (carried alongside, not serialized onto the wire — see module docs).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheMetadata {
    pub branch: String,
    pub journal_tip_oid: Oid,
    pub journal_tip_time: i64,
    pub edge_count: u64,
    pub build_time_ms: u64,
    pub shard_bits: u32,
    pub version: u32,
}

impl CacheMetadata {
    /// Serialize the fixed-size wire struct (branch excluded; see module
    /// docs). The result is always exactly [`WIRE_LEN`] bytes.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(WIRE_LEN);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.edge_count.to_le_bytes());
        out.extend_from_slice(&self.build_time_ms.to_le_bytes());
        out.extend_from_slice(&self.shard_bits.to_le_bytes());
        out.extend_from_slice(&self.journal_tip_time.to_le_bytes());
        out.push(self.journal_tip_oid.len() as u8);
        let mut oid_buf = [0u8; 32];
        let bytes = self.journal_tip_oid.as_bytes();
        oid_buf[..bytes.len()].copy_from_slice(bytes);
        out.extend_from_slice(&oid_buf);
        debug_assert_eq!(out.len(), WIRE_LEN);
        out
    }

    /// Parse the fixed-size wire struct; `branch` must be supplied by the
    /// caller from the cache ref name it was read off of.
    pub fn from_wire(branch: impl Into<String>, blob: &[u8]) -> Result<Self, Error> {
        if blob.len() < WIRE_LEN {
            return Err(Error::Truncated(blob.len()));
        }
        if &blob[0..8] != MAGIC {
            return Err(Error::BadMagic);
        }
        let version = u32::from_le_bytes(blob[8..12].try_into().unwrap());
        if version != VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        let edge_count = u64::from_le_bytes(blob[12..20].try_into().unwrap());
        let build_time_ms = u64::from_le_bytes(blob[20..28].try_into().unwrap());
        let shard_bits = u32::from_le_bytes(blob[28..32].try_into().unwrap());
        let journal_tip_time = i64::from_le_bytes(blob[32..40].try_into().unwrap());
        let oid_len = blob[40];
        if oid_len != 20 && oid_len != 32 {
            return Err(Error::BadOidLength(oid_len));
        }
        let journal_tip_oid = Oid::from_bytes(&blob[41..41 + oid_len as usize])
            .expect("oid_len was validated to be 20 or 32");

        Ok(Self {
            branch: branch.into(),
            journal_tip_oid,
            journal_tip_time,
            edge_count,
            build_time_ms,
            shard_bits,
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips() {
        let meta = CacheMetadata {
            branch: "main".into(),
            journal_tip_oid: Oid::from_bytes(&[7u8; 20]).unwrap(),
            journal_tip_time: 1_700_000_000,
            edge_count: 42,
            build_time_ms: 13,
            shard_bits: DEFAULT_SHARD_BITS,
            version: VERSION,
        };
        let wire = meta.to_wire();
        assert_eq!(wire.len(), WIRE_LEN);
        let decoded = CacheMetadata::from_wire("main", &wire).unwrap();
        assert_eq!(decoded, meta);
    }

    #[test]
    fn roundtrips_sha256_sized_oid() {
        let meta = CacheMetadata {
            branch: "main".into(),
            journal_tip_oid: Oid::from_bytes(&[9u8; 32]).unwrap(),
            journal_tip_time: 1,
            edge_count: 0,
            build_time_ms: 0,
            shard_bits: DEFAULT_SHARD_BITS,
            version: VERSION,
        };
        let decoded = CacheMetadata::from_wire("main", &meta.to_wire()).unwrap();
        assert_eq!(decoded.journal_tip_oid, meta.journal_tip_oid);
    }

    #[test]
    fn rejects_bad_version() {
        let meta = CacheMetadata {
            branch: "main".into(),
            journal_tip_oid: Oid::from_bytes(&[1u8; 20]).unwrap(),
            journal_tip_time: 1,
            edge_count: 0,
            build_time_ms: 0,
            shard_bits: DEFAULT_SHARD_BITS,
            version: VERSION,
        };
        let mut wire = meta.to_wire();
        wire[8..12].copy_from_slice(&2u32.to_le_bytes());
        assert_eq!(
            CacheMetadata::from_wire("main", &wire),
            Err(Error::UnsupportedVersion(2))
        );
    }
}
