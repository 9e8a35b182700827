// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Content-addressed object identifiers.
//!
//! An [`Oid`] identifies a blob or commit by content hash. Git-mind is
//! agnostic to the hash algorithm a repository uses (SHA-1 today, SHA-256 in
//! newer repositories) so `Oid` carries its length at runtime rather than
//! hard-coding 20 bytes; see §9 "OID size agnosticism" of the design notes.
//!
//! A fixed 20-byte "legacy" SHA field is carried alongside the OID in edge
//! records for backwards compatibility with readers that predate OID
//! support. When an OID is present it is authoritative; the legacy field is
//! always a zero-padded prefix of it.

use std::{
    convert::TryFrom,
    fmt::{self, Display},
    hash::{Hash, Hasher},
    str::FromStr,
};

use thiserror::Error;

/// Length in bytes of the legacy SHA-1 compatibility field.
pub const LEGACY_LEN: usize = 20;

/// Largest OID length git-mind knows how to carry (SHA-256).
pub const MAX_LEN: usize = 32;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid oid length {0}: expected 20 or 32 bytes")]
    InvalidLength(usize),

    #[error("invalid hex encoding")]
    Hex(#[from] hex::FromHexError),
}

/// A content hash of known-but-variable length (20 or 32 bytes).
#[derive(Clone, Copy)]
pub struct Oid {
    bytes: [u8; MAX_LEN],
    len: u8,
}

impl Oid {
    /// Construct an `Oid` from raw bytes. `bytes.len()` must be 20 or 32.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != LEGACY_LEN && bytes.len() != MAX_LEN {
            return Err(Error::InvalidLength(bytes.len()));
        }
        let mut buf = [0u8; MAX_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            bytes: buf,
            len: bytes.len() as u8,
        })
    }

    /// Construct an `Oid` from a legacy 20-byte SHA-1, for readers that have
    /// no native OID (e.g. decoding a pure-legacy edge record). The result is
    /// always a 20-byte OID; repositories using a longer hash must supply the
    /// full OID directly rather than relying on this constructor.
    pub fn from_legacy(legacy: [u8; LEGACY_LEN]) -> Self {
        // unwrap: LEGACY_LEN is always a valid length.
        Self::from_bytes(&legacy).unwrap()
    }

    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let mut buf = [0u8; MAX_LEN];
        let len = s.len() / 2;
        if len != LEGACY_LEN && len != MAX_LEN {
            return Err(Error::InvalidLength(len));
        }
        hex::decode_to_slice(s, &mut buf[..len])?;
        Ok(Self {
            bytes: buf,
            len: len as u8,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// The first `min(len, 20)` bytes of this OID, zero-padded to 20 bytes —
    /// the compatibility representation carried in legacy edge fields.
    pub fn legacy_sha(&self) -> [u8; LEGACY_LEN] {
        let mut out = [0u8; LEGACY_LEN];
        let n = self.len().min(LEGACY_LEN);
        out[..n].copy_from_slice(&self.bytes[..n]);
        out
    }

    /// Uppercase hex of the first `ceil(bits/4)` hex digits (i.e. the first
    /// `ceil(bits/8)` bytes rounded to a whole hex digit), used as a cache
    /// shard key.
    pub fn shard_prefix(&self, bits: u32) -> String {
        let chars = ((bits + 3) / 4) as usize;
        let hex = hex::encode_upper(self.as_bytes());
        hex.chars().take(chars).collect()
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self.to_hex())
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl PartialEq for Oid {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Oid {}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for Oid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl TryFrom<&[u8]> for Oid {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(feature = "git2")]
impl From<git2::Oid> for Oid {
    fn from(oid: git2::Oid) -> Self {
        // git2::Oid is always 20 bytes in the libgit2 versions git-mind
        // targets; SHA-256 repositories are handled by `Oid::from_bytes`
        // directly against the raw bytes libgit2 hands back.
        Self::from_bytes(oid.as_bytes()).expect("git2::Oid is always a valid length")
    }
}

#[cfg(feature = "git2")]
impl From<Oid> for git2::Oid {
    fn from(oid: Oid) -> Self {
        git2::Oid::from_bytes(oid.as_bytes()).expect("Oid always carries a valid git2 length")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_hex_20() {
        let bytes = [7u8; 20];
        let oid = Oid::from_bytes(&bytes).unwrap();
        assert_eq!(oid.to_hex(), hex::encode(bytes));
        assert_eq!(Oid::from_hex(&oid.to_hex()).unwrap(), oid);
    }

    #[test]
    fn roundtrip_hex_32() {
        let bytes = [9u8; 32];
        let oid = Oid::from_bytes(&bytes).unwrap();
        assert_eq!(oid.len(), 32);
        assert_eq!(Oid::from_hex(&oid.to_hex()).unwrap(), oid);
    }

    #[test]
    fn rejects_bad_length() {
        assert!(matches!(
            Oid::from_bytes(&[1, 2, 3]),
            Err(Error::InvalidLength(3))
        ));
    }

    #[test]
    fn legacy_sha_is_zero_padded_prefix() {
        let bytes = [1u8; 32];
        let oid = Oid::from_bytes(&bytes).unwrap();
        let legacy = oid.legacy_sha();
        assert_eq!(&legacy[..], &bytes[..20]);
    }

    #[test]
    fn legacy_sha_short_oid_is_unchanged() {
        let bytes = [3u8; 20];
        let oid = Oid::from_bytes(&bytes).unwrap();
        assert_eq!(oid.legacy_sha(), bytes);
    }

    #[test]
    fn different_lengths_are_never_equal() {
        let a = Oid::from_bytes(&[1u8; 20]).unwrap();
        let mut long = [0u8; 32];
        long[..20].copy_from_slice(&[1u8; 20]);
        let b = Oid::from_bytes(&long).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn shard_prefix_rounds_up_to_hex_digit() {
        let oid = Oid::from_hex("abcdef0123456789abcdef0123456789abcdef01").unwrap();
        assert_eq!(oid.shard_prefix(8), "AB");
        assert_eq!(oid.shard_prefix(4), "A");
    }
}
