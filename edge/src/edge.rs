// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

use thiserror::Error;

use gitmind_oid::Oid;

use crate::attribution::Attribution;
use crate::lane::Lane;
use crate::path::{self, PATH_MAX};
use crate::rel_type::RelType;

/// Length of a Crockford-base32 ULID string.
pub const ULID_LEN: usize = 26;

/// `1.0` in the confidence field's fixed-point encoding. Despite the name,
/// this is a linear scale to `0x3C00`, not a real IEEE-754 half-float
/// conversion — matching the original's `gm_confidence_to_half_float`.
pub const CONFIDENCE_SCALE: f32 = 0x3C00 as f32;

/// Clamp to `[0.0, 1.0]` and scale linearly to `0x3C00` (spec §4.1
/// "Confidence conversion").
pub fn encode_confidence(value: f32) -> u16 {
    let clamped = value.clamp(0.0, 1.0);
    (clamped * CONFIDENCE_SCALE).round() as u16
}

pub fn decode_confidence(bits: u16) -> f32 {
    bits as f32 / CONFIDENCE_SCALE
}

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("path exceeds {PATH_MAX} bytes")]
    PathTooLong,
    #[error("ulid must be exactly {ULID_LEN} characters, got {0}")]
    BadUlidLength(usize),
}

impl gitmind_telemetry::Classify for Error {
    fn kind(&self) -> gitmind_telemetry::ErrorKind {
        gitmind_telemetry::ErrorKind::InvalidArgument
    }
}

/// An edge in its full attributed shape: confidence, attribution, lane, and
/// both a content-addressed OID and a legacy SHA-1 per endpoint.
///
/// Identity is `(src_oid, tgt_oid, rel_type)` — see [`Edge::eq`]. `ulid` and
/// `timestamp` are provenance, not identity. `ulid` is `None` for edges
/// upgraded from the legacy wire shape, which never carried one.
#[derive(Clone, Debug)]
pub struct Edge {
    src_oid: Oid,
    tgt_oid: Oid,
    rel_type: RelType,
    confidence_bits: u16,
    timestamp: u64,
    src_path: String,
    tgt_path: String,
    ulid: Option<String>,
    attribution: Attribution,
    lane: Lane,
}

impl Edge {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        src_oid: Oid,
        tgt_oid: Oid,
        rel_type: RelType,
        confidence: f32,
        timestamp: u64,
        src_path: impl Into<String>,
        tgt_path: impl Into<String>,
        ulid: Option<String>,
        attribution: Attribution,
        lane: Lane,
    ) -> Result<Self, Error> {
        let src_path = path::normalize(&src_path.into());
        let tgt_path = path::normalize(&tgt_path.into());
        if src_path.len() > PATH_MAX || tgt_path.len() > PATH_MAX {
            return Err(Error::PathTooLong);
        }
        if let Some(ref u) = ulid {
            if u.len() != ULID_LEN {
                return Err(Error::BadUlidLength(u.len()));
            }
        }
        Ok(Self {
            src_oid,
            tgt_oid,
            rel_type,
            confidence_bits: encode_confidence(confidence),
            timestamp,
            src_path,
            tgt_path,
            ulid,
            attribution,
            lane,
        })
    }

    pub fn src_oid(&self) -> &Oid {
        &self.src_oid
    }

    pub fn tgt_oid(&self) -> &Oid {
        &self.tgt_oid
    }

    pub fn rel_type(&self) -> RelType {
        self.rel_type
    }

    /// Confidence as stored: a linear fixed-point scale to `0x3C00` (`1.0`).
    pub fn confidence_bits(&self) -> u16 {
        self.confidence_bits
    }

    pub fn confidence(&self) -> f32 {
        decode_confidence(self.confidence_bits)
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn src_path(&self) -> &str {
        &self.src_path
    }

    pub fn tgt_path(&self) -> &str {
        &self.tgt_path
    }

    pub fn ulid(&self) -> Option<&str> {
        self.ulid.as_deref()
    }

    pub fn attribution(&self) -> &Attribution {
        &self.attribution
    }

    pub fn lane(&self) -> Lane {
        self.lane
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.src_oid == other.src_oid
            && self.tgt_oid == other.tgt_oid
            && self.rel_type == other.rel_type
    }
}

impl Eq for Edge {}

/// The 7-field basic edge shape carried before attribution existed:
/// `src_sha, tgt_sha, rel_type, confidence, timestamp, src_path, tgt_path`.
/// No ULID, attribution, or lane — those are attributed-shape-only fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyEdge {
    pub src_sha: [u8; 20],
    pub tgt_sha: [u8; 20],
    pub rel_type: RelType,
    pub confidence_bits: u16,
    pub timestamp: u64,
    pub src_path: String,
    pub tgt_path: String,
}

impl LegacyEdge {
    /// Lossless upgrade into the attributed shape, per spec §3's
    /// "dual-shape decode with lossless conversion between shapes":
    /// attribution defaults to [`Attribution::default_for_legacy`], lane
    /// defaults to `Primary`, and `ulid` is absent.
    pub fn into_edge(self) -> Result<Edge, Error> {
        Edge::new(
            Oid::from_legacy(self.src_sha),
            Oid::from_legacy(self.tgt_sha),
            self.rel_type,
            decode_confidence(self.confidence_bits),
            self.timestamp,
            self.src_path,
            self.tgt_path,
            None,
            Attribution::default_for_legacy(),
            Lane::Primary,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::SourceType;

    fn ulid() -> Option<String> {
        Some("01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string())
    }

    #[test]
    fn equality_ignores_ulid_and_timestamp() {
        let oid_a = Oid::from_hex("aa".repeat(20).as_str()).unwrap();
        let oid_b = Oid::from_hex("bb".repeat(20).as_str()).unwrap();
        let e1 = Edge::new(
            oid_a.clone(),
            oid_b.clone(),
            RelType::Implements,
            1.0,
            1000,
            "a",
            "b",
            ulid(),
            Attribution::default_for(SourceType::Human),
            Lane::Primary,
        )
        .unwrap();
        let e2 = Edge::new(
            oid_a,
            oid_b,
            RelType::Implements,
            0.5,
            9999,
            "a",
            "b",
            Some("01ARZ3NDEKTSV4RRFFQ69G5FAW".to_string()),
            Attribution::default_for(SourceType::AiClaude),
            Lane::Review,
        )
        .unwrap();
        assert_eq!(e1, e2);
    }

    #[test]
    fn equality_requires_matching_rel_type() {
        let oid_a = Oid::from_hex("aa".repeat(20).as_str()).unwrap();
        let oid_b = Oid::from_hex("bb".repeat(20).as_str()).unwrap();
        let e1 = Edge::new(
            oid_a.clone(),
            oid_b.clone(),
            RelType::Implements,
            1.0,
            0,
            "a",
            "b",
            ulid(),
            Attribution::default_for_legacy(),
            Lane::Primary,
        )
        .unwrap();
        let e2 = Edge::new(
            oid_a,
            oid_b,
            RelType::References,
            1.0,
            0,
            "a",
            "b",
            ulid(),
            Attribution::default_for_legacy(),
            Lane::Primary,
        )
        .unwrap();
        assert_ne!(e1, e2);
    }

    #[test]
    fn confidence_one_roundtrips_to_the_spec_sentinel() {
        let oid_a = Oid::from_hex("aa".repeat(20).as_str()).unwrap();
        let oid_b = Oid::from_hex("bb".repeat(20).as_str()).unwrap();
        let e = Edge::new(
            oid_a,
            oid_b,
            RelType::Implements,
            1.0,
            0,
            "a",
            "b",
            ulid(),
            Attribution::default_for_legacy(),
            Lane::Primary,
        )
        .unwrap();
        assert_eq!(e.confidence_bits(), 0x3C00);
    }

    #[test]
    fn rejects_overlong_path() {
        let oid_a = Oid::from_hex("aa".repeat(20).as_str()).unwrap();
        let oid_b = Oid::from_hex("bb".repeat(20).as_str()).unwrap();
        let long = "a/".repeat(PATH_MAX);
        let result = Edge::new(
            oid_a,
            oid_b,
            RelType::Implements,
            1.0,
            0,
            long,
            "b",
            ulid(),
            Attribution::default_for_legacy(),
            Lane::Primary,
        );
        assert_eq!(result, Err(Error::PathTooLong));
    }

    #[test]
    fn legacy_edge_upgrades_losslessly() {
        let legacy = LegacyEdge {
            src_sha: [0xaa; 20],
            tgt_sha: [0xbb; 20],
            rel_type: RelType::DependsOn,
            confidence_bits: 0x3C00,
            timestamp: 42,
            src_path: "a".to_string(),
            tgt_path: "b".to_string(),
        };
        let edge = legacy.clone().into_edge().unwrap();
        assert_eq!(edge.src_oid().legacy_sha(), legacy.src_sha);
        assert_eq!(edge.tgt_oid().legacy_sha(), legacy.tgt_sha);
        assert_eq!(edge.rel_type(), RelType::DependsOn);
        assert_eq!(edge.confidence_bits(), 0x3C00);
        assert_eq!(edge.ulid(), None);
    }
}
