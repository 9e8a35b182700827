// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Hand-written, deterministic CBOR encode/decode for edge records.
//!
//! Derives are deliberately not used: the wire format freezes specific
//! integer map keys and a dual array/map shape that a derive macro cannot
//! express, mirroring `radicle-git-ext`'s hand-written `Oid` `Encode`/
//! `Decode` impls and the original's `cbor_common.h` length-form table.

use minicbor::data::Type;
use minicbor::{decode, encode, Decoder, Encoder};
use thiserror::Error;

use gitmind_edge::attribution::{Attribution, Flags, SourceType};
use gitmind_edge::edge::{decode_confidence, Edge, LegacyEdge};
use gitmind_edge::lane::Lane;
use gitmind_edge::rel_type::RelType;
use gitmind_oid::Oid;

const LEGACY_SHA_LEN: usize = 20;
const TEXT_MAX: usize = 4096;
const ATTRIBUTED_MAP_LEN: u64 = 15;
const LEGACY_ARRAY_LEN: u64 = 7;

const KEY_SRC_LEGACY_SHA: u8 = 1;
const KEY_TGT_LEGACY_SHA: u8 = 2;
const KEY_REL_TYPE: u8 = 3;
const KEY_CONFIDENCE: u8 = 4;
const KEY_TIMESTAMP: u8 = 5;
const KEY_SRC_PATH: u8 = 6;
const KEY_TGT_PATH: u8 = 7;
const KEY_ULID: u8 = 8;
const KEY_SOURCE_TYPE: u8 = 9;
const KEY_AUTHOR: u8 = 10;
const KEY_SESSION_ID: u8 = 11;
const KEY_FLAGS: u8 = 12;
const KEY_LANE: u8 = 13;
const KEY_SRC_OID: u8 = 14;
const KEY_TGT_OID: u8 = 15;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("unexpected top-level CBOR type {0:?}, expected array or map")]
    UnexpectedShape(Type),
    #[error("legacy array has {0} elements, expected {LEGACY_ARRAY_LEN}")]
    BadArrayLength(u64),
    #[error("attributed map has {0} elements, expected at most {ATTRIBUTED_MAP_LEN}")]
    BadMapLength(u64),
    #[error("indefinite-length arrays/maps are not supported")]
    IndefiniteLength,
    #[error("byte string has length {0}, expected {1}")]
    BadByteStringLength(usize, usize),
    #[error("oid byte string has invalid length {0}")]
    BadOidLength(usize),
    #[error("text field exceeds {TEXT_MAX} bytes")]
    TextTooLong,
    #[error("unrecognized map key {0}")]
    UnknownKey(u8),
    #[error("edge domain validation failed: {0}")]
    Edge(#[from] gitmind_edge::edge::Error),
    #[error("attribution validation failed: {0}")]
    Attribution(#[from] gitmind_edge::attribution::Error),
    #[error("cbor decode error: {0}")]
    Decode(String),
}

impl From<decode::Error> for Error {
    fn from(e: decode::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

/// A decoded record, reporting how many bytes of the input it consumed so
/// the caller can keep decoding concatenated records from the same buffer.
pub struct Decoded {
    pub edge: Edge,
    /// `true` if the wire record was the attributed (map) shape.
    pub was_attributed: bool,
    pub consumed: usize,
}

/// Encode an attributed edge as the 15-key canonical CBOR map.
pub fn encode_attributed(edge: &Edge) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut e = Encoder::new(&mut buf);
    e.map(ATTRIBUTED_MAP_LEN).infallible();
    e.u8(KEY_SRC_LEGACY_SHA).infallible();
    e.bytes(&edge.src_oid().legacy_sha()).infallible();
    e.u8(KEY_TGT_LEGACY_SHA).infallible();
    e.bytes(&edge.tgt_oid().legacy_sha()).infallible();
    e.u8(KEY_REL_TYPE).infallible();
    e.u16(edge.rel_type().to_u16()).infallible();
    e.u8(KEY_CONFIDENCE).infallible();
    e.u16(edge.confidence_bits()).infallible();
    e.u8(KEY_TIMESTAMP).infallible();
    e.u64(edge.timestamp()).infallible();
    e.u8(KEY_SRC_PATH).infallible();
    e.str(edge.src_path()).infallible();
    e.u8(KEY_TGT_PATH).infallible();
    e.str(edge.tgt_path()).infallible();
    e.u8(KEY_ULID).infallible();
    e.str(edge.ulid().unwrap_or("")).infallible();
    e.u8(KEY_SOURCE_TYPE).infallible();
    e.u16(edge.attribution().source_type.to_u16()).infallible();
    e.u8(KEY_AUTHOR).infallible();
    e.str(edge.attribution().author()).infallible();
    e.u8(KEY_SESSION_ID).infallible();
    e.str(edge.attribution().session_id()).infallible();
    e.u8(KEY_FLAGS).infallible();
    e.u32(edge.attribution().flags.bits()).infallible();
    e.u8(KEY_LANE).infallible();
    e.u16(edge.lane().to_u16()).infallible();
    e.u8(KEY_SRC_OID).infallible();
    e.bytes(edge.src_oid().as_bytes()).infallible();
    e.u8(KEY_TGT_OID).infallible();
    e.bytes(edge.tgt_oid().as_bytes()).infallible();
    buf
}

/// Encode a legacy edge as the 7-element CBOR array.
pub fn encode_legacy(edge: &LegacyEdge) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut e = Encoder::new(&mut buf);
    e.array(LEGACY_ARRAY_LEN).infallible();
    e.bytes(&edge.src_sha).infallible();
    e.bytes(&edge.tgt_sha).infallible();
    e.u16(edge.rel_type.to_u16()).infallible();
    e.u16(edge.confidence_bits).infallible();
    e.u64(edge.timestamp).infallible();
    e.str(&edge.src_path).infallible();
    e.str(&edge.tgt_path).infallible();
    buf
}

trait Infallible {
    fn infallible(self);
}

impl<T> Infallible for Result<T, encode::Error<std::convert::Infallible>> {
    fn infallible(self) {
        self.expect("encoding to an in-memory Vec<u8> is infallible");
    }
}

/// Decode exactly one record (array or map shape) starting at the front of
/// `buf`, returning the decoded edge and the number of bytes consumed. When
/// `debug` is set, logs the top-level shape and (for attributed records)
/// each decoded map key at `tracing::debug!` — the CLI wires this to
/// `GITMIND_CBOR_DEBUG` rather than having the decoder consult the
/// environment itself.
pub fn decode_one(buf: &[u8], debug: bool) -> Result<Decoded, Error> {
    let mut d = Decoder::new(buf);
    let shape = d.datatype()?;
    if debug {
        tracing::debug!(?shape, len = buf.len(), "decoding cbor edge record");
    }
    let edge = match shape {
        Type::Array => decode_legacy(&mut d)?.into_edge()?,
        Type::Map => decode_attributed(&mut d, debug)?,
        other => return Err(Error::UnexpectedShape(other)),
    };
    Ok(Decoded {
        edge,
        was_attributed: matches!(shape, Type::Map),
        consumed: d.position(),
    })
}

/// Project an attributed edge down to the legacy wire shape, dropping
/// attribution and lane (spec §4.1 "attributed → legacy" conversion).
pub fn to_legacy(edge: &Edge) -> LegacyEdge {
    LegacyEdge {
        src_sha: edge.src_oid().legacy_sha(),
        tgt_sha: edge.tgt_oid().legacy_sha(),
        rel_type: edge.rel_type(),
        confidence_bits: edge.confidence_bits(),
        timestamp: edge.timestamp(),
        src_path: edge.src_path().to_string(),
        tgt_path: edge.tgt_path().to_string(),
    }
}

fn read_legacy_sha(d: &mut Decoder) -> Result<[u8; LEGACY_SHA_LEN], Error> {
    let bytes = d.bytes()?;
    if bytes.len() != LEGACY_SHA_LEN {
        return Err(Error::BadByteStringLength(bytes.len(), LEGACY_SHA_LEN));
    }
    let mut out = [0u8; LEGACY_SHA_LEN];
    out.copy_from_slice(bytes);
    Ok(out)
}

fn read_text(d: &mut Decoder) -> Result<String, Error> {
    let s = d.str()?;
    if s.len() > TEXT_MAX {
        return Err(Error::TextTooLong);
    }
    Ok(s.to_string())
}

fn decode_legacy(d: &mut Decoder) -> Result<LegacyEdge, Error> {
    let len = d.array()?.ok_or(Error::IndefiniteLength)?;
    if len != LEGACY_ARRAY_LEN {
        return Err(Error::BadArrayLength(len));
    }
    let src_sha = read_legacy_sha(d)?;
    let tgt_sha = read_legacy_sha(d)?;
    let rel_type = RelType::from_u16(d.u16()?);
    let confidence_bits = d.u16()?;
    let timestamp = d.u64()?;
    let src_path = read_text(d)?;
    let tgt_path = read_text(d)?;
    Ok(LegacyEdge {
        src_sha,
        tgt_sha,
        rel_type,
        confidence_bits,
        timestamp,
        src_path,
        tgt_path,
    })
}

fn decode_attributed(d: &mut Decoder, debug: bool) -> Result<Edge, Error> {
    let len = d.map()?.ok_or(Error::IndefiniteLength)?;
    if len > ATTRIBUTED_MAP_LEN {
        return Err(Error::BadMapLength(len));
    }

    let mut src_legacy_sha = None;
    let mut tgt_legacy_sha = None;
    let mut rel_type = None;
    let mut confidence_bits = None;
    let mut timestamp = None;
    let mut src_path = None;
    let mut tgt_path = None;
    let mut ulid = None;
    let mut source_type = SourceType::Human;
    let mut author = String::new();
    let mut session_id = String::new();
    let mut flags = Flags::empty();
    let mut lane = Lane::Primary;
    let mut src_oid_bytes: Option<Vec<u8>> = None;
    let mut tgt_oid_bytes: Option<Vec<u8>> = None;

    for _ in 0..len {
        let key = d.u8()?;
        if debug {
            tracing::debug!(key, "decoding attributed-edge map key");
        }
        match key {
            KEY_SRC_LEGACY_SHA => src_legacy_sha = Some(read_legacy_sha(d)?),
            KEY_TGT_LEGACY_SHA => tgt_legacy_sha = Some(read_legacy_sha(d)?),
            KEY_REL_TYPE => rel_type = Some(RelType::from_u16(d.u16()?)),
            KEY_CONFIDENCE => confidence_bits = Some(d.u16()?),
            KEY_TIMESTAMP => timestamp = Some(d.u64()?),
            KEY_SRC_PATH => src_path = Some(read_text(d)?),
            KEY_TGT_PATH => tgt_path = Some(read_text(d)?),
            KEY_ULID => {
                let s = read_text(d)?;
                ulid = if s.is_empty() { None } else { Some(s) };
            },
            KEY_SOURCE_TYPE => source_type = SourceType::from_u16(d.u16()?),
            KEY_AUTHOR => author = read_text(d)?,
            KEY_SESSION_ID => session_id = read_text(d)?,
            KEY_FLAGS => flags = Flags::from_bits_truncate(d.u32()?),
            KEY_LANE => lane = Lane::from_u16(d.u16()?),
            KEY_SRC_OID => src_oid_bytes = Some(d.bytes()?.to_vec()),
            KEY_TGT_OID => tgt_oid_bytes = Some(d.bytes()?.to_vec()),
            other => return Err(Error::UnknownKey(other)),
        }
    }

    let src_legacy_sha = src_legacy_sha.unwrap_or([0u8; LEGACY_SHA_LEN]);
    let tgt_legacy_sha = tgt_legacy_sha.unwrap_or([0u8; LEGACY_SHA_LEN]);

    // Keys 14/15 may be omitted; backfill by zero-padding the legacy SHA.
    let src_oid = match src_oid_bytes {
        Some(bytes) => {
            let len = bytes.len();
            Oid::try_from(bytes.as_slice()).map_err(|_| Error::BadOidLength(len))?
        },
        None => Oid::from_legacy(src_legacy_sha),
    };
    let tgt_oid = match tgt_oid_bytes {
        Some(bytes) => {
            let len = bytes.len();
            Oid::try_from(bytes.as_slice()).map_err(|_| Error::BadOidLength(len))?
        },
        None => Oid::from_legacy(tgt_legacy_sha),
    };

    let attribution = Attribution::new(source_type, author, session_id, flags)?;

    let edge = Edge::new(
        src_oid,
        tgt_oid,
        rel_type.unwrap_or(RelType::Custom(0)),
        confidence_bits.map(decode_confidence).unwrap_or(1.0),
        timestamp.unwrap_or(0),
        src_path.unwrap_or_default(),
        tgt_path.unwrap_or_default(),
        ulid,
        attribution,
        lane,
    )?;
    Ok(edge)
}
