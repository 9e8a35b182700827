// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Deterministic CBOR codec for git-mind edge records, plus ULID generation.
//!
//! Encoding is hand-written rather than derived (see [`codec`]) because the
//! wire format freezes specific integer keys and a dual array/map shape.

pub mod codec;
pub mod ulid;

pub use codec::{decode_one, encode_attributed, encode_legacy, to_legacy, Decoded, Error};
