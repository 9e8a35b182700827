// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Domain model for git-mind's knowledge graph: the attributed and legacy
//! edge shapes, relationship types, lanes, attribution, and logical path
//! normalization shared by the journal and cache engines.

pub mod attribution;
pub mod edge;
pub mod lane;
pub mod path;
pub mod rel_type;

pub use attribution::{Attribution, Flags, SourceType};
pub use edge::{decode_confidence, encode_confidence, Edge, LegacyEdge, CONFIDENCE_SCALE, ULID_LEN};
pub use lane::Lane;
pub use rel_type::RelType;
