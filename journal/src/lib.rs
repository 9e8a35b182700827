// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! The append-only edge journal: [`writer`] batches and commits encoded
//! edges, [`reader`] walks them back out in commit-time-descending order.

pub mod reader;
pub mod writer;

pub use reader::{collect_edges, collect_recent_edges, visit_edges, VisitControl};
pub use writer::{append, encode_attributed, AppendOutcome, EncodedEdge, MAX_BATCH_RAW_BYTES};
