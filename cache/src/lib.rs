// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Roaring-bitmap fan-out/fan-in cache: [`bitmap`] is the on-disk/blob
//! format, [`builder`] replays the journal into a new cache tip,
//! [`query`] resolves edge IDs via the cache or falls back to a journal
//! scan.

pub mod bitmap;
pub mod builder;
pub mod fnv;
pub mod metadata;
pub mod query;

pub use builder::{is_stale, rebuild, RebuildOutcome};
pub use metadata::CacheMetadata;
pub use query::{query as query_cache, Direction, QueryResult};
