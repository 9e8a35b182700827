// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Cache builder: replays the journal into per-OID fan-out/fan-in
//! bitmaps, shards them, writes a tree, and commits a new cache tip
//! (spec §4.9).

use std::collections::BTreeMap;
use std::time::Instant;

use roaring::RoaringBitmap;
use thiserror::Error;

use gitmind_edge::Edge;
use gitmind_git::{CommitSpec, RefUpdate, RepositoryPort};
use gitmind_oid::Oid;
use gitmind_ref_format::{CacheRef, EdgesRef};

use crate::metadata::{CacheMetadata, DEFAULT_SHARD_BITS, VERSION};
use crate::{bitmap, fnv};

const STALE_AGE_SECONDS: i64 = 3600;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    RefFormat(#[from] gitmind_ref_format::Error),
    #[error(transparent)]
    Git(#[from] gitmind_git::Error),
    #[error(transparent)]
    Journal(#[from] gitmind_journal::reader::Error),
    #[error("failed to stage cache shards on disk: {0}")]
    Io(#[from] std::io::Error),
}

impl gitmind_telemetry::Classify for Error {
    fn kind(&self) -> gitmind_telemetry::ErrorKind {
        use gitmind_telemetry::ErrorKind;
        match self {
            Error::RefFormat(_) => ErrorKind::InvalidArgument,
            Error::Git(_) => ErrorKind::IoFailed,
            Error::Journal(gitmind_journal::reader::Error::NotFound(_)) => ErrorKind::NotFound,
            Error::Journal(_) => ErrorKind::InvalidFormat,
            Error::Io(_) => ErrorKind::IoFailed,
        }
    }
}

/// Whether a branch's cache needs rebuilding (spec §4.9 step 1).
pub fn is_stale(
    metadata: Option<&CacheMetadata>,
    journal_tip: Oid,
    cache_age_seconds: i64,
) -> bool {
    match metadata {
        None => true,
        Some(m) => m.journal_tip_oid != journal_tip || cache_age_seconds > STALE_AGE_SECONDS,
    }
}

pub struct RebuildOutcome {
    pub cache_ref: String,
    pub edges: u64,
}

/// Rebuild (or incrementally extend) `branch`'s cache. `force` skips the
/// staleness check.
pub fn rebuild(
    repo: &dyn RepositoryPort,
    branch: &str,
    prior: Option<&CacheMetadata>,
    force: bool,
    now_unix_seconds: u64,
) -> Result<RebuildOutcome, Error> {
    let start = Instant::now();
    match rebuild_inner(repo, branch, prior, force, now_unix_seconds, start) {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            gitmind_telemetry::events::rebuild_failed(branch, &e.to_string());
            Err(e)
        },
    }
}

fn rebuild_inner(
    repo: &dyn RepositoryPort,
    branch: &str,
    prior: Option<&CacheMetadata>,
    force: bool,
    now_unix_seconds: u64,
    start: Instant,
) -> Result<RebuildOutcome, Error> {
    let edges_ref = EdgesRef::new(branch)?;
    let journal_tip = repo
        .reference_tip(edges_ref.as_str())?
        .ok_or(gitmind_journal::reader::Error::NotFound(
            edges_ref.as_str().to_owned(),
        ))?;

    let cache_age = (now_unix_seconds as i64) - prior.map(|m| m.journal_tip_time).unwrap_or(0);
    if !force && !is_stale(prior, journal_tip.oid, cache_age) {
        return Ok(RebuildOutcome {
            cache_ref: String::new(),
            edges: prior.map(|m| m.edge_count).unwrap_or(0),
        });
    }

    let staging = match tempfile::Builder::new()
        .prefix(&format!("gitmind-cache-{}-", fnv::hash128_hex(repo.identifier().as_bytes())))
        .tempdir()
    {
        Ok(dir) => dir,
        Err(e) => {
            gitmind_telemetry::events::rebuild_prep_failed(branch, &e.to_string());
            return Err(e.into());
        },
    };

    let edges = match gitmind_journal::collect_edges(repo, branch, false) {
        Ok(edges) => edges,
        Err(e) => {
            gitmind_telemetry::events::rebuild_edge_map_failed(branch, &e.to_string());
            return Err(e.into());
        },
    };
    // collect_edges walks commit-time-descending; the builder replays
    // chronologically (oldest first).
    let mut chronological = edges;
    chronological.reverse();

    let shard_bits = prior.map(|m| m.shard_bits).unwrap_or(DEFAULT_SHARD_BITS);
    // `collect_edges` above always replays the *entire* journal rather than
    // loading the prior generation's bitmaps and extending them, so IDs
    // always start at 0 — an offset start_id here would desynchronize
    // every emitted edge ID from the chronological index callers use to
    // look edges back up (see `cli::commands::list`).
    let start_id = 0u32;

    let (forward, reverse) = build_edge_maps(&chronological, start_id);

    if let Err(e) = write_shards(staging.path(), shard_bits, &forward, &reverse) {
        gitmind_telemetry::events::rebuild_collect_write_failed(branch, &e.to_string());
        return Err(e.into());
    }

    let tree = repo.build_tree_from_directory(staging.path())?;

    let metadata = CacheMetadata {
        branch: branch.to_owned(),
        journal_tip_oid: journal_tip.oid,
        journal_tip_time: journal_tip.commit_time,
        edge_count: start_id as u64 + chronological.len() as u64,
        build_time_ms: start.elapsed().as_millis() as u64,
        shard_bits,
        version: VERSION,
    };

    let message = metadata.to_wire();
    let commit = repo.commit_create(CommitSpec {
        tree,
        parent: None,
        message: &message,
    });
    let commit = match commit {
        Ok(c) => c,
        Err(e) => {
            gitmind_telemetry::events::rebuild_meta_failed(branch, &e.to_string());
            return Err(e.into());
        },
    };

    let cache_ref = CacheRef::new(branch, now_unix_seconds)?;
    repo.reference_update(RefUpdate {
        name: cache_ref.as_str(),
        target: commit,
        expected_old: None,
        force: true,
    })?;

    gitmind_telemetry::events::rebuild_ok(branch, metadata.edge_count, metadata.build_time_ms);
    Ok(RebuildOutcome {
        cache_ref: cache_ref.as_str().to_owned(),
        edges: metadata.edge_count,
    })
}

fn build_edge_maps(
    edges: &[Edge],
    start_id: u32,
) -> (BTreeMap<Oid, RoaringBitmap>, BTreeMap<Oid, RoaringBitmap>) {
    let mut forward: BTreeMap<Oid, RoaringBitmap> = BTreeMap::new();
    let mut reverse: BTreeMap<Oid, RoaringBitmap> = BTreeMap::new();
    for (offset, edge) in edges.iter().enumerate() {
        let id = start_id + offset as u32;
        forward.entry(*edge.src_oid()).or_default().insert(id);
        reverse.entry(*edge.tgt_oid()).or_default().insert(id);
    }
    (forward, reverse)
}

fn write_shards(
    root: &std::path::Path,
    shard_bits: u32,
    forward: &BTreeMap<Oid, RoaringBitmap>,
    reverse: &BTreeMap<Oid, RoaringBitmap>,
) -> std::io::Result<()> {
    let mut all_oids: std::collections::BTreeSet<Oid> = forward.keys().copied().collect();
    all_oids.extend(reverse.keys().copied());

    for oid in all_oids {
        let shard = oid.shard_prefix(shard_bits);
        let shard_dir = root.join(&shard);
        std::fs::create_dir_all(&shard_dir)?;
        let oid_hex = oid.to_hex();

        if let Some(bitmap) = forward.get(&oid) {
            std::fs::write(
                shard_dir.join(format!("{oid_hex}.forward")),
                bitmap::serialize(bitmap),
            )?;
        }
        if let Some(bitmap) = reverse.get(&oid) {
            std::fs::write(
                shard_dir.join(format!("{oid_hex}.reverse")),
                bitmap::serialize(bitmap),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitmind_oid::Oid;

    fn oid(n: u8) -> Oid {
        Oid::from_bytes(&[n; 20]).unwrap()
    }

    fn meta(journal_tip_oid: Oid, journal_tip_time: i64) -> CacheMetadata {
        CacheMetadata {
            branch: "main".into(),
            journal_tip_oid,
            journal_tip_time,
            edge_count: 10,
            build_time_ms: 1,
            shard_bits: DEFAULT_SHARD_BITS,
            version: VERSION,
        }
    }

    #[test]
    fn absent_metadata_is_always_stale() {
        assert!(is_stale(None, oid(1), 0));
    }

    #[test]
    fn matching_tip_within_age_is_fresh() {
        let m = meta(oid(1), 1000);
        assert!(!is_stale(Some(&m), oid(1), 10));
    }

    #[test]
    fn differing_tip_is_stale() {
        let m = meta(oid(1), 1000);
        assert!(is_stale(Some(&m), oid(2), 10));
    }

    #[test]
    fn old_cache_is_stale_even_with_matching_tip() {
        let m = meta(oid(1), 1000);
        assert!(is_stale(Some(&m), oid(1), STALE_AGE_SECONDS + 1));
    }

    #[test]
    fn edge_map_assigns_sequential_ids_from_start() {
        let edges = vec![];
        let (forward, reverse) = build_edge_maps(&edges, 5);
        assert!(forward.is_empty());
        assert!(reverse.is_empty());
    }

    #[test]
    fn write_shards_creates_expected_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut forward = BTreeMap::new();
        let mut bitmap = RoaringBitmap::new();
        bitmap.insert(0);
        forward.insert(oid(1), bitmap);
        write_shards(dir.path(), DEFAULT_SHARD_BITS, &forward, &BTreeMap::new()).unwrap();

        let shard = oid(1).shard_prefix(DEFAULT_SHARD_BITS);
        let path = dir.path().join(&shard).join(format!("{}.forward", oid(1).to_hex()));
        assert!(path.exists());
    }
}
