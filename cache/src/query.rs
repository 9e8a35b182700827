// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Cache query: resolve forward/reverse edge-ID lookups for an OID via the
//! cache, falling back to a linear journal scan on any cache miss (spec
//! §4.10).

use gitmind_git::RepositoryPort;
use gitmind_oid::Oid;
use gitmind_ref_format::CacheGlob;

use crate::metadata::CacheMetadata;
use crate::bitmap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Edges where the queried OID is the source.
    Forward,
    /// Edges where the queried OID is the target.
    Reverse,
}

pub struct QueryResult {
    pub ids: Vec<u32>,
    pub from_cache: bool,
}

/// Resolve the set of edge IDs touching `oid` in `direction`, for `branch`.
pub fn query(
    repo: &dyn RepositoryPort,
    branch: &str,
    oid: Oid,
    direction: Direction,
) -> Result<QueryResult, gitmind_journal::reader::Error> {
    if let Some(ids) = try_cache(repo, branch, oid, direction) {
        return Ok(QueryResult {
            ids,
            from_cache: true,
        });
    }
    Ok(QueryResult {
        ids: scan_journal(repo, branch, oid, direction)?,
        from_cache: false,
    })
}

fn try_cache(repo: &dyn RepositoryPort, branch: &str, oid: Oid, direction: Direction) -> Option<Vec<u32>> {
    let glob = CacheGlob::new(branch).ok()?;
    let tip = repo.reference_glob_latest(glob.as_str()).ok()??;
    let message = repo.commit_read_message(tip.oid).ok()?;
    let metadata = CacheMetadata::from_wire(branch, &message).ok()?;

    let shard = oid.shard_prefix(metadata.shard_bits);
    let suffix = match direction {
        Direction::Forward => "forward",
        Direction::Reverse => "reverse",
    };
    let path = format!("{shard}/{}.{suffix}", oid.to_hex());
    let blob = repo.commit_read_blob(tip.oid, &path).ok()?;
    let bitmap = bitmap::deserialize(&blob).ok()?;
    Some(bitmap.iter().collect())
}

fn scan_journal(
    repo: &dyn RepositoryPort,
    branch: &str,
    oid: Oid,
    direction: Direction,
) -> Result<Vec<u32>, gitmind_journal::reader::Error> {
    let edges = gitmind_journal::collect_edges(repo, branch, false)?;
    let mut chronological = edges;
    chronological.reverse();

    let ids = chronological
        .iter()
        .enumerate()
        .filter(|(_, e)| match direction {
            Direction::Forward => *e.src_oid() == oid,
            Direction::Reverse => *e.tgt_oid() == oid,
        })
        .map(|(i, _)| i as u32)
        .collect();
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitmind_edge::{Attribution, Edge, Lane, RelType};
    use gitmind_git::MemoryRepository;
    use gitmind_journal::{append, encode_attributed};

    fn edge(src: u8, tgt: u8) -> Edge {
        Edge::new(
            Oid::from_bytes(&[src; 20]).unwrap(),
            Oid::from_bytes(&[tgt; 20]).unwrap(),
            RelType::Implements,
            1.0,
            1,
            "/a",
            "/b",
            None,
            Attribution::default_for_legacy(),
            Lane::Primary,
        )
        .unwrap()
    }

    #[test]
    fn falls_back_to_journal_scan_without_a_cache() {
        let repo = MemoryRepository::new("/tmp/repo");
        append(&repo, "main", &encode_attributed(&[edge(1, 2), edge(3, 1)])).unwrap();

        let result = query(
            &repo,
            "main",
            Oid::from_bytes(&[1u8; 20]).unwrap(),
            Direction::Forward,
        )
        .unwrap();
        assert!(!result.from_cache);
        assert_eq!(result.ids, vec![0]);
    }

    #[test]
    fn reverse_direction_matches_target_oid() {
        let repo = MemoryRepository::new("/tmp/repo");
        append(&repo, "main", &encode_attributed(&[edge(1, 2), edge(3, 2)])).unwrap();

        let result = query(
            &repo,
            "main",
            Oid::from_bytes(&[2u8; 20]).unwrap(),
            Direction::Reverse,
        )
        .unwrap();
        assert_eq!(result.ids, vec![0, 1]);
    }
}
