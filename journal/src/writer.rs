// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Append-only journal writer: batches CBOR-encoded edges into commits on
//! `refs/gitmind/edges/<branch>`, retrying once on a non-fast-forward race
//! (spec §4.5).

use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use gitmind_edge::Edge;
use gitmind_git::{CommitSpec, RefUpdate, RepositoryPort};
use gitmind_ref_format::EdgesRef;

/// Raw CBOR batch ceiling; a commit body stays under 64 KiB after base64
/// (which expands by 4/3) with headroom for the worst-case record size.
pub const MAX_BATCH_RAW_BYTES: usize = 57 * 1024;

/// A single encoded edge plus its wire shape, ready to batch.
pub struct EncodedEdge {
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    RefFormat(#[from] gitmind_ref_format::Error),
    #[error(transparent)]
    Git(#[from] gitmind_git::Error),
    #[error("a second reference update attempt also hit a non-fast-forward conflict")]
    RetryExhausted,
}

impl gitmind_telemetry::Classify for Error {
    fn kind(&self) -> gitmind_telemetry::ErrorKind {
        use gitmind_telemetry::ErrorKind;
        match self {
            Error::RefFormat(_) => ErrorKind::InvalidArgument,
            Error::Git(gitmind_git::Error::NonFastForward { .. }) | Error::RetryExhausted => {
                ErrorKind::Conflict
            },
            Error::Git(_) => ErrorKind::IoFailed,
        }
    }
}

/// How many commits a call to [`append`] produced and how many edges each
/// one carried, for telemetry and tests.
pub struct AppendOutcome {
    pub commits: usize,
    pub edges: usize,
}

/// Append `edges` (already CBOR-encoded, in caller order) to the journal
/// ref for `branch`, splitting into multiple commits when the batch ceiling
/// is exceeded.
pub fn append(
    repo: &dyn RepositoryPort,
    branch: &str,
    edges: &[EncodedEdge],
) -> Result<AppendOutcome, Error> {
    let start = Instant::now();
    gitmind_telemetry::events::journal_append_start(branch);

    let result = append_inner(repo, branch, edges);

    match &result {
        Ok(outcome) => gitmind_telemetry::events::journal_append_ok(
            branch,
            start.elapsed().as_millis() as u64,
            outcome.edges,
        ),
        Err(e) => gitmind_telemetry::events::journal_append_failed(
            branch,
            &format!("{:?}", gitmind_telemetry::Classify::kind(e)),
        ),
    }
    result
}

fn append_inner(
    repo: &dyn RepositoryPort,
    branch: &str,
    edges: &[EncodedEdge],
) -> Result<AppendOutcome, Error> {
    let ref_name = EdgesRef::new(branch)?;
    let mut commits = 0;
    let mut written = 0;
    let mut batch: Vec<u8> = Vec::with_capacity(MAX_BATCH_RAW_BYTES);

    let mut flush = |batch: &mut Vec<u8>| -> Result<(), Error> {
        if batch.is_empty() {
            return Ok(());
        }
        flush_batch(repo, ref_name.as_str(), batch)?;
        commits += 1;
        batch.clear();
        Ok(())
    };

    for edge in edges {
        if !batch.is_empty() && batch.len() + edge.bytes.len() > MAX_BATCH_RAW_BYTES {
            flush(&mut batch)?;
        }
        batch.extend_from_slice(&edge.bytes);
        written += 1;
    }
    flush(&mut batch)?;

    Ok(AppendOutcome {
        commits,
        edges: written,
    })
}

fn flush_batch(repo: &dyn RepositoryPort, ref_name: &str, raw: &[u8]) -> Result<(), Error> {
    let message = BASE64.encode(raw);
    let tree = repo.empty_tree()?;

    let parent = repo.reference_tip(ref_name)?.map(|t| t.oid);
    let commit = repo.commit_create(CommitSpec {
        tree,
        parent,
        message: message.as_bytes(),
    })?;

    let update = repo.reference_update(RefUpdate {
        name: ref_name,
        target: commit,
        expected_old: parent,
        force: false,
    });

    match update {
        Ok(()) => Ok(()),
        Err(gitmind_git::Error::NonFastForward { .. }) => {
            let retried_parent = repo.reference_tip(ref_name)?.map(|t| t.oid);
            let retried_commit = repo.commit_create(CommitSpec {
                tree,
                parent: retried_parent,
                message: message.as_bytes(),
            })?;
            repo.reference_update(RefUpdate {
                name: ref_name,
                target: retried_commit,
                expected_old: retried_parent,
                force: false,
            })
            .map_err(|e| match e {
                gitmind_git::Error::NonFastForward { .. } => Error::RetryExhausted,
                other => Error::Git(other),
            })
        },
        Err(other) => Err(Error::Git(other)),
    }
}

/// Encode edges for [`append`], choosing attributed or legacy shape.
pub fn encode_attributed(edges: &[Edge]) -> Vec<EncodedEdge> {
    edges
        .iter()
        .map(|e| EncodedEdge {
            bytes: gitmind_cbor::encode_attributed(e),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitmind_edge::{Attribution, Lane, RelType};
    use gitmind_git::MemoryRepository;
    use gitmind_oid::Oid;

    fn sample(n: u8) -> Edge {
        let src = Oid::from_bytes(&[n; 20]).unwrap();
        let tgt = Oid::from_bytes(&[n.wrapping_add(1); 20]).unwrap();
        Edge::new(
            src,
            tgt,
            RelType::Implements,
            1.0,
            1_700_000_000,
            "/a",
            "/b",
            None,
            Attribution::default_for_legacy(),
            Lane::Primary,
        )
        .unwrap()
    }

    #[test]
    fn append_creates_one_commit_for_a_small_batch() {
        let repo = MemoryRepository::new("/tmp/repo");
        let edges = encode_attributed(&[sample(1), sample(2)]);
        let outcome = append(&repo, "main", &edges).unwrap();
        assert_eq!(outcome.commits, 1);
        assert_eq!(outcome.edges, 2);
        assert!(repo.reference_tip("refs/gitmind/edges/main").unwrap().is_some());
    }

    #[test]
    fn append_splits_into_multiple_commits_past_the_batch_ceiling() {
        let repo = MemoryRepository::new("/tmp/repo");
        let many: Vec<Edge> = (0..200u8).map(sample).collect();
        let edges = encode_attributed(&many);
        let outcome = append(&repo, "main", &edges).unwrap();
        assert!(outcome.commits > 1);
        assert_eq!(outcome.edges, 200);
    }

    #[test]
    fn successive_appends_chain_by_parent() {
        let repo = MemoryRepository::new("/tmp/repo");
        append(&repo, "main", &encode_attributed(&[sample(1)])).unwrap();
        let first_tip = repo.reference_tip("refs/gitmind/edges/main").unwrap().unwrap().oid;
        append(&repo, "main", &encode_attributed(&[sample(2)])).unwrap();
        let second_tip = repo.reference_tip("refs/gitmind/edges/main").unwrap().unwrap().oid;
        assert_ne!(first_tip, second_tip);
    }
}
