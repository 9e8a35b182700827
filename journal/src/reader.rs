// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Journal reader: walks `refs/gitmind/edges/<branch>` commit-time
//! descending, base64-decoding each commit body and streaming CBOR records
//! out of it (spec §4.6).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use gitmind_edge::Edge;
use gitmind_git::{RepositoryPort, WalkControl};
use gitmind_ref_format::EdgesRef;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    RefFormat(#[from] gitmind_ref_format::Error),
    #[error(transparent)]
    Git(#[from] gitmind_git::Error),
    #[error("journal ref {0:?} has no history")]
    NotFound(String),
}

impl gitmind_telemetry::Classify for Error {
    fn kind(&self) -> gitmind_telemetry::ErrorKind {
        use gitmind_telemetry::ErrorKind;
        match self {
            Error::RefFormat(_) => ErrorKind::InvalidArgument,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Git(_) => ErrorKind::IoFailed,
        }
    }
}

/// What a visitor returns to keep reading or stop early (bubbles up to
/// [`gitmind_git::WalkControl`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisitControl {
    Continue,
    Stop,
}

/// Visit every edge on `branch`'s journal, most-recent commit first,
/// invoking `visitor` for each decoded edge in its commit's on-wire order.
/// Stops the whole walk as soon as `visitor` returns [`VisitControl::Stop`].
pub fn visit_edges(
    repo: &dyn RepositoryPort,
    branch: &str,
    debug: bool,
    mut visitor: impl FnMut(&Edge) -> VisitControl,
) -> Result<(), Error> {
    let ref_name = EdgesRef::new(branch)?;
    let tip = repo
        .reference_tip(ref_name.as_str())?
        .ok_or_else(|| Error::NotFound(ref_name.as_str().to_owned()))?;

    repo.walk_commits(tip.oid, &mut |commit_oid, message, _time| {
        let message = std::str::from_utf8(message).unwrap_or("");
        let raw = match BASE64.decode(message) {
            Ok(raw) => raw,
            Err(e) => {
                gitmind_telemetry::events::journal_decode_failed(
                    branch,
                    &commit_oid.to_hex(),
                    &e.to_string(),
                );
                return Ok(WalkControl::Continue);
            },
        };

        let mut offset = 0usize;
        while offset < raw.len() {
            match gitmind_cbor::decode_one(&raw[offset..], debug) {
                Ok(decoded) => {
                    offset += decoded.consumed;
                    if visitor(&decoded.edge) == VisitControl::Stop {
                        return Ok(WalkControl::Stop);
                    }
                },
                Err(e) => {
                    gitmind_telemetry::events::journal_decode_failed(
                        branch,
                        &commit_oid.to_hex(),
                        &e.to_string(),
                    );
                    break;
                },
            }
        }
        Ok(WalkControl::Continue)
    })?;
    Ok(())
}

/// Collect every edge on `branch`'s journal into a `Vec`, most-recent
/// commit first. Convenience wrapper over [`visit_edges`] for callers that
/// don't need early termination (e.g. `list`, the augmentation hook's
/// recent-K scan). `debug` forwards to [`gitmind_cbor::decode_one`]'s
/// diagnostic logging.
pub fn collect_edges(
    repo: &dyn RepositoryPort,
    branch: &str,
    debug: bool,
) -> Result<Vec<Edge>, Error> {
    let mut edges = Vec::new();
    visit_edges(repo, branch, debug, |edge| {
        edges.push(edge.clone());
        VisitControl::Continue
    })?;
    Ok(edges)
}

/// Collect at most the most recent `limit` edges, for the augmentation
/// hook's bounded scan (spec §4.7 step 4, default `limit = 200`).
pub fn collect_recent_edges(
    repo: &dyn RepositoryPort,
    branch: &str,
    limit: usize,
    debug: bool,
) -> Result<Vec<Edge>, Error> {
    let mut edges = Vec::with_capacity(limit.min(256));
    visit_edges(repo, branch, debug, |edge| {
        edges.push(edge.clone());
        if edges.len() >= limit {
            VisitControl::Stop
        } else {
            VisitControl::Continue
        }
    })?;
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitmind_edge::{Attribution, Lane, RelType};
    use gitmind_git::MemoryRepository;
    use gitmind_oid::Oid;
    use crate::writer::{append, encode_attributed};

    fn sample(n: u8) -> Edge {
        let src = Oid::from_bytes(&[n; 20]).unwrap();
        let tgt = Oid::from_bytes(&[n.wrapping_add(1); 20]).unwrap();
        Edge::new(
            src,
            tgt,
            RelType::Implements,
            1.0,
            1_700_000_000 + n as u64,
            "/a",
            "/b",
            None,
            Attribution::default_for_legacy(),
            Lane::Primary,
        )
        .unwrap()
    }

    #[test]
    fn missing_ref_is_reported_as_not_found() {
        let repo = MemoryRepository::new("/tmp/repo");
        let err = collect_edges(&repo, "main", false).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn reads_back_everything_that_was_appended() {
        let repo = MemoryRepository::new("/tmp/repo");
        append(&repo, "main", &encode_attributed(&[sample(1), sample(2)])).unwrap();
        append(&repo, "main", &encode_attributed(&[sample(3)])).unwrap();

        let edges = collect_edges(&repo, "main", false).unwrap();
        assert_eq!(edges.len(), 3);
    }

    #[test]
    fn visitor_stop_halts_the_walk() {
        let repo = MemoryRepository::new("/tmp/repo");
        append(&repo, "main", &encode_attributed(&[sample(1)])).unwrap();
        append(&repo, "main", &encode_attributed(&[sample(2)])).unwrap();

        let mut seen = 0;
        visit_edges(&repo, "main", false, |_edge| {
            seen += 1;
            VisitControl::Stop
        })
        .unwrap();
        assert_eq!(seen, 1);
    }

    #[test]
    fn recent_edges_are_bounded_by_limit() {
        let repo = MemoryRepository::new("/tmp/repo");
        for n in 0..5u8 {
            append(&repo, "main", &encode_attributed(&[sample(n)])).unwrap();
        }
        let recent = collect_recent_edges(&repo, "main", 2, false).unwrap();
        assert_eq!(recent.len(), 2);
    }
}
