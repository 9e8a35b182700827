// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! An in-process [`RepositoryPort`] fake for unit tests, grounded on the
//! original's `fake_git_repository_port.c` test double: no libgit2, no
//! filesystem, just maps the tests can inspect directly.

use std::collections::BTreeMap;
use std::sync::Mutex;

use gitmind_oid::Oid;

use crate::port::{
    CommitSpec, Error, PathKind, RefTip, RefUpdate, RepositoryPort, TreeEntry, WalkControl,
};

struct Commit {
    message: Vec<u8>,
    parent: Option<Oid>,
    tree: Oid,
    time: i64,
}

struct State {
    commits: BTreeMap<Oid, Commit>,
    trees: BTreeMap<Oid, Vec<TreeEntry>>,
    blobs: BTreeMap<Oid, Vec<u8>>,
    refs: BTreeMap<String, Oid>,
    next_oid: u64,
    clock: i64,
}

/// A repository fake that keeps everything in memory. `commit_create`
/// assigns deterministic sequential OIDs and strictly increasing commit
/// times, so tests can assert ordering without wall-clock flakiness.
pub struct MemoryRepository {
    state: Mutex<State>,
    identifier: String,
    head_branch: String,
}

impl MemoryRepository {
    pub fn new(identifier: impl Into<String>) -> Self {
        let mut state = State {
            commits: BTreeMap::new(),
            trees: BTreeMap::new(),
            blobs: BTreeMap::new(),
            refs: BTreeMap::new(),
            next_oid: 1,
            clock: 1_700_000_000,
        };
        let empty = state.fresh_oid();
        state.trees.insert(empty, Vec::new());
        Self {
            state: Mutex::new(state),
            identifier: identifier.into(),
            head_branch: "main".to_owned(),
        }
    }

    /// Insert a blob directly, bypassing commit construction, for tests that
    /// want to seed `commit_read_blob` without building a tree.
    pub fn put_blob(&self, data: impl Into<Vec<u8>>) -> Oid {
        let mut state = self.state.lock().expect("memory repository lock poisoned");
        let oid = state.fresh_oid();
        state.blobs.insert(oid, data.into());
        oid
    }

    pub fn put_tree(&self, entries: Vec<TreeEntry>) -> Oid {
        let mut state = self.state.lock().expect("memory repository lock poisoned");
        let oid = state.fresh_oid();
        state.trees.insert(oid, entries);
        oid
    }
}

impl State {
    fn fresh_oid(&mut self) -> Oid {
        let n = self.next_oid;
        self.next_oid += 1;
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Oid::from_bytes(&bytes).expect("20 bytes is a valid Oid length")
    }

    fn find_blob_in_tree(&self, tree: Oid, path: &str) -> Result<Oid, Error> {
        let mut current = tree;
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(Error::PathNotFound(path.to_owned()));
        }
        for (i, segment) in segments.iter().enumerate() {
            let entries = self
                .trees
                .get(&current)
                .ok_or_else(|| Error::PathNotFound(path.to_owned()))?;
            let entry = entries
                .iter()
                .find(|e| e.name == *segment)
                .ok_or_else(|| Error::PathNotFound(path.to_owned()))?;
            if i + 1 == segments.len() {
                if !self.blobs.contains_key(&entry.oid) {
                    return Err(Error::NotABlob(path.to_owned()));
                }
                return Ok(entry.oid);
            }
            current = entry.oid;
        }
        unreachable!("loop always returns by the last segment")
    }
}

impl RepositoryPort for MemoryRepository {
    fn repository_path(&self, kind: PathKind) -> Result<String, Error> {
        Ok(match kind {
            PathKind::GitDir => format!("{}/.git", self.identifier),
            PathKind::WorkDir => self.identifier.clone(),
        })
    }

    fn head_branch(&self) -> Result<String, Error> {
        Ok(self.head_branch.clone())
    }

    fn empty_tree(&self) -> Result<Oid, Error> {
        let state = self.state.lock().expect("memory repository lock poisoned");
        state
            .trees
            .iter()
            .find(|(_, entries)| entries.is_empty())
            .map(|(oid, _)| *oid)
            .ok_or_else(|| Error::PathNotFound("empty tree".into()))
    }

    fn build_tree_from_directory(&self, _dir: &std::path::Path) -> Result<Oid, Error> {
        Err(Error::PathNotFound(
            "MemoryRepository has no filesystem; use put_tree/put_blob".into(),
        ))
    }

    fn read_tree(&self, tree: Oid) -> Result<Vec<TreeEntry>, Error> {
        let state = self.state.lock().expect("memory repository lock poisoned");
        state
            .trees
            .get(&tree)
            .cloned()
            .ok_or_else(|| Error::PathNotFound(tree.to_hex()))
    }

    fn reference_tip(&self, name: &str) -> Result<Option<RefTip>, Error> {
        let state = self.state.lock().expect("memory repository lock poisoned");
        Ok(state.refs.get(name).map(|oid| RefTip {
            oid: *oid,
            commit_time: state.commits.get(oid).map(|c| c.time).unwrap_or(0),
        }))
    }

    fn reference_glob_latest(&self, pattern: &str) -> Result<Option<RefTip>, Error> {
        let state = self.state.lock().expect("memory repository lock poisoned");
        let glob = glob_to_prefix_suffix(pattern);
        let mut latest: Option<RefTip> = None;
        for (name, oid) in state.refs.iter() {
            if !glob_matches(&glob, name) {
                continue;
            }
            let time = state.commits.get(oid).map(|c| c.time).unwrap_or(0);
            if latest.as_ref().is_none_or(|l| time > l.commit_time) {
                latest = Some(RefTip {
                    oid: *oid,
                    commit_time: time,
                });
            }
        }
        Ok(latest)
    }

    fn commit_read_blob(&self, commit: Oid, path: &str) -> Result<Vec<u8>, Error> {
        let state = self.state.lock().expect("memory repository lock poisoned");
        let c = state
            .commits
            .get(&commit)
            .ok_or_else(|| Error::PathNotFound(commit.to_hex()))?;
        let blob_oid = state.find_blob_in_tree(c.tree, path)?;
        state
            .blobs
            .get(&blob_oid)
            .cloned()
            .ok_or_else(|| Error::PathNotFound(path.to_owned()))
    }

    fn commit_read_message(&self, commit: Oid) -> Result<Vec<u8>, Error> {
        let state = self.state.lock().expect("memory repository lock poisoned");
        state
            .commits
            .get(&commit)
            .map(|c| c.message.clone())
            .ok_or_else(|| Error::PathNotFound(commit.to_hex()))
    }

    fn walk_commits(
        &self,
        start: Oid,
        visitor: &mut dyn FnMut(Oid, &[u8], i64) -> Result<WalkControl, Error>,
    ) -> Result<(), Error> {
        let mut cursor = Some(start);
        while let Some(oid) = cursor {
            let (message, time, parent) = {
                let state = self.state.lock().expect("memory repository lock poisoned");
                let c = state
                    .commits
                    .get(&oid)
                    .ok_or_else(|| Error::PathNotFound(oid.to_hex()))?;
                (c.message.clone(), c.time, c.parent)
            };
            if visitor(oid, &message, time)? == WalkControl::Stop {
                break;
            }
            cursor = parent;
        }
        Ok(())
    }

    fn commit_tree_size(&self, commit: Oid) -> Result<u64, Error> {
        let state = self.state.lock().expect("memory repository lock poisoned");
        let c = state
            .commits
            .get(&commit)
            .ok_or_else(|| Error::PathNotFound(commit.to_hex()))?;
        Ok(sum_tree_size(&state, c.tree))
    }

    fn resolve_blob_at_commit(&self, commit: Oid, path: &str) -> Result<Oid, Error> {
        let state = self.state.lock().expect("memory repository lock poisoned");
        let c = state
            .commits
            .get(&commit)
            .ok_or_else(|| Error::PathNotFound(commit.to_hex()))?;
        state.find_blob_in_tree(c.tree, path)
    }

    fn resolve_blob_at_head(&self, path: &str) -> Result<Oid, Error> {
        let state = self.state.lock().expect("memory repository lock poisoned");
        let head = state
            .refs
            .get(&format!("refs/heads/{}", self.head_branch))
            .copied()
            .ok_or_else(|| Error::PathNotFound("HEAD".into()))?;
        let c = state
            .commits
            .get(&head)
            .ok_or_else(|| Error::PathNotFound(head.to_hex()))?;
        state.find_blob_in_tree(c.tree, path)
    }

    fn commit_create(&self, spec: CommitSpec<'_>) -> Result<Oid, Error> {
        let mut state = self.state.lock().expect("memory repository lock poisoned");
        if !state.trees.contains_key(&spec.tree) {
            return Err(Error::PathNotFound(spec.tree.to_hex()));
        }
        state.clock += 1;
        let time = state.clock;
        let oid = state.fresh_oid();
        state.commits.insert(
            oid,
            Commit {
                message: spec.message.to_vec(),
                parent: spec.parent,
                tree: spec.tree,
                time,
            },
        );
        Ok(oid)
    }

    fn reference_update(&self, spec: RefUpdate<'_>) -> Result<(), Error> {
        let mut state = self.state.lock().expect("memory repository lock poisoned");
        let current = state.refs.get(spec.name).copied();
        if !spec.force && current != spec.expected_old {
            return Err(Error::NonFastForward {
                name: spec.name.to_owned(),
                current: current.unwrap_or(spec.target),
                expected: spec.expected_old,
            });
        }
        state.refs.insert(spec.name.to_owned(), spec.target);
        Ok(())
    }

    fn head_commit(&self) -> Result<Oid, Error> {
        let state = self.state.lock().expect("memory repository lock poisoned");
        state
            .refs
            .get(&format!("refs/heads/{}", self.head_branch))
            .copied()
            .ok_or_else(|| Error::PathNotFound("HEAD".into()))
    }

    fn commit_parents(&self, commit: Oid) -> Result<Vec<Oid>, Error> {
        let state = self.state.lock().expect("memory repository lock poisoned");
        let c = state
            .commits
            .get(&commit)
            .ok_or_else(|| Error::PathNotFound(commit.to_hex()))?;
        Ok(c.parent.into_iter().collect())
    }

    fn changed_paths(&self, old: Oid, new: Oid) -> Result<Vec<String>, Error> {
        let state = self.state.lock().expect("memory repository lock poisoned");
        let old_tree = state
            .commits
            .get(&old)
            .ok_or_else(|| Error::PathNotFound(old.to_hex()))?
            .tree;
        let new_tree = state
            .commits
            .get(&new)
            .ok_or_else(|| Error::PathNotFound(new.to_hex()))?
            .tree;
        let mut paths = Vec::new();
        diff_trees(&state, old_tree, new_tree, "", &mut paths);
        Ok(paths)
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

fn diff_trees(state: &State, old: Oid, new: Oid, prefix: &str, out: &mut Vec<String>) {
    if old == new {
        return;
    }
    let empty = Vec::new();
    let old_entries = state.trees.get(&old).unwrap_or(&empty);
    let new_entries = state.trees.get(&new).unwrap_or(&empty);

    for new_entry in new_entries {
        let path = format!("{prefix}{}", new_entry.name);
        match old_entries.iter().find(|e| e.name == new_entry.name) {
            Some(old_entry) if old_entry.oid == new_entry.oid => {},
            Some(old_entry) => {
                if state.trees.contains_key(&old_entry.oid) && state.trees.contains_key(&new_entry.oid)
                {
                    diff_trees(state, old_entry.oid, new_entry.oid, &format!("{path}/"), out);
                } else {
                    out.push(path);
                }
            },
            None => out.push(path),
        }
    }
    for old_entry in old_entries {
        if !new_entries.iter().any(|e| e.name == old_entry.name) {
            out.push(format!("{prefix}{}", old_entry.name));
        }
    }
}

fn sum_tree_size(state: &State, tree: Oid) -> u64 {
    let Some(entries) = state.trees.get(&tree) else {
        return 0;
    };
    let mut total = 0u64;
    for entry in entries {
        if let Some(blob) = state.blobs.get(&entry.oid) {
            total += blob.len() as u64;
        } else if state.trees.contains_key(&entry.oid) {
            total += sum_tree_size(state, entry.oid);
        }
    }
    total
}

/// Minimal glob support (`*` wildcard only) sufficient for ref patterns like
/// `refs/gitmind/cache/main/*`.
struct GlobParts<'a> {
    prefix: &'a str,
    suffix: &'a str,
}

fn glob_to_prefix_suffix(pattern: &str) -> GlobParts<'_> {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => GlobParts { prefix, suffix },
        None => GlobParts {
            prefix: pattern,
            suffix: "",
        },
    }
}

fn glob_matches(parts: &GlobParts<'_>, candidate: &str) -> bool {
    candidate.len() >= parts.prefix.len() + parts.suffix.len()
        && candidate.starts_with(parts.prefix)
        && candidate.ends_with(parts.suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_create_then_read_message_roundtrips() {
        let repo = MemoryRepository::new("/tmp/repo");
        let tree = repo.empty_tree().unwrap();
        let oid = repo
            .commit_create(CommitSpec {
                tree,
                parent: None,
                message: b"hello",
            })
            .unwrap();
        assert_eq!(repo.commit_read_message(oid).unwrap(), b"hello");
    }

    #[test]
    fn reference_update_rejects_non_fast_forward() {
        let repo = MemoryRepository::new("/tmp/repo");
        let tree = repo.empty_tree().unwrap();
        let first = repo
            .commit_create(CommitSpec {
                tree,
                parent: None,
                message: b"first",
            })
            .unwrap();
        repo.reference_update(RefUpdate {
            name: "refs/gitmind/edges/main",
            target: first,
            expected_old: None,
            force: false,
        })
        .unwrap();

        let second = repo
            .commit_create(CommitSpec {
                tree,
                parent: Some(first),
                message: b"second",
            })
            .unwrap();
        let err = repo
            .reference_update(RefUpdate {
                name: "refs/gitmind/edges/main",
                target: second,
                expected_old: None,
                force: false,
            })
            .unwrap_err();
        assert!(matches!(err, Error::NonFastForward { .. }));

        repo.reference_update(RefUpdate {
            name: "refs/gitmind/edges/main",
            target: second,
            expected_old: Some(first),
            force: false,
        })
        .unwrap();
    }

    #[test]
    fn walk_commits_stops_when_visitor_requests() {
        let repo = MemoryRepository::new("/tmp/repo");
        let tree = repo.empty_tree().unwrap();
        let first = repo
            .commit_create(CommitSpec {
                tree,
                parent: None,
                message: b"first",
            })
            .unwrap();
        let second = repo
            .commit_create(CommitSpec {
                tree,
                parent: Some(first),
                message: b"second",
            })
            .unwrap();

        let mut seen = Vec::new();
        repo.walk_commits(second, &mut |oid, _, _| {
            seen.push(oid);
            Ok(WalkControl::Stop)
        })
        .unwrap();
        assert_eq!(seen, vec![second]);
    }

    #[test]
    fn blob_resolves_through_nested_tree() {
        let repo = MemoryRepository::new("/tmp/repo");
        let blob = repo.put_blob(b"content".to_vec());
        let inner = repo.put_tree(vec![TreeEntry {
            name: "b.txt".into(),
            oid: blob,
        }]);
        let root = repo.put_tree(vec![TreeEntry {
            name: "sub".into(),
            oid: inner,
        }]);
        let commit = repo
            .commit_create(CommitSpec {
                tree: root,
                parent: None,
                message: b"seed",
            })
            .unwrap();
        assert_eq!(
            repo.commit_read_blob(commit, "sub/b.txt").unwrap(),
            b"content"
        );
    }
}
