// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! `RepositoryPort`: the interface the journal, hook, and cache engines use
//! to talk to a repository without depending on `git2` directly. Modeled on
//! `cob::refs_storage::RefsStorage` (trait for polymorphism, not a
//! hand-rolled vtable) generalized to the operations §4.4 names.

use thiserror::Error;

use gitmind_oid::Oid;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("reference {0:?} not found")]
    RefNotFound(String),

    #[error("path {0:?} not found in tree")]
    PathNotFound(String),

    #[error("path {0:?} does not resolve to a blob")]
    NotABlob(String),

    #[error(
        "reference update for {name:?} is not a fast-forward (current {current}, requested from {expected:?})"
    )]
    NonFastForward {
        name: String,
        current: Oid,
        expected: Option<Oid>,
    },

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl gitmind_telemetry::Classify for Error {
    fn kind(&self) -> gitmind_telemetry::ErrorKind {
        use gitmind_telemetry::ErrorKind;
        match self {
            Error::RefNotFound(_) | Error::PathNotFound(_) => ErrorKind::NotFound,
            Error::NotABlob(_) => ErrorKind::InvalidFormat,
            Error::NonFastForward { .. } => ErrorKind::Conflict,
            Error::Git(_) => ErrorKind::IoFailed,
            Error::Io(_) => ErrorKind::IoFailed,
        }
    }
}

/// Which repository-relative path a caller wants (`repository_path` of
/// §4.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    /// The `.git` directory itself.
    GitDir,
    /// The working tree root.
    WorkDir,
}

/// Outcome of `reference_tip`/`reference_glob_latest`: present or absent,
/// with the tip OID and the tip commit's author time when present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefTip {
    pub oid: Oid,
    pub commit_time: i64,
}

/// A single tree entry as produced by `build_tree_from_directory` / read back
/// by the cache engine: a path segment (not a full path) and its target OID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub oid: Oid,
}

/// What to create a new journal/cache commit with. Exactly zero or one
/// parent — merges are never produced by git-mind.
pub struct CommitSpec<'a> {
    pub tree: Oid,
    pub parent: Option<Oid>,
    pub message: &'a [u8],
}

/// How to update a reference: create if absent, otherwise require the
/// update be a fast-forward from `expected_old` unless `force` is set.
pub struct RefUpdate<'a> {
    pub name: &'a str,
    pub target: Oid,
    pub expected_old: Option<Oid>,
    pub force: bool,
}

/// Whether a commit visitor wants to keep walking (§4.4 `walk_commits`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    Stop,
}

/// Interface the journal, hook, and cache engines use instead of touching
/// `git2` directly, so they're testable against [`crate::memory::MemoryRepository`].
pub trait RepositoryPort {
    fn repository_path(&self, kind: PathKind) -> Result<String, Error>;

    fn head_branch(&self) -> Result<String, Error>;

    /// OID of the canonical empty tree.
    fn empty_tree(&self) -> Result<Oid, Error>;

    /// Write a tree mirroring `dir`'s file hierarchy. Directories recurse;
    /// symlinks and special files are skipped.
    fn build_tree_from_directory(&self, dir: &std::path::Path) -> Result<Oid, Error>;

    /// List the direct entries of a tree object (non-recursive), used by the
    /// cache engine to read back shard directories.
    fn read_tree(&self, tree: Oid) -> Result<Vec<TreeEntry>, Error>;

    fn reference_tip(&self, name: &str) -> Result<Option<RefTip>, Error>;

    /// Among all refs matching `pattern` (a `fnmatch`-style glob), the one
    /// with the latest commit time.
    fn reference_glob_latest(&self, pattern: &str) -> Result<Option<RefTip>, Error>;

    fn commit_read_blob(&self, commit: Oid, path: &str) -> Result<Vec<u8>, Error>;

    fn commit_read_message(&self, commit: Oid) -> Result<Vec<u8>, Error>;

    /// Visit commits reachable from `start` by first-parent, most-recent
    /// first, until the visitor returns [`WalkControl::Stop`] or history is
    /// exhausted.
    fn walk_commits(
        &self,
        start: Oid,
        visitor: &mut dyn FnMut(Oid, &[u8], i64) -> Result<WalkControl, Error>,
    ) -> Result<(), Error>;

    /// Total size in bytes of the commit's tree and every reachable blob.
    fn commit_tree_size(&self, commit: Oid) -> Result<u64, Error>;

    /// Resolve the blob OID at `path` in `commit`'s tree.
    fn resolve_blob_at_commit(&self, commit: Oid, path: &str) -> Result<Oid, Error>;

    /// Resolve the blob OID at `path` in HEAD's tree.
    fn resolve_blob_at_head(&self, path: &str) -> Result<Oid, Error>;

    /// OID of the current HEAD commit.
    fn head_commit(&self) -> Result<Oid, Error>;

    /// Direct parents of a commit, in order.
    fn commit_parents(&self, commit: Oid) -> Result<Vec<Oid>, Error>;

    /// Paths whose blob OID differs between two commits' trees, used by the
    /// augmentation hook to find revised files (§4.7 step 1).
    fn changed_paths(&self, old: Oid, new: Oid) -> Result<Vec<String>, Error>;

    /// Write a commit object. Does not move any reference.
    fn commit_create(&self, spec: CommitSpec<'_>) -> Result<Oid, Error>;

    /// Create-or-fast-forward a reference. Fails with
    /// [`Error::NonFastForward`] when `expected_old` doesn't match the
    /// reference's current target and `force` is false.
    fn reference_update(&self, spec: RefUpdate<'_>) -> Result<(), Error>;

    /// A stable identifier for this repository (its canonical gitdir path),
    /// used to namespace cache rebuild temp directories.
    fn identifier(&self) -> &str;
}
