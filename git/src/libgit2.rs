// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Production [`RepositoryPort`] backed by `git2`. Commit construction
//! follows `cob::change::Change::create`'s treebuilder shape; the
//! first-parent walk follows `git-ext::revwalk::FirstParent`.

use std::path::Path;

use gitmind_oid::Oid;

use crate::port::{
    CommitSpec, Error, PathKind, RefTip, RefUpdate, RepositoryPort, TreeEntry, WalkControl,
};

pub struct Libgit2Repository {
    repo: git2::Repository,
    identifier: String,
}

impl Libgit2Repository {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let repo = git2::Repository::open(path)?;
        let identifier = repo
            .path()
            .canonicalize()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| repo.path().to_string_lossy().into_owned());
        Ok(Self { repo, identifier })
    }

    pub fn discover(path: &Path) -> Result<Self, Error> {
        let repo = git2::Repository::discover(path)?;
        let identifier = repo
            .path()
            .canonicalize()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| repo.path().to_string_lossy().into_owned());
        Ok(Self { repo, identifier })
    }

    fn find_commit(&self, oid: Oid) -> Result<git2::Commit<'_>, Error> {
        Ok(self.repo.find_commit(oid.into())?)
    }

    /// Render a signature as the raw `name <email> seconds offset` line
    /// `git_commit_create_buffer` expects, without going through `&str`
    /// message plumbing (journal/cache commit messages are binary).
    fn format_signature(sig: &git2::Signature<'_>) -> Vec<u8> {
        let when = sig.when();
        let offset = when.offset_minutes().abs();
        let mut out = Vec::new();
        out.extend_from_slice(sig.name_bytes());
        out.extend_from_slice(b" <");
        out.extend_from_slice(sig.email_bytes());
        out.extend_from_slice(b"> ");
        out.extend_from_slice(when.seconds().to_string().as_bytes());
        out.extend_from_slice(
            format!(" {}{:02}{:02}", when.sign(), offset / 60, offset % 60).as_bytes(),
        );
        out
    }

    fn build_tree(&self, dir: &Path, builder: &mut git2::TreeBuilder<'_>) -> Result<(), Error> {
        let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<Result<_, _>>()?;
        entries.sort_by_key(|e| e.file_name());
        for entry in entries {
            let file_type = entry.file_type()?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if file_type.is_dir() {
                let mut sub = self.repo.treebuilder(None)?;
                self.build_tree(&entry.path(), &mut sub)?;
                let sub_oid = sub.write()?;
                builder.insert(name.as_ref(), sub_oid, git2::FileMode::Tree.into())?;
            } else if file_type.is_file() {
                let bytes = std::fs::read(entry.path())?;
                let blob_oid = self.repo.blob(&bytes)?;
                builder.insert(name.as_ref(), blob_oid, git2::FileMode::Blob.into())?;
            }
        }
        Ok(())
    }
}

impl RepositoryPort for Libgit2Repository {
    fn repository_path(&self, kind: PathKind) -> Result<String, Error> {
        let path = match kind {
            PathKind::GitDir => self.repo.path(),
            PathKind::WorkDir => self
                .repo
                .workdir()
                .ok_or_else(|| Error::PathNotFound("workdir (bare repository)".into()))?,
        };
        Ok(path.to_string_lossy().into_owned())
    }

    fn head_branch(&self) -> Result<String, Error> {
        let head = self.repo.head()?;
        Ok(head
            .shorthand()
            .ok_or_else(|| Error::PathNotFound("HEAD is not valid UTF-8".into()))?
            .to_owned())
    }

    fn empty_tree(&self) -> Result<Oid, Error> {
        let builder = self.repo.treebuilder(None)?;
        Ok(builder.write()?.into())
    }

    fn build_tree_from_directory(&self, dir: &Path) -> Result<Oid, Error> {
        let mut builder = self.repo.treebuilder(None)?;
        self.build_tree(dir, &mut builder)?;
        Ok(builder.write()?.into())
    }

    fn read_tree(&self, tree: Oid) -> Result<Vec<TreeEntry>, Error> {
        let tree = self.repo.find_tree(tree.into())?;
        let mut entries = Vec::with_capacity(tree.len());
        for entry in tree.iter() {
            let name = entry
                .name()
                .ok_or_else(|| Error::PathNotFound("tree entry is not valid UTF-8".into()))?;
            entries.push(TreeEntry {
                name: name.to_owned(),
                oid: entry.id().into(),
            });
        }
        Ok(entries)
    }

    fn reference_tip(&self, name: &str) -> Result<Option<RefTip>, Error> {
        let reference = match self.repo.find_reference(name) {
            Ok(r) => r,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let oid = reference
            .target()
            .ok_or_else(|| Error::PathNotFound(format!("{name} is a symbolic reference")))?;
        let commit = self.repo.find_commit(oid)?;
        Ok(Some(RefTip {
            oid: oid.into(),
            commit_time: commit.time().seconds(),
        }))
    }

    fn reference_glob_latest(&self, pattern: &str) -> Result<Option<RefTip>, Error> {
        let mut latest: Option<RefTip> = None;
        for name in self.repo.references_glob(pattern)?.names() {
            let name = name?;
            if let Some(tip) = self.reference_tip(name)? {
                if latest.as_ref().is_none_or(|l| tip.commit_time > l.commit_time) {
                    latest = Some(tip);
                }
            }
        }
        Ok(latest)
    }

    fn commit_read_blob(&self, commit: Oid, path: &str) -> Result<Vec<u8>, Error> {
        let blob_oid = self.resolve_blob_at_commit(commit, path)?;
        let blob = self.repo.find_blob(blob_oid.into())?;
        Ok(blob.content().to_vec())
    }

    fn commit_read_message(&self, commit: Oid) -> Result<Vec<u8>, Error> {
        let commit = self.find_commit(commit)?;
        Ok(commit.message_bytes().to_vec())
    }

    fn walk_commits(
        &self,
        start: Oid,
        visitor: &mut dyn FnMut(Oid, &[u8], i64) -> Result<WalkControl, Error>,
    ) -> Result<(), Error> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;
        revwalk.simplify_first_parent()?;
        revwalk.push(start.into())?;

        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            let control = visitor(
                oid.into(),
                commit.message_bytes(),
                commit.time().seconds(),
            )?;
            if control == WalkControl::Stop {
                break;
            }
        }
        Ok(())
    }

    fn commit_tree_size(&self, commit: Oid) -> Result<u64, Error> {
        let commit = self.find_commit(commit)?;
        let tree = commit.tree()?;
        let mut total = 0u64;
        tree.walk(git2::TreeWalkMode::PreOrder, |_, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob) {
                if let Ok(blob) = self.repo.find_blob(entry.id()) {
                    total += blob.size() as u64;
                }
            }
            git2::TreeWalkResult::Ok
        })?;
        Ok(total)
    }

    fn resolve_blob_at_commit(&self, commit: Oid, path: &str) -> Result<Oid, Error> {
        let commit = self.find_commit(commit)?;
        let tree = commit.tree()?;
        let entry = tree
            .get_path(Path::new(path))
            .map_err(|_| Error::PathNotFound(path.to_owned()))?;
        if entry.kind() != Some(git2::ObjectType::Blob) {
            return Err(Error::NotABlob(path.to_owned()));
        }
        Ok(entry.id().into())
    }

    fn resolve_blob_at_head(&self, path: &str) -> Result<Oid, Error> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.resolve_blob_at_commit(head.id().into(), path)
    }

    fn head_commit(&self) -> Result<Oid, Error> {
        Ok(self.repo.head()?.peel_to_commit()?.id().into())
    }

    fn commit_parents(&self, commit: Oid) -> Result<Vec<Oid>, Error> {
        let commit = self.find_commit(commit)?;
        Ok(commit.parent_ids().map(Oid::from).collect())
    }

    fn changed_paths(&self, old: Oid, new: Oid) -> Result<Vec<String>, Error> {
        let old_tree = self.find_commit(old)?.tree()?;
        let new_tree = self.find_commit(new)?.tree()?;
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)?;
        let mut paths = Vec::new();
        for delta in diff.deltas() {
            if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
                paths.push(path.to_string_lossy().into_owned());
            }
        }
        Ok(paths)
    }

    /// Writes the commit object directly to the ODB from a hand-built raw
    /// buffer rather than `Repository::commit`, which takes its message as
    /// `&str` and would reject the binary cache-metadata payload (spec §6
    /// requires commit messages be treated as an opaque byte string).
    fn commit_create(&self, spec: CommitSpec<'_>) -> Result<Oid, Error> {
        // Validate that tree/parent actually exist before writing a commit
        // that references them.
        self.repo.find_tree(spec.tree.into())?;
        if let Some(parent) = spec.parent {
            self.find_commit(parent)?;
        }

        let signature = self
            .repo
            .signature()
            .or_else(|_| git2::Signature::now("git-mind", "git-mind@localhost"))?;
        let author = Self::format_signature(&signature);

        let mut buf = Vec::new();
        buf.extend_from_slice(b"tree ");
        buf.extend_from_slice(git2::Oid::from(spec.tree).to_string().as_bytes());
        buf.push(b'\n');
        if let Some(parent) = spec.parent {
            buf.extend_from_slice(b"parent ");
            buf.extend_from_slice(git2::Oid::from(parent).to_string().as_bytes());
            buf.push(b'\n');
        }
        buf.extend_from_slice(b"author ");
        buf.extend_from_slice(&author);
        buf.push(b'\n');
        buf.extend_from_slice(b"committer ");
        buf.extend_from_slice(&author);
        buf.push(b'\n');
        buf.push(b'\n');
        buf.extend_from_slice(spec.message);

        let odb = self.repo.odb()?;
        let oid = odb.write(git2::ObjectType::Commit, &buf)?;
        Ok(oid.into())
    }

    fn reference_update(&self, spec: RefUpdate<'_>) -> Result<(), Error> {
        let current = self.reference_tip(spec.name)?.map(|t| t.oid);
        if !spec.force && current != spec.expected_old {
            let current = current.unwrap_or_else(|| spec.target);
            return Err(Error::NonFastForward {
                name: spec.name.to_owned(),
                current,
                expected: spec.expected_old,
            });
        }
        let log_message = format!("git-mind: update {}", spec.name);
        self.repo
            .reference(spec.name, spec.target.into(), true, &log_message)?;
        Ok(())
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
