// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Composition and validation of git-mind's reference namespace.
//!
//! Journal refs live at `refs/gitmind/edges/<branch>`; cache refs at
//! `refs/gitmind/cache/<branch>/<epoch>`. `<branch>` is a Git branch
//! shorthand and may itself contain `/`, so composition is a straight
//! concatenation rather than a path-segment join.
//!
//! Validation is narrower than `git-check-ref-format`: it exists to keep
//! git-mind's own namespace well-formed, not to second-guess libgit2 (see
//! `radicle-git-ext::reference::name` for the shape this is grounded on,
//! though the rule table here is git-mind's own, per spec §4.3).

use std::fmt;

use thiserror::Error;

/// Prefix for journal refs: `refs/gitmind/edges/<branch>`.
pub const EDGES_PREFIX: &str = "refs/gitmind/edges/";

/// Prefix for cache refs: `refs/gitmind/cache/<branch>/<epoch>`.
pub const CACHE_PREFIX: &str = "refs/gitmind/cache/";

/// Maximum byte length of a composed reference name.
pub const MAX_REF_LEN: usize = 511;

const FORBIDDEN_CHARS: &[char] = &['~', '^', ':', '?', '*', '[', '\\'];

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("branch name must not be empty")]
    Empty,

    #[error("branch name must not start with \"refs/\"")]
    LeadingRefs,

    #[error("branch name must not start or end with '/'")]
    SlashBoundary,

    #[error("branch name must not contain \"..\"")]
    DotDot,

    #[error("branch name must not contain \"@{{\"")]
    AtBrace,

    #[error("branch name contains a forbidden character: {0:?}")]
    ForbiddenChar(char),

    #[error("composed reference name exceeds {MAX_REF_LEN} bytes")]
    TooLong,
}

/// Validate a branch shorthand per spec §4.3.
pub fn validate_branch(branch: &str) -> Result<(), Error> {
    if branch.is_empty() {
        return Err(Error::Empty);
    }
    if branch.starts_with("refs/") {
        return Err(Error::LeadingRefs);
    }
    if branch.starts_with('/') || branch.ends_with('/') {
        return Err(Error::SlashBoundary);
    }
    if branch.contains("..") {
        return Err(Error::DotDot);
    }
    if branch.contains("@{") {
        return Err(Error::AtBrace);
    }
    if let Some(c) = branch.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(Error::ForbiddenChar(c));
    }
    Ok(())
}

fn compose(prefix: &str, branch: &str) -> Result<String, Error> {
    validate_branch(branch)?;
    let composed = format!("{prefix}{branch}");
    if composed.len() > MAX_REF_LEN {
        return Err(Error::TooLong);
    }
    Ok(composed)
}

/// A validated journal reference name: `refs/gitmind/edges/<branch>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgesRef(String);

impl EdgesRef {
    pub fn new(branch: &str) -> Result<Self, Error> {
        Ok(Self(compose(EDGES_PREFIX, branch)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgesRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated cache reference name: `refs/gitmind/cache/<branch>/<epoch>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheRef(String);

impl CacheRef {
    pub fn new(branch: &str, epoch_unix_seconds: u64) -> Result<Self, Error> {
        let with_epoch = format!("{branch}/{epoch_unix_seconds}");
        Ok(Self(compose(CACHE_PREFIX, &with_epoch)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A glob pattern matching all cache refs for a branch:
/// `refs/gitmind/cache/<branch>/*`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheGlob(String);

impl CacheGlob {
    pub fn new(branch: &str) -> Result<Self, Error> {
        validate_branch(branch)?;
        let pattern = format!("{CACHE_PREFIX}{branch}/*");
        if pattern.len() > MAX_REF_LEN {
            return Err(Error::TooLong);
        }
        Ok(Self(pattern))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheGlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_edges_ref() {
        let r = EdgesRef::new("main").unwrap();
        assert_eq!(r.as_str(), "refs/gitmind/edges/main");
    }

    #[test]
    fn composes_edges_ref_with_slash_in_branch() {
        let r = EdgesRef::new("feature/foo").unwrap();
        assert_eq!(r.as_str(), "refs/gitmind/edges/feature/foo");
    }

    #[test]
    fn composes_cache_ref() {
        let r = CacheRef::new("main", 1_700_000_000).unwrap();
        assert_eq!(r.as_str(), "refs/gitmind/cache/main/1700000000");
    }

    #[test]
    fn composes_cache_glob() {
        let g = CacheGlob::new("main").unwrap();
        assert_eq!(g.as_str(), "refs/gitmind/cache/main/*");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(EdgesRef::new(""), Err(Error::Empty));
    }

    #[test]
    fn rejects_leading_refs() {
        assert_eq!(
            EdgesRef::new("refs/heads/main"),
            Err(Error::LeadingRefs)
        );
    }

    #[test]
    fn rejects_leading_or_trailing_slash() {
        assert_eq!(EdgesRef::new("/main"), Err(Error::SlashBoundary));
        assert_eq!(EdgesRef::new("main/"), Err(Error::SlashBoundary));
    }

    #[test]
    fn rejects_dotdot() {
        assert_eq!(EdgesRef::new("foo/../bar"), Err(Error::DotDot));
    }

    #[test]
    fn rejects_at_brace() {
        assert_eq!(EdgesRef::new("foo@{1}"), Err(Error::AtBrace));
    }

    #[test]
    fn rejects_forbidden_chars() {
        for c in "~^:?*[\\".chars() {
            let branch = format!("foo{c}bar");
            assert_eq!(EdgesRef::new(&branch), Err(Error::ForbiddenChar(c)));
        }
    }

    #[test]
    fn rejects_too_long() {
        let branch = "a".repeat(MAX_REF_LEN);
        assert_eq!(EdgesRef::new(&branch), Err(Error::TooLong));
    }

    #[test]
    fn valid_branch_names_pass() {
        for b in ["main", "feature/long/path", "release-1.2.3"] {
            assert!(validate_branch(b).is_ok(), "expected {b} to validate");
        }
    }
}
