// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Repository access port. The journal, hook, and cache engines depend only
//! on [`RepositoryPort`]; [`Libgit2Repository`] is the production adapter,
//! [`MemoryRepository`] the in-process test fake.

pub mod libgit2;
pub mod memory;
pub mod port;

pub use crate::libgit2::Libgit2Repository;
pub use memory::MemoryRepository;
pub use port::{
    CommitSpec, Error, PathKind, RefTip, RefUpdate, RepositoryPort, TreeEntry, WalkControl,
};
