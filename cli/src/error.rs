// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! The CLI's single error type: each command wraps whichever crate error
//! it can fail with, and [`gitmind_telemetry::Classify`] drives the process
//! exit code (spec §6 "Exit codes").

use thiserror::Error;

use gitmind_telemetry::{Classify, ErrorKind};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    #[error(transparent)]
    Git(#[from] gitmind_git::Error),
    #[error(transparent)]
    Edge(#[from] gitmind_edge::edge::Error),
    #[error(transparent)]
    RefFormat(#[from] gitmind_ref_format::Error),
    #[error(transparent)]
    JournalWrite(#[from] gitmind_journal::writer::Error),
    #[error(transparent)]
    JournalRead(#[from] gitmind_journal::reader::Error),
    #[error(transparent)]
    Cache(#[from] gitmind_cache::builder::Error),
    #[error(transparent)]
    Hooks(#[from] gitmind_hooks::installer::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Classify for CliError {
    fn kind(&self) -> ErrorKind {
        match self {
            CliError::Git(e) => e.kind(),
            CliError::Edge(e) => e.kind(),
            CliError::RefFormat(_) => ErrorKind::InvalidArgument,
            CliError::JournalWrite(e) => e.kind(),
            CliError::JournalRead(e) => e.kind(),
            CliError::Cache(e) => e.kind(),
            CliError::Hooks(e) => e.kind(),
            CliError::Other(_) => ErrorKind::Unknown,
        }
    }
}
