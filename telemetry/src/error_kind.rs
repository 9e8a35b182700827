// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Shared error-kind taxonomy (spec §7). Each crate keeps its own
//! `thiserror` error enum; this lets the CLI classify any of them for
//! exit-code and porcelain-stderr purposes without collapsing their
//! specific variants.

/// Semantic error category, independent of which crate raised it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    /// Already exists, or a non-fast-forward reference update.
    Conflict,
    /// CBOR or base64 malformed.
    InvalidFormat,
    InvalidPath,
    PathTooLong,
    PermissionDenied,
    IoFailed,
    OutOfMemory,
    BufferTooSmall,
    /// Port missing a method, or an uninitialized context.
    InvalidState,
    NotImplemented,
    Unknown,
}

impl ErrorKind {
    /// Process exit code per the CLI's exit-code contract.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::InvalidArgument | ErrorKind::NotFound | ErrorKind::InvalidFormat => 1,
            ErrorKind::PermissionDenied | ErrorKind::IoFailed => 2,
            ErrorKind::Conflict => 3,
            _ => 70,
        }
    }
}

/// Implemented by each crate's error enum so the CLI can classify it.
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}
