// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Writes the POSIX shell `post-commit` hook script that execs `git-mind
//! hook run-post-commit` (spec §4.7 "install-hooks", grounded on the
//! original's `core/src/hooks/post-commit.c` driver shape — a thin shell
//! shim, not a reimplementation of the hook logic in shell).

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Marker line written into every hook script git-mind installs, used to
/// recognize (and safely overwrite) our own previous installation.
pub const MARKER: &str = "# installed-by: git-mind";

const SCRIPT_TEMPLATE: &str = "#!/bin/sh\n# installed-by: git-mind\nexec git-mind hook run-post-commit \"$@\"\n";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("a foreign post-commit hook already exists at {0}; rerun with --force to overwrite")]
    ForeignHookExists(PathBuf),
    #[error("io error writing hook script: {0}")]
    Io(#[from] std::io::Error),
}

impl gitmind_telemetry::Classify for Error {
    fn kind(&self) -> gitmind_telemetry::ErrorKind {
        match self {
            Error::ForeignHookExists(_) => gitmind_telemetry::ErrorKind::Conflict,
            Error::Io(_) => gitmind_telemetry::ErrorKind::IoFailed,
        }
    }
}

/// Install the `post-commit` hook into `git_dir/hooks/post-commit`.
/// Refuses to overwrite a pre-existing hook that isn't our own unless
/// `force` is set.
pub fn install(git_dir: &Path, force: bool) -> Result<PathBuf, Error> {
    let hooks_dir = git_dir.join("hooks");
    std::fs::create_dir_all(&hooks_dir)?;
    let target = hooks_dir.join("post-commit");

    if target.exists() && !force {
        let existing = std::fs::read_to_string(&target).unwrap_or_default();
        if !existing.contains(MARKER) {
            return Err(Error::ForeignHookExists(target));
        }
    }

    let mut file = std::fs::File::create(&target)?;
    file.write_all(SCRIPT_TEMPLATE.as_bytes())?;
    drop(file);
    set_executable(&target)?;
    Ok(target)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_when_no_hook_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = install(dir.path(), false).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains(MARKER));
        assert!(contents.contains("run-post-commit"));
    }

    #[test]
    fn refuses_to_overwrite_a_foreign_hook() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("hooks")).unwrap();
        std::fs::write(dir.path().join("hooks/post-commit"), "#!/bin/sh\necho mine\n").unwrap();

        let err = install(dir.path(), false).unwrap_err();
        assert!(matches!(err, Error::ForeignHookExists(_)));
    }

    #[test]
    fn force_overwrites_a_foreign_hook() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("hooks")).unwrap();
        std::fs::write(dir.path().join("hooks/post-commit"), "#!/bin/sh\necho mine\n").unwrap();

        let path = install(dir.path(), true).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains(MARKER));
    }

    #[test]
    fn reinstalling_our_own_hook_does_not_need_force() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path(), false).unwrap();
        install(dir.path(), false).unwrap();
    }
}
