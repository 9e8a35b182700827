// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Post-commit `AUGMENTS` synthesis ([`augment`]) and the `post-commit`
//! hook script installer ([`installer`]).

pub mod augment;
pub mod installer;

pub use augment::{run as run_augmentation, Limits};
pub use installer::install;
