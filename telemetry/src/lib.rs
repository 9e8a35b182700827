// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Structured logging setup (`tracing` + `tracing-subscriber`) and the
//! shared [`ErrorKind`] taxonomy every crate's error enum classifies into.

pub mod config;
pub mod error_kind;
pub mod events;

pub use config::{init, InitError, Verbosity, LOG_ENV_VAR};
pub use error_kind::{Classify, ErrorKind};
