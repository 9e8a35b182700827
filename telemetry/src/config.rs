// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Logging/verbosity configuration, grounded on
//! `noseyparker-cli::main::configure_tracing`'s `-q`/`-v` → `LevelFilter`
//! mapping and `NP_LOG`-style env override (here: `GITMIND_LOG`).

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "GITMIND_LOG";

#[derive(Clone, Copy, Debug, Default)]
pub struct Verbosity {
    pub quiet: bool,
    pub verbose: u8,
}

impl Verbosity {
    fn level_filter(self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::ERROR;
        }
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to install global tracing subscriber: {0}")]
pub struct InitError(#[from] tracing::subscriber::SetGlobalDefaultError);

/// Install a `tracing-subscriber` `fmt` layer writing to stderr, filtered by
/// `verbosity` and overridable via [`LOG_ENV_VAR`].
pub fn init(verbosity: Verbosity) -> Result<(), InitError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(verbosity.level_filter().into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
