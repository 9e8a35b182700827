// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! `git-mind`: a knowledge graph layered on Git. Entry point follows
//! `noseyparker_cli`'s `try_main`/`main` split — logging and error
//! rendering live here, command logic in [`commands`].

mod args;
mod commands;
mod config;
mod error;

use clap::Parser;

use args::{Command, CommandLineArgs, HookCommand};
use error::CliError;
use gitmind_telemetry::{Classify, Verbosity};

fn try_main() -> Result<(), CliError> {
    let args = CommandLineArgs::parse();

    let verbosity = Verbosity {
        quiet: args.global.quiet,
        verbose: args.global.verbose,
    };
    gitmind_telemetry::init(verbosity).map_err(|e| CliError::Other(e.into()))?;

    match &args.command {
        Command::Link(link_args) => commands::link(link_args),
        Command::List(list_args) => commands::list(list_args),
        Command::CacheRebuild(rebuild_args) => commands::cache_rebuild(rebuild_args),
        Command::InstallHooks(install_args) => commands::install_hooks(install_args),
        Command::Hook(HookCommand::RunPostCommit) => commands::run_post_commit(),
    }
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("Error: {e}");
        std::process::exit(e.kind().exit_code());
    }
}
