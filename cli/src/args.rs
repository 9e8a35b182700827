// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Command-line surface (spec §6 "CLI surface"), clap-derived following
//! `noseyparker_cli::args::CommandLineArgs`'s shape: one top-level parser
//! with a `#[command(subcommand)]` enum and a flattened set of global
//! flags.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "git-mind", author, version, about = "A knowledge graph layered on Git")]
pub struct CommandLineArgs {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Increase logging verbosity; repeatable.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all but error-level logging.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a typed edge between two files at HEAD.
    Link(LinkArgs),
    /// List edges recorded on a branch.
    List(ListArgs),
    /// Rebuild the bitmap cache for a branch.
    CacheRebuild(CacheRebuildArgs),
    /// Install the post-commit hook that synthesizes AUGMENTS edges.
    InstallHooks(InstallHooksArgs),
    /// Hidden entry points execed by installed hook scripts.
    #[command(subcommand, hide = true)]
    Hook(HookCommand),
}

#[derive(Subcommand, Debug)]
pub enum HookCommand {
    RunPostCommit,
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    pub src: PathBuf,
    pub tgt: PathBuf,

    #[arg(long = "type", default_value = "references")]
    pub rel_type: String,

    #[arg(long, default_value_t = 1.0)]
    pub confidence: f32,

    #[arg(long, default_value = "primary")]
    pub lane: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    pub path: Option<PathBuf>,

    #[arg(long)]
    pub branch: Option<String>,

    #[arg(long)]
    pub source: Option<String>,

    #[arg(long)]
    pub min_confidence: Option<f32>,

    #[arg(long)]
    pub show_augments: bool,

    #[arg(long)]
    pub show_attribution: bool,

    #[arg(long)]
    pub verbose: bool,

    #[arg(long)]
    pub porcelain: bool,
}

#[derive(Args, Debug)]
pub struct CacheRebuildArgs {
    #[arg(long)]
    pub branch: Option<String>,

    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct InstallHooksArgs {
    #[arg(long)]
    pub force: bool,
}
