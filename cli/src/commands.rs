// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Command handlers, one per [`crate::args::Command`] variant.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use gitmind_edge::{Edge, Lane};
use gitmind_git::{Libgit2Repository, RepositoryPort};
use gitmind_journal::EncodedEdge;

use crate::args::{CacheRebuildArgs, InstallHooksArgs, LinkArgs, ListArgs};
use crate::config;
use crate::error::CliError;

fn open_repo() -> Result<Libgit2Repository, CliError> {
    Ok(Libgit2Repository::discover(Path::new("."))?)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub fn link(args: &LinkArgs) -> Result<(), CliError> {
    let repo = open_repo()?;
    let branch = repo.head_branch()?;

    let src_path = args.src.to_string_lossy();
    let tgt_path = args.tgt.to_string_lossy();
    let src_oid = repo.resolve_blob_at_head(&src_path)?;
    let tgt_oid = repo.resolve_blob_at_head(&tgt_path)?;

    let rel_type = config::parse_rel_type(&args.rel_type)?;
    let lane = config::parse_lane(&args.lane)?;
    let attribution = config::attribution_from_env();

    let edge = Edge::new(
        src_oid,
        tgt_oid,
        rel_type,
        args.confidence,
        unix_now(),
        src_path.as_ref(),
        tgt_path.as_ref(),
        Some(gitmind_cbor::ulid::generate()),
        attribution,
        lane,
    )?;

    gitmind_journal::append(
        &repo,
        &branch,
        &[EncodedEdge {
            bytes: gitmind_cbor::encode_attributed(&edge),
        }],
    )?;

    println!(
        "linked {} -> {} [{}]",
        src_path, tgt_path, edge.rel_type()
    );
    Ok(())
}

pub fn list(args: &ListArgs) -> Result<(), CliError> {
    let repo = open_repo()?;
    let branch = match &args.branch {
        Some(b) => b.clone(),
        None => repo.head_branch()?,
    };

    let source_filter = args
        .source
        .as_deref()
        .map(config::parse_source)
        .transpose()?;

    let debug = config::cbor_debug_from_env();
    let edges: Vec<Edge> = match &args.path {
        Some(path) => {
            let path = path.to_string_lossy();
            let oid = repo.resolve_blob_at_head(&path)?;

            let mut chronological = gitmind_journal::collect_edges(&repo, &branch, debug)?;
            chronological.reverse();

            let forward = gitmind_cache::query_cache(&repo, &branch, oid, gitmind_cache::Direction::Forward)?;
            let reverse = gitmind_cache::query_cache(&repo, &branch, oid, gitmind_cache::Direction::Reverse)?;
            let ids: BTreeSet<u32> = forward.ids.into_iter().chain(reverse.ids).collect();

            ids.into_iter()
                .filter_map(|id| chronological.get(id as usize).cloned())
                .collect()
        },
        None => gitmind_journal::collect_edges(&repo, &branch, debug)?,
    };

    for edge in &edges {
        if !args.show_augments && edge.rel_type() == gitmind_edge::RelType::Augments {
            continue;
        }
        if !args.verbose && edge.attribution().is_rejected() {
            continue;
        }
        if let Some(source) = source_filter {
            if edge.attribution().source_type != source {
                continue;
            }
        }
        if let Some(min_confidence) = args.min_confidence {
            if edge.confidence() < min_confidence {
                continue;
            }
        }
        render_edge(edge, args);
    }
    Ok(())
}

fn render_edge(edge: &Edge, args: &ListArgs) {
    // Spec §3: confidence is unconditionally 1.0 on display for HUMAN-source
    // edges, regardless of what was stored.
    let confidence = if edge.attribution().source_type == gitmind_edge::SourceType::Human {
        1.0
    } else {
        edge.confidence()
    };

    if args.porcelain {
        print!(
            "{}\t{}\t{}\t{:.3}\t{:?}",
            edge.src_path(),
            edge.tgt_path(),
            edge.rel_type(),
            confidence,
            edge.lane()
        );
        if args.show_attribution {
            print!(
                "\t{:?}\t{}\t{}",
                edge.attribution().source_type,
                edge.attribution().author(),
                edge.attribution().session_id()
            );
        }
        println!();
        return;
    }

    print!(
        "{} --{}({:.2})--> {} [{:?}]",
        edge.src_path(),
        edge.rel_type(),
        confidence,
        edge.tgt_path(),
        edge.lane()
    );
    if args.show_attribution {
        print!(
            " by {:?}:{}",
            edge.attribution().source_type,
            edge.attribution().author()
        );
    }
    if edge.lane() != Lane::Primary && !args.verbose {
        print!(" (non-primary lane)");
    }
    println!();
}

pub fn cache_rebuild(args: &CacheRebuildArgs) -> Result<(), CliError> {
    let repo = open_repo()?;
    let branch = match &args.branch {
        Some(b) => b.clone(),
        None => repo.head_branch()?,
    };

    let prior = latest_cache_metadata(&repo, &branch);
    let outcome = gitmind_cache::rebuild(&repo, &branch, prior.as_ref(), args.force, unix_now())?;
    println!(
        "cache rebuilt: {} ({} edges)",
        outcome.cache_ref, outcome.edges
    );
    Ok(())
}

fn latest_cache_metadata(
    repo: &dyn RepositoryPort,
    branch: &str,
) -> Option<gitmind_cache::CacheMetadata> {
    let glob = gitmind_ref_format::CacheGlob::new(branch).ok()?;
    let tip = repo.reference_glob_latest(glob.as_str()).ok()??;
    let message = repo.commit_read_message(tip.oid).ok()?;
    gitmind_cache::CacheMetadata::from_wire(branch, &message).ok()
}

pub fn install_hooks(args: &InstallHooksArgs) -> Result<(), CliError> {
    let repo = open_repo()?;
    let git_dir = repo.repository_path(gitmind_git::PathKind::GitDir)?;
    let installed_at = gitmind_hooks::install(Path::new(&git_dir), args.force)?;
    println!("installed post-commit hook at {}", installed_at.display());
    Ok(())
}

pub fn run_post_commit() -> Result<(), CliError> {
    let repo = open_repo()?;
    let branch = repo.head_branch()?;
    gitmind_hooks::run_augmentation(&repo, &branch, &gitmind_hooks::Limits::default());
    Ok(())
}
