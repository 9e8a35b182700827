// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Environment-derived configuration (spec §6 "Environment inputs"),
//! grounded on `pustynsky-search-index`'s use of `dirs` for resolving
//! `HOME`-relative state roots when unset.

use anyhow::{anyhow, Result};

use gitmind_edge::{Attribution, Lane, RelType, SourceType};

pub fn attribution_from_env() -> Attribution {
    let source_type = match std::env::var("GIT_MIND_SOURCE").as_deref() {
        Ok("human") => SourceType::Human,
        Ok("claude") => SourceType::AiClaude,
        Ok("gpt") => SourceType::AiGpt,
        Ok("system") => SourceType::System,
        Ok(_) => SourceType::AiOther,
        Err(_) => SourceType::Human,
    };

    let mut attribution = Attribution::default_for(source_type);
    if let Ok(author) = std::env::var("GIT_MIND_AUTHOR") {
        attribution = Attribution::new(
            source_type,
            author,
            std::env::var("GIT_MIND_SESSION").unwrap_or_default(),
            attribution.flags,
        )
        .unwrap_or(attribution);
    } else if let Ok(session) = std::env::var("GIT_MIND_SESSION") {
        attribution = Attribution::new(
            source_type,
            attribution.author().to_owned(),
            session,
            attribution.flags,
        )
        .unwrap_or(attribution);
    }
    attribution
}

/// Whether the hand-written CBOR decoder should emit per-field decode
/// diagnostics, per `GITMIND_CBOR_DEBUG`.
pub fn cbor_debug_from_env() -> bool {
    std::env::var("GITMIND_CBOR_DEBUG")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Resolve git-mind's state root: `$TMPDIR` takes precedence for scratch
/// space, `$HOME`/`dirs::home_dir()` for anything persistent.
pub fn state_root() -> Result<std::path::PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("could not resolve a home directory"))
}

pub fn parse_rel_type(s: &str) -> Result<RelType> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "implements" => RelType::Implements,
        "references" => RelType::References,
        "depends_on" | "depends-on" => RelType::DependsOn,
        "augments" => RelType::Augments,
        other => {
            return Err(anyhow!("unknown relationship type {other:?}"));
        },
    })
}

pub fn parse_lane(s: &str) -> Result<Lane> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "primary" => Lane::Primary,
        "exploration" => Lane::Exploration,
        "review" => Lane::Review,
        "archived" => Lane::Archived,
        other => {
            return Err(anyhow!("unknown lane {other:?}"));
        },
    })
}

pub fn parse_source(s: &str) -> Result<SourceType> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "human" => SourceType::Human,
        "claude" => SourceType::AiClaude,
        "gpt" => SourceType::AiGpt,
        "system" => SourceType::System,
        "other" => SourceType::AiOther,
        other => {
            return Err(anyhow!("unknown source type {other:?}"));
        },
    })
}
