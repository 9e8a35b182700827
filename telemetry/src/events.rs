// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! Structured key/value diagnostic events with the literal names the spec
//! fixes (§4.5, §4.9), so log scraping/telemetry pipelines can match on
//! event name rather than free-text messages.

pub fn journal_append_start(branch: &str) {
    tracing::info!(event = "journal_append_start", branch);
}

pub fn journal_append_ok(branch: &str, duration_ms: u64, edges: usize) {
    tracing::info!(event = "journal_append_ok", branch, duration_ms, edges);
}

pub fn journal_append_failed(branch: &str, code: &str) {
    tracing::warn!(event = "journal_append_failed", branch, code);
}

pub fn journal_decode_failed(branch: &str, commit: &str, reason: &str) {
    tracing::warn!(event = "journal_decode_failed", branch, commit, reason);
}

pub fn augment_skipped(reason: &str) {
    tracing::debug!(event = "augment_skipped", reason);
}

pub fn augment_edge_written(src: &str, tgt: &str, path: &str) {
    tracing::info!(event = "augment_edge_written", src, tgt, path);
}

pub fn rebuild_prep_failed(branch: &str, reason: &str) {
    tracing::warn!(event = "rebuild_prep_failed", branch, reason);
}

pub fn rebuild_edge_map_failed(branch: &str, reason: &str) {
    tracing::warn!(event = "rebuild_edge_map_failed", branch, reason);
}

pub fn rebuild_collect_write_failed(branch: &str, reason: &str) {
    tracing::warn!(event = "rebuild_collect_write_failed", branch, reason);
}

pub fn rebuild_meta_failed(branch: &str, reason: &str) {
    tracing::warn!(event = "rebuild_meta_failed", branch, reason);
}

pub fn rebuild_failed(branch: &str, reason: &str) {
    tracing::warn!(event = "rebuild_failed", branch, reason);
}

pub fn rebuild_ok(branch: &str, edges: u64, duration_ms: u64) {
    tracing::info!(event = "rebuild_ok", branch, edges, duration_ms);
}
