// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Raw YAML deserialization types (internal)
// Kept apart from the public config structs because every field is optional
// here; defaults, interpolation and validation happen in the loader.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub cadence: String,
    pub humanizer: Option<String>,
    pub max_message_len: Option<usize>,
    pub inactivity_timeout_ms: Option<u64>,
    pub thresholds: Option<RawThresholds>,
    pub pacing: Option<RawPacing>,
    pub notices: Option<RawNotices>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawThresholds {
    pub code_flush_chars: Option<usize>,
    pub regular_flush_chars: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPacing {
    pub per_char_ms: Option<u64>,
    pub max_typing_ms: Option<u64>,
    pub min_visible_ms: Option<u64>,
    pub min_code_visible_ms: Option<u64>,
    pub pause_min_ms: Option<u64>,
    pub pause_max_ms: Option<u64>,
    pub thinking_probability: Option<f64>,
    pub thinking_min_ms: Option<u64>,
    pub thinking_max_ms: Option<u64>,
    pub jitter_seed: Option<u64>,
}

/// Notice texts. An empty string disables the notice.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawNotices {
    pub blocked: Option<String>,
    pub stopped: Option<String>,
    pub transport: Option<String>,
    pub timeout: Option<String>,
    pub empty_response: Option<String>,
}
