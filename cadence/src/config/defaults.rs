// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use super::types::{DeliveryConfig, HumanizerDegree, Notices, PacingConfig, Thresholds};

pub const DEFAULT_MAX_MESSAGE_LEN: usize = 1950;
pub const DEFAULT_CODE_FLUSH_CHARS: usize = 15_000;
pub const DEFAULT_REGULAR_FLUSH_CHARS: usize = 500;
pub const DEFAULT_INACTIVITY_TIMEOUT_MS: u64 = 30_000;

/// Hash recorded for configs that did not come from a YAML source.
pub const BUILTIN_CONFIG_HASH: &str = "builtin";

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            code_flush_chars: DEFAULT_CODE_FLUSH_CHARS,
            regular_flush_chars: DEFAULT_REGULAR_FLUSH_CHARS,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            per_char_ms: 35,
            max_typing_ms: 4_000,
            min_visible_ms: 800,
            min_code_visible_ms: 2_000,
            pause_min_ms: 400,
            pause_max_ms: 1_400,
            thinking_probability: 0.12,
            thinking_min_ms: 2_500,
            thinking_max_ms: 5_000,
            jitter_seed: None,
        }
    }
}

/// Default notice texts, all enabled.
pub fn default_notices() -> Notices {
    Notices {
        blocked: Some("I can't respond to that one.".to_string()),
        stopped: Some("My response was cut off, sorry about that.".to_string()),
        transport: Some("Something went wrong while I was replying. Please try again.".to_string()),
        timeout: Some("I stopped hearing back from the model, so I gave up on that reply.".to_string()),
        empty_response: Some("...".to_string()),
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            degree: HumanizerDegree::default(),
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            thresholds: Thresholds::default(),
            inactivity_timeout: Duration::from_millis(DEFAULT_INACTIVITY_TIMEOUT_MS),
            pacing: PacingConfig::default(),
            notices: default_notices(),
            config_hash: BUILTIN_CONFIG_HASH.to_string(),
        }
    }
}

impl DeliveryConfig {
    /// Default config at the given humanizer degree.
    pub fn for_degree(degree: HumanizerDegree) -> Self {
        Self {
            degree,
            ..Self::default()
        }
    }
}
