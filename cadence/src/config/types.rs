// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

// ---------------------------------------------------------------------------
// Humanizer degree
// ---------------------------------------------------------------------------

/// Pacing and styling intensity. Ordered: `None < Light < Medium < Heavy`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum HumanizerDegree {
    #[default]
    None,
    Light,
    Medium,
    Heavy,
}

impl HumanizerDegree {
    /// Whether chunks are sent with simulated typing delays.
    pub fn simulates_typing(self) -> bool {
        self >= HumanizerDegree::Medium
    }

    /// Whether the segmenter may cut at sentence ends.
    pub fn splits_sentences(self) -> bool {
        self == HumanizerDegree::Heavy
    }

    /// Whether chunks pass through the text transform before sending.
    pub fn transforms_text(self) -> bool {
        self == HumanizerDegree::Heavy
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HumanizerDegree::None => "none",
            HumanizerDegree::Light => "light",
            HumanizerDegree::Medium => "medium",
            HumanizerDegree::Heavy => "heavy",
        }
    }
}

impl fmt::Display for HumanizerDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HumanizerDegree {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(HumanizerDegree::None),
            "light" => Ok(HumanizerDegree::Light),
            "medium" => Ok(HumanizerDegree::Medium),
            "heavy" => Ok(HumanizerDegree::Heavy),
            other => Err(ConfigError::Validation(format!(
                "unknown humanizer degree \"{other}\", expected \"none\", \"light\", \"medium\", or \"heavy\""
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Typed config structs
// ---------------------------------------------------------------------------

/// Validated per-session delivery configuration.
///
/// Built by [`load_config`](super::load_config) or from the presets in
/// [`DeliveryConfig::default`] / [`DeliveryConfig::for_degree`]. Sessions
/// take their own copy; nothing here is global.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryConfig {
    /// Config format version. Always "v1".
    pub version: String,
    pub degree: HumanizerDegree,
    /// Maximum chars per platform message. The sink's own limit must be at
    /// least this large.
    pub max_message_len: usize,
    pub thresholds: Thresholds,
    /// How long the model stream may stay silent before the session gives up.
    pub inactivity_timeout: Duration,
    pub pacing: PacingConfig,
    pub notices: Notices,
    /// SHA256 of the source YAML: "sha256:{hex}". "builtin" for presets.
    pub config_hash: String,
}

/// Safety-flush limits for the segmenter, in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// An unclosed fence is abandoned once the buffer reaches this size.
    pub code_flush_chars: usize,
    /// Plain text with no break is force-cut at this size.
    pub regular_flush_chars: usize,
}

/// Timing constants for MEDIUM and HEAVY pacing.
#[derive(Debug, Clone, PartialEq)]
pub struct PacingConfig {
    pub per_char_ms: u64,
    pub max_typing_ms: u64,
    pub min_visible_ms: u64,
    /// Minimum typing duration for chunks that carry a code fence.
    pub min_code_visible_ms: u64,
    pub pause_min_ms: u64,
    pub pause_max_ms: u64,
    /// Probability in `[0, 1]` that an inter-chunk pause becomes a
    /// "thinking" pause.
    pub thinking_probability: f64,
    pub thinking_min_ms: u64,
    pub thinking_max_ms: u64,
    /// Fixed RNG seed for reproducible pauses.
    pub jitter_seed: Option<u64>,
}

/// User-facing notice texts. `None` disables the corresponding notice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Notices {
    pub blocked: Option<String>,
    pub stopped: Option<String>,
    pub transport: Option<String>,
    pub timeout: Option<String>,
    /// Placeholder sent when a completed response produced no message.
    pub empty_response: Option<String>,
}
