// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use regex::Regex;
use sha2::{Digest, Sha256};

use super::defaults::default_notices;
use super::error::ConfigError;
use super::raw;
use super::source::ConfigSource;
use super::types::*;

/// Load and validate a delivery config.
///
/// Steps:
/// 1. Read raw YAML from source
/// 2. Compute SHA256 config hash
/// 3. Parse YAML into raw deserialization types
/// 4. Check the format version
/// 5. Fill unset fields from defaults, resolving `${VAR}` in notice texts
/// 6. Validate the result
pub fn load_config(source: &ConfigSource) -> Result<DeliveryConfig, ConfigError> {
    let raw_yaml = source.read()?;
    let config_hash = compute_hash(&raw_yaml);

    let raw: raw::RawConfig = serde_yaml::from_str(&raw_yaml)?;

    if raw.cadence != "v1" {
        return Err(ConfigError::Validation(format!(
            "unsupported config version \"{}\", expected \"v1\"",
            raw.cadence
        )));
    }

    let degree = match raw.humanizer.as_deref() {
        Some(s) => s.parse()?,
        None => HumanizerDegree::default(),
    };

    let defaults = DeliveryConfig::default();

    let config = DeliveryConfig {
        version: raw.cadence,
        degree,
        max_message_len: raw.max_message_len.unwrap_or(defaults.max_message_len),
        thresholds: build_thresholds(raw.thresholds),
        inactivity_timeout: raw
            .inactivity_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.inactivity_timeout),
        pacing: build_pacing(raw.pacing),
        notices: build_notices(raw.notices)?,
        config_hash,
    };

    validate_config(&config)?;
    Ok(config)
}

pub fn compute_hash(raw_yaml: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_yaml.as_bytes());
    let hash = hasher.finalize();
    format!("sha256:{:x}", hash)
}

/// Check the invariants every session relies on.
///
/// Called by the loader and again when a session is constructed, since
/// callers may assemble a `DeliveryConfig` by hand.
pub fn validate_config(config: &DeliveryConfig) -> Result<(), ConfigError> {
    if config.max_message_len == 0 {
        return Err(ConfigError::Validation(
            "max_message_len must be greater than zero".to_string(),
        ));
    }

    let t = &config.thresholds;
    if t.regular_flush_chars == 0 || t.code_flush_chars == 0 {
        return Err(ConfigError::Validation(
            "flush thresholds must be greater than zero".to_string(),
        ));
    }
    if t.code_flush_chars < t.regular_flush_chars {
        return Err(ConfigError::Validation(format!(
            "code_flush_chars ({}) must not be below regular_flush_chars ({})",
            t.code_flush_chars, t.regular_flush_chars
        )));
    }

    if config.inactivity_timeout.is_zero() {
        return Err(ConfigError::Validation(
            "inactivity_timeout_ms must be greater than zero".to_string(),
        ));
    }

    let p = &config.pacing;
    if p.pause_min_ms > p.pause_max_ms {
        return Err(ConfigError::Validation(format!(
            "pause_min_ms ({}) exceeds pause_max_ms ({})",
            p.pause_min_ms, p.pause_max_ms
        )));
    }
    if p.thinking_min_ms > p.thinking_max_ms {
        return Err(ConfigError::Validation(format!(
            "thinking_min_ms ({}) exceeds thinking_max_ms ({})",
            p.thinking_min_ms, p.thinking_max_ms
        )));
    }
    if !(0.0..=1.0).contains(&p.thinking_probability) {
        return Err(ConfigError::Validation(format!(
            "thinking_probability must be within [0, 1], got {}",
            p.thinking_probability
        )));
    }

    Ok(())
}

fn build_thresholds(raw: Option<raw::RawThresholds>) -> Thresholds {
    let defaults = Thresholds::default();
    let raw = match raw {
        Some(r) => r,
        None => return defaults,
    };

    Thresholds {
        code_flush_chars: raw.code_flush_chars.unwrap_or(defaults.code_flush_chars),
        regular_flush_chars: raw
            .regular_flush_chars
            .unwrap_or(defaults.regular_flush_chars),
    }
}

fn build_pacing(raw: Option<raw::RawPacing>) -> PacingConfig {
    let d = PacingConfig::default();
    let raw = match raw {
        Some(r) => r,
        None => return d,
    };

    PacingConfig {
        per_char_ms: raw.per_char_ms.unwrap_or(d.per_char_ms),
        max_typing_ms: raw.max_typing_ms.unwrap_or(d.max_typing_ms),
        min_visible_ms: raw.min_visible_ms.unwrap_or(d.min_visible_ms),
        min_code_visible_ms: raw.min_code_visible_ms.unwrap_or(d.min_code_visible_ms),
        pause_min_ms: raw.pause_min_ms.unwrap_or(d.pause_min_ms),
        pause_max_ms: raw.pause_max_ms.unwrap_or(d.pause_max_ms),
        thinking_probability: raw.thinking_probability.unwrap_or(d.thinking_probability),
        thinking_min_ms: raw.thinking_min_ms.unwrap_or(d.thinking_min_ms),
        thinking_max_ms: raw.thinking_max_ms.unwrap_or(d.thinking_max_ms),
        jitter_seed: raw.jitter_seed,
    }
}

fn build_notices(raw: Option<raw::RawNotices>) -> Result<Notices, ConfigError> {
    let defaults = default_notices();
    let raw = match raw {
        Some(r) => r,
        None => return Ok(defaults),
    };

    let vars = NoticeVars::new();
    Ok(Notices {
        blocked: vars.resolve("blocked", raw.blocked, defaults.blocked)?,
        stopped: vars.resolve("stopped", raw.stopped, defaults.stopped)?,
        transport: vars.resolve("transport", raw.transport, defaults.transport)?,
        timeout: vars.resolve("timeout", raw.timeout, defaults.timeout)?,
        empty_response: vars.resolve(
            "empty_response",
            raw.empty_response,
            defaults.empty_response,
        )?,
    })
}

/// Expands `${NAME}` environment references in notice texts. Anything that
/// is not a well-formed reference (`${`, `${}`, `${1X}`) stays literal.
struct NoticeVars {
    reference: Regex,
}

impl NoticeVars {
    fn new() -> Self {
        let reference = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .expect("notice variable pattern is invalid");
        Self { reference }
    }

    /// Unset keeps the default, an empty string disables the notice.
    fn resolve(
        &self,
        notice: &'static str,
        raw: Option<String>,
        default: Option<String>,
    ) -> Result<Option<String>, ConfigError> {
        match raw {
            None => Ok(default),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => self.expand(notice, &s).map(Some),
        }
    }

    fn expand(&self, notice: &'static str, text: &str) -> Result<String, ConfigError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in self.reference.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let name = &caps[1];
            let value = std::env::var(name).map_err(|_| ConfigError::UndefinedVariable {
                notice,
                name: name.to_string(),
            })?;
            out.push_str(&text[last..whole.start()]);
            out.push_str(&value);
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}
