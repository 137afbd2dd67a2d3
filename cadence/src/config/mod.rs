// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Delivery config loader and validator
//
// Loads a cadence YAML document, fills unset fields from defaults, resolves
// variable interpolation in notice texts, validates thresholds and timing,
// and computes a deterministic config hash for log correlation.

mod defaults;
mod error;
mod loader;
mod raw;
mod source;
mod types;

pub use defaults::default_notices;
pub use error::ConfigError;
pub use loader::{compute_hash, load_config, validate_config};
pub use source::ConfigSource;
pub use types::{DeliveryConfig, HumanizerDegree, Notices, PacingConfig, Thresholds};

#[cfg(test)]
mod tests {
    use super::defaults::DEFAULT_MAX_MESSAGE_LEN;
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn with_env<F: FnOnce()>(key: &str, value: &str, f: F) {
        let _guard = ENV_MUTEX.lock().unwrap();
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value);
        f();
        match previous {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }

    const FULL_YAML: &str = r#"cadence: v1
humanizer: heavy
max_message_len: 1800
inactivity_timeout_ms: 45000

thresholds:
  code_flush_chars: 12000
  regular_flush_chars: 400

pacing:
  per_char_ms: 20
  max_typing_ms: 3000
  min_visible_ms: 500
  min_code_visible_ms: 1500
  pause_min_ms: 300
  pause_max_ms: 900
  thinking_probability: 0.25
  thinking_min_ms: 2000
  thinking_max_ms: 4000
  jitter_seed: 7

notices:
  blocked: "Nope."
  timeout: ""
"#;

    fn load(yaml: &str) -> Result<DeliveryConfig, ConfigError> {
        load_config(&ConfigSource::inline(yaml))
    }

    #[test]
    fn full_config_loads() {
        let config = load(FULL_YAML).unwrap();
        assert_eq!(config.version, "v1");
        assert_eq!(config.degree, HumanizerDegree::Heavy);
        assert_eq!(config.max_message_len, 1800);
        assert_eq!(config.inactivity_timeout, Duration::from_secs(45));
        assert_eq!(
            config.thresholds,
            Thresholds {
                code_flush_chars: 12_000,
                regular_flush_chars: 400,
            }
        );
        assert_eq!(config.pacing.per_char_ms, 20);
        assert_eq!(config.pacing.thinking_probability, 0.25);
        assert_eq!(config.pacing.jitter_seed, Some(7));
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = load("cadence: v1\n").unwrap();
        let defaults = DeliveryConfig::default();
        assert_eq!(config.degree, HumanizerDegree::None);
        assert_eq!(config.max_message_len, DEFAULT_MAX_MESSAGE_LEN);
        assert_eq!(config.thresholds, defaults.thresholds);
        assert_eq!(config.pacing, defaults.pacing);
        assert_eq!(config.notices, default_notices());
    }

    #[test]
    fn empty_notice_disables_it_and_unset_keeps_default() {
        let config = load(FULL_YAML).unwrap();
        assert_eq!(config.notices.blocked.as_deref(), Some("Nope."));
        assert_eq!(config.notices.timeout, None);
        assert_eq!(config.notices.stopped, default_notices().stopped);
    }

    #[test]
    fn notice_variables_are_interpolated() {
        with_env("CADENCE_TEST_BOT_NAME", "Pip", || {
            let yaml = "cadence: v1\nnotices:\n  transport: \"${CADENCE_TEST_BOT_NAME} lost the thread.\"\n";
            let config = load(yaml).unwrap();
            assert_eq!(
                config.notices.transport.as_deref(),
                Some("Pip lost the thread.")
            );
        });
    }

    #[test]
    fn undefined_variable_is_rejected() {
        let yaml = "cadence: v1\nnotices:\n  blocked: \"${CADENCE_TEST_SURELY_UNSET_VAR}\"\n";
        let err = load(yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UndefinedVariable { notice: "blocked", ref name }
                if name == "CADENCE_TEST_SURELY_UNSET_VAR"
        ));
    }

    #[test]
    fn malformed_interpolation_is_kept_literally() {
        let yaml = "cadence: v1\nnotices:\n  blocked: \"cost: ${ is weird\"\n";
        let config = load(yaml).unwrap();
        assert_eq!(config.notices.blocked.as_deref(), Some("cost: ${ is weird"));

        let yaml = "cadence: v1\nnotices:\n  stopped: \"${} and ${9LIVES} stay\"\n";
        let config = load(yaml).unwrap();
        assert_eq!(config.notices.stopped.as_deref(), Some("${} and ${9LIVES} stay"));
    }

    #[test]
    fn undefined_variable_names_the_failing_notice() {
        with_env("CADENCE_TEST_GREETING", "hey", || {
            let yaml = "cadence: v1\nnotices:\n  blocked: \"${CADENCE_TEST_GREETING}\"\n  empty_response: \"${CADENCE_TEST_GREETING} ${CADENCE_TEST_NOT_SET}\"\n";
            let err = load(yaml).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::UndefinedVariable { notice: "empty_response", ref name }
                    if name == "CADENCE_TEST_NOT_SET"
            ));
            assert!(err.to_string().contains("empty_response"));
        });
    }

    #[test]
    fn repeated_references_all_expand() {
        with_env("CADENCE_TEST_BOT", "Pip", || {
            let yaml = "cadence: v1\nnotices:\n  timeout: \"${CADENCE_TEST_BOT}, ${CADENCE_TEST_BOT}?\"\n";
            let config = load(yaml).unwrap();
            assert_eq!(config.notices.timeout.as_deref(), Some("Pip, Pip?"));
        });
    }

    #[test]
    fn missing_file_reports_its_path() {
        let source = ConfigSource::file("/nonexistent/cadence-test.yaml");
        let err = load_config(&source).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/cadence-test.yaml"));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let err = load("cadence: v2\n").unwrap_err();
        assert!(err.to_string().contains("unsupported config version"));
    }

    #[test]
    fn unknown_degree_is_rejected() {
        let err = load("cadence: v1\nhumanizer: extreme\n").unwrap_err();
        assert!(err.to_string().contains("unknown humanizer degree"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = load("cadence: v1\nmax_len: 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::YamlError(_)));
    }

    #[test]
    fn zero_max_len_is_rejected() {
        let err = load("cadence: v1\nmax_message_len: 0\n").unwrap_err();
        assert!(err.to_string().contains("max_message_len"));
    }

    #[test]
    fn code_threshold_below_regular_is_rejected() {
        let yaml = "cadence: v1\nthresholds:\n  code_flush_chars: 100\n  regular_flush_chars: 200\n";
        let err = load(yaml).unwrap_err();
        assert!(err.to_string().contains("code_flush_chars"));
    }

    #[test]
    fn inverted_pause_range_is_rejected() {
        let yaml = "cadence: v1\npacing:\n  pause_min_ms: 900\n  pause_max_ms: 100\n";
        let err = load(yaml).unwrap_err();
        assert!(err.to_string().contains("pause_min_ms"));
    }

    #[test]
    fn thinking_probability_out_of_range_is_rejected() {
        let yaml = "cadence: v1\npacing:\n  thinking_probability: 1.5\n";
        let err = load(yaml).unwrap_err();
        assert!(err.to_string().contains("thinking_probability"));
    }

    #[test]
    fn hash_is_deterministic_and_content_sensitive() {
        let a = load(FULL_YAML).unwrap();
        let b = load(FULL_YAML).unwrap();
        let c = load("cadence: v1\n").unwrap();
        assert_eq!(a.config_hash, b.config_hash);
        assert_ne!(a.config_hash, c.config_hash);
        assert!(a.config_hash.starts_with("sha256:"));
    }

    #[test]
    fn presets_are_valid() {
        for degree in [
            HumanizerDegree::None,
            HumanizerDegree::Light,
            HumanizerDegree::Medium,
            HumanizerDegree::Heavy,
        ] {
            let config = DeliveryConfig::for_degree(degree);
            assert_eq!(config.degree, degree);
            validate_config(&config).unwrap();
        }
    }

    #[test]
    fn degrees_are_ordered() {
        assert!(HumanizerDegree::None < HumanizerDegree::Light);
        assert!(HumanizerDegree::Light < HumanizerDegree::Medium);
        assert!(HumanizerDegree::Medium < HumanizerDegree::Heavy);
        assert!(!HumanizerDegree::Light.simulates_typing());
        assert!(HumanizerDegree::Medium.simulates_typing());
        assert!(!HumanizerDegree::Medium.splits_sentences());
        assert!(HumanizerDegree::Heavy.splits_sentences());
    }

    #[test]
    fn degree_parses_case_insensitively() {
        assert_eq!("HEAVY".parse::<HumanizerDegree>().unwrap(), HumanizerDegree::Heavy);
        assert_eq!(" light ".parse::<HumanizerDegree>().unwrap(), HumanizerDegree::Light);
    }
}
