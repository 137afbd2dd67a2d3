// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::path::PathBuf;

use super::error::ConfigError;

/// Where a delivery config document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A `cadence.yaml` on disk.
    File(PathBuf),
    /// YAML held by the caller, e.g. a per-channel override.
    Inline(String),
}

impl ConfigSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        ConfigSource::File(path.into())
    }

    pub fn inline(yaml: impl Into<String>) -> Self {
        ConfigSource::Inline(yaml.into())
    }

    pub(super) fn read(&self) -> Result<String, ConfigError> {
        match self {
            ConfigSource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    origin: self.to_string(),
                    source,
                })
            }
            ConfigSource::Inline(yaml) => Ok(yaml.clone()),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Inline(_) => f.write_str("<inline>"),
        }
    }
}
