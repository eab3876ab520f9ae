// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{KlarwerkError, Result};

/// Where uploaded originals and encoded variants are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Keep all artifacts in process memory.
    Memory,
    /// Keep artifacts under `root/uploads` and `root/processed`.
    /// A `None` root resolves to the application data directory.
    Directory { root: Option<PathBuf> },
}

/// Settings for the enhancement service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// JPEG quality for every encoded variant (1-100).
    pub jpeg_quality: u8,
    /// How many submissions the presentation history shows.
    pub history_limit: usize,
    /// Run the twelve variant attempts on the rayon thread pool.
    pub parallel: bool,
    pub storage: StorageConfig,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            history_limit: 10,
            parallel: false,
            storage: StorageConfig::Directory { root: None },
        }
    }
}

impl EnhanceConfig {
    /// Reject values the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(KlarwerkError::Config(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.history_limit == 0 {
            return Err(KlarwerkError::Config("history_limit must be positive".into()));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
