// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings are read from the YAML file named by `EXPLODED_VIEW_CONFIG`, or
//! from `exploded-view.yaml` in the working directory when it exists.
//! Missing fields fall back to their defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "EXPLODED_VIEW_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "exploded-view.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Directory holding saved artifacts and their marker sidecars
    pub storage_dir: PathBuf,
    /// Default `env_logger` filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Close the editor once a save succeeds
    pub close_after_save: bool,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("uploads"),
            log_filter: "info".to_string(),
            close_after_save: true,
            window_width: 1100.0,
            window_height: 1000.0,
        }
    }
}

impl EditorConfig {
    /// Load from the environment-selected file, the default file, or defaults.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
