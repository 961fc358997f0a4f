// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Marker list serialization and deserialization.
//!
//! This module handles the structured marker sidecar (`{ "markers": [...] }`)
//! stored next to each artifact and embedded in its metadata, as well as
//! exporting the marker list in YAML and JSON formats.

use crate::models::marker::Marker;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Explicit listing of an artifact's markers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerSidecar {
    pub markers: Vec<Marker>,
}

impl MarkerSidecar {
    pub fn new(markers: &[Marker]) -> Self {
        Self {
            markers: markers.to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid marker sidecar")
    }
}

/// Export markers to YAML format.
pub fn export_yaml(sidecar: &MarkerSidecar, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(sidecar)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export markers to JSON format.
pub fn export_json(sidecar: &MarkerSidecar, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(sidecar)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import markers from a JSON sidecar file.
pub fn import_json(path: &Path) -> Result<MarkerSidecar> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    MarkerSidecar::from_json(&json)
}
