// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Artifact storage.
//!
//! The editor hands encoded artifacts to an [`ArtifactStore`] and reads them
//! back by reference. [`DirectoryStore`] keeps them in a local directory as
//! `<stem>.svg` with a `<stem>.markers.json` sidecar next to it.

use super::serialization::{self, MarkerSidecar};
use crate::models::marker::Marker;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ARTIFACT_EXTENSION: &str = "svg";
const SIDECAR_SUFFIX: &str = ".markers.json";

/// What the editor asks storage to persist.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub filename: String,
    pub markers: Vec<Marker>,
    pub document: String,
}

/// Storage's answer to a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResponse {
    pub fn saved(image_path: impl Into<String>) -> Self {
        Self {
            success: true,
            image_path: Some(image_path.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            image_path: None,
            error: Some(error.into()),
        }
    }
}

pub trait ArtifactStore: Send + Sync {
    /// Raw artifact document for `reference`.
    fn load_document(&self, reference: &str) -> Result<Vec<u8>>;
    /// Structured marker listing for `reference`, if storage keeps one.
    fn load_markers(&self, reference: &str) -> Result<Option<MarkerSidecar>>;
    fn save(&self, request: &SaveRequest) -> SaveResponse;
}

pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reference for a file picked inside the storage root.
    pub fn reference_for(&self, path: &Path) -> Option<String> {
        let parent = path.parent()?.canonicalize().ok()?;
        if parent != self.root.canonicalize().ok()? {
            return None;
        }
        let reference = path.file_name()?.to_str()?.to_string();
        validate_reference(&reference).ok()?;
        Some(reference)
    }

    fn path_of(&self, reference: &str) -> Result<PathBuf> {
        validate_reference(reference)?;
        Ok(self.root.join(reference))
    }

    fn try_save(&self, request: &SaveRequest) -> Result<String> {
        let reference = artifact_name(&request.filename);
        if reference == format!(".{ARTIFACT_EXTENSION}") {
            bail!("Invalid file name: {:?}", request.filename);
        }

        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;

        let path = self.path_of(&reference)?;
        let sidecar = self.path_of(&sidecar_name(&reference))?;
        let staging = path.with_extension("svg.tmp");
        let sidecar_staging = sidecar.with_extension("json.tmp");

        // Stage both files so a failed write leaves the previous pair untouched
        let staged = std::fs::write(&staging, &request.document)
            .with_context(|| format!("failed to write {}", staging.display()))
            .and_then(|_| {
                serialization::export_json(&MarkerSidecar::new(&request.markers), &sidecar_staging)
                    .with_context(|| format!("failed to write {}", sidecar_staging.display()))
            });
        if let Err(e) = staged {
            let _ = std::fs::remove_file(&staging);
            let _ = std::fs::remove_file(&sidecar_staging);
            return Err(e);
        }

        std::fs::rename(&sidecar_staging, &sidecar)
            .with_context(|| format!("failed to replace {}", sidecar.display()))?;
        if let Err(e) = std::fs::rename(&staging, &path) {
            // The sidecar must always describe the artifact next to it
            let _ = std::fs::remove_file(&sidecar);
            let _ = std::fs::remove_file(&staging);
            return Err(e).with_context(|| format!("failed to replace {}", path.display()));
        }

        Ok(reference)
    }
}

impl ArtifactStore for DirectoryStore {
    fn load_document(&self, reference: &str) -> Result<Vec<u8>> {
        let path = self.path_of(reference)?;
        std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))
    }

    fn load_markers(&self, reference: &str) -> Result<Option<MarkerSidecar>> {
        let path = self.path_of(&sidecar_name(reference))?;
        if !path.exists() {
            return Ok(None);
        }
        serialization::import_json(&path).map(Some)
    }

    fn save(&self, request: &SaveRequest) -> SaveResponse {
        match self.try_save(request) {
            Ok(reference) => {
                log::info!(
                    "Stored artifact {} ({} markers) in {}",
                    reference,
                    request.markers.len(),
                    self.root.display()
                );
                SaveResponse::saved(reference)
            }
            Err(e) => {
                log::error!("Failed to store artifact {}: {:#}", request.filename, e);
                SaveResponse::failed(format!("{:#}", e))
            }
        }
    }
}

fn validate_reference(reference: &str) -> Result<()> {
    if reference.is_empty()
        || reference.contains(['/', '\\'])
        || reference.starts_with('.')
    {
        bail!("Invalid artifact reference: {:?}", reference);
    }
    Ok(())
}

/// Keep only characters that are safe in a file name.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

/// Artifact file name for an uploaded image name: same stem, `.svg` extension.
pub fn artifact_name(filename: &str) -> String {
    let cleaned = sanitize_filename(filename);
    let stem = Path::new(&cleaned)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    format!("{stem}.{ARTIFACT_EXTENSION}")
}

fn sidecar_name(reference: &str) -> String {
    let stem = reference
        .strip_suffix(&format!(".{ARTIFACT_EXTENSION}"))
        .unwrap_or(reference);
    format!("{stem}{SIDECAR_SUFFIX}")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::marker::Side;

    fn request(filename: &str) -> SaveRequest {
        SaveRequest {
            filename: filename.to_string(),
            markers: vec![Marker {
                id: 1,
                x: 100.0,
                y: 200.0,
                side: Side::Left,
            }],
            document: "<svg/>".to_string(),
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("my view (1).png"), "my_view_1.png");
        assert_eq!(sanitize_filename("C:\\temp\\part.jpg"), "part.jpg");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
    }

    #[test]
    fn test_artifact_name() {
        assert_eq!(artifact_name("cloison.png"), "cloison.svg");
        assert_eq!(artifact_name("cloison.svg"), "cloison.svg");
        assert_eq!(sidecar_name("cloison.svg"), "cloison.markers.json");
    }

    #[test]
    fn test_save_writes_artifact_and_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().join("uploads"));

        let response = store.save(&request("door.png"));
        assert_eq!(response, SaveResponse::saved("door.svg"));

        assert_eq!(store.load_document("door.svg").unwrap(), b"<svg/>");
        let sidecar = store.load_markers("door.svg").unwrap().unwrap();
        assert_eq!(sidecar.markers.len(), 1);
        assert!(!dir.path().join("uploads/door.svg.tmp").exists());
        assert!(!dir.path().join("uploads/door.markers.json.tmp").exists());
    }

    #[test]
    fn test_failed_sidecar_write_keeps_previous_pair() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().to_path_buf());
        assert!(store.save(&request("door.png")).success);

        // Block the staged sidecar so its write fails
        std::fs::create_dir(dir.path().join("door.markers.json.tmp")).unwrap();
        let mut second = request("door.png");
        second.document = "<svg id=\"second\"/>".to_string();
        second.markers[0].id = 7;

        let response = store.save(&second);
        assert!(!response.success);
        assert!(response.error.is_some());

        assert_eq!(store.load_document("door.svg").unwrap(), b"<svg/>");
        let sidecar = store.load_markers("door.svg").unwrap().unwrap();
        assert_eq!(sidecar.markers[0].id, 1);
        assert!(!dir.path().join("door.svg.tmp").exists());
    }

    #[test]
    fn test_missing_sidecar_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().to_path_buf());
        std::fs::write(dir.path().join("plain.svg"), "<svg/>").unwrap();
        assert!(store.load_markers("plain.svg").unwrap().is_none());
    }

    #[test]
    fn test_references_cannot_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().to_path_buf());
        assert!(store.load_document("../secret.svg").is_err());
        assert!(store.load_document("nested/part.svg").is_err());
        assert!(store.reference_for(Path::new("/elsewhere/part.svg")).is_none());
        assert_eq!(
            store.reference_for(&dir.path().join("part.svg")),
            Some("part.svg".to_string())
        );
    }

    #[test]
    fn test_unusable_filename_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().to_path_buf());
        let response = store.save(&request("///"));
        assert!(!response.success);
        assert!(response.image_path.is_none());
        assert!(response.error.is_some());
    }

    #[test]
    fn test_response_wire_shape() {
        let json = serde_json::to_string(&SaveResponse::saved("a.svg")).unwrap();
        assert_eq!(json, r#"{"success":true,"image_path":"a.svg"}"#);

        let parsed: SaveResponse =
            serde_json::from_str(r#"{"success":false,"image_path":null,"error":"nope"}"#).unwrap();
        assert_eq!(parsed, SaveResponse::failed("nope"));
    }
}
