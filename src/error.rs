// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor error taxonomy.
//!
//! Every variant is recoverable: load failures leave the editor closed,
//! save failures leave it open with the markers intact. The `Display` text
//! is what the host shows to the user.

use crate::models::marker::MarkerId;
use thiserror::Error;

/// The error type used by the callout editor.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EditorError {
    #[error("The image must be exactly 700x900 pixels (got {width}x{height})")]
    DimensionMismatch { width: u32, height: u32 },

    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    #[error("Malformed artifact: {0}")]
    MalformedArtifact(String),

    #[error("Marker number {0} already exists, please choose another number")]
    DuplicateId(MarkerId),

    #[error("Invalid marker number: {0:?}")]
    InvalidId(String),

    #[error("There are no markers to save")]
    EmptyAnnotationSet,

    #[error("{0}")]
    SaveFailed(String),

    #[error("Cannot {action} while the editor is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}
