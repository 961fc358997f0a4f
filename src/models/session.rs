// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editing session state.
//!
//! A session owns everything that exists while one exploded view is open:
//! the pristine base image, the marker store, the reference the artifact is
//! read from and written to, and the pointer drag state.

use super::marker::{MarkerId, Point};
use super::store::AnnotationStore;
use crate::io::media::PristineImage;

/// Pointer drag sub-state of an open session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Dragging a marker; `grab_offset` is the pointer position relative to the marker when pressed.
    Dragging { id: MarkerId, grab_offset: Point },
}

#[derive(Debug, Clone)]
pub struct Session {
    base_image: PristineImage,
    pub markers: AnnotationStore,
    source_reference: String,
    pub drag: DragState,
    /// Canvas point waiting for the user to type a marker number
    pub pending_insert: Option<Point>,
}

impl Session {
    pub fn new(base_image: PristineImage, markers: AnnotationStore, source_reference: String) -> Self {
        Self {
            base_image,
            markers,
            source_reference,
            drag: DragState::Idle,
            pending_insert: None,
        }
    }

    pub fn base_image(&self) -> &PristineImage {
        &self.base_image
    }

    pub fn source_reference(&self) -> &str {
        &self.source_reference
    }

    /// Only called once storage has confirmed a save.
    pub(crate) fn advance_reference(&mut self, reference: String) {
        self.source_reference = reference;
    }
}
