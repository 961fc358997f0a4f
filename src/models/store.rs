// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation store.
//!
//! Ordered in-memory collection of the markers being edited. Iteration order
//! is insertion order and only affects drawing order.

use super::marker::{Marker, MarkerId, Point};
use crate::error::EditorError;
use crate::util::geometry::{self, HitTarget};

#[derive(Debug, Clone)]
pub struct AnnotationStore {
    markers: Vec<Marker>,
    /// Lower bound offered as the default id in the prompt
    next_suggested_id: MarkerId,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            markers: Vec::new(),
            next_suggested_id: 1,
        }
    }

    /// Insert a new marker, classifying its side from `x`.
    pub fn add(&mut self, id: MarkerId, x: f64, y: f64) -> Result<&Marker, EditorError> {
        let position = geometry::clamp(x, y);
        self.insert(Marker {
            id,
            x: position.x,
            y: position.y,
            side: geometry::classify_side(position.x),
        })
    }

    /// Insert a previously persisted marker, keeping its stored side.
    pub fn restore(&mut self, marker: Marker) -> Result<&Marker, EditorError> {
        if !marker.x.is_finite() || !marker.y.is_finite() {
            return Err(EditorError::MalformedArtifact(format!(
                "marker {} has no usable position",
                marker.id
            )));
        }
        let position = geometry::clamp(marker.x, marker.y);
        self.insert(Marker {
            x: position.x,
            y: position.y,
            ..marker
        })
    }

    fn insert(&mut self, marker: Marker) -> Result<&Marker, EditorError> {
        if marker.id < 1 {
            return Err(EditorError::InvalidId(marker.id.to_string()));
        }
        if self.contains(marker.id) {
            return Err(EditorError::DuplicateId(marker.id));
        }

        self.next_suggested_id = self
            .next_suggested_id
            .max(marker.id.saturating_add(1));
        self.markers.push(marker);
        Ok(&self.markers[self.markers.len() - 1])
    }

    /// Delete a marker. Returns the removed marker, if there was one.
    pub fn remove(&mut self, id: MarkerId) -> Option<Marker> {
        let index = self.markers.iter().position(|m| m.id == id)?;
        Some(self.markers.remove(index))
    }

    /// Move a marker to the clamped position. The side is left untouched.
    pub fn move_to(&mut self, id: MarkerId, x: f64, y: f64) -> Option<&Marker> {
        let position = geometry::clamp(x, y);
        let marker = self.markers.iter_mut().find(|m| m.id == id)?;
        marker.x = position.x;
        marker.y = position.y;
        Some(&*marker)
    }

    /// First marker, in insertion order, whose `target` lies within `radius` of `point`.
    pub fn find_at(&self, point: Point, radius: f64, target: HitTarget) -> Option<&Marker> {
        self.markers
            .iter()
            .find(|m| geometry::hits(point, m, target, radius))
    }

    pub fn clear(&mut self) {
        self.markers.clear();
        self.next_suggested_id = 1;
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.get(id).is_some()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn next_suggested_id(&self) -> MarkerId {
        self.next_suggested_id
    }
}
