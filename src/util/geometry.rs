// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the canvas constants and the pure hit-testing
//! helpers used to pick markers and badges under the pointer.

use crate::models::marker::{Marker, Point, Side};

/// Logical canvas width in pixels.
pub const CANVAS_WIDTH: f64 = 700.0;
/// Logical canvas height in pixels.
pub const CANVAS_HEIGHT: f64 = 900.0;
/// Markers left of this x get a left anchor column.
pub const MIDLINE: f64 = CANVAS_WIDTH / 2.0;
/// Distance of each anchor column from its canvas edge.
pub const ANCHOR_MARGIN: f64 = 50.0;

/// Picking radius around the marker dot.
pub const ANCHOR_PICK_RADIUS: f64 = 5.0;
/// Picking radius around the numbered badge.
pub const BADGE_PICK_RADIUS: f64 = 20.0;

/// What part of a marker a hit test measures against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// The small dot at the marker position.
    Anchor,
    /// The numbered badge on the anchor column.
    Badge,
}

impl HitTarget {
    pub fn point_of(self, marker: &Marker) -> Point {
        match self {
            HitTarget::Anchor => marker.position(),
            HitTarget::Badge => anchor_column(marker),
        }
    }
}

/// Euclidean distance between two points.
pub fn distance(p: Point, q: Point) -> f64 {
    (p.x - q.x).hypot(p.y - q.y)
}

/// Whether `point` lies within `radius` of the chosen part of `marker`.
pub fn hits(point: Point, marker: &Marker, target: HitTarget, radius: f64) -> bool {
    distance(point, target.point_of(marker)) <= radius
}

pub fn hit_anchor(point: Point, marker: &Marker) -> bool {
    hits(point, marker, HitTarget::Anchor, ANCHOR_PICK_RADIUS)
}

pub fn hit_badge(point: Point, marker: &Marker) -> bool {
    hits(point, marker, HitTarget::Badge, BADGE_PICK_RADIUS)
}

/// Fixed x-coordinate of the anchor column for a side.
pub fn anchor_x(side: Side) -> f64 {
    match side {
        Side::Left => ANCHOR_MARGIN,
        Side::Right => CANVAS_WIDTH - ANCHOR_MARGIN,
    }
}

/// Point where the badge sits: the anchor column at the marker's height.
pub fn anchor_column(marker: &Marker) -> Point {
    Point::new(anchor_x(marker.side), marker.y)
}

/// Project a point into the canvas bounds.
pub fn clamp(x: f64, y: f64) -> Point {
    Point::new(x.clamp(0.0, CANVAS_WIDTH), y.clamp(0.0, CANVAS_HEIGHT))
}

pub fn classify_side(x: f64) -> Side {
    if x < MIDLINE {
        Side::Left
    } else {
        Side::Right
    }
}
