// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Callout marker data structures.
//!
//! This module defines the numbered point markers placed on the exploded
//! view, along with the canvas-space point type they are positioned with.

use serde::{Deserialize, Serialize};

/// Marker number shown inside the badge.
pub type MarkerId = u32;

/// A 2D point in canvas coordinates (0..700 by 0..900 logical pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

/// Which fixed anchor column the badge and leader line start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// A numbered callout.
///
/// `side` is chosen once when the marker is created and is kept even if the
/// marker is later dragged across the midline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub x: f64,
    pub y: f64,
    pub side: Side,
}

impl Marker {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_json_shape() {
        let marker = Marker {
            id: 3,
            x: 120.5,
            y: 40.0,
            side: Side::Left,
        };

        let json = serde_json::to_value(marker).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["x"], 120.5);
        assert_eq!(json["side"], "left");
    }

    #[test]
    fn test_point_offset() {
        let grab = Point::new(103.0, 198.0).offset_from(Point::new(100.0, 200.0));
        assert_eq!(grab, Point::new(3.0, -2.0));
    }
}
