// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Callout drawing primitives.
//!
//! A marker is drawn as a leader line from its anchor column to the marker
//! point, a small dot at the point, a filled badge on the anchor column and
//! the marker number centred in the badge. Both the interactive canvas and
//! the saved artifact draw exactly this primitive list, so what the user
//! edits is what gets persisted.

use crate::models::marker::{Marker, Point};
use crate::util::geometry::anchor_column;

/// Radius of the dot at the marker point.
pub const DOT_RADIUS: f64 = 3.0;
/// Radius of the numbered badge.
pub const BADGE_RADIUS: f64 = 20.0;
/// Stroke width of the leader line.
pub const LEADER_WIDTH: f64 = 1.0;
/// Font size of the number inside the badge.
pub const NUMERAL_SIZE: f64 = 20.0;

/// Colours in RGB order.
pub const INK: [u8; 3] = [0, 0, 0];
pub const NUMERAL_INK: [u8; 3] = [255, 255, 255];

/// One drawing operation, in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Leader { from: Point, to: Point },
    Dot { center: Point, radius: f64 },
    Badge { center: Point, radius: f64 },
    Numeral { center: Point, text: String },
}

/// Something the callout primitives can be drawn onto.
pub trait Surface {
    fn draw(&mut self, primitive: &Primitive);
}

/// The primitives making up one callout, in painting order.
pub fn callout(marker: &Marker) -> [Primitive; 4] {
    let anchor = anchor_column(marker);
    let point = marker.position();
    [
        Primitive::Leader {
            from: anchor,
            to: point,
        },
        Primitive::Dot {
            center: point,
            radius: DOT_RADIUS,
        },
        Primitive::Badge {
            center: anchor,
            radius: BADGE_RADIUS,
        },
        Primitive::Numeral {
            center: anchor,
            text: marker.id.to_string(),
        },
    ]
}

/// Draw every marker in store order; later markers overdraw earlier ones.
pub fn draw_markers<S: Surface + ?Sized>(surface: &mut S, markers: &[Marker]) {
    for marker in markers {
        for primitive in &callout(marker) {
            surface.draw(primitive);
        }
    }
}
