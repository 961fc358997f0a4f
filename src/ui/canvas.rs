// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for the exploded view and its callouts.
//!
//! This module displays the pristine image scaled to fit the panel, draws
//! every marker on top of it and translates egui pointer input into
//! canvas-space [`PointerEvent`]s for the editor.

use crate::editor::PointerEvent;
use crate::models::marker::{Marker, Point};
use crate::render::{self, Primitive, Surface};
use crate::util::geometry::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Pointer affordance to show over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Default,
    OverMarker,
    Dragging,
}

/// Display the main canvas area and collect pointer events.
pub fn show(
    ui: &mut egui::Ui,
    image_texture: &Option<egui::TextureHandle>,
    markers: Option<&[Marker]>,
    affordance: Affordance,
    status: &str,
) -> Vec<PointerEvent> {
    let mut events = Vec::new();
    // Set background color
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size() - egui::vec2(0.0, 24.0);

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        match (image_texture, markers) {
            (Some(texture), Some(markers)) => {
                // Fit the fixed canvas into the available space
                let available = ui.available_size();
                let scale = (available.x / CANVAS_WIDTH as f32)
                    .min(available.y / CANVAS_HEIGHT as f32)
                    .max(0.1);
                let display_size =
                    egui::vec2(CANVAS_WIDTH as f32 * scale, CANVAS_HEIGHT as f32 * scale);

                // Center the image
                let offset = (available - display_size) / 2.0;
                let image_rect =
                    egui::Rect::from_min_size(ui.min_rect().min + offset, display_size);

                let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());

                ui.painter().image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );

                let mut surface = PainterSurface {
                    painter: ui.painter_at(image_rect),
                    origin: image_rect.min,
                    scale,
                };
                render::draw_markers(&mut surface, markers);

                collect_events(ui, &response, image_rect, scale, &mut events);

                match affordance {
                    Affordance::Dragging => ui.ctx().set_cursor_icon(egui::CursorIcon::Move),
                    Affordance::OverMarker if response.hovered() => {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand)
                    }
                    _ => {}
                }
            }
            _ => {
                // Show welcome message when nothing is open
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.heading(
                            egui::RichText::new("EXPLODED VIEW")
                                .size(32.0)
                                .color(egui::Color32::from_gray(200)),
                        );
                        ui.label(
                            egui::RichText::new("Numbered callouts for technical sheets")
                                .size(14.0)
                                .color(egui::Color32::from_gray(150)),
                        );
                        ui.add_space(20.0);
                        ui.label(
                            egui::RichText::new("Open a 700x900 image or a saved exploded view to begin")
                                .color(egui::Color32::from_gray(180)),
                        );
                        ui.add_space(10.0);
                        ui.label(
                            egui::RichText::new("File → Open Image...")
                                .weak()
                                .color(egui::Color32::from_gray(130)),
                        );
                    });
                });
            }
        }
    });

    // Status line at the bottom
    ui.separator();
    ui.horizontal(|ui| {
        match markers {
            Some(markers) => ui.label(format!("{} marker(s)", markers.len())),
            None => ui.label("No image open"),
        };
        if !status.is_empty() {
            ui.separator();
            ui.label(status);
        }
    });

    events
}

fn collect_events(
    ui: &egui::Ui,
    response: &egui::Response,
    image_rect: egui::Rect,
    scale: f32,
    events: &mut Vec<PointerEvent>,
) {
    let to_canvas = |pos: egui::Pos2| {
        Point::new(
            ((pos.x - image_rect.min.x) / scale) as f64,
            ((pos.y - image_rect.min.y) / scale) as f64,
        )
    };
    let pointer = response.interact_pointer_pos().map(to_canvas);

    if response.drag_started_by(egui::PointerButton::Primary) {
        // Drags start once the pointer has travelled; press where it went down
        if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
            events.push(PointerEvent::Press(to_canvas(origin)));
        }
    }
    if response.dragged_by(egui::PointerButton::Primary) {
        if let Some(point) = pointer {
            events.push(PointerEvent::Move(point));
        }
    }
    if response.drag_stopped() {
        if let Some(point) = pointer {
            events.push(PointerEvent::Release(point));
        }
    }
    if response.clicked() {
        if let Some(point) = pointer {
            events.push(PointerEvent::Click(point));
        }
    }
    if response.secondary_clicked() {
        if let Some(point) = pointer {
            events.push(PointerEvent::Secondary(point));
        }
    }

    if events.is_empty() && !response.dragged() {
        if let Some(pos) = response.hover_pos() {
            events.push(PointerEvent::Move(to_canvas(pos)));
        }
    }
}

/// Draws callout primitives with an egui painter.
struct PainterSurface {
    painter: egui::Painter,
    origin: egui::Pos2,
    scale: f32,
}

impl PainterSurface {
    fn to_screen(&self, point: Point) -> egui::Pos2 {
        self.origin + egui::vec2(point.x as f32, point.y as f32) * self.scale
    }
}

fn color([r, g, b]: [u8; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(r, g, b)
}

impl Surface for PainterSurface {
    fn draw(&mut self, primitive: &Primitive) {
        let ink = color(render::INK);
        match primitive {
            Primitive::Leader { from, to } => {
                self.painter.line_segment(
                    [self.to_screen(*from), self.to_screen(*to)],
                    egui::Stroke::new(render::LEADER_WIDTH as f32 * self.scale, ink),
                );
            }
            Primitive::Dot { center, radius } | Primitive::Badge { center, radius } => {
                self.painter
                    .circle_filled(self.to_screen(*center), *radius as f32 * self.scale, ink);
            }
            Primitive::Numeral { center, text } => {
                self.painter.text(
                    self.to_screen(*center),
                    egui::Align2::CENTER_CENTER,
                    text,
                    egui::FontId::proportional(render::NUMERAL_SIZE as f32 * self.scale),
                    color(render::NUMERAL_INK),
                );
            }
        }
    }
}
