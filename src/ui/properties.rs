// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Marker list panel.
//!
//! Lists every marker of the open session with its side and position, and
//! offers a delete button per row.

use crate::models::marker::MarkerId;
use crate::models::session::Session;

/// Action requested from the marker panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertiesAction {
    None,
    DeleteMarker(MarkerId),
}

pub fn show(ui: &mut egui::Ui, session: Option<&Session>, editable: bool) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Markers");
    ui.separator();

    let Some(session) = session else {
        ui.label(egui::RichText::new("No image loaded").weak());
        return action;
    };

    ui.label(format!("Source: {}", session.source_reference()));
    ui.label(format!(
        "{} marker(s), next number: {}",
        session.markers.len(),
        session.markers.next_suggested_id()
    ));
    ui.separator();

    if session.markers.is_empty() {
        ui.label(egui::RichText::new("Click the image to place a marker").weak());
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("marker_grid")
            .num_columns(5)
            .striped(true)
            .show(ui, |ui| {
                ui.strong("#");
                ui.strong("Side");
                ui.strong("X");
                ui.strong("Y");
                ui.label("");
                ui.end_row();

                for marker in session.markers.markers() {
                    ui.label(marker.id.to_string());
                    ui.label(marker.side.as_str());
                    ui.label(format!("{:.0}", marker.x));
                    ui.label(format!("{:.0}", marker.y));
                    if ui
                        .add_enabled(editable, egui::Button::new("🗑").small())
                        .on_hover_text("Delete marker")
                        .clicked()
                    {
                        action = PropertiesAction::DeleteMarker(marker.id);
                    }
                    ui.end_row();
                }
            });
    });

    action
}
