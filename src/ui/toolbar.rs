// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the editor's session actions.

/// Action requested from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Save,
    ClearAll,
    Close,
}

/// Display the toolbar. Buttons are disabled unless a session is open and idle.
pub fn show(ui: &mut egui::Ui, open: bool, has_markers: bool, saving: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui
            .add_enabled(open && has_markers, egui::Button::new("💾 Save"))
            .on_hover_text("Save the exploded view (Ctrl+S)")
            .clicked()
        {
            action = ToolbarAction::Save;
        }

        if ui
            .add_enabled(open && has_markers, egui::Button::new("🗑 Clear all"))
            .clicked()
        {
            action = ToolbarAction::ClearAll;
        }

        if ui.add_enabled(open, egui::Button::new("✖ Close")).clicked() {
            action = ToolbarAction::Close;
        }

        ui.separator();

        if saving {
            ui.spinner();
            ui.label(egui::RichText::new("Saving...").italics());
        } else if open {
            ui.label(
                egui::RichText::new(
                    "Click to place a marker, drag a dot to move it, right-click a number to delete it",
                )
                .italics()
                .weak(),
            );
        } else {
            ui.label(egui::RichText::new("No exploded view open").italics().weak());
        }
    });

    action
}
