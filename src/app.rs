// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the [`Editor`], runs image loading and
//! saving on background threads, and turns canvas input and editor
//! outcomes into dialogs and status messages.

use crate::config::EditorConfig;
use crate::editor::{self, Editor, EditorState, EventOutcome, ImageSource};
use crate::error::EditorError;
use crate::io::artifact;
use crate::io::media::{self, PristineImage};
use crate::io::serialization::{self, MarkerSidecar};
use crate::io::storage::{ArtifactStore, DirectoryStore, SaveResponse};
use crate::models::marker::MarkerId;
use crate::models::session::{DragState, Session};
use crate::ui::{canvas, properties, toolbar};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

/// Marker number prompt shown after clicking empty canvas.
struct IdPrompt {
    input: String,
}

/// Main application state.
pub struct ExplodedViewApp {
    config: EditorConfig,

    editor: Editor,

    store: Arc<DirectoryStore>,

    /// Texture of the open session's pristine image
    image_texture: Option<egui::TextureHandle>,

    /// Receiver for background session loading
    loader: Option<Receiver<Result<Session, EditorError>>>,

    /// Receiver for background saving
    saver: Option<Receiver<SaveResponse>>,

    id_prompt: Option<IdPrompt>,

    confirm_clear: bool,

    /// Pointer is over a marker dot
    hovering: bool,

    /// Last message for the status line
    status: String,
}

impl ExplodedViewApp {
    pub fn new(config: EditorConfig) -> Self {
        let store = Arc::new(DirectoryStore::new(config.storage_dir.clone()));
        Self {
            config,
            editor: Editor::new(),
            store,
            image_texture: None,
            loader: None,
            saver: None,
            id_prompt: None,
            confirm_clear: false,
            hovering: false,
            status: String::new(),
        }
    }

    fn report(&mut self, error: &EditorError) {
        self.status = error.to_string();
    }

    /// Enter `Loading` and build the session on a background thread.
    fn open(&mut self, source: ImageSource) {
        if let Err(e) = self.editor.begin_open() {
            self.report(&e);
            return;
        }

        let (sender, receiver) = channel();
        self.loader = Some(receiver);
        self.status = "Loading image...".to_string();

        let store = Arc::clone(&self.store);
        std::thread::spawn(move || {
            let _ = sender.send(editor::load_session(source, store.as_ref()));
        });
    }

    fn open_image_file(&mut self, path: PathBuf) {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        match media::read_image_file(&path) {
            Ok(bytes) => self.open(ImageSource::Fresh { filename, bytes }),
            Err(e) => {
                log::error!("Failed to read {}: {}", path.display(), e);
                self.report(&e);
            }
        }
    }

    fn open_artifact_file(&mut self, path: PathBuf) {
        match self.store.reference_for(&path) {
            Some(reference) => self.open(ImageSource::Saved { reference }),
            None => {
                log::warn!("{} is not inside {}", path.display(), self.store.root().display());
                self.status = format!(
                    "Saved exploded views must be opened from {}",
                    self.store.root().display()
                );
            }
        }
    }

    fn reopen_last_saved(&mut self) {
        if let Some(reference) = self.editor.last_saved_reference().map(str::to_string) {
            self.open(ImageSource::Saved { reference });
        }
    }

    /// Enter `Saving` and hand the encoded artifact to storage on a background thread.
    fn save(&mut self) {
        let request = match self.editor.begin_save() {
            Ok(request) => request,
            Err(e) => {
                self.report(&e);
                return;
            }
        };

        let (sender, receiver) = channel();
        self.saver = Some(receiver);
        self.status = "Saving...".to_string();

        let store = Arc::clone(&self.store);
        std::thread::spawn(move || {
            let _ = sender.send(store.save(&request));
        });
    }

    fn close(&mut self) {
        match self.editor.close() {
            Ok(()) => {
                self.image_texture = None;
                self.id_prompt = None;
                self.confirm_clear = false;
                self.hovering = false;
            }
            Err(e) => self.report(&e),
        }
    }

    fn poll_background(&mut self, ctx: &egui::Context) {
        if let Some(ref receiver) = self.loader {
            if let Ok(loaded) = receiver.try_recv() {
                self.loader = None;
                match self.editor.finish_open(loaded) {
                    Ok(()) => {
                        if let Some(session) = self.editor.session() {
                            let (width, height) = session.base_image().size();
                            let color_image = egui::ColorImage::from_rgba_unmultiplied(
                                [width as usize, height as usize],
                                session.base_image().pixels().as_raw(),
                            );
                            self.image_texture = Some(ctx.load_texture(
                                "pristine_image",
                                color_image,
                                egui::TextureOptions::LINEAR,
                            ));
                            self.status = format!("Opened {}", session.source_reference());
                        }
                    }
                    Err(e) => self.report(&e),
                }
            }
        }

        if let Some(ref receiver) = self.saver {
            if let Ok(response) = receiver.try_recv() {
                self.saver = None;
                match self.editor.finish_save(response) {
                    Ok(reference) => {
                        self.status = format!("Saved as {}", reference);
                        if self.config.close_after_save {
                            self.close();
                        }
                    }
                    Err(e) => self.report(&e),
                }
            }
        }

        // Keep polling while work is in flight
        if self.editor.is_busy() {
            ctx.request_repaint();
        }
    }

    fn apply(&mut self, outcome: EventOutcome) {
        match outcome {
            EventOutcome::Hover(over) => self.hovering = over,
            EventOutcome::PromptId { suggested } => {
                self.id_prompt = Some(IdPrompt {
                    input: suggested.to_string(),
                });
            }
            EventOutcome::Added(id) => self.status = format!("Added: {}", id),
            EventOutcome::Removed(id) => self.status = format!("Deleted: {}", id),
            EventOutcome::ConfirmClear => self.confirm_clear = true,
            EventOutcome::Cleared => self.status = "Cleared all markers".to_string(),
            EventOutcome::Ignored | EventOutcome::Unchanged | EventOutcome::Redraw => {}
        }
    }

    fn remove_marker(&mut self, id: MarkerId) {
        let outcome = self.editor.remove_marker(id);
        self.apply(outcome);
    }

    /// Export the open session's markers to a file.
    fn export_markers(&mut self, path: PathBuf) {
        let Some(session) = self.editor.session() else {
            return;
        };
        let sidecar = MarkerSidecar::new(session.markers.markers());
        let extension = path.extension().and_then(|s| s.to_str());
        let result = match extension {
            Some("yaml") | Some("yml") => serialization::export_yaml(&sidecar, &path),
            Some("json") => serialization::export_json(&sidecar, &path),
            _ => {
                log::error!("Unsupported file extension: {:?}", extension);
                return;
            }
        };

        match result {
            Ok(_) => {
                log::info!("Exported markers to {}", path.display());
                self.status = format!("Exported markers to {}", path.display());
            }
            Err(e) => {
                log::error!("Failed to export markers: {:#}", e);
                self.status = format!("Failed to export markers: {:#}", e);
            }
        }
    }

    /// Recover the untouched upload from the last saved artifact.
    fn export_original(&mut self) {
        let Some(reference) = self.editor.last_saved_reference().map(str::to_string) else {
            return;
        };
        let pristine: PristineImage = match artifact::resolve_pristine(self.store.as_ref(), &reference) {
            Ok(pristine) => pristine,
            Err(e) => {
                self.report(&e);
                return;
            }
        };

        let stem = reference.strip_suffix(".svg").unwrap_or(&reference);
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Image", &[pristine.extension()])
            .set_file_name(format!("{}.{}", stem, pristine.extension()))
            .save_file()
        else {
            return;
        };

        match pristine.export(&path) {
            Ok(()) => {
                log::info!("Exported original image to {}", path.display());
                self.status = format!("Exported original image to {}", path.display());
            }
            Err(e) => {
                log::error!("Failed to export original image: {:#}", e);
                self.status = format!("Failed to export original image: {:#}", e);
            }
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(mut prompt) = self.id_prompt.take() {
            let mut answer: Option<Option<String>> = None;
            egui::Window::new("Marker number")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label("Enter the marker number:");
                    let response = ui.text_edit_singleline(&mut prompt.input);
                    response.request_focus();
                    let entered =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() || entered {
                            answer = Some(Some(prompt.input.clone()));
                        }
                        if ui.button("Cancel").clicked() {
                            answer = Some(None);
                        }
                    });
                });
            if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                answer = Some(None);
            }

            match answer {
                Some(input) => match self.editor.submit_id(input.as_deref()) {
                    Ok(outcome) => self.apply(outcome),
                    Err(e) => self.report(&e),
                },
                None => self.id_prompt = Some(prompt),
            }
        }

        if self.confirm_clear {
            egui::Window::new("Clear all markers")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label("Remove every marker from this image?");
                    ui.horizontal(|ui| {
                        if ui.button("Clear").clicked() {
                            self.confirm_clear = false;
                            let outcome = self.editor.confirm_clear(true);
                            self.apply(outcome);
                        }
                        if ui.button("Cancel").clicked() {
                            self.confirm_clear = false;
                            self.editor.confirm_clear(false);
                        }
                    });
                });
        }
    }

    fn show_menu(&mut self, ctx: &egui::Context) {
        let open = self.editor.is_open();
        let closed = matches!(self.editor.state(), EditorState::Closed);
        let has_markers = self
            .editor
            .session()
            .is_some_and(|session| !session.markers.is_empty());
        let has_saved = self.editor.last_saved_reference().is_some();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.add_enabled(closed, egui::Button::new("Open Image...")).clicked() {
                        // Open native file picker
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "gif", "bmp", "webp"])
                            .pick_file()
                        {
                            self.open_image_file(path);
                        }
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(closed, egui::Button::new("Open Exploded View..."))
                        .clicked()
                    {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Exploded view", &["svg"])
                            .set_directory(self.store.root())
                            .pick_file()
                        {
                            self.open_artifact_file(path);
                        }
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(closed && has_saved, egui::Button::new("Reopen Last Saved"))
                        .clicked()
                    {
                        self.reopen_last_saved();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui
                        .add_enabled(open && has_markers, egui::Button::new("Save (Ctrl+S)"))
                        .clicked()
                    {
                        self.save();
                        ui.close_menu();
                    }
                    ui.menu_button("Export Markers", |ui| {
                        if ui.add_enabled(has_markers, egui::Button::new("Export as YAML...")).clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name("markers.yaml")
                                .save_file()
                            {
                                self.export_markers(path);
                            }
                            ui.close_menu();
                        }
                        if ui.add_enabled(has_markers, egui::Button::new("Export as JSON...")).clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name("markers.json")
                                .save_file()
                            {
                                self.export_markers(path);
                            }
                            ui.close_menu();
                        }
                    });
                    if ui
                        .add_enabled(has_saved, egui::Button::new("Export Original Image..."))
                        .clicked()
                    {
                        self.export_original();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.add_enabled(open, egui::Button::new("Close")).clicked() {
                        self.close();
                        ui.close_menu();
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui
                        .add_enabled(open && has_markers, egui::Button::new("Clear All Markers"))
                        .clicked()
                    {
                        let outcome = self.editor.request_clear();
                        self.apply(outcome);
                        ui.close_menu();
                    }
                });
            });
        });
    }
}

impl eframe::App for ExplodedViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_background(ctx);

        self.show_menu(ctx);

        let modal = self.id_prompt.is_some() || self.confirm_clear;

        // Handle Ctrl+S
        if !modal && ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S)) {
            self.save();
        }

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(
                    ui,
                    self.editor.is_open(),
                    self.editor
                        .session()
                        .is_some_and(|session| !session.markers.is_empty()),
                    self.saver.is_some(),
                )
            })
            .inner;

        match toolbar_action {
            toolbar::ToolbarAction::Save => self.save(),
            toolbar::ToolbarAction::ClearAll => {
                let outcome = self.editor.request_clear();
                self.apply(outcome);
            }
            toolbar::ToolbarAction::Close => self.close(),
            toolbar::ToolbarAction::None => {}
        }

        // Marker list (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| {
                properties::show(ui, self.editor.session(), self.editor.is_open() && !modal)
            })
            .inner;

        if let properties::PropertiesAction::DeleteMarker(id) = properties_action {
            self.remove_marker(id);
        }

        // Main canvas (center)
        let events = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if self.loader.is_some() {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new("Loading image...")
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    return Vec::new();
                }

                let session = self.editor.session();
                let affordance = match session.map(|s| s.drag) {
                    Some(DragState::Dragging { .. }) => canvas::Affordance::Dragging,
                    Some(DragState::Idle) if self.hovering => canvas::Affordance::OverMarker,
                    _ => canvas::Affordance::Default,
                };
                canvas::show(
                    ui,
                    &self.image_texture,
                    session.map(|s| s.markers.markers()),
                    affordance,
                    &self.status,
                )
            })
            .inner;

        // Pointer input is ignored while a dialog is up
        if !modal {
            for event in events {
                let outcome = self.editor.handle(event);
                self.apply(outcome);
            }
        }

        self.show_dialogs(ctx);
    }
}
