// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor session state machine.
//!
//! The editor moves through `Closed -> Loading -> Open -> Saving -> Open`
//! and only interprets pointer events while `Open`. Loading and saving are
//! split into `begin_*`/`finish_*` halves so the host can run the slow part
//! (image decode, storage I/O) on a worker thread; the synchronous `open`
//! and `save` wrappers run both halves in one call.

use crate::error::EditorError;
use crate::io::artifact;
use crate::io::media::PristineImage;
use crate::io::storage::{self, ArtifactStore, SaveRequest, SaveResponse};
use crate::models::marker::{MarkerId, Point};
use crate::models::session::{DragState, Session};
use crate::models::store::AnnotationStore;
use crate::util::geometry::{self, HitTarget, ANCHOR_PICK_RADIUS};

/// Where the image for a new session comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A freshly picked raster that has not been persisted yet.
    Fresh { filename: String, bytes: Vec<u8> },
    /// A previously saved artifact in storage.
    Saved { reference: String },
}

/// Pointer input in canvas-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(Point),
    Move(Point),
    Release(Point),
    /// Primary click (press and release without a drag).
    Click(Point),
    /// Secondary (context) action.
    Secondary(Point),
}

/// What the host should do after an editor call.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// The editor is not open; nothing was interpreted.
    Ignored,
    Unchanged,
    Redraw,
    /// Pointer is over a draggable marker dot.
    Hover(bool),
    /// Ask the user for a marker number, defaulting to `suggested`.
    PromptId { suggested: MarkerId },
    Added(MarkerId),
    Removed(MarkerId),
    /// Ask the user to confirm removing every marker.
    ConfirmClear,
    Cleared,
}

#[derive(Debug, Default)]
pub enum EditorState {
    #[default]
    Closed,
    Loading,
    Open(Session),
    Saving(Session),
}

impl EditorState {
    pub fn name(&self) -> &'static str {
        match self {
            EditorState::Closed => "closed",
            EditorState::Loading => "loading",
            EditorState::Open(_) => "open",
            EditorState::Saving(_) => "saving",
        }
    }
}

/// The callout editor: at most one session at a time.
#[derive(Debug, Default)]
pub struct Editor {
    state: EditorState,
    /// Reference returned by the last successful save
    last_saved: Option<String>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, EditorState::Open(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, EditorState::Loading | EditorState::Saving(_))
    }

    /// The active session, while open or saving.
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            EditorState::Open(session) | EditorState::Saving(session) => Some(session),
            _ => None,
        }
    }

    pub fn last_saved_reference(&self) -> Option<&str> {
        self.last_saved.as_deref()
    }

    fn invalid(&self, action: &'static str) -> EditorError {
        EditorError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    fn open_session(&mut self) -> Option<&mut Session> {
        match &mut self.state {
            EditorState::Open(session) => Some(session),
            _ => None,
        }
    }

    /// Enter `Loading`. Only valid while no session exists.
    pub fn begin_open(&mut self) -> Result<(), EditorError> {
        if !matches!(self.state, EditorState::Closed) {
            return Err(self.invalid("open an image"));
        }
        self.state = EditorState::Loading;
        Ok(())
    }

    /// Leave `Loading` with the outcome of [`load_session`].
    pub fn finish_open(&mut self, loaded: Result<Session, EditorError>) -> Result<(), EditorError> {
        if !matches!(self.state, EditorState::Loading) {
            return Err(self.invalid("finish loading"));
        }

        match loaded {
            Ok(session) => {
                log::info!(
                    "Opened {} with {} markers",
                    session.source_reference(),
                    session.markers.len()
                );
                self.state = EditorState::Open(session);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to open editor: {}", e);
                self.state = EditorState::Closed;
                Err(e)
            }
        }
    }

    pub fn open(&mut self, source: ImageSource, store: &dyn ArtifactStore) -> Result<(), EditorError> {
        self.begin_open()?;
        let loaded = load_session(source, store);
        self.finish_open(loaded)
    }

    /// Interpret one pointer event.
    pub fn handle(&mut self, event: PointerEvent) -> EventOutcome {
        let Some(session) = self.open_session() else {
            return EventOutcome::Ignored;
        };

        match event {
            PointerEvent::Press(point) => {
                if session.drag != DragState::Idle {
                    return EventOutcome::Unchanged;
                }
                match session.markers.find_at(point, ANCHOR_PICK_RADIUS, HitTarget::Anchor) {
                    Some(marker) => {
                        log::debug!("Started dragging marker {}", marker.id);
                        session.drag = DragState::Dragging {
                            id: marker.id,
                            grab_offset: point.offset_from(marker.position()),
                        };
                        EventOutcome::Hover(true)
                    }
                    None => EventOutcome::Unchanged,
                }
            }
            PointerEvent::Move(point) => match session.drag {
                DragState::Dragging { id, grab_offset } => {
                    session
                        .markers
                        .move_to(id, point.x - grab_offset.x, point.y - grab_offset.y);
                    EventOutcome::Redraw
                }
                DragState::Idle => EventOutcome::Hover(
                    session
                        .markers
                        .markers()
                        .iter()
                        .any(|m| geometry::hit_anchor(point, m)),
                ),
            },
            PointerEvent::Release(_) => {
                if let DragState::Dragging { id, .. } = session.drag {
                    log::debug!("Stopped dragging marker {}", id);
                    session.drag = DragState::Idle;
                }
                EventOutcome::Unchanged
            }
            PointerEvent::Click(point) => {
                if session.drag != DragState::Idle {
                    return EventOutcome::Unchanged;
                }
                let on_marker = session
                    .markers
                    .find_at(point, ANCHOR_PICK_RADIUS, HitTarget::Anchor)
                    .is_some();
                if on_marker {
                    return EventOutcome::Unchanged;
                }
                session.pending_insert = Some(point);
                EventOutcome::PromptId {
                    suggested: session.markers.next_suggested_id(),
                }
            }
            PointerEvent::Secondary(point) => {
                let hit = session
                    .markers
                    .markers()
                    .iter()
                    .find(|m| geometry::hit_badge(point, m))
                    .map(|m| m.id);
                match hit.and_then(|id| session.markers.remove(id)) {
                    Some(removed) => {
                        log::info!(
                            "Deleted marker {}, total: {}",
                            removed.id,
                            session.markers.len()
                        );
                        EventOutcome::Removed(removed.id)
                    }
                    None => EventOutcome::Unchanged,
                }
            }
        }
    }

    /// Answer the marker number prompt. `None` means the prompt was cancelled.
    pub fn submit_id(&mut self, input: Option<&str>) -> Result<EventOutcome, EditorError> {
        let Some(session) = self.open_session() else {
            return Ok(EventOutcome::Ignored);
        };
        let (Some(point), Some(input)) = (session.pending_insert.take(), input) else {
            return Ok(EventOutcome::Unchanged);
        };

        let id = parse_id(input)
            .and_then(|id| session.markers.add(id, point.x, point.y).map(|m| m.id))
            .map_err(|e| {
                log::warn!("Rejected marker number {:?}: {}", input, e);
                e
            })?;
        log::info!(
            "Added marker {} at ({:.1}, {:.1}), total: {}",
            id,
            point.x,
            point.y,
            session.markers.len()
        );
        Ok(EventOutcome::Added(id))
    }

    /// Remove a marker by number, as from the marker list.
    pub fn remove_marker(&mut self, id: MarkerId) -> EventOutcome {
        let Some(session) = self.open_session() else {
            return EventOutcome::Ignored;
        };
        match session.markers.remove(id) {
            Some(_) => {
                if matches!(session.drag, DragState::Dragging { id: dragged, .. } if dragged == id) {
                    session.drag = DragState::Idle;
                }
                log::info!("Deleted marker {}, total: {}", id, session.markers.len());
                EventOutcome::Removed(id)
            }
            None => EventOutcome::Unchanged,
        }
    }

    pub fn request_clear(&mut self) -> EventOutcome {
        match self.open_session() {
            Some(_) => EventOutcome::ConfirmClear,
            None => EventOutcome::Ignored,
        }
    }

    pub fn confirm_clear(&mut self, confirmed: bool) -> EventOutcome {
        let Some(session) = self.open_session() else {
            return EventOutcome::Ignored;
        };
        if !confirmed {
            return EventOutcome::Unchanged;
        }
        session.markers.clear();
        session.drag = DragState::Idle;
        log::info!("Cleared all markers");
        EventOutcome::Cleared
    }

    /// Encode the session and enter `Saving`. The returned request goes to storage.
    pub fn begin_save(&mut self) -> Result<SaveRequest, EditorError> {
        let request = match &self.state {
            EditorState::Open(session) => {
                if session.markers.is_empty() {
                    return Err(EditorError::EmptyAnnotationSet);
                }
                let markers = session.markers.markers().to_vec();
                SaveRequest {
                    filename: session.source_reference().to_string(),
                    document: artifact::encode(session.base_image(), &markers)?,
                    markers,
                }
            }
            _ => return Err(self.invalid("save")),
        };

        if let EditorState::Open(mut session) = std::mem::take(&mut self.state) {
            session.drag = DragState::Idle;
            session.pending_insert = None;
            self.state = EditorState::Saving(session);
        }
        log::info!("Saving {} markers to {}", request.markers.len(), request.filename);
        Ok(request)
    }

    /// Leave `Saving` with storage's response. Returns the new source reference.
    pub fn finish_save(&mut self, response: SaveResponse) -> Result<String, EditorError> {
        let mut session = match std::mem::take(&mut self.state) {
            EditorState::Saving(session) => session,
            other => {
                self.state = other;
                return Err(self.invalid("finish saving"));
            }
        };

        let result = match (response.success, response.image_path) {
            (true, Some(reference)) => {
                log::info!("Saved artifact as {}", reference);
                session.advance_reference(reference.clone());
                self.last_saved = Some(reference.clone());
                Ok(reference)
            }
            (_, _) => {
                let message = response
                    .error
                    .unwrap_or_else(|| "Storage did not return an image path".to_string());
                log::error!("Failed to save annotations: {}", message);
                Err(EditorError::SaveFailed(message))
            }
        };

        self.state = EditorState::Open(session);
        result
    }

    pub fn save(&mut self, store: &dyn ArtifactStore) -> Result<String, EditorError> {
        let request = self.begin_save()?;
        let response = store.save(&request);
        self.finish_save(response)
    }

    /// Discard the open session.
    pub fn close(&mut self) -> Result<(), EditorError> {
        match self.state {
            EditorState::Open(_) => {
                self.state = EditorState::Closed;
                log::info!("Closed editor");
                Ok(())
            }
            EditorState::Closed => Ok(()),
            _ => Err(self.invalid("close")),
        }
    }
}

/// Build a session from `source`. Runs off the UI thread in the app.
pub fn load_session(source: ImageSource, store: &dyn ArtifactStore) -> Result<Session, EditorError> {
    match source {
        ImageSource::Fresh { filename, bytes } => {
            let pristine = PristineImage::decode(bytes)?;
            let reference = storage::artifact_name(&filename);
            log::info!("Loaded fresh image {} as {}", filename, reference);
            Ok(Session::new(pristine, AnnotationStore::new(), reference))
        }
        ImageSource::Saved { reference } => {
            let document = store
                .load_document(&reference)
                .map_err(|e| EditorError::ImageLoad(format!("{:#}", e)))?;
            let sidecar = store.load_markers(&reference).unwrap_or_else(|e| {
                log::warn!("Marker sidecar for {} unavailable: {:#}", reference, e);
                None
            });
            let decoded = artifact::decode(&document, sidecar)?;

            let mut markers = AnnotationStore::new();
            for marker in decoded.markers {
                markers.restore(marker).map_err(|e| match e {
                    EditorError::MalformedArtifact(detail) => {
                        EditorError::MalformedArtifact(format!("{} in {}", detail, reference))
                    }
                    other => EditorError::MalformedArtifact(format!("{} in {}", other, reference)),
                })?;
            }
            Ok(Session::new(decoded.pristine, markers, reference))
        }
    }
}

fn parse_id(input: &str) -> Result<MarkerId, EditorError> {
    let invalid = || EditorError::InvalidId(input.to_string());
    let value: i64 = input.trim().parse().map_err(|_| invalid())?;
    if value < 1 {
        return Err(invalid());
    }
    MarkerId::try_from(value).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::media::solid_png;
    use crate::io::storage::testing::MemoryStore;
    use crate::models::marker::Side;

    fn fresh(width: u32, height: u32) -> ImageSource {
        ImageSource::Fresh {
            filename: "cloison.png".to_string(),
            bytes: solid_png(width, height, [250, 250, 250, 255]),
        }
    }

    fn open_editor(store: &MemoryStore) -> Editor {
        let mut editor = Editor::new();
        editor.open(fresh(700, 900), store).unwrap();
        editor
    }

    fn add(editor: &mut Editor, id: MarkerId, x: f64, y: f64) -> Result<EventOutcome, EditorError> {
        let outcome = editor.handle(PointerEvent::Click(Point::new(x, y)));
        assert!(matches!(outcome, EventOutcome::PromptId { .. }), "{outcome:?}");
        editor.submit_id(Some(&id.to_string()))
    }

    fn markers(editor: &Editor) -> Vec<(MarkerId, f64, f64, Side)> {
        editor
            .session()
            .unwrap()
            .markers
            .markers()
            .iter()
            .map(|m| (m.id, m.x, m.y, m.side))
            .collect()
    }

    #[test]
    fn test_annotate_save_and_reopen() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);

        add(&mut editor, 1, 100.0, 200.0).unwrap();
        add(&mut editor, 2, 600.0, 300.0).unwrap();
        let session = editor.session().unwrap();
        assert_eq!(
            geometry::anchor_column(session.markers.get(1).unwrap()),
            Point::new(50.0, 200.0)
        );
        assert_eq!(
            geometry::anchor_column(session.markers.get(2).unwrap()),
            Point::new(650.0, 300.0)
        );

        let reference = editor.save(&store).unwrap();
        assert_eq!(reference, "cloison.svg");
        assert!(editor.is_open());
        assert_eq!(editor.session().unwrap().markers.len(), 2);
        assert_eq!(editor.session().unwrap().source_reference(), "cloison.svg");
        let saved = markers(&editor);

        editor.close().unwrap();
        assert_eq!(editor.last_saved_reference(), Some("cloison.svg"));

        editor
            .open(ImageSource::Saved { reference }, &store)
            .unwrap();
        assert_eq!(markers(&editor), saved);
        assert_eq!(
            saved,
            vec![(1, 100.0, 200.0, Side::Left), (2, 600.0, 300.0, Side::Right)]
        );
    }

    #[test]
    fn test_reopened_session_starts_from_pristine() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);
        let original = editor.session().unwrap().base_image().clone();

        add(&mut editor, 1, 100.0, 200.0).unwrap();
        let reference = editor.save(&store).unwrap();
        editor.close().unwrap();

        for id in 2..5 {
            editor
                .open(ImageSource::Saved { reference: reference.clone() }, &store)
                .unwrap();
            assert_eq!(editor.session().unwrap().base_image(), &original);
            add(&mut editor, id, 300.0, 100.0 * id as f64).unwrap();
            editor.save(&store).unwrap();
            editor.close().unwrap();
        }

        let document = store.document(&reference).unwrap();
        let resolved = artifact::resolve_pristine(&store, &reference).unwrap();
        assert_eq!(resolved.pixels().as_raw(), original.pixels().as_raw());
        assert_eq!(String::from_utf8(document).unwrap().matches("<image ").count(), 1);
    }

    #[test]
    fn test_wrong_dimensions_stay_closed() {
        let store = MemoryStore::default();
        let mut editor = Editor::new();

        let result = editor.open(fresh(640, 480), &store);
        assert_eq!(
            result.unwrap_err(),
            EditorError::DimensionMismatch {
                width: 640,
                height: 480
            }
        );
        assert!(matches!(editor.state(), EditorState::Closed));
        assert!(editor.session().is_none());
    }

    #[test]
    fn test_missing_artifact_stays_closed() {
        let store = MemoryStore::default();
        let mut editor = Editor::new();

        let result = editor.open(
            ImageSource::Saved {
                reference: "gone.svg".to_string(),
            },
            &store,
        );
        assert!(matches!(result, Err(EditorError::ImageLoad(_))));
        assert!(matches!(editor.state(), EditorState::Closed));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);

        add(&mut editor, 5, 100.0, 100.0).unwrap();
        let result = add(&mut editor, 5, 400.0, 400.0);

        assert_eq!(result.unwrap_err(), EditorError::DuplicateId(5));
        assert_eq!(markers(&editor), vec![(5, 100.0, 100.0, Side::Left)]);
    }

    #[test]
    fn test_invalid_id_inputs() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);

        for input in ["", "  ", "abc", "0", "-3", "99999999999"] {
            editor.handle(PointerEvent::Click(Point::new(200.0, 200.0)));
            let result = editor.submit_id(Some(input));
            assert!(matches!(result, Err(EditorError::InvalidId(_))), "{input:?}");
        }

        editor.handle(PointerEvent::Click(Point::new(200.0, 200.0)));
        assert_eq!(editor.submit_id(None).unwrap(), EventOutcome::Unchanged);
        assert!(editor.session().unwrap().markers.is_empty());
    }

    #[test]
    fn test_prompt_suggests_next_id() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);

        add(&mut editor, 7, 100.0, 100.0).unwrap();
        assert_eq!(
            editor.handle(PointerEvent::Click(Point::new(300.0, 300.0))),
            EventOutcome::PromptId { suggested: 8 }
        );
    }

    #[test]
    fn test_click_on_anchor_does_not_insert() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);

        add(&mut editor, 1, 100.0, 200.0).unwrap();
        assert_eq!(
            editor.handle(PointerEvent::Click(Point::new(102.0, 203.0))),
            EventOutcome::Unchanged
        );
        assert_eq!(editor.submit_id(Some("2")).unwrap(), EventOutcome::Unchanged);
        assert_eq!(editor.session().unwrap().markers.len(), 1);
    }

    #[test]
    fn test_drag_clamps_to_canvas() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);
        add(&mut editor, 5, 100.0, 200.0).unwrap();

        editor.handle(PointerEvent::Press(Point::new(100.0, 200.0)));
        assert_eq!(
            editor.handle(PointerEvent::Move(Point::new(-50.0, 1000.0))),
            EventOutcome::Redraw
        );
        editor.handle(PointerEvent::Release(Point::new(-50.0, 1000.0)));

        assert_eq!(markers(&editor), vec![(5, 0.0, 900.0, Side::Left)]);
        assert_eq!(editor.session().unwrap().drag, DragState::Idle);
    }

    #[test]
    fn test_drag_keeps_side_and_grab_offset() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);
        add(&mut editor, 3, 100.0, 200.0).unwrap();

        editor.handle(PointerEvent::Press(Point::new(103.0, 204.0)));
        editor.handle(PointerEvent::Move(Point::new(603.0, 404.0)));
        editor.handle(PointerEvent::Release(Point::new(603.0, 404.0)));

        assert_eq!(markers(&editor), vec![(3, 600.0, 400.0, Side::Left)]);

        // Moves after release only report hover
        assert_eq!(
            editor.handle(PointerEvent::Move(Point::new(10.0, 10.0))),
            EventOutcome::Hover(false)
        );
        assert_eq!(
            editor.handle(PointerEvent::Move(Point::new(601.0, 401.0))),
            EventOutcome::Hover(true)
        );
        assert_eq!(markers(&editor), vec![(3, 600.0, 400.0, Side::Left)]);
    }

    #[test]
    fn test_press_off_marker_does_not_drag() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);
        add(&mut editor, 1, 100.0, 200.0).unwrap();

        assert_eq!(
            editor.handle(PointerEvent::Press(Point::new(300.0, 300.0))),
            EventOutcome::Unchanged
        );
        editor.handle(PointerEvent::Move(Point::new(400.0, 400.0)));
        assert_eq!(markers(&editor), vec![(1, 100.0, 200.0, Side::Left)]);
    }

    #[test]
    fn test_secondary_removes_by_badge() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);
        add(&mut editor, 1, 100.0, 200.0).unwrap();
        add(&mut editor, 2, 600.0, 300.0).unwrap();

        // The marker dot itself is not a delete target
        assert_eq!(
            editor.handle(PointerEvent::Secondary(Point::new(600.0, 300.0))),
            EventOutcome::Unchanged
        );
        assert_eq!(
            editor.handle(PointerEvent::Secondary(Point::new(655.0, 310.0))),
            EventOutcome::Removed(2)
        );
        assert_eq!(markers(&editor), vec![(1, 100.0, 200.0, Side::Left)]);
        assert_eq!(editor.session().unwrap().markers.next_suggested_id(), 3);
    }

    #[test]
    fn test_remove_marker_by_number() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);
        add(&mut editor, 1, 100.0, 200.0).unwrap();
        add(&mut editor, 2, 600.0, 300.0).unwrap();

        assert_eq!(editor.remove_marker(1), EventOutcome::Removed(1));
        assert_eq!(editor.remove_marker(1), EventOutcome::Unchanged);
        assert_eq!(markers(&editor), vec![(2, 600.0, 300.0, Side::Right)]);
    }

    #[test]
    fn test_secondary_uses_badge_radius_on_anchor_column() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);
        add(&mut editor, 1, 300.0, 200.0).unwrap();
        add(&mut editor, 2, 200.0, 215.0).unwrap();

        // Outside the badge disc, though within 20 on each axis
        assert_eq!(
            editor.handle(PointerEvent::Secondary(Point::new(65.0, 185.0))),
            EventOutcome::Unchanged
        );
        // Both badges overlap here; the first inserted marker wins
        assert_eq!(
            editor.handle(PointerEvent::Secondary(Point::new(50.0, 208.0))),
            EventOutcome::Removed(1)
        );
        assert_eq!(markers(&editor), vec![(2, 200.0, 215.0, Side::Left)]);
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);
        add(&mut editor, 4, 100.0, 200.0).unwrap();

        assert_eq!(editor.request_clear(), EventOutcome::ConfirmClear);
        assert_eq!(editor.confirm_clear(false), EventOutcome::Unchanged);
        assert_eq!(editor.session().unwrap().markers.len(), 1);

        assert_eq!(editor.confirm_clear(true), EventOutcome::Cleared);
        assert!(editor.session().unwrap().markers.is_empty());
        assert_eq!(editor.session().unwrap().markers.next_suggested_id(), 1);
    }

    #[test]
    fn test_save_empty_never_reaches_storage() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);

        assert_eq!(editor.save(&store), Err(EditorError::EmptyAnnotationSet));
        assert!(editor.is_open());
        assert_eq!(store.saves(), 0);
    }

    #[test]
    fn test_failed_save_keeps_markers_and_reference() {
        let store = MemoryStore::default();
        *store.fail_with.lock().unwrap() = Some("Disque plein".to_string());
        let mut editor = open_editor(&store);
        add(&mut editor, 1, 100.0, 200.0).unwrap();

        let result = editor.save(&store);
        assert_eq!(result, Err(EditorError::SaveFailed("Disque plein".to_string())));
        assert!(editor.is_open());
        assert_eq!(editor.session().unwrap().markers.len(), 1);
        assert_eq!(editor.session().unwrap().source_reference(), "cloison.svg");
        assert_eq!(editor.last_saved_reference(), None);

        // Retry without re-annotating
        *store.fail_with.lock().unwrap() = None;
        assert_eq!(editor.save(&store).unwrap(), "cloison.svg");
        assert_eq!(store.saves(), 2);
    }

    #[test]
    fn test_success_without_path_is_failure() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);
        add(&mut editor, 1, 100.0, 200.0).unwrap();

        editor.begin_save().unwrap();
        let response = SaveResponse {
            success: true,
            image_path: None,
            error: None,
        };
        assert!(matches!(
            editor.finish_save(response),
            Err(EditorError::SaveFailed(_))
        ));
        assert!(editor.is_open());
    }

    #[test]
    fn test_events_ignored_unless_open() {
        let store = MemoryStore::default();
        let mut editor = Editor::new();
        let click = PointerEvent::Click(Point::new(10.0, 10.0));
        assert_eq!(editor.handle(click), EventOutcome::Ignored);

        editor.begin_open().unwrap();
        assert_eq!(editor.handle(click), EventOutcome::Ignored);
        assert!(editor.is_busy());
        editor
            .finish_open(load_session(fresh(700, 900), &store))
            .unwrap();

        add(&mut editor, 1, 100.0, 200.0).unwrap();
        editor.begin_save().unwrap();
        assert_eq!(editor.handle(click), EventOutcome::Ignored);
        assert_eq!(editor.request_clear(), EventOutcome::Ignored);
        assert!(editor.close().is_err());
        editor.finish_save(SaveResponse::saved("cloison.svg")).unwrap();
        assert!(editor.is_open());
    }

    #[test]
    fn test_single_session_at_a_time() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);

        let result = editor.open(fresh(700, 900), &store);
        assert!(matches!(result, Err(EditorError::InvalidTransition { .. })));
        assert!(editor.is_open());

        editor.close().unwrap();
        assert!(editor.session().is_none());
        editor.open(fresh(700, 900), &store).unwrap();
    }

    #[test]
    fn test_restore_rejects_duplicate_ids_in_artifact() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);
        add(&mut editor, 1, 100.0, 200.0).unwrap();
        editor.save(&store).unwrap();
        editor.close().unwrap();

        let document = store.document("cloison.svg").unwrap();
        let mut sidecar = crate::io::serialization::MarkerSidecar::new(
            &[editor_marker(1), editor_marker(1)],
        );
        sidecar.markers[1].x = 20.0;
        store.insert("cloison.svg", document, Some(sidecar));

        let result = editor.open(
            ImageSource::Saved {
                reference: "cloison.svg".to_string(),
            },
            &store,
        );
        assert!(matches!(result, Err(EditorError::MalformedArtifact(_))));
        assert!(editor.session().is_none());
    }

    #[test]
    fn test_open_artifact_with_layered_callouts() {
        let store = MemoryStore::default();
        let mut editor = open_editor(&store);
        add(&mut editor, 1, 100.0, 200.0).unwrap();
        add(&mut editor, 2, 600.0, 300.0).unwrap();
        editor.save(&store).unwrap();
        editor.close().unwrap();

        // An outside tool regrouped the callouts and dropped the listings
        let svg = String::from_utf8(store.document("cloison.svg").unwrap()).unwrap();
        let svg = svg
            .lines()
            .filter(|line| !line.starts_with("<metadata"))
            .collect::<Vec<_>>()
            .join("\n")
            .replacen(r#"<g class="callout">"#, r#"<g id="layer1"><g class="callout">"#, 1)
            .replace("</svg>", "</g></svg>");
        store.insert("cloison.svg", svg.into_bytes(), None);

        editor
            .open(
                ImageSource::Saved {
                    reference: "cloison.svg".to_string(),
                },
                &store,
            )
            .unwrap();
        assert_eq!(
            markers(&editor),
            vec![(1, 100.0, 200.0, Side::Left), (2, 600.0, 300.0, Side::Right)]
        );
    }

    fn editor_marker(id: MarkerId) -> crate::models::marker::Marker {
        crate::models::marker::Marker {
            id,
            x: 10.0,
            y: 10.0,
            side: Side::Left,
        }
    }
}
