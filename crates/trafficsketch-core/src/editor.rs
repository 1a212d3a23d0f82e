//! The editor: scene store, history, viewport and the interaction state
//! machine that turns pointer and keyboard input into scene edits.
//!
//! All state lives in one owned [`Editor`]; nothing is global. Every
//! recoverable condition is handled here and reported as a return value,
//! so callers never see an error from an interaction.

use crate::history::History;
use crate::ink::InkOverlay;
use crate::input::{DoubleClickDetector, KeyPress, PointerEvent};
use crate::items::{DEFAULT_VEHICLE_COLOR, Item, ItemId, ItemTrait};
use crate::mode::Mode;
use crate::scene::Scene;
use crate::share::{self, ShareError};
use crate::snap::snap_point;
use crate::storage::{LOCAL_SLOT_KEY, Storage, StorageError, StorageResult};
use crate::store::SceneStore;
use crate::templates::{PaletteEntry, Template, bootstrap_scene};
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};
use std::time::Instant;

/// Hit tolerance around items, in screen pixels.
const HIT_TOLERANCE_PX: f64 = 4.0;

/// Editor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Snap moved and placed items to the 40-unit grid.
    pub snap_to_grid: bool,
    /// Size of the drawing surface in pixels.
    pub screen_size: Size,
    /// Colour given to vehicles added from the palette.
    pub vehicle_color: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_to_grid: true,
            screen_size: Size::new(1200.0, 800.0),
            vehicle_color: DEFAULT_VEHICLE_COLOR.to_string(),
        }
    }
}

/// An in-progress pointer gesture.
#[derive(Debug, Clone)]
enum Gesture {
    /// Dragging an item.
    Move {
        id: ItemId,
        /// Pointer position minus item anchor at pointer-down.
        grab: Vec2,
        /// Scene as it was before the drag.
        before: Scene,
    },
    /// Dragging the background to move the viewport.
    Pan {
        /// Viewport at pointer-down.
        start_view: Viewport,
        /// Pointer position at pointer-down, in scene coordinates of `start_view`.
        start_pointer: Point,
    },
    /// Sketching an ink stroke.
    Ink,
}

/// What a pointer event did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// Something visible changed.
    pub redraw: bool,
    /// A text label was double-clicked; the caller should prompt for new
    /// text and pass the answer to [`Editor::commit_text_edit`].
    pub edit_text: Option<ItemId>,
}

impl Response {
    fn redraw() -> Self {
        Self {
            redraw: true,
            edit_text: None,
        }
    }
}

/// What a key press asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    /// The key is not bound.
    Ignored,
    /// The key was handled by the editor.
    Handled,
    /// Save to the local slot (needs storage, which the caller owns).
    SaveRequested,
    /// Show the help screen.
    HelpRequested,
}

/// Result of loading the local slot.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The saved scene replaced the live one.
    Loaded(usize),
    /// Nothing has been saved yet.
    NothingSaved,
    /// A saved value exists but could not be read; the scene is unchanged.
    Unreadable(StorageError),
}

/// Result of importing a URL fragment.
#[derive(Debug, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The shared scene replaced the live one.
    Imported(usize),
    /// The fragment does not carry a shared scene; nothing changed.
    NotShared,
    /// The shared token was unreadable; the bootstrap scene was loaded.
    FellBackToDefault,
}

/// Prompt for replacement label text. `None` means cancelled.
pub trait TextPrompt {
    fn prompt(&mut self, title: &str, current: &str) -> Option<String>;
}

/// The editor state machine.
#[derive(Debug)]
pub struct Editor {
    store: SceneStore,
    history: History,
    viewport: Viewport,
    mode: Mode,
    ink: InkOverlay,
    gesture: Option<Gesture>,
    double_click: DoubleClickDetector,
    screen_size: Size,
    vehicle_color: String,
    needs_redraw: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Create an editor with an empty scene.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_scene(config, Scene::new())
    }

    pub fn with_scene(config: EditorConfig, scene: Scene) -> Self {
        let mut store = SceneStore::new(scene);
        store.set_snap_to_grid(config.snap_to_grid);
        Self {
            store,
            history: History::new(),
            viewport: Viewport::new(),
            mode: Mode::default(),
            ink: InkOverlay::new(),
            gesture: None,
            double_click: DoubleClickDetector::new(),
            screen_size: config.screen_size,
            vehicle_color: config.vehicle_color,
            needs_redraw: true,
        }
    }

    /// Start-up scene: the shared scene from `fragment` if it carries one,
    /// otherwise the bootstrap scene. An unreadable token also yields the
    /// bootstrap scene.
    pub fn from_fragment(config: EditorConfig, fragment: Option<&str>) -> (Self, ImportOutcome) {
        let mut editor = Self::new(config);
        let outcome = match fragment.map(share::decode_fragment) {
            Some(Ok(scene)) => {
                log::info!("Scene loaded from URL ({} items)", scene.len());
                let count = scene.len();
                editor.store.replace_scene(scene);
                ImportOutcome::Imported(count)
            }
            Some(Err(ShareError::MissingPrefix)) | None => {
                editor.store.replace_scene(bootstrap_scene());
                ImportOutcome::NotShared
            }
            Some(Err(err)) => {
                log::warn!("Failed to import scene from URL: {err}");
                editor.store.replace_scene(bootstrap_scene());
                ImportOutcome::FellBackToDefault
            }
        };
        (editor, outcome)
    }

    // --- Read access ---

    pub fn scene(&self) -> &Scene {
        self.store.scene()
    }

    /// Selected id, or `None` if the selection no longer exists.
    pub fn selection(&self) -> Option<&ItemId> {
        self.store.selection()
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.store.selected_item()
    }

    /// Items back to front, selected item last.
    pub fn render_order(&self) -> Vec<&Item> {
        self.scene().render_order(self.selection())
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn ink(&self) -> &InkOverlay {
        &self.ink
    }

    pub fn screen_size(&self) -> Size {
        self.screen_size
    }

    pub fn set_screen_size(&mut self, size: Size) {
        if size.width > 0.0 && size.height > 0.0 {
            self.screen_size = size;
            self.needs_redraw = true;
        }
    }

    pub fn vehicle_color(&self) -> &str {
        &self.vehicle_color
    }

    pub fn snap_to_grid(&self) -> bool {
        self.store.snap_to_grid()
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.store.set_snap_to_grid(enabled);
    }

    /// Whether a pointer gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Return and reset the pending redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Convert a screen point to scene coordinates.
    pub fn screen_to_scene(&self, point: Point) -> Point {
        self.viewport.screen_to_scene(point, self.screen_size)
    }

    pub fn scene_to_screen(&self, point: Point) -> Point {
        self.viewport.scene_to_screen(point, self.screen_size)
    }

    // --- Selection and mode ---

    /// Select an item (or clear with `None`). Selecting a vehicle syncs the
    /// palette colour from it.
    pub fn select(&mut self, id: Option<ItemId>) {
        if let Some(color) = id
            .as_ref()
            .and_then(|id| self.scene().get(id))
            .and_then(Item::as_vehicle)
            .map(|v| v.color.clone())
        {
            self.vehicle_color = color;
        }
        self.store.set_selection(id);
        self.needs_redraw = true;
    }

    /// Switch mode. Leaving draw mode wipes the ink overlay.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        self.finish_gesture();
        if self.mode == Mode::Draw {
            self.ink.clear();
        }
        log::debug!("Mode {} -> {}", self.mode, mode);
        self.mode = mode;
        self.needs_redraw = true;
    }

    // --- Pointer input ---

    /// Handle a pointer event in screen coordinates.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Response {
        self.handle_pointer_at(event, Instant::now())
    }

    /// Handle a pointer event with an explicit timestamp for double-click
    /// detection.
    ///
    /// Events at non-finite positions are dropped.
    pub fn handle_pointer_at(&mut self, event: PointerEvent, now: Instant) -> Response {
        if event.position().is_some_and(|p| !p.is_finite()) {
            log::warn!("Ignoring pointer event at non-finite position: {event:?}");
            return Response::default();
        }
        let response = match event {
            event if event.ends_gesture() => {
                let redraw = self.finish_gesture();
                Response {
                    redraw,
                    edit_text: None,
                }
            }
            PointerEvent::Down { position } => self.pointer_down(position, now),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { .. } | PointerEvent::Cancel | PointerEvent::Leave => Response::default(),
        };
        self.needs_redraw |= response.redraw;
        response
    }

    fn hit_tolerance(&self) -> f64 {
        HIT_TOLERANCE_PX * self.viewport.rect().width() / self.screen_size.width
    }

    fn pointer_down(&mut self, screen: Point, now: Instant) -> Response {
        // A pointer-down without a matching up still closes the old gesture
        self.finish_gesture();
        let is_double = self.double_click.press(screen, now);

        if self.mode == Mode::Draw {
            self.ink.begin(screen);
            self.gesture = Some(Gesture::Ink);
            return Response::redraw();
        }

        let point = self.screen_to_scene(screen);
        let hit = self
            .scene()
            .item_at_point(point, self.hit_tolerance(), self.selection())
            .map(|item| (item.id().clone(), item.anchor(), item.as_text().is_some()));

        match (self.mode, hit) {
            (Mode::Select, Some((id, _, true))) if is_double => {
                self.select(Some(id.clone()));
                Response {
                    redraw: true,
                    edit_text: Some(id),
                }
            }
            (Mode::Select, Some((id, anchor, _))) => {
                self.select(Some(id.clone()));
                log::debug!("Move gesture on {id}");
                self.gesture = Some(Gesture::Move {
                    id,
                    grab: point - anchor,
                    before: self.scene().clone(),
                });
                Response::redraw()
            }
            (Mode::Select, None) => {
                let had_selection = self.selection().is_some();
                self.select(None);
                Response {
                    redraw: had_selection,
                    edit_text: None,
                }
            }
            (Mode::Pan, Some((id, _, _))) => {
                self.select(Some(id));
                Response::redraw()
            }
            (Mode::Pan, None) => {
                self.gesture = Some(Gesture::Pan {
                    start_view: self.viewport,
                    start_pointer: point,
                });
                Response::default()
            }
            (Mode::Draw, _) => Response::default(),
        }
    }

    fn pointer_move(&mut self, screen: Point) -> Response {
        match &self.gesture {
            Some(Gesture::Move { id, grab, .. }) => {
                let target = self.screen_to_scene(screen) - *grab;
                let id = id.clone();
                let moved = self.store.move_item(&id, target.x, target.y);
                Response {
                    redraw: moved,
                    edit_text: None,
                }
            }
            Some(Gesture::Pan {
                start_view,
                start_pointer,
            }) => {
                let start_view = *start_view;
                let current = start_view.screen_to_scene(screen, self.screen_size);
                let origin = start_view.origin() - (current - *start_pointer);
                self.viewport.set_origin(origin);
                Response::redraw()
            }
            Some(Gesture::Ink) => {
                self.ink.extend(screen);
                Response::redraw()
            }
            None => Response::default(),
        }
    }

    /// End the active gesture. Every completed move or pan gesture records
    /// exactly one history entry: the pre-drag scene for a move, the current
    /// scene for a pan. Ink strokes are not scene edits.
    fn finish_gesture(&mut self) -> bool {
        match self.gesture.take() {
            Some(Gesture::Move { id, before, .. }) => {
                let moved = &before != self.scene();
                log::debug!("Move gesture on {id} committed (moved: {moved})");
                self.history.push(before);
                moved
            }
            Some(Gesture::Pan { .. }) => {
                log::debug!("Pan gesture committed");
                self.history.snapshot(self.store.scene());
                false
            }
            Some(Gesture::Ink) => {
                self.ink.end();
                true
            }
            None => false,
        }
    }

    /// Close any gesture, then snapshot the scene before an edit.
    fn record(&mut self) {
        self.finish_gesture();
        self.history.snapshot(self.store.scene());
        self.needs_redraw = true;
    }

    // --- Keyboard ---

    /// Handle a key press.
    pub fn handle_key(&mut self, key: &KeyPress) -> KeyResponse {
        let command = key.modifiers.command();

        if key.is("Delete") || key.is("Backspace") {
            return if self.delete_selected() { KeyResponse::Handled } else { KeyResponse::Ignored };
        }
        if command && key.is("z") {
            if key.modifiers.shift {
                self.redo();
            } else {
                self.undo();
            }
            return KeyResponse::Handled;
        }
        if command && key.is("s") {
            return KeyResponse::SaveRequested;
        }
        if key.key == "?" || (key.modifiers.shift && key.key == "/") {
            return KeyResponse::HelpRequested;
        }
        if command {
            return KeyResponse::Ignored;
        }
        if key.is("v") {
            self.set_mode(Mode::Select);
        } else if key.is("h") {
            self.set_mode(Mode::Pan);
        } else if key.is("r") {
            self.rotate_selected();
        } else if key.is("d") {
            self.duplicate_selected();
        } else {
            return KeyResponse::Ignored;
        }
        KeyResponse::Handled
    }

    // --- Commands ---

    /// Rotate the selected item a quarter turn (arrows reverse).
    pub fn rotate_selected(&mut self) -> bool {
        let Some(id) = self.selection().cloned() else {
            return false;
        };
        self.record();
        self.store.rotate_item(&id)
    }

    /// Duplicate the selected item and select the copy.
    pub fn duplicate_selected(&mut self) -> Option<ItemId> {
        let id = self.selection().cloned()?;
        self.record();
        let copy = self.store.duplicate_item(&id)?;
        self.select(Some(copy.clone()));
        Some(copy)
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection().cloned() else {
            return false;
        };
        self.record();
        self.store.delete_item(&id)
    }

    pub fn undo(&mut self) -> bool {
        self.finish_gesture();
        let done = self.history.undo(self.store.scene_mut());
        self.needs_redraw |= done;
        done
    }

    pub fn redo(&mut self) -> bool {
        self.finish_gesture();
        let done = self.history.redo(self.store.scene_mut());
        self.needs_redraw |= done;
        done
    }

    /// Empty the scene (undoable).
    pub fn clear_scene(&mut self) {
        self.record();
        self.store.clear();
    }

    /// Add a palette item at the snapped centre of the view and select it.
    pub fn add_from_palette(&mut self, entry: &PaletteEntry) -> ItemId {
        let center = snap_point(self.viewport.center(), self.snap_to_grid());
        let item = entry.build(center, &self.vehicle_color);
        let id = item.id().clone();
        self.record();
        self.store.add_item(item);
        self.select(Some(id.clone()));
        id
    }

    /// Replace the scene with a template (undoable).
    pub fn apply_template(&mut self, template: Template) {
        self.record();
        self.store.replace_scene(template.scene());
        self.store.set_selection(None);
        log::info!("Applied template {template}");
    }

    /// Set the palette vehicle colour. A selected vehicle is recoloured.
    pub fn set_vehicle_color(&mut self, color: &str) -> bool {
        self.vehicle_color = color.to_string();
        let Some(vehicle) = self.selected_item().and_then(Item::as_vehicle) else {
            return false;
        };
        if vehicle.color == color {
            return false;
        }
        let id = vehicle.id().clone();
        self.record();
        self.store.set_vehicle_color(&id, color)
    }

    /// Ask `prompt` for new text for a label and apply it.
    pub fn edit_text(&mut self, id: &ItemId, prompt: &mut dyn TextPrompt) -> bool {
        let Some(current) = self.scene().get(id).and_then(Item::as_text).map(|t| t.text.clone()) else {
            return false;
        };
        match prompt.prompt("Edit label", &current) {
            Some(text) => self.commit_text_edit(id, text),
            None => false,
        }
    }

    /// Replace a label's text (undoable). No-op for missing or non-text ids.
    pub fn commit_text_edit(&mut self, id: &ItemId, text: String) -> bool {
        if self.scene().get(id).and_then(Item::as_text).is_none() {
            return false;
        }
        self.record();
        self.store.set_text(id, text)
    }

    // --- Viewport ---

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.needs_redraw = true;
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.needs_redraw = true;
    }

    /// Zoom around a scene-space pivot.
    pub fn zoom_at(&mut self, factor: f64, center: Point) {
        self.viewport.zoom(factor, center);
        self.needs_redraw = true;
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
        self.needs_redraw = true;
    }

    // --- Persistence and sharing ---

    /// Save the scene to the local slot.
    pub async fn save_local(&self, storage: &dyn Storage) -> StorageResult<()> {
        storage.save(LOCAL_SLOT_KEY, self.scene()).await?;
        log::info!("Saved {} items to {LOCAL_SLOT_KEY}", self.scene().len());
        Ok(())
    }

    /// Replace the scene with the local slot (undoable).
    pub async fn load_local(&mut self, storage: &dyn Storage) -> LoadOutcome {
        match storage.load(LOCAL_SLOT_KEY).await {
            Ok(scene) => {
                let count = scene.len();
                self.record();
                self.store.replace_scene(scene);
                log::info!("Loaded {count} items from {LOCAL_SLOT_KEY}");
                LoadOutcome::Loaded(count)
            }
            Err(StorageError::NotFound(_)) => LoadOutcome::NothingSaved,
            Err(err) => {
                log::warn!("Could not load {LOCAL_SLOT_KEY}: {err}");
                LoadOutcome::Unreadable(err)
            }
        }
    }

    /// Fragment body (`s=<token>`) for the current scene.
    pub fn share_fragment(&self) -> Result<String, serde_json::Error> {
        share::encode_fragment(self.scene())
    }

    /// Full share link for the current scene.
    pub fn share_url(&self, base: &str) -> Result<String, serde_json::Error> {
        share::share_url(base, self.scene())
    }

    /// Import a scene from a URL fragment (undoable).
    ///
    /// Fragments without the share prefix are ignored. An unreadable token
    /// loads the bootstrap scene instead.
    pub fn import_fragment(&mut self, fragment: &str) -> ImportOutcome {
        if !share::is_share_fragment(fragment) {
            return ImportOutcome::NotShared;
        }
        let (scene, outcome) = match share::decode_fragment(fragment) {
            Ok(scene) => {
                let count = scene.len();
                log::info!("Scene loaded from URL ({count} items)");
                (scene, ImportOutcome::Imported(count))
            }
            Err(err) => {
                log::warn!("Failed to import scene from URL: {err}");
                (bootstrap_scene(), ImportOutcome::FellBackToDefault)
            }
        };
        self.record();
        self.store.replace_scene(scene);
        outcome
    }
}
