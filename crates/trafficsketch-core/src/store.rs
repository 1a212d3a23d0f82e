//! Scene store: the scene plus the selection pointer.
//!
//! Every mutating operation here is a single atomic transition. History is
//! not touched; callers snapshot first so that intermediate updates during a
//! drag do not each produce an undo entry.

use crate::items::{Item, ItemId, ItemTrait};
use crate::scene::Scene;
use crate::snap::{GRID_SIZE, snap_coord};
use kurbo::{Point, Vec2};

/// Owns the scene and the current selection.
#[derive(Debug, Clone)]
pub struct SceneStore {
    scene: Scene,
    /// Selected item id. May be stale; see [`SceneStore::selection`].
    selection: Option<ItemId>,
    snap_to_grid: bool,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new(Scene::new())
    }
}

impl SceneStore {
    /// Create a store around a scene, with snapping enabled.
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            selection: None,
            snap_to_grid: true,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Replace the whole scene (load, import, undo, template).
    pub fn replace_scene(&mut self, scene: Scene) {
        self.scene = scene;
    }

    pub(crate) fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn snap_to_grid(&self) -> bool {
        self.snap_to_grid
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.snap_to_grid = enabled;
    }

    /// Snap a coordinate according to the current setting.
    pub fn snap(&self, value: f64) -> f64 {
        snap_coord(value, self.snap_to_grid)
    }

    pub fn add_item(&mut self, item: Item) {
        self.scene.add_item(item);
    }

    /// Move an item's anchor to `(x, y)`, snapping if enabled.
    ///
    /// For arrows the anchor is the start point; the end point follows.
    /// Returns false if the id is unknown or the target is not finite.
    pub fn move_item(&mut self, id: &ItemId, x: f64, y: f64) -> bool {
        if !(x.is_finite() && y.is_finite()) {
            log::warn!("Refusing to move {id} to ({x}, {y})");
            return false;
        }
        let snap_enabled = self.snap_to_grid;
        let Some(item) = self.scene.get_mut(id) else {
            return false;
        };
        item.move_anchor(Point::new(x, y), &|v| snap_coord(v, snap_enabled));
        true
    }

    /// Rotate an item by a quarter turn, or reverse it if it is an arrow.
    pub fn rotate_item(&mut self, id: &ItemId) -> bool {
        match self.scene.get_mut(id) {
            Some(item) => {
                item.rotate_step();
                true
            }
            None => false,
        }
    }

    /// Copy an item under a fresh id, offset by one grid unit on both axes.
    ///
    /// Returns the id of the copy.
    pub fn duplicate_item(&mut self, id: &ItemId) -> Option<ItemId> {
        let mut copy = self.scene.get(id)?.clone();
        let new_id = ItemId::new();
        copy.set_id(new_id.clone());
        let target = copy.anchor() + Vec2::new(GRID_SIZE, GRID_SIZE);
        let snap_enabled = self.snap_to_grid;
        copy.move_anchor(target, &|v| snap_coord(v, snap_enabled));
        self.scene.add_item(copy);
        Some(new_id)
    }

    /// Delete an item, clearing the selection if it pointed at it.
    pub fn delete_item(&mut self, id: &ItemId) -> bool {
        if self.selection.as_ref() == Some(id) {
            self.selection = None;
        }
        self.scene.remove_item(id).is_some()
    }

    /// Set or clear the selection. Existence is not checked here.
    pub fn set_selection(&mut self, id: Option<ItemId>) {
        self.selection = id;
    }

    /// The selected id, or `None` if nothing is selected or the id no
    /// longer names an item in the scene.
    pub fn selection(&self) -> Option<&ItemId> {
        self.selection.as_ref().filter(|id| self.scene.contains(id))
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.selection.as_ref().and_then(|id| self.scene.get(id))
    }

    /// Replace the payload of a text item. No-op for other kinds.
    pub fn set_text(&mut self, id: &ItemId, text: String) -> bool {
        match self.scene.get_mut(id) {
            Some(Item::Text(label)) => {
                label.text = text;
                true
            }
            _ => false,
        }
    }

    /// Recolour a vehicle. No-op for other kinds.
    pub fn set_vehicle_color(&mut self, id: &ItemId, color: &str) -> bool {
        match self.scene.get_mut(id) {
            Some(Item::Vehicle(vehicle)) => {
                vehicle.color = color.to_string();
                true
            }
            _ => false,
        }
    }

    /// Empty the scene and clear the selection.
    pub fn clear(&mut self) {
        self.scene.clear();
        self.selection = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{Arrow, Text, Tile, TileKind, Vehicle, VehicleKind};

    fn store_with(item: impl Into<Item>) -> (SceneStore, ItemId) {
        let item = item.into();
        let id = item.id().clone();
        let mut store = SceneStore::default();
        store.add_item(item);
        (store, id)
    }

    #[test]
    fn test_move_snaps_when_enabled() {
        let (mut store, id) = store_with(Tile::new(TileKind::Straight, Point::ZERO));
        assert!(store.move_item(&id, 57.0, 101.0));
        let item = store.scene().get(&id).unwrap();
        assert_eq!(item.anchor(), Point::new(40.0, 120.0));
    }

    #[test]
    fn test_move_exact_when_disabled() {
        let (mut store, id) = store_with(Tile::new(TileKind::Straight, Point::ZERO));
        store.set_snap_to_grid(false);
        store.move_item(&id, 57.5, 101.25);
        assert_eq!(store.scene().get(&id).unwrap().anchor(), Point::new(57.5, 101.25));
    }

    #[test]
    fn test_move_unknown_id_is_noop() {
        let (mut store, _) = store_with(Tile::new(TileKind::Straight, Point::ZERO));
        let before = store.scene().clone();
        assert!(!store.move_item(&ItemId::from("missing"), 10.0, 10.0));
        assert_eq!(store.scene(), &before);
    }

    #[test]
    fn test_move_to_non_finite_is_refused() {
        let (mut store, id) = store_with(Arrow::new(Point::new(40.0, 40.0), Point::new(120.0, 40.0)));
        let before = store.scene().clone();
        assert!(!store.move_item(&id, f64::NAN, 10.0));
        assert!(!store.move_item(&id, 10.0, f64::NEG_INFINITY));
        assert_eq!(store.scene(), &before);
    }

    #[test]
    fn test_rotate_cycles() {
        let (mut store, id) = store_with(Vehicle::new(VehicleKind::Car, Point::ZERO, "#000"));
        for expected in [90.0, 180.0, 270.0, 0.0] {
            store.rotate_item(&id);
            let rot = store.scene().get(&id).unwrap().rotation().unwrap();
            assert!((rot - expected).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_duplicate_offsets_and_renames() {
        let (mut store, id) = store_with(Vehicle::new(VehicleKind::Car, Point::new(560.0, 360.0), "#1f9cf0"));
        let copy_id = store.duplicate_item(&id).unwrap();
        assert_ne!(copy_id, id);
        assert_eq!(store.scene().len(), 2);
        let copy = store.scene().get(&copy_id).unwrap();
        assert_eq!(copy.anchor(), Point::new(600.0, 400.0));
        assert_eq!(copy.as_vehicle().unwrap().color, "#1f9cf0");
    }

    #[test]
    fn test_duplicate_arrow_moves_both_ends() {
        let (mut store, id) = store_with(Arrow::new(Point::new(520.0, 360.0), Point::new(600.0, 360.0)));
        let copy_id = store.duplicate_item(&id).unwrap();
        match store.scene().get(&copy_id).unwrap() {
            Item::Arrow(arrow) => {
                assert_eq!(arrow.start(), Point::new(560.0, 400.0));
                assert_eq!(arrow.end(), Point::new(640.0, 400.0));
            }
            other => panic!("expected arrow, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_missing_is_none() {
        let mut store = SceneStore::default();
        assert!(store.duplicate_item(&ItemId::from("nope")).is_none());
        assert!(store.scene().is_empty());
    }

    #[test]
    fn test_delete_clears_selection() {
        let (mut store, id) = store_with(Text::new("hi", Point::ZERO));
        store.set_selection(Some(id.clone()));
        assert!(store.delete_item(&id));
        assert!(store.selection().is_none());
        assert!(!store.delete_item(&id));
    }

    #[test]
    fn test_stale_selection_reads_as_none() {
        let mut store = SceneStore::default();
        store.set_selection(Some(ItemId::from("ghost")));
        assert!(store.selection().is_none());
        assert!(store.selected_item().is_none());
    }

    #[test]
    fn test_set_text_only_on_labels() {
        let (mut store, id) = store_with(Tile::new(TileKind::Cross, Point::ZERO));
        assert!(!store.set_text(&id, "x".into()));
        let label = Text::new("Note", Point::ZERO);
        let label_id = label.id.clone();
        store.add_item(label.into());
        assert!(store.set_text(&label_id, "Yield".into()));
        assert_eq!(store.scene().get(&label_id).unwrap().as_text().unwrap().text, "Yield");
    }

    #[test]
    fn test_clear() {
        let (mut store, id) = store_with(Tile::new(TileKind::Cross, Point::ZERO));
        store.set_selection(Some(id));
        store.clear();
        assert!(store.scene().is_empty());
        assert!(store.selection().is_none());
    }
}
