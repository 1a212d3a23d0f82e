//! End-to-end checks of the scene laws through the public API.

use kurbo::Point;
use trafficsketch_core::items::{Arrow, Sign, SignKind, Text, Tile, TileKind, Vehicle, VehicleKind};
use trafficsketch_core::{
    Editor, EditorConfig, History, ImportOutcome, Item, ItemId, ItemTrait, MAX_UNDO_HISTORY, Scene,
    SceneStore, bootstrap_scene, share,
};

fn add(store: &mut SceneStore, item: impl Into<Item>) -> ItemId {
    let item = item.into();
    let id = item.id().clone();
    store.add_item(item);
    id
}

#[test]
fn test_duplicate_scenario() {
    let mut store = SceneStore::default();
    add(&mut store, Tile::new(TileKind::Cross, Point::new(600.0, 400.0)));
    let car = add(&mut store, Vehicle::new(VehicleKind::Car, Point::new(560.0, 360.0), "#1f9cf0"));

    let copy = store.duplicate_item(&car).unwrap();

    assert_eq!(store.scene().len(), 3);
    assert_ne!(copy, car);
    assert_eq!(store.scene().get(&copy).unwrap().anchor(), Point::new(600.0, 400.0));
    assert!(store.scene().has_unique_ids());
}

#[test]
fn test_corrupted_token_falls_back_to_bootstrap() {
    let (editor, outcome) = Editor::from_fragment(EditorConfig::default(), Some("#s=eyJub3QiOi"));
    assert_eq!(outcome, ImportOutcome::FellBackToDefault);
    assert_eq!(editor.scene().len(), 3);

    let mut editor = Editor::default();
    assert_eq!(editor.import_fragment("#s=!!corrupt!!"), ImportOutcome::FellBackToDefault);
    assert_eq!(editor.scene().len(), bootstrap_scene().len());
}

#[test]
fn test_add_delete_keeps_exact_membership() {
    let mut store = SceneStore::default();
    let mut expected = Vec::new();
    for i in 0..20 {
        let id = add(&mut store, Tile::new(TileKind::Straight, Point::new(i as f64 * 40.0, 0.0)));
        expected.push(id);
    }
    for id in expected.iter().step_by(3) {
        assert!(store.delete_item(id));
    }
    expected = expected
        .into_iter()
        .enumerate()
        .filter(|(i, _)| i % 3 != 0)
        .map(|(_, id)| id)
        .collect();

    let ids: Vec<ItemId> = store.scene().iter().map(|item| item.id().clone()).collect();
    assert_eq!(ids, expected);
    assert!(store.scene().has_unique_ids());
}

#[test]
fn test_undo_redo_round_trip_law() {
    let mut store = SceneStore::default();
    let id = add(&mut store, Text::new("Note", Point::new(200.0, 200.0)));
    let mut history = History::new();

    let before = store.scene().clone();
    history.snapshot(store.scene());
    store.move_item(&id, 400.0, 400.0);
    store.rotate_item(&id);
    let after = store.scene().clone();

    let mut scene = store.scene().clone();
    assert!(history.undo(&mut scene));
    assert_eq!(scene, before);
    assert!(history.redo(&mut scene));
    assert_eq!(scene, after);
}

#[test]
fn test_history_capacity() {
    let mut history = History::new();
    let scene = Scene::new();
    for _ in 0..=MAX_UNDO_HISTORY {
        history.snapshot(&scene);
    }
    assert_eq!(history.undo_len(), MAX_UNDO_HISTORY);
}

#[test]
fn test_rotation_cycle_laws() {
    let mut store = SceneStore::default();
    let tile = add(&mut store, Tile::new(TileKind::Curve, Point::ZERO));
    let arrow = add(&mut store, Arrow::new(Point::new(0.0, 0.0), Point::new(80.0, 40.0)));
    let before = store.scene().clone();

    for _ in 0..4 {
        store.rotate_item(&tile);
    }
    store.rotate_item(&arrow);
    match store.scene().get(&arrow).unwrap() {
        Item::Arrow(a) => assert_eq!(a.start(), Point::new(80.0, 40.0)),
        other => panic!("expected arrow, got {other:?}"),
    }
    store.rotate_item(&arrow);

    assert_eq!(store.scene(), &before);
}

#[test]
fn test_move_snapping_law() {
    let mut store = SceneStore::default();
    let id = add(&mut store, Sign::new(SignKind::Stop, Point::ZERO));
    for (x, y) in [(13.0, 27.0), (-61.0, 99.9), (1234.5, -0.4)] {
        store.move_item(&id, x, y);
        let p = store.scene().get(&id).unwrap().anchor();
        assert_eq!(p.x % 40.0, 0.0);
        assert_eq!(p.y % 40.0, 0.0);
    }

    store.set_snap_to_grid(false);
    store.move_item(&id, 13.25, -7.5);
    assert_eq!(store.scene().get(&id).unwrap().anchor(), Point::new(13.25, -7.5));
}

#[test]
fn test_stale_selection_is_no_selection() {
    let mut editor = Editor::with_scene(EditorConfig::default(), bootstrap_scene());
    let id = editor.scene().items()[1].id().clone();
    editor.select(Some(id));
    assert!(editor.delete_selected());

    assert!(editor.selection().is_none());
    assert!(editor.selected_item().is_none());
    assert!(!editor.rotate_selected());
    assert!(editor.duplicate_selected().is_none());
}

#[test]
fn test_share_and_storage_round_trip_preserve_ids() {
    let scene = bootstrap_scene();
    let fragment = share::encode_fragment(&scene).unwrap();
    let decoded = share::decode_fragment(&fragment).unwrap();
    assert_eq!(decoded, scene);

    let json = scene.to_json().unwrap();
    assert_eq!(Scene::from_json(&json).unwrap(), scene);
}

#[test]
fn test_selected_item_painted_last() {
    let mut editor = Editor::with_scene(EditorConfig::default(), bootstrap_scene());
    let tile = editor.scene().items()[0].id().clone();
    editor.select(Some(tile.clone()));
    let order = editor.render_order();
    assert_eq!(order.last().unwrap().id(), &tile);
}
