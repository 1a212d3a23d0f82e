//! Item catalog for the scene.
//!
//! Every placed object is an [`Item`]: a closed sum over tiles, vehicles,
//! signs, text labels and arrows. Constructors never fail and never touch
//! the scene; subtype names that are not part of the catalog are kept
//! verbatim so they survive a save/load round trip.

mod arrow;
mod sign;
mod text;
mod tile;
mod vehicle;

pub use arrow::Arrow;
pub use sign::{Sign, SignKind};
pub use text::{DEFAULT_TEXT, Text};
pub use tile::{Tile, TileKind};
pub use vehicle::{DEFAULT_VEHICLE_COLOR, Vehicle, VehicleKind};

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for items.
///
/// Identifiers are opaque strings so that scenes written by older builds
/// (which used short random tokens) load with their ids intact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Discriminant of an [`Item`], used for paint layering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Tile,
    Vehicle,
    Sign,
    Text,
    Arrow,
}

impl ItemKind {
    /// Paint layer: lower layers are drawn first.
    ///
    /// Signs share the tile layer.
    pub fn layer(self) -> u8 {
        match self {
            ItemKind::Tile | ItemKind::Sign => 0,
            ItemKind::Vehicle => 1,
            ItemKind::Text => 2,
            ItemKind::Arrow => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Tile => "tile",
            ItemKind::Vehicle => "vehicle",
            ItemKind::Sign => "sign",
            ItemKind::Text => "text",
            ItemKind::Arrow => "arrow",
        }
    }
}

/// Normalize an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

/// Read a stored rotation, folding it into `[0, 360)`.
pub(crate) fn deserialize_rotation<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    f64::deserialize(deserializer).map(normalize_degrees)
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    point.distance(proj)
}

/// Common behaviour of every item variant.
pub trait ItemTrait {
    /// Get the unique identifier.
    fn id(&self) -> &ItemId;

    /// Replace the identifier (used when duplicating).
    fn set_id(&mut self, id: ItemId);

    /// Anchor point: the position for placed items, the start point for arrows.
    fn anchor(&self) -> Point;

    /// Move the item so its anchor lands on `anchor`, applying `snap` to
    /// every stored coordinate.
    fn move_anchor(&mut self, anchor: Point, snap: &dyn Fn(f64) -> f64);

    /// Advance the item by one rotation step.
    fn rotate_step(&mut self);

    /// Bounding box in scene coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in scene coordinates) hits this item.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;
}

/// Footprint-based hit test for items placed at a position with a rotation.
fn hit_test_placed(local: Rect, position: Point, rotation: f64, point: Point, tolerance: f64) -> bool {
    if local.area() <= 0.0 {
        return false;
    }
    let to_local = placement_transform(position, rotation).inverse();
    local.inflate(tolerance, tolerance).contains(to_local * point)
}

/// Transform from item-local coordinates to scene coordinates.
pub fn placement_transform(position: Point, rotation: f64) -> Affine {
    Affine::translate(position.to_vec2()) * Affine::rotate(rotation.to_radians())
}

/// One placed object in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    Tile(Tile),
    Vehicle(Vehicle),
    Sign(Sign),
    Text(Text),
    Arrow(Arrow),
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Tile(_) => ItemKind::Tile,
            Item::Vehicle(_) => ItemKind::Vehicle,
            Item::Sign(_) => ItemKind::Sign,
            Item::Text(_) => ItemKind::Text,
            Item::Arrow(_) => ItemKind::Arrow,
        }
    }

    /// Rotation in degrees; `None` for arrows.
    pub fn rotation(&self) -> Option<f64> {
        match self {
            Item::Tile(t) => Some(t.rotation),
            Item::Vehicle(v) => Some(v.rotation),
            Item::Sign(s) => Some(s.rotation),
            Item::Text(t) => Some(t.rotation),
            Item::Arrow(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Item::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_vehicle(&self) -> Option<&Vehicle> {
        match self {
            Item::Vehicle(v) => Some(v),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn ItemTrait {
        match self {
            Item::Tile(t) => t,
            Item::Vehicle(v) => v,
            Item::Sign(s) => s,
            Item::Text(t) => t,
            Item::Arrow(a) => a,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ItemTrait {
        match self {
            Item::Tile(t) => t,
            Item::Vehicle(v) => v,
            Item::Sign(s) => s,
            Item::Text(t) => t,
            Item::Arrow(a) => a,
        }
    }
}

impl ItemTrait for Item {
    fn id(&self) -> &ItemId {
        self.inner().id()
    }

    fn set_id(&mut self, id: ItemId) {
        self.inner_mut().set_id(id);
    }

    fn anchor(&self) -> Point {
        self.inner().anchor()
    }

    fn move_anchor(&mut self, anchor: Point, snap: &dyn Fn(f64) -> f64) {
        self.inner_mut().move_anchor(anchor, snap);
    }

    fn rotate_step(&mut self) {
        self.inner_mut().rotate_step();
    }

    fn bounds(&self) -> Rect {
        self.inner().bounds()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.inner().hit_test(point, tolerance)
    }
}

impl From<Tile> for Item {
    fn from(value: Tile) -> Self {
        Item::Tile(value)
    }
}

impl From<Vehicle> for Item {
    fn from(value: Vehicle) -> Self {
        Item::Vehicle(value)
    }
}

impl From<Sign> for Item {
    fn from(value: Sign) -> Self {
        Item::Sign(value)
    }
}

impl From<Text> for Item {
    fn from(value: Text) -> Self {
        Item::Text(value)
    }
}

impl From<Arrow> for Item {
    fn from(value: Arrow) -> Self {
        Item::Arrow(value)
    }
}
