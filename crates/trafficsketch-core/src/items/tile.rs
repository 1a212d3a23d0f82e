//! Road tiles.

use super::{ItemId, ItemTrait, hit_test_placed, normalize_degrees, placement_transform};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Road tile template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TileKind {
    Straight,
    Curve,
    T,
    Cross,
    Merge,
    Freeway,
    Roundabout,
    Signals,
    Stops,
    Crosswalk,
    MultilaneSignals,
    Multilane4Way,
    TwoWayStraight,
    TwoWayCurve,
    TwoWayCross,
    /// A subtype this build does not know; kept verbatim and drawn as nothing.
    Unknown(String),
}

impl TileKind {
    /// All known tile templates, in palette order.
    pub const ALL: [TileKind; 15] = [
        TileKind::Straight,
        TileKind::Curve,
        TileKind::T,
        TileKind::Cross,
        TileKind::Merge,
        TileKind::Freeway,
        TileKind::Roundabout,
        TileKind::Signals,
        TileKind::Stops,
        TileKind::Crosswalk,
        TileKind::MultilaneSignals,
        TileKind::Multilane4Way,
        TileKind::TwoWayStraight,
        TileKind::TwoWayCurve,
        TileKind::TwoWayCross,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            TileKind::Straight => "straight",
            TileKind::Curve => "curve",
            TileKind::T => "t",
            TileKind::Cross => "cross",
            TileKind::Merge => "merge",
            TileKind::Freeway => "freeway",
            TileKind::Roundabout => "roundabout",
            TileKind::Signals => "signals",
            TileKind::Stops => "stops",
            TileKind::Crosswalk => "crosswalk",
            TileKind::MultilaneSignals => "multilane-signals",
            TileKind::Multilane4Way => "multilane-4way",
            TileKind::TwoWayStraight => "two-way-straight",
            TileKind::TwoWayCurve => "two-way-curve",
            TileKind::TwoWayCross => "two-way-cross",
            TileKind::Unknown(name) => name,
        }
    }

    /// Area covered by the template, centred on the tile position.
    pub fn footprint(&self) -> Rect {
        match self {
            TileKind::Straight | TileKind::TwoWayStraight => Rect::new(-100.0, -40.0, 100.0, 40.0),
            // Quarter arc of radius 140 with an 80-wide road
            TileKind::Curve | TileKind::TwoWayCurve => Rect::new(-180.0, -180.0, 40.0, 40.0),
            TileKind::T => Rect::new(-100.0, -140.0, 100.0, 40.0),
            TileKind::Cross | TileKind::Signals | TileKind::TwoWayCross => {
                Rect::new(-120.0, -120.0, 120.0, 120.0)
            }
            TileKind::Merge => Rect::new(-160.0, -40.0, 120.0, 40.0),
            TileKind::Freeway => Rect::new(-200.0, -70.0, 200.0, 70.0),
            TileKind::Roundabout => Rect::new(-160.0, -160.0, 160.0, 160.0),
            TileKind::Stops => Rect::new(-170.0, -170.0, 170.0, 170.0),
            TileKind::Crosswalk => Rect::new(-160.0, -40.0, 160.0, 40.0),
            TileKind::MultilaneSignals | TileKind::Multilane4Way => {
                Rect::new(-200.0, -200.0, 200.0, 200.0)
            }
            TileKind::Unknown(_) => Rect::ZERO,
        }
    }
}

impl From<String> for TileKind {
    fn from(value: String) -> Self {
        TileKind::ALL
            .iter()
            .find(|kind| kind.as_str() == value)
            .cloned()
            .unwrap_or(TileKind::Unknown(value))
    }
}

impl From<TileKind> for String {
    fn from(value: TileKind) -> Self {
        match value {
            TileKind::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// A road tile placed in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub(crate) id: ItemId,
    pub subtype: TileKind,
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees.
    #[serde(rename = "rot", default, deserialize_with = "super::deserialize_rotation")]
    pub rotation: f64,
}

impl Tile {
    /// Create a new tile with a fresh id and no rotation.
    pub fn new(subtype: TileKind, position: Point) -> Self {
        Self {
            id: ItemId::new(),
            subtype,
            x: position.x,
            y: position.y,
            rotation: 0.0,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl ItemTrait for Tile {
    fn id(&self) -> &ItemId {
        &self.id
    }

    fn set_id(&mut self, id: ItemId) {
        self.id = id;
    }

    fn anchor(&self) -> Point {
        self.position()
    }

    fn move_anchor(&mut self, anchor: Point, snap: &dyn Fn(f64) -> f64) {
        self.x = snap(anchor.x);
        self.y = snap(anchor.y);
    }

    fn rotate_step(&mut self) {
        self.rotation = normalize_degrees(self.rotation + 90.0);
    }

    fn bounds(&self) -> Rect {
        placement_transform(self.position(), self.rotation).transform_rect_bbox(self.subtype.footprint())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        hit_test_placed(self.subtype.footprint(), self.position(), self.rotation, point, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in TileKind::ALL {
            let name: String = kind.clone().into();
            assert_eq!(TileKind::from(name), kind);
        }
    }

    #[test]
    fn test_unknown_subtype_preserved() {
        let kind = TileKind::from("hyperloop".to_string());
        assert_eq!(kind, TileKind::Unknown("hyperloop".to_string()));
        assert_eq!(String::from(kind), "hyperloop");
    }

    #[test]
    fn test_unknown_subtype_is_not_hittable() {
        let tile = Tile::new(TileKind::Unknown("x".into()), Point::new(10.0, 10.0));
        assert!(!tile.hit_test(Point::new(10.0, 10.0), 0.0));
    }

    #[test]
    fn test_hit_test_follows_rotation() {
        let mut tile = Tile::new(TileKind::Straight, Point::new(0.0, 0.0));
        assert!(tile.hit_test(Point::new(90.0, 0.0), 0.0));
        assert!(!tile.hit_test(Point::new(0.0, 90.0), 0.0));

        tile.rotate_step();
        assert!(!tile.hit_test(Point::new(90.0, 0.0), 0.0));
        assert!(tile.hit_test(Point::new(0.0, 90.0), 0.0));
    }

    #[test]
    fn test_rotation_cycle() {
        let mut tile = Tile::new(TileKind::Cross, Point::ZERO);
        for _ in 0..4 {
            tile.rotate_step();
        }
        assert!(tile.rotation.abs() < f64::EPSILON);
    }
}
