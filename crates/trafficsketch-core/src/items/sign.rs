//! Standalone road signs.

use super::{ItemId, ItemTrait, hit_test_placed, normalize_degrees, placement_transform};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Sign template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignKind {
    Stop,
    TrafficLight,
    Unknown(String),
}

impl SignKind {
    pub const ALL: [SignKind; 2] = [SignKind::Stop, SignKind::TrafficLight];

    pub fn as_str(&self) -> &str {
        match self {
            SignKind::Stop => "stop",
            SignKind::TrafficLight => "traffic-light",
            SignKind::Unknown(name) => name,
        }
    }

    pub fn footprint(&self) -> Rect {
        match self {
            SignKind::Stop => Rect::new(-24.0, -24.0, 24.0, 24.0),
            SignKind::TrafficLight => Rect::new(-12.0, -35.0, 12.0, 35.0),
            SignKind::Unknown(_) => Rect::ZERO,
        }
    }
}

impl From<String> for SignKind {
    fn from(value: String) -> Self {
        SignKind::ALL
            .iter()
            .find(|kind| kind.as_str() == value)
            .cloned()
            .unwrap_or(SignKind::Unknown(value))
    }
}

impl From<SignKind> for String {
    fn from(value: SignKind) -> Self {
        match value {
            SignKind::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// A sign placed in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sign {
    pub(crate) id: ItemId,
    pub subtype: SignKind,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "rot", default, deserialize_with = "super::deserialize_rotation")]
    pub rotation: f64,
}

impl Sign {
    pub fn new(subtype: SignKind, position: Point) -> Self {
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

impl ItemTrait for Sign {
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
