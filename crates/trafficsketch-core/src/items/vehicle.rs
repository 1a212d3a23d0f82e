//! Vehicles.

use super::{ItemId, ItemTrait, hit_test_placed, normalize_degrees, placement_transform};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Body colour used when none is stored.
pub const DEFAULT_VEHICLE_COLOR: &str = "#1f9cf0";

fn default_color() -> String {
    DEFAULT_VEHICLE_COLOR.to_string()
}

/// Vehicle class; selects the body size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VehicleKind {
    Car,
    Suv,
    Truck,
    Semi,
    /// Unrecognised class, drawn with the car body.
    Unknown(String),
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 4] = [
        VehicleKind::Car,
        VehicleKind::Suv,
        VehicleKind::Truck,
        VehicleKind::Semi,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            VehicleKind::Car => "car",
            VehicleKind::Suv => "suv",
            VehicleKind::Truck => "truck",
            VehicleKind::Semi => "semi",
            VehicleKind::Unknown(name) => name,
        }
    }

    /// Body size in scene units.
    pub fn body_size(&self) -> Size {
        match self {
            VehicleKind::Suv => Size::new(66.0, 36.0),
            VehicleKind::Truck => Size::new(90.0, 36.0),
            VehicleKind::Semi => Size::new(130.0, 38.0),
            VehicleKind::Car | VehicleKind::Unknown(_) => Size::new(60.0, 32.0),
        }
    }

    /// Corner radius of the body.
    pub fn corner_radius(&self) -> f64 {
        match self {
            VehicleKind::Suv => 7.0,
            _ => 6.0,
        }
    }
}

impl From<String> for VehicleKind {
    fn from(value: String) -> Self {
        VehicleKind::ALL
            .iter()
            .find(|kind| kind.as_str() == value)
            .cloned()
            .unwrap_or(VehicleKind::Unknown(value))
    }
}

impl From<VehicleKind> for String {
    fn from(value: VehicleKind) -> Self {
        match value {
            VehicleKind::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// A vehicle placed in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub(crate) id: ItemId,
    pub subtype: VehicleKind,
    /// Body colour as a hex string (`#rrggbb`).
    #[serde(default = "default_color")]
    pub color: String,
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees.
    #[serde(rename = "rot", default, deserialize_with = "super::deserialize_rotation")]
    pub rotation: f64,
}

impl Vehicle {
    /// Create a new vehicle with a fresh id and no rotation.
    pub fn new(subtype: VehicleKind, position: Point, color: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            subtype,
            color: color.into(),
            x: position.x,
            y: position.y,
            rotation: 0.0,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn footprint(&self) -> Rect {
        Rect::from_center_size(Point::ZERO, self.subtype.body_size())
    }
}

impl ItemTrait for Vehicle {
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
        placement_transform(self.position(), self.rotation).transform_rect_bbox(self.footprint())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        hit_test_placed(self.footprint(), self.position(), self.rotation, point, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_sizes() {
        assert_eq!(VehicleKind::Car.body_size(), Size::new(60.0, 32.0));
        assert_eq!(VehicleKind::Semi.body_size(), Size::new(130.0, 38.0));
        assert_eq!(VehicleKind::Unknown("tank".into()).body_size(), Size::new(60.0, 32.0));
    }

    #[test]
    fn test_missing_color_defaults() {
        let json = r#"{"id":"a","subtype":"car","x":1,"y":2}"#;
        let vehicle: Vehicle = serde_json::from_str(json).unwrap();
        assert_eq!(vehicle.color, DEFAULT_VEHICLE_COLOR);
        assert!(vehicle.rotation.abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds_rotate_with_vehicle() {
        let mut truck = Vehicle::new(VehicleKind::Truck, Point::new(100.0, 100.0), "#f59e0b");
        assert!((truck.bounds().width() - 90.0).abs() < 1e-9);
        truck.rotate_step();
        assert!((truck.bounds().width() - 36.0).abs() < 1e-9);
        assert!((truck.bounds().height() - 90.0).abs() < 1e-9);
    }
}
