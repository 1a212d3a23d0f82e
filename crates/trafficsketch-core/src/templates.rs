//! Palette entries, prefab templates and the bootstrap scene.

use crate::items::{
    Arrow, DEFAULT_TEXT, Item, Sign, SignKind, Text, Tile, TileKind, Vehicle, VehicleKind,
};
use crate::scene::Scene;
use kurbo::{Point, Vec2};
use std::fmt;
use std::str::FromStr;

/// Blue used for cars in templates.
const BLUE: &str = "#1f9cf0";
const AMBER: &str = "#f59e0b";
const GREEN: &str = "#10b981";
const RED: &str = "#ef4444";

/// Offsets of a palette arrow's endpoints from the placement centre.
const ARROW_START_OFFSET: Vec2 = Vec2::new(-80.0, -40.0);
const ARROW_END_OFFSET: Vec2 = Vec2::new(40.0, 20.0);

/// Something the user can tap in the palette to add to the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteEntry {
    Tile(TileKind),
    Vehicle(VehicleKind),
    Sign(SignKind),
    Text,
    Arrow,
}

impl PaletteEntry {
    /// Every entry in the palette, in display order.
    pub fn all() -> Vec<PaletteEntry> {
        let mut entries: Vec<PaletteEntry> = TileKind::ALL.iter().cloned().map(PaletteEntry::Tile).collect();
        entries.extend(VehicleKind::ALL.iter().cloned().map(PaletteEntry::Vehicle));
        entries.extend(SignKind::ALL.iter().cloned().map(PaletteEntry::Sign));
        entries.push(PaletteEntry::Text);
        entries.push(PaletteEntry::Arrow);
        entries
    }

    /// Build a new item for this entry centred on `center`.
    ///
    /// `center` is expected to be already snapped. Vehicles take
    /// `vehicle_color`.
    pub fn build(&self, center: Point, vehicle_color: &str) -> Item {
        match self {
            PaletteEntry::Tile(kind) => Tile::new(kind.clone(), center).into(),
            PaletteEntry::Vehicle(kind) => Vehicle::new(kind.clone(), center, vehicle_color).into(),
            PaletteEntry::Sign(kind) => Sign::new(kind.clone(), center).into(),
            PaletteEntry::Text => Text::new(DEFAULT_TEXT, center).into(),
            PaletteEntry::Arrow => Arrow::new(center + ARROW_START_OFFSET, center + ARROW_END_OFFSET).into(),
        }
    }
}

impl fmt::Display for PaletteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteEntry::Tile(kind) => write!(f, "tile:{}", kind.as_str()),
            PaletteEntry::Vehicle(kind) => write!(f, "vehicle:{}", kind.as_str()),
            PaletteEntry::Sign(kind) => write!(f, "sign:{}", kind.as_str()),
            PaletteEntry::Text => f.write_str("label:text"),
            PaletteEntry::Arrow => f.write_str("label:arrow"),
        }
    }
}

/// Parses `type:subtype`, e.g. `tile:cross`, `vehicle:semi`, `label:arrow`.
///
/// Unknown subtypes are accepted and kept verbatim.
impl FromStr for PaletteEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, subtype) = s
            .split_once(':')
            .ok_or_else(|| format!("expected type:subtype, got {s:?}"))?;
        let subtype = subtype.to_string();
        match kind {
            "tile" => Ok(PaletteEntry::Tile(subtype.into())),
            "vehicle" => Ok(PaletteEntry::Vehicle(subtype.into())),
            "sign" => Ok(PaletteEntry::Sign(subtype.into())),
            "label" | "text" | "arrow" => match subtype.as_str() {
                "text" => Ok(PaletteEntry::Text),
                "arrow" => Ok(PaletteEntry::Arrow),
                other => Err(format!("unknown label: {other}")),
            },
            other => Err(format!("unknown palette type: {other}")),
        }
    }
}

/// Prefab scenes that replace the current scene wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    FourWay,
    TJunction,
    Merge,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::FourWay, Template::TJunction, Template::Merge];

    pub fn name(self) -> &'static str {
        match self {
            Template::FourWay => "4way",
            Template::TJunction => "tjunction",
            Template::Merge => "merge",
        }
    }

    /// Build a fresh scene for this template. Every call yields new ids.
    pub fn scene(self) -> Scene {
        let items: Vec<Item> = match self {
            Template::FourWay => vec![
                Tile::new(TileKind::Cross, Point::new(600.0, 400.0)).into(),
                Vehicle::new(VehicleKind::Car, Point::new(560.0, 360.0), BLUE).into(),
                Vehicle::new(VehicleKind::Truck, Point::new(640.0, 440.0), AMBER).into(),
                Arrow::new(Point::new(520.0, 360.0), Point::new(600.0, 360.0)).into(),
                Text::new("Yield to right", Point::new(600.0, 300.0)).into(),
            ],
            Template::TJunction => vec![
                Tile::new(TileKind::T, Point::new(600.0, 420.0)).into(),
                Vehicle::new(VehicleKind::Suv, Point::new(600.0, 520.0), GREEN).into(),
                Text::new("Stop then proceed when clear", Point::new(600.0, 300.0)).into(),
                Arrow::new(Point::new(600.0, 500.0), Point::new(600.0, 460.0)).into(),
            ],
            Template::Merge => vec![
                Tile::new(TileKind::Merge, Point::new(600.0, 400.0)).into(),
                Vehicle::new(VehicleKind::Semi, Point::new(520.0, 400.0), RED).into(),
                Vehicle::new(VehicleKind::Car, Point::new(660.0, 400.0), BLUE).into(),
                Text::new("Zipper merge", Point::new(600.0, 300.0)).into(),
            ],
        };
        Scene::from_items(items)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown template: {s}"))
    }
}

/// Scene shown on first launch and when a shared link cannot be read.
pub fn bootstrap_scene() -> Scene {
    Scene::from_items(vec![
        Tile::new(TileKind::Cross, Point::new(600.0, 400.0)).into(),
        Vehicle::new(VehicleKind::Car, Point::new(560.0, 360.0), BLUE).into(),
        Vehicle::new(VehicleKind::Truck, Point::new(640.0, 440.0), AMBER).into(),
    ])
}
