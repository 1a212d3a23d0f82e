//! Item drawing catalog.
//!
//! Pure projection from scene data to a display list of filled and stroked
//! paths in scene coordinates. Nothing here reads or writes editor state.
//! Unknown subtypes produce an empty list.

use kurbo::{
    Affine, Arc, BezPath, Cap, Circle, Join, Line, Point, Rect, RoundedRect, Shape, Stroke, Vec2,
};
use peniko::Color;
use std::f64::consts::{FRAC_PI_2, PI};
use trafficsketch_core::items::{
    Arrow, Item, ItemTrait, Sign, SignKind, Text, Tile, TileKind, Vehicle, VehicleKind,
    placement_transform,
};

/// Flattening tolerance for curves, in scene units.
pub const TOLERANCE: f64 = 0.1;

const ROAD: Color = Color::from_rgba8(0x2b, 0x2f, 0x3f, 255);
const LANE: Color = Color::from_rgba8(0xdf, 0xe6, 0xff, 255);
const CENTER_LINE: Color = Color::from_rgba8(0xfb, 0xbf, 0x24, 255);
const ISLAND: Color = Color::from_rgba8(0x0b, 0x0d, 0x14, 255);
const ZEBRA: Color = Color::from_rgba8(0xed, 0xf2, 0xff, 255);
const STOP_RED: Color = Color::from_rgba8(0xef, 0x44, 0x44, 255);
const LIGHT_GREEN: Color = Color::from_rgba8(0x22, 0xc5, 0x5e, 255);
const LIGHT_AMBER: Color = Color::from_rgba8(0xf5, 0x9e, 0x0b, 255);
const OUTLINE: Color = Color::from_rgba8(0x11, 0x11, 0x11, 255);
const POLE: Color = Color::from_rgba8(0x4a, 0x55, 0x68, 255);
const HOUSING: Color = Color::from_rgba8(0x2d, 0x37, 0x48, 255);
const BODY_OUTLINE: Color = Color::from_rgba8(0x0a, 0x0a, 0x0a, 255);
const WINDSHIELD: Color = Color::from_rgba8(0xe0, 0xf2, 0xff, 255);
const PLATE_FILL: Color = Color::from_rgba8(0x0e, 0x13, 0x22, 255);
const PLATE_EDGE: Color = Color::from_rgba8(0x2a, 0x30, 0x45, 255);
const ARROW_COLOR: Color = Color::from_rgba8(0xf5, 0x9e, 0x0b, 255);
const SELECTION_INNER: Color = Color::from_rgba8(0xa7, 0x8b, 0xfa, 255);
const SELECTION_OUTER: Color = Color::from_rgba8(0x6e, 0xe7, 0xff, 255);

/// Octagon used by stop signs, scaled by the caller.
const OCTAGON: [(f64, f64); 8] = [
    (-1.0, -3.0),
    (1.0, -3.0),
    (3.0, -1.0),
    (3.0, 1.0),
    (1.0, 3.0),
    (-1.0, 3.0),
    (-3.0, 1.0),
    (-3.0, -1.0),
];

/// How a path is painted.
#[derive(Debug, Clone)]
pub enum Paint {
    Fill(Color),
    /// Stroke outline with the given style.
    Stroke(Color, Stroke),
}

/// One entry in a display list.
#[derive(Debug, Clone)]
pub struct DrawOp {
    pub path: BezPath,
    pub paint: Paint,
    pub opacity: f32,
}

/// Parse a CSS hex color like "#ff0000" or "#f00".
pub fn parse_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    let channel = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
    match hex.len() {
        6 => Some(Color::from_rgba8(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?, 255)),
        3 => {
            let expand = |v: u8| v * 17;
            Some(Color::from_rgba8(
                expand(channel(0, 1)?),
                expand(channel(1, 1)?),
                expand(channel(2, 1)?),
                255,
            ))
        }
        _ => None,
    }
}

/// Collects ops in item-local coordinates and maps them to the scene.
struct Builder {
    transform: Affine,
    ops: Vec<DrawOp>,
}

impl Builder {
    fn new(transform: Affine) -> Self {
        Self {
            transform,
            ops: Vec::new(),
        }
    }

    fn push(&mut self, shape: &impl Shape, paint: Paint, opacity: f32) {
        let mut path = shape.to_path(TOLERANCE);
        path.apply_affine(self.transform);
        self.ops.push(DrawOp { path, paint, opacity });
    }

    fn fill(&mut self, shape: &impl Shape, color: Color) {
        self.push(shape, Paint::Fill(color), 1.0);
    }

    fn stroke(&mut self, shape: &impl Shape, color: Color, style: Stroke) {
        self.push(shape, Paint::Stroke(color, style), 1.0);
    }

    fn road(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, radius: f64) {
        self.fill(&RoundedRect::new(x0, y0, x1, y1, radius), ROAD);
    }

    /// Dashed lane marking along a segment.
    fn lane(&mut self, from: (f64, f64), to: (f64, f64)) {
        let style = Stroke::new(6.0).with_dashes(0.0, [16.0, 12.0]);
        self.stroke(&Line::new(from, to), LANE, style);
    }

    /// Solid yellow centre line along a segment.
    fn center_line(&mut self, from: (f64, f64), to: (f64, f64)) {
        self.stroke(&Line::new(from, to), CENTER_LINE, Stroke::new(4.0));
    }

    fn dot(&mut self, x: f64, y: f64, r: f64, color: Color, outline: f64) {
        let circle = Circle::new((x, y), r);
        self.fill(&circle, color);
        self.stroke(&circle, OUTLINE, Stroke::new(outline));
    }

    fn octagon(&mut self, center: Vec2, unit: f64) {
        let mut path = BezPath::new();
        for (i, (x, y)) in OCTAGON.iter().enumerate() {
            let p = Point::new(x * unit, y * unit) + center;
            if i == 0 { path.move_to(p) } else { path.line_to(p) }
        }
        path.close_path();
        self.fill(&path, STOP_RED);
        self.stroke(&path, Color::WHITE, Stroke::new(2.0).with_join(Join::Miter));
    }

    fn finish(self) -> Vec<DrawOp> {
        self.ops
    }
}

/// Quarter arc from (-r, 0) to (0, -r) around the tile origin.
fn quarter_arc(radius: f64) -> Arc {
    Arc::new(Point::ZERO, Vec2::new(radius, radius), PI, FRAC_PI_2, 0.0)
}

fn four_way(b: &mut Builder, half: f64, arm: f64, radius: f64) {
    b.road(-half, -arm, half, arm, radius);
    b.road(-arm, -half, arm, half, radius);
}

fn draw_tile(tile: &Tile) -> Vec<DrawOp> {
    let mut b = Builder::new(placement_transform(tile.position(), tile.rotation));
    match &tile.subtype {
        TileKind::Straight => {
            b.road(-100.0, -40.0, 100.0, 40.0, 10.0);
            b.lane((-100.0, 0.0), (100.0, 0.0));
        }
        TileKind::Curve => {
            b.stroke(&quarter_arc(140.0), ROAD, Stroke::new(80.0).with_caps(Cap::Round));
            let lane = Stroke::new(4.0).with_dashes(0.0, [8.0, 8.0]);
            b.stroke(&quarter_arc(120.0), LANE, lane);
        }
        TileKind::T => {
            b.road(-100.0, -40.0, 100.0, 40.0, 10.0);
            b.road(-40.0, -140.0, 40.0, 0.0, 10.0);
            b.lane((0.0, -120.0), (0.0, 0.0));
            b.lane((-100.0, 0.0), (100.0, 0.0));
        }
        TileKind::Cross => {
            four_way(&mut b, 120.0, 40.0, 10.0);
            b.lane((0.0, -120.0), (0.0, 120.0));
            b.lane((-120.0, 0.0), (120.0, 0.0));
        }
        TileKind::Merge => {
            b.road(-160.0, -40.0, 80.0, 40.0, 10.0);
            let mut wedge = BezPath::new();
            wedge.move_to((-40.0, -40.0));
            wedge.line_to((120.0, 0.0));
            wedge.line_to((-40.0, 40.0));
            wedge.close_path();
            b.push(&wedge, Paint::Fill(ROAD), 0.95);
            b.lane((-160.0, 0.0), (80.0, 0.0));
            let taper = Stroke::new(4.0).with_dashes(0.0, [8.0, 8.0]);
            b.stroke(&Line::new((-20.0, -20.0), (80.0, -2.0)), LANE, taper);
        }
        TileKind::Freeway => {
            b.road(-200.0, -70.0, 200.0, 70.0, 14.0);
            for y in [-40.0, 0.0, 40.0] {
                b.lane((-200.0, y), (200.0, y));
            }
        }
        TileKind::Roundabout => {
            b.fill(&Circle::new(Point::ZERO, 90.0), ROAD);
            b.fill(&Circle::new(Point::ZERO, 40.0), ISLAND);
            let arm = RoundedRect::new(-20.0, -160.0, 20.0, -70.0, 10.0);
            let base = b.transform;
            for i in 0..4 {
                b.transform = base * Affine::rotate(f64::from(i) * FRAC_PI_2);
                b.fill(&arm, ROAD);
            }
            b.transform = base;
        }
        TileKind::Signals => {
            four_way(&mut b, 120.0, 40.0, 10.0);
            for (x, color) in [(-70.0, LIGHT_GREEN), (-50.0, LIGHT_AMBER), (-30.0, STOP_RED)] {
                b.dot(x, -70.0, 6.0, color, 1.0);
                b.dot(-x, 70.0, 6.0, color, 1.0);
            }
        }
        TileKind::Stops => {
            four_way(&mut b, 120.0, 40.0, 10.0);
            for (x, y) in [(-140.0, 0.0), (140.0, 0.0), (0.0, -140.0), (0.0, 140.0)] {
                b.octagon(Vec2::new(x, y), 10.0);
            }
        }
        TileKind::Crosswalk => {
            b.road(-160.0, -40.0, 160.0, 40.0, 10.0);
            for i in (-70..=70).step_by(20) {
                let x = f64::from(i);
                b.push(&Rect::new(x - 10.0, -40.0, x + 2.0, 40.0), Paint::Fill(ZEBRA), 0.95);
            }
        }
        TileKind::MultilaneSignals | TileKind::Multilane4Way => {
            four_way(&mut b, 200.0, 70.0, 14.0);
            for d in [-40.0, 0.0, 40.0] {
                b.lane((-200.0, d), (200.0, d));
                b.lane((d, -200.0), (d, 200.0));
            }
            if tile.subtype == TileKind::MultilaneSignals {
                let lights = [(LIGHT_GREEN, 120.0), (LIGHT_AMBER, 100.0), (STOP_RED, 80.0)];
                for (color, d) in lights {
                    b.dot(-d, -120.0, 8.0, color, 2.0);
                    b.dot(d, 120.0, 8.0, color, 2.0);
                    b.dot(120.0, -d, 8.0, color, 2.0);
                    b.dot(-120.0, d, 8.0, color, 2.0);
                }
            }
        }
        TileKind::TwoWayStraight => {
            b.road(-100.0, -40.0, 100.0, 40.0, 10.0);
            b.center_line((-100.0, 0.0), (100.0, 0.0));
        }
        TileKind::TwoWayCurve => {
            b.stroke(&quarter_arc(140.0), ROAD, Stroke::new(80.0).with_caps(Cap::Round));
            b.stroke(&quarter_arc(140.0), CENTER_LINE, Stroke::new(4.0));
        }
        TileKind::TwoWayCross => {
            four_way(&mut b, 120.0, 40.0, 10.0);
            b.center_line((0.0, -120.0), (0.0, 120.0));
            b.center_line((-120.0, 0.0), (120.0, 0.0));
        }
        TileKind::Unknown(_) => {}
    }
    b.finish()
}

fn draw_vehicle(vehicle: &Vehicle) -> Vec<DrawOp> {
    let mut b = Builder::new(placement_transform(vehicle.position(), vehicle.rotation));
    let size = vehicle.subtype.body_size();
    let (w, h) = (size.width, size.height);
    let radius = vehicle.subtype.corner_radius();
    let body = RoundedRect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0, radius);
    let color =
        parse_color(&vehicle.color).unwrap_or_else(|| fallback_vehicle_color(&vehicle.subtype));
    b.fill(&body, color);
    b.stroke(&body, BODY_OUTLINE, Stroke::new(2.0));
    let glass = RoundedRect::new(-w / 4.0, -h / 4.0, w / 4.0, h / 4.0, 4.0);
    b.push(&glass, Paint::Fill(WINDSHIELD), 0.8);
    b.finish()
}

fn draw_sign(sign: &Sign) -> Vec<DrawOp> {
    let mut b = Builder::new(placement_transform(sign.position(), sign.rotation));
    match &sign.subtype {
        SignKind::Stop => b.octagon(Vec2::ZERO, 8.0),
        SignKind::TrafficLight => {
            b.fill(&Rect::new(-2.0, -5.0, 2.0, 35.0), POLE);
            let housing = RoundedRect::new(-12.0, -35.0, 12.0, -5.0, 4.0);
            b.fill(&housing, HOUSING);
            b.stroke(&housing, POLE, Stroke::new(1.0));
            for (y, color) in [(-27.0, STOP_RED), (-20.0, LIGHT_AMBER), (-13.0, LIGHT_GREEN)] {
                b.dot(0.0, y, 4.0, color, 1.0);
            }
        }
        SignKind::Unknown(_) => {}
    }
    b.finish()
}

/// Label plate. Glyphs are left to text-capable backends.
fn draw_text(text: &Text) -> Vec<DrawOp> {
    let mut b = Builder::new(placement_transform(text.position(), text.rotation));
    let plate = Text::plate();
    let plate = RoundedRect::from_rect(plate, 6.0);
    b.fill(&plate, PLATE_FILL);
    b.stroke(&plate, PLATE_EDGE, Stroke::new(1.0));
    b.finish()
}

fn draw_arrow(arrow: &Arrow) -> Vec<DrawOp> {
    let mut b = Builder::new(Affine::IDENTITY);
    let (start, end) = (arrow.start(), arrow.end());
    b.stroke(&Line::new(start, end), ARROW_COLOR, Stroke::new(4.0));

    let dir = end - start;
    let len = dir.hypot();
    if len > f64::EPSILON {
        let unit = dir / len;
        let normal = Vec2::new(-unit.y, unit.x);
        let mut head = BezPath::new();
        head.move_to(end + unit * 6.0);
        head.line_to(end - unit * 10.0 + normal * 7.0);
        head.line_to(end - unit * 10.0 - normal * 7.0);
        head.close_path();
        b.fill(&head, ARROW_COLOR);
    }
    b.finish()
}

/// Display list for one item, in scene coordinates.
pub fn draw_item(item: &Item) -> Vec<DrawOp> {
    match item {
        Item::Tile(tile) => draw_tile(tile),
        Item::Vehicle(vehicle) => draw_vehicle(vehicle),
        Item::Sign(sign) => draw_sign(sign),
        Item::Text(text) => draw_text(text),
        Item::Arrow(arrow) => draw_arrow(arrow),
    }
}

/// Dashed double outline drawn around the selected item.
pub fn selection_decoration(item: &Item) -> Vec<DrawOp> {
    let bounds = item.bounds();
    if bounds.area() <= 0.0 && !matches!(item, Item::Arrow(_)) {
        return Vec::new();
    }
    let mut b = Builder::new(Affine::IDENTITY);
    let outer = RoundedRect::from_rect(bounds.inflate(10.0, 10.0), 12.0);
    b.push(&outer, Paint::Stroke(SELECTION_OUTER, Stroke::new(1.0)), 0.8);
    let inner = RoundedRect::from_rect(bounds.inflate(8.0, 8.0), 10.0);
    b.stroke(&inner, SELECTION_INNER, Stroke::new(3.0).with_dashes(0.0, [8.0, 4.0]));
    b.finish()
}

/// Colour of vehicles whose stored colour cannot be parsed.
pub fn fallback_vehicle_color(kind: &VehicleKind) -> Color {
    match kind {
        VehicleKind::Truck => LIGHT_AMBER,
        _ => Color::from_rgba8(0x1f, 0x9c, 0xf0, 255),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        let c = parse_color("#ff8000").unwrap();
        assert_eq!(c, Color::from_rgba8(255, 128, 0, 255));
        assert_eq!(parse_color("#fff"), Some(Color::from_rgba8(255, 255, 255, 255)));
        assert!(parse_color("red").is_none());
        assert!(parse_color("#12345").is_none());
        assert!(parse_color("#gg0000").is_none());
    }

    #[test]
    fn test_every_known_tile_draws() {
        for kind in TileKind::ALL {
            let item: Item = Tile::new(kind.clone(), Point::new(100.0, 100.0)).into();
            assert!(!draw_item(&item).is_empty(), "{} drew nothing", kind.as_str());
        }
    }

    #[test]
    fn test_unknown_subtype_draws_nothing() {
        let tile: Item = Tile::new(TileKind::Unknown("helipad".into()), Point::ZERO).into();
        let sign: Item = Sign::new(SignKind::Unknown("yield".into()), Point::ZERO).into();
        assert!(draw_item(&tile).is_empty());
        assert!(draw_item(&sign).is_empty());
        assert!(selection_decoration(&tile).is_empty());
    }

    #[test]
    fn test_ops_are_in_scene_space() {
        let item: Item = Vehicle::new(VehicleKind::Car, Point::new(500.0, 300.0), "#000000").into();
        let ops = draw_item(&item);
        let bbox = ops[0].path.bounding_box();
        assert!((bbox.center().x - 500.0).abs() < 1e-6);
        assert!((bbox.center().y - 300.0).abs() < 1e-6);
        assert!((bbox.width() - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotated_vehicle_swaps_extent() {
        let mut vehicle = Vehicle::new(VehicleKind::Semi, Point::ZERO, "#ef4444");
        vehicle.rotation = 90.0;
        let ops = draw_item(&vehicle.into());
        let bbox = ops[0].path.bounding_box();
        assert!((bbox.height() - 130.0).abs() < 1e-6);
    }

    #[test]
    fn test_arrow_has_head() {
        let item: Item = Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0)).into();
        assert_eq!(draw_item(&item).len(), 2);
        let degenerate: Item = Arrow::new(Point::ZERO, Point::ZERO).into();
        assert_eq!(draw_item(&degenerate).len(), 1);
    }

    #[test]
    fn test_unparseable_color_uses_fallback() {
        let item: Item = Vehicle::new(VehicleKind::Car, Point::ZERO, "not-a-color").into();
        match &draw_item(&item)[0].paint {
            Paint::Fill(color) => assert_eq!(*color, fallback_vehicle_color(&VehicleKind::Car)),
            other => panic!("expected fill, got {other:?}"),
        }
    }
}
