//! Direction arrows.

use super::{ItemId, ItemTrait, point_to_segment_dist};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Stroke width used when hit testing the shaft.
const SHAFT_WIDTH: f64 = 4.0;

/// An arrow from (x1, y1) to (x2, y2); the head sits at the end point.
///
/// Arrows carry no rotation of their own. Rotating reverses the direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub(crate) id: ItemId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Arrow {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: ItemId::new(),
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// Reverse the arrow in place.
    ///
    /// Reflecting each endpoint through the midpoint lands it on the other
    /// endpoint, so this is an exact swap.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.x1, &mut self.x2);
        std::mem::swap(&mut self.y1, &mut self.y2);
    }
}

impl ItemTrait for Arrow {
    fn id(&self) -> &ItemId {
        &self.id
    }

    fn set_id(&mut self, id: ItemId) {
        self.id = id;
    }

    fn anchor(&self) -> Point {
        self.start()
    }

    fn move_anchor(&mut self, anchor: Point, snap: &dyn Fn(f64) -> f64) {
        let shaft = self.end() - self.start();
        self.x1 = snap(anchor.x);
        self.y1 = snap(anchor.y);
        self.x2 = snap(anchor.x + shaft.x);
        self.y2 = snap(anchor.y + shaft.y);
    }

    fn rotate_step(&mut self) {
        self.reverse();
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start(), self.end())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_segment_dist(point, self.start(), self.end()) <= tolerance + SHAFT_WIDTH / 2.0
    }
}
