//! Freehand ink overlay.
//!
//! Strokes live in screen coordinates on a surface above the scene. They
//! are never scene data: not serialized, not undoable, and wiped when the
//! editor leaves draw mode.

use kurbo::{BezPath, Point};

/// Ink colour as a CSS hex string.
pub const INK_COLOR: &str = "#ff0000";
/// Ink stroke width in screen pixels.
pub const INK_WIDTH: f64 = 5.0;

/// One continuous stroke.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InkStroke {
    points: Vec<Point>,
}

impl InkStroke {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Polyline through the recorded points.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut iter = self.points.iter();
        if let Some(first) = iter.next() {
            path.move_to(*first);
            for p in iter {
                path.line_to(*p);
            }
        }
        path
    }
}

/// Completed strokes plus the one in progress.
#[derive(Debug, Clone, Default)]
pub struct InkOverlay {
    strokes: Vec<InkStroke>,
    active: Option<InkStroke>,
}

impl InkOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stroke. An unfinished stroke is committed first.
    pub fn begin(&mut self, point: Point) {
        self.end();
        self.active = Some(InkStroke { points: vec![point] });
    }

    /// Extend the active stroke; ignored when no stroke is active.
    pub fn extend(&mut self, point: Point) {
        if let Some(stroke) = self.active.as_mut() {
            stroke.points.push(point);
        }
    }

    pub fn end(&mut self) {
        if let Some(stroke) = self.active.take() {
            self.strokes.push(stroke);
        }
    }

    /// All strokes, finished ones first.
    pub fn strokes(&self) -> impl Iterator<Item = &InkStroke> {
        self.strokes.iter().chain(self.active.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.active.is_none()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_lifecycle() {
        let mut ink = InkOverlay::new();
        ink.begin(Point::new(0.0, 0.0));
        ink.extend(Point::new(5.0, 5.0));
        ink.end();
        assert_eq!(ink.strokes().count(), 1);
        assert_eq!(ink.strokes().next().unwrap().points().len(), 2);
    }

    #[test]
    fn test_extend_without_begin_ignored() {
        let mut ink = InkOverlay::new();
        ink.extend(Point::new(1.0, 1.0));
        assert!(ink.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut ink = InkOverlay::new();
        ink.begin(Point::ZERO);
        ink.end();
        ink.begin(Point::ZERO);
        ink.clear();
        assert!(ink.is_empty());
    }

    #[test]
    fn test_to_path() {
        let mut ink = InkOverlay::new();
        ink.begin(Point::ZERO);
        ink.extend(Point::new(10.0, 0.0));
        let path = ink.strokes().next().unwrap().to_path();
        assert_eq!(path.elements().len(), 2);
    }
}
