//! Text labels.

use super::{ItemId, ItemTrait, hit_test_placed, normalize_degrees, placement_transform};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Payload of a freshly placed label.
pub const DEFAULT_TEXT: &str = "Note";

/// Label plate, centred slightly above the anchor.
const PLATE: Rect = Rect::new(-60.0, -22.0, 60.0, 10.0);

fn default_text() -> String {
    DEFAULT_TEXT.to_string()
}

/// A text label placed in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ItemId,
    #[serde(default = "default_text")]
    pub text: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "rot", default, deserialize_with = "super::deserialize_rotation")]
    pub rotation: f64,
}

impl Text {
    pub fn new(text: impl Into<String>, position: Point) -> Self {
        Self {
            id: ItemId::new(),
            text: text.into(),
            x: position.x,
            y: position.y,
            rotation: 0.0,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Text to display; an empty payload shows the default.
    pub fn display_text(&self) -> &str {
        if self.text.is_empty() { DEFAULT_TEXT } else { &self.text }
    }

    /// Local rectangle of the label plate.
    pub fn plate() -> Rect {
        PLATE
    }
}

impl ItemTrait for Text {
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
        placement_transform(self.position(), self.rotation).transform_rect_bbox(PLATE)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        hit_test_placed(PLATE, self.position(), self.rotation, point, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_text_defaults_to_note() {
        let label: Text = serde_json::from_str(r#"{"id":"t","x":0,"y":0}"#).unwrap();
        assert_eq!(label.text, DEFAULT_TEXT);
    }

    #[test]
    fn test_empty_text_displays_default() {
        let label = Text::new("", Point::ZERO);
        assert_eq!(label.display_text(), "Note");
    }
}
