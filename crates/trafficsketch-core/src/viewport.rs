//! Viewport for pan/zoom over the scene.
//!
//! The viewport is a rectangle in scene coordinates that is stretched onto
//! the screen. It is never snapshotted and never serialized.

use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Default visible window, also the export canvas.
pub const DEFAULT_VIEW: Rect = Rect::new(0.0, 0.0, 1200.0, 800.0);

/// Zoom step used by the zoom buttons.
pub const ZOOM_STEP: f64 = 1.2;

/// Minimum zoom level relative to [`DEFAULT_VIEW`].
pub const MIN_ZOOM: f64 = 0.1;
/// Maximum zoom level relative to [`DEFAULT_VIEW`].
pub const MAX_ZOOM: f64 = 10.0;

/// Visible window into scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    rect: Rect,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { rect: DEFAULT_VIEW }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// The visible rectangle in scene coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn origin(&self) -> Point {
        self.rect.origin()
    }

    pub fn center(&self) -> Point {
        self.rect.center()
    }

    /// Current zoom level; 1.0 shows the default window.
    pub fn zoom_level(&self) -> f64 {
        DEFAULT_VIEW.width() / self.rect.width()
    }

    /// Zoom by `factor` keeping `center` (scene coordinates) fixed.
    ///
    /// A factor above 1 zooms in. The resulting zoom level is clamped to
    /// [`MIN_ZOOM`, `MAX_ZOOM`].
    pub fn zoom(&mut self, factor: f64, center: Point) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let level = self.zoom_level();
        let target = (level * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let factor = target / level;
        if (factor - 1.0).abs() < f64::EPSILON {
            return;
        }

        let keep = 1.0 / factor;
        let x0 = center.x - (center.x - self.rect.x0) * keep;
        let y0 = center.y - (center.y - self.rect.y0) * keep;
        let size = self.rect.size() * keep;
        self.rect = Rect::from_origin_size((x0, y0), size);
    }

    /// Zoom in one step around the view centre.
    pub fn zoom_in(&mut self) {
        self.zoom(ZOOM_STEP, self.center());
    }

    /// Zoom out one step around the view centre.
    pub fn zoom_out(&mut self) {
        self.zoom(1.0 / ZOOM_STEP, self.center());
    }

    /// Restore the default window.
    pub fn reset(&mut self) {
        self.rect = DEFAULT_VIEW;
    }

    /// Translate the window by a delta in scene coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.rect = self.rect + delta;
    }

    /// Move the window origin, keeping its size.
    pub fn set_origin(&mut self, origin: Point) {
        self.rect = Rect::from_origin_size(origin, self.rect.size());
    }

    /// Transform from scene coordinates to screen pixels.
    pub fn transform(&self, screen: Size) -> Affine {
        let sx = screen.width / self.rect.width();
        let sy = screen.height / self.rect.height();
        Affine::scale_non_uniform(sx, sy) * Affine::translate(-self.rect.origin().to_vec2())
    }

    /// Convert a screen point to scene coordinates.
    pub fn screen_to_scene(&self, point: Point, screen: Size) -> Point {
        self.transform(screen).inverse() * point
    }

    /// Convert a scene point to screen coordinates.
    pub fn scene_to_screen(&self, point: Point, screen: Size) -> Point {
        self.transform(screen) * point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Size = Size::new(1200.0, 800.0);

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_default_is_identity() {
        let view = Viewport::new();
        let p = Point::new(123.0, 456.0);
        assert!(approx(view.screen_to_scene(p, SCREEN), p));
    }

    #[test]
    fn test_zoom_keeps_pivot() {
        let mut view = Viewport::new();
        let pivot = Point::new(300.0, 200.0);
        let before = view.scene_to_screen(pivot, SCREEN);
        view.zoom(2.0, pivot);
        assert!((view.rect().width() - 600.0).abs() < 1e-9);
        assert!((view.rect().height() - 400.0).abs() < 1e-9);
        assert!(approx(view.scene_to_screen(pivot, SCREEN), before));
    }

    #[test]
    fn test_zoom_in_out_round_trip() {
        let mut view = Viewport::new();
        view.zoom_in();
        assert!((view.zoom_level() - ZOOM_STEP).abs() < 1e-9);
        view.zoom_out();
        assert!(approx(view.origin(), DEFAULT_VIEW.origin()));
        assert!((view.rect().width() - DEFAULT_VIEW.width()).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = Viewport::new();
        for _ in 0..100 {
            view.zoom_in();
        }
        assert!((view.zoom_level() - MAX_ZOOM).abs() < 1e-9);
        for _ in 0..200 {
            view.zoom_out();
        }
        assert!((view.zoom_level() - MIN_ZOOM).abs() < 1e-9);
        assert!(view.rect().width().is_finite());
    }

    #[test]
    fn test_zoom_rejects_bad_factor() {
        let mut view = Viewport::new();
        view.zoom(0.0, Point::ZERO);
        view.zoom(f64::NAN, Point::ZERO);
        assert_eq!(view, Viewport::new());
    }

    #[test]
    fn test_pan_and_reset() {
        let mut view = Viewport::new();
        view.pan(Vec2::new(-50.0, 25.0));
        assert!(approx(view.origin(), Point::new(-50.0, 25.0)));
        view.set_origin(Point::new(10.0, 10.0));
        assert!(approx(view.origin(), Point::new(10.0, 10.0)));
        view.reset();
        assert_eq!(view.rect(), DEFAULT_VIEW);
    }

    #[test]
    fn test_screen_mapping_after_zoom() {
        let mut view = Viewport::new();
        view.zoom(2.0, Point::new(600.0, 400.0));
        // The screen centre still maps to the pivot.
        let centre = view.screen_to_scene(Point::new(600.0, 400.0), SCREEN);
        assert!(approx(centre, Point::new(600.0, 400.0)));
        let corner = view.screen_to_scene(Point::ZERO, SCREEN);
        assert!(approx(corner, Point::new(300.0, 200.0)));
    }
}
