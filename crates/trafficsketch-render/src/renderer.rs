//! Renderer trait abstraction.

use crate::drawing::{DrawOp, Paint, draw_item, parse_color, selection_decoration};
use kurbo::{Affine, BezPath, Cap, Join, Size, Stroke};
use peniko::Color;
use thiserror::Error;
use trafficsketch_core::ink::{INK_COLOR, INK_WIDTH, InkOverlay};
use trafficsketch_core::snap::GRID_SIZE;
use trafficsketch_core::viewport::Viewport;
use trafficsketch_core::{ItemId, Scene};

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid surface size: {0}")]
    InvalidSize(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

const GRID_LINE: Color = Color::from_rgba8(0x1b, 0x20, 0x30, 255);

/// Upper bound on grid lines per axis.
const MAX_GRID_LINES: usize = 4096;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The scene to render.
    pub scene: &'a Scene,
    /// Visible window into the scene.
    pub viewport: Viewport,
    /// Logical output size the viewport is stretched onto.
    pub viewport_size: Size,
    /// Device pixel ratio (export uses 2).
    pub scale_factor: f64,
    /// Draw the snapping grid beneath the items.
    pub show_grid: bool,
    /// Item raised to the top and outlined, if any.
    pub selection: Option<&'a ItemId>,
    /// Freehand strokes in logical screen coordinates.
    pub ink: Option<&'a InkOverlay>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(scene: &'a Scene, viewport_size: Size) -> Self {
        Self {
            scene,
            viewport: Viewport::default(),
            viewport_size,
            scale_factor: 1.0,
            show_grid: false,
            selection: None,
            ink: None,
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }

    /// Set the selected item. Stale ids are ignored when drawing.
    pub fn with_selection(mut self, selection: Option<&'a ItemId>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_ink(mut self, ink: Option<&'a InkOverlay>) -> Self {
        self.ink = ink;
        self
    }

    /// Output size in physical pixels.
    pub fn pixel_size(&self) -> RenderResult<(u32, u32)> {
        let w = self.viewport_size.width * self.scale_factor;
        let h = self.viewport_size.height * self.scale_factor;
        if !(w.is_finite() && h.is_finite()) || w < 1.0 || h < 1.0 || w > 16384.0 || h > 16384.0 {
            return Err(RendererError::InvalidSize(format!("{w}x{h}")));
        }
        Ok((w.round() as u32, h.round() as u32))
    }

    /// Transform from scene coordinates to physical pixels.
    pub fn scene_transform(&self) -> Affine {
        Affine::scale(self.scale_factor) * self.viewport.transform(self.viewport_size)
    }

    /// Transform from logical screen coordinates to physical pixels.
    pub fn screen_transform(&self) -> Affine {
        Affine::scale(self.scale_factor)
    }

    /// Everything drawn in scene space, in paint order: grid, items, then
    /// the selection outline.
    pub fn scene_ops(&self) -> Vec<DrawOp> {
        let mut ops = Vec::new();
        if self.show_grid {
            ops.extend(self.grid_op());
        }
        for item in self.scene.render_order(self.selection) {
            ops.extend(draw_item(item));
        }
        if let Some(item) = self.selection.and_then(|id| self.scene.get(id)) {
            ops.extend(selection_decoration(item));
        }
        ops
    }

    /// Ink strokes, in logical screen space.
    pub fn ink_ops(&self) -> Vec<DrawOp> {
        let Some(ink) = self.ink else {
            return Vec::new();
        };
        let color = parse_color(INK_COLOR).unwrap_or(Color::from_rgba8(255, 0, 0, 255));
        let style = Stroke::new(INK_WIDTH).with_caps(Cap::Round).with_join(Join::Round);
        ink.strokes()
            .filter(|stroke| !stroke.points().is_empty())
            .map(|stroke| DrawOp {
                path: stroke.to_path(),
                paint: Paint::Stroke(color, style.clone()),
                opacity: 1.0,
            })
            .collect()
    }

    fn grid_op(&self) -> Option<DrawOp> {
        let view = self.viewport.rect();
        let mut path = BezPath::new();
        for x in grid_lines(view.x0, view.x1) {
            path.move_to((x, view.y0));
            path.line_to((x, view.y1));
        }
        for y in grid_lines(view.y0, view.y1) {
            path.move_to((view.x0, y));
            path.line_to((view.x1, y));
        }
        if path.elements().is_empty() {
            return None;
        }
        Some(DrawOp {
            path,
            paint: Paint::Stroke(GRID_LINE, Stroke::new(1.0)),
            opacity: 1.0,
        })
    }
}

/// Grid line positions covering `[lo, hi]`.
///
/// Lines are counted by index so that positions too large for a 40-unit step
/// to register still terminate. Spans needing more than [`MAX_GRID_LINES`]
/// draw no grid.
fn grid_lines(lo: f64, hi: f64) -> impl Iterator<Item = f64> {
    let first = (lo / GRID_SIZE).floor();
    let last = (hi / GRID_SIZE).floor();
    let count = last - first;
    let count = if count.is_finite() && (0.0..=MAX_GRID_LINES as f64).contains(&count) {
        count as usize + 1
    } else {
        0
    };
    (0..count).map(move |i| (first + i as f64) * GRID_SIZE)
}

/// Trait for rendering backends.
///
/// Backends consume the display lists built by [`RenderContext`]; they never
/// read or write editor state.
pub trait Renderer: Send + Sync {
    /// Build the frame for a context.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Get the background color (for clearing). Exports are transparent.
    fn background_color(&self, _ctx: &RenderContext) -> Color {
        Color::TRANSPARENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use trafficsketch_core::bootstrap_scene;
    use trafficsketch_core::items::{Item, ItemTrait, Tile, TileKind};

    #[test]
    fn test_pixel_size() {
        let scene = Scene::new();
        let ctx = RenderContext::new(&scene, Size::new(1200.0, 800.0)).with_scale_factor(2.0);
        assert_eq!(ctx.pixel_size().unwrap(), (2400, 1600));

        let ctx = RenderContext::new(&scene, Size::new(0.0, 800.0));
        assert!(matches!(ctx.pixel_size(), Err(RendererError::InvalidSize(_))));
        let ctx = RenderContext::new(&scene, Size::new(100.0, 100.0)).with_scale_factor(f64::NAN);
        assert!(ctx.pixel_size().is_err());
    }

    #[test]
    fn test_scene_transform_maps_view_to_pixels() {
        let scene = Scene::new();
        let ctx = RenderContext::new(&scene, Size::new(1200.0, 800.0)).with_scale_factor(2.0);
        let p = ctx.scene_transform() * Point::new(1200.0, 800.0);
        assert!((p.x - 2400.0).abs() < 1e-9);
        assert!((p.y - 1600.0).abs() < 1e-9);
    }

    #[test]
    fn test_selection_adds_outline_last() {
        let scene = bootstrap_scene();
        let tile = scene.items()[0].id().clone();
        let size = Size::new(1200.0, 800.0);

        let plain = RenderContext::new(&scene, size).scene_ops();
        let selected = RenderContext::new(&scene, size).with_selection(Some(&tile)).scene_ops();
        assert_eq!(selected.len(), plain.len() + 2);
        assert!(matches!(selected.last().unwrap().paint, Paint::Stroke(..)));
    }

    #[test]
    fn test_stale_selection_draws_no_outline() {
        let scene = bootstrap_scene();
        let gone = ItemId::new();
        let size = Size::new(1200.0, 800.0);
        let plain = RenderContext::new(&scene, size).scene_ops();
        let stale = RenderContext::new(&scene, size).with_selection(Some(&gone)).scene_ops();
        assert_eq!(stale.len(), plain.len());
    }

    #[test]
    fn test_grid_toggle() {
        let scene: Scene = [Item::from(Tile::new(TileKind::Straight, Point::new(80.0, 80.0)))]
            .into_iter()
            .collect();
        let size = Size::new(1200.0, 800.0);
        let without = RenderContext::new(&scene, size).scene_ops().len();
        let with = RenderContext::new(&scene, size).with_grid(true).scene_ops().len();
        assert_eq!(with, without + 1);
    }

    #[test]
    fn test_grid_lines_cover_view() {
        let xs: Vec<f64> = grid_lines(-30.0, 90.0).collect();
        assert_eq!(xs, vec![-40.0, 0.0, 40.0, 80.0]);
    }

    #[test]
    fn test_grid_terminates_far_from_origin() {
        // 40-unit steps vanish at this magnitude
        let far = 1e18;
        assert!(grid_lines(far, far + 1200.0).count() <= 64);
        assert_eq!(grid_lines(0.0, f64::INFINITY).count(), 0);
        assert_eq!(grid_lines(f64::NAN, 10.0).count(), 0);

        let scene = Scene::new();
        let mut viewport = Viewport::default();
        viewport.set_origin(Point::new(far, far));
        let ctx = RenderContext::new(&scene, Size::new(1200.0, 800.0))
            .with_viewport(viewport)
            .with_grid(true);
        assert!(ctx.scene_ops().len() <= 1);
    }

    #[test]
    fn test_ink_ops() {
        let scene = Scene::new();
        let mut ink = InkOverlay::new();
        ink.begin(Point::new(10.0, 10.0));
        ink.extend(Point::new(50.0, 40.0));
        ink.end();
        let ctx = RenderContext::new(&scene, Size::new(100.0, 100.0)).with_ink(Some(&ink));
        assert_eq!(ctx.ink_ops().len(), 1);
        assert!(RenderContext::new(&scene, Size::new(100.0, 100.0)).ink_ops().is_empty());
    }
}
