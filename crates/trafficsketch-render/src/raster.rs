//! CPU raster backend and PNG export, built on tiny-skia.
//!
//! Display list entries are kurbo paths; they are converted to tiny-skia
//! paths at draw time and painted anti-aliased with the nonzero rule.

use crate::drawing::{DrawOp, Paint};
use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use kurbo::{Affine, BezPath, Cap, Join, PathEl, Size};
use peniko::Color;
use tiny_skia::{FillRule, LineCap, LineJoin, PathBuilder, Pixmap, StrokeDash, Transform};
use trafficsketch_core::Scene;
use trafficsketch_core::viewport::{DEFAULT_VIEW, Viewport};

/// Default export density.
pub const EXPORT_SCALE: f64 = 2.0;

/// RGBA pixel data ready for encoding.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// RGBA pixel data (4 bytes per pixel, straight alpha).
    pub rgba_data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl RasterImage {
    fn from_pixmap(pixmap: &Pixmap) -> Self {
        let mut rgba_data = Vec::with_capacity(pixmap.pixels().len() * 4);
        for px in pixmap.pixels() {
            let c = px.demultiply();
            rgba_data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Self {
            rgba_data,
            width: pixmap.width(),
            height: pixmap.height(),
        }
    }

    /// Encode as PNG.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        encode_png(&self.rgba_data, self.width, self.height)
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba_data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

fn to_skia_color(color: Color, opacity: f32) -> tiny_skia::Color {
    let [r, g, b, a] = color.components.map(|c| c.clamp(0.0, 1.0));
    let alpha = (a * opacity).clamp(0.0, 1.0);
    tiny_skia::Color::from_rgba(r, g, b, alpha).unwrap_or(tiny_skia::Color::TRANSPARENT)
}

fn to_skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs().map(|v| v as f32);
    Transform::from_row(a, b, c, d, e, f)
}

/// Convert a kurbo path. Empty or degenerate paths yield `None`.
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn to_skia_stroke(style: &kurbo::Stroke) -> tiny_skia::Stroke {
    let line_cap = match style.start_cap {
        Cap::Butt => LineCap::Butt,
        Cap::Round => LineCap::Round,
        Cap::Square => LineCap::Square,
    };
    let line_join = match style.join {
        Join::Bevel => LineJoin::Bevel,
        Join::Miter => LineJoin::Miter,
        Join::Round => LineJoin::Round,
    };
    let dash = if style.dash_pattern.is_empty() {
        None
    } else {
        let intervals = style.dash_pattern.iter().map(|&d| d as f32).collect();
        StrokeDash::new(intervals, style.dash_offset as f32)
    };
    tiny_skia::Stroke {
        width: style.width as f32,
        miter_limit: style.miter_limit as f32,
        line_cap,
        line_join,
        dash,
    }
}

/// Paint one display list entry under `transform`.
///
/// Stroke widths are in the op's own space and scale with the transform.
fn draw_op(pixmap: &mut Pixmap, op: &DrawOp, transform: Affine) {
    let Some(path) = to_skia_path(&op.path) else {
        return;
    };
    let transform = to_skia_transform(transform);
    let mut paint = tiny_skia::Paint::default();
    paint.anti_alias = true;
    match &op.paint {
        Paint::Fill(color) => {
            paint.set_color(to_skia_color(*color, op.opacity));
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
        Paint::Stroke(color, style) => {
            paint.set_color(to_skia_color(*color, op.opacity));
            pixmap.stroke_path(&path, &paint, &to_skia_stroke(style), transform, None);
        }
    }
}

/// Software renderer producing a tiny-skia pixmap per frame.
#[derive(Debug, Default)]
pub struct CpuRenderer {
    target: Option<Pixmap>,
}

impl CpuRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the last frame built as straight-alpha RGBA.
    pub fn take_image(&mut self) -> Option<RasterImage> {
        self.target.take().map(|pixmap| RasterImage::from_pixmap(&pixmap))
    }
}

impl Renderer for CpuRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let (width, height) = ctx.pixel_size()?;
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RendererError::InvalidSize(format!("{width}x{height}")))?;
        pixmap.fill(to_skia_color(self.background_color(ctx), 1.0));

        let scene_transform = ctx.scene_transform();
        for op in ctx.scene_ops() {
            draw_op(&mut pixmap, &op, scene_transform);
        }
        let screen_transform = ctx.screen_transform();
        for op in ctx.ink_ops() {
            draw_op(&mut pixmap, &op, screen_transform);
        }

        log::debug!("Rendered {}x{} frame", width, height);
        self.target = Some(pixmap);
        Ok(())
    }
}

/// Encode RGBA data as PNG.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header().map_err(|e| {
            log::error!("Failed to write PNG header: {:?}", e);
            RendererError::Encode(e.to_string())
        })?;
        writer.write_image_data(rgba_data).map_err(|e| {
            log::error!("Failed to write PNG data: {:?}", e);
            RendererError::Encode(e.to_string())
        })?;
    }
    Ok(png_data)
}

/// Rasterise the visible window of a scene onto the fixed export canvas.
///
/// The canvas is always [`DEFAULT_VIEW`]-sized; `viewport` picks which part
/// of the scene is stretched onto it. Selection decoration and ink are never
/// exported.
pub fn export_image(scene: &Scene, viewport: &Viewport, show_grid: bool, scale: f64) -> RenderResult<RasterImage> {
    let ctx = RenderContext::new(scene, Size::new(DEFAULT_VIEW.width(), DEFAULT_VIEW.height()))
        .with_viewport(*viewport)
        .with_scale_factor(scale)
        .with_grid(show_grid);
    let mut renderer = CpuRenderer::new();
    renderer.build_scene(&ctx)?;
    renderer
        .take_image()
        .ok_or_else(|| RendererError::Encode("no frame was rendered".to_string()))
}

/// [`export_image`] encoded as PNG.
pub fn export_png(scene: &Scene, viewport: &Viewport, show_grid: bool, scale: f64) -> RenderResult<Vec<u8>> {
    let image = export_image(scene, viewport, show_grid, scale)?;
    log::info!("Exporting {}x{} PNG", image.width, image.height);
    image.encode_png()
}
