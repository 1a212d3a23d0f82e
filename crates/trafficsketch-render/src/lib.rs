//! Traffic Sketcher render library
//!
//! Projects scene items to display lists and rasterises them. The display
//! list is the contract with rendering backends; the bundled backend is a
//! tiny-skia rasteriser used for PNG export.

pub mod drawing;
mod raster;
mod renderer;

pub use drawing::{DrawOp, Paint, draw_item, parse_color, selection_decoration};
pub use raster::{CpuRenderer, EXPORT_SCALE, RasterImage, encode_png, export_image, export_png};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
