//! SketchInk Render Library
//!
//! Renderer abstraction for SketchInk sessions and a CPU rasterizer that
//! doubles as the snapshot surface for PNG/JPEG/WEBP export.

mod raster;
mod renderer;

pub use raster::RasterRenderer;
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
