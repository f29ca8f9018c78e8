//! CPU rasterizer backed by tiny-skia.
//!
//! Curves are converted to tiny-skia paths and painted with antialiasing
//! into a premultiplied pixmap. Snapshots are demultiplied into an
//! `RgbaImage` and encoded with `image`.

use crate::renderer::{RenderResult, Renderer, RendererError};
use base64::{Engine, engine::general_purpose::STANDARD};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use kurbo::{BezPath, PathEl, Size};
use sketchink_core::{Color, CurveStyle, ImageFormat, SnapshotOptions, SnapshotSurface};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Transform};

/// Width of the line painted for [`CurveStyle::Stroke`].
const HAIRLINE_WIDTH: f32 = 1.0;

/// Upper bound on either side of the surface.
const MAX_DIMENSION: f64 = 16384.0;

fn skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    paint.anti_alias = true;
    paint
}

/// Convert a kurbo path. Returns `None` for paths with no area or length.
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => {
                builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32)
            }
            PathEl::CurveTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

/// Straight-alpha copy of a premultiplied pixmap.
fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    RgbaImage::from_fn(pixmap.width(), pixmap.height(), |x, y| {
        pixmap.pixel(x, y).map_or(Rgba([0, 0, 0, 0]), |pixel| {
            let c = pixel.demultiply();
            Rgba([c.red(), c.green(), c.blue(), c.alpha()])
        })
    })
}

/// JPEG has no alpha channel.
fn flatten_onto_white(frame: &Pixmap) -> Option<RgbImage> {
    let mut canvas = Pixmap::new(frame.width(), frame.height())?;
    canvas.fill(tiny_skia::Color::WHITE);
    canvas.draw_pixmap(
        0,
        0,
        frame.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Some(RgbImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        canvas.pixel(x, y).map_or(Rgb([255, 255, 255]), |pixel| {
            Rgb([pixel.red(), pixel.green(), pixel.blue()])
        })
    }))
}

/// Software renderer that keeps the last frame as a pixmap.
#[derive(Debug, Clone, Default)]
pub struct RasterRenderer {
    frame: Option<Pixmap>,
}

impl RasterRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last rendered frame, premultiplied.
    pub fn frame(&self) -> Option<&Pixmap> {
        self.frame.as_ref()
    }

    /// Allocate a cleared frame of `size`.
    pub fn resize(&mut self, size: Size, background: Option<Color>) -> RenderResult<()> {
        let invalid = || RendererError::InvalidSize {
            width: size.width,
            height: size.height,
        };
        let valid = |v: f64| (1.0..=MAX_DIMENSION).contains(&v);
        if !valid(size.width) || !valid(size.height) {
            return Err(invalid());
        }

        let (width, height) = (size.width.ceil() as u32, size.height.ceil() as u32);
        let mut pixmap = Pixmap::new(width, height).ok_or_else(invalid)?;
        if let Some(background) = background {
            pixmap.fill(skia_color(background));
        }
        self.frame = Some(pixmap);
        Ok(())
    }

    /// Fill `path` with the nonzero rule.
    pub fn fill_path(&mut self, path: &BezPath, color: Color) {
        let Some(frame) = self.frame.as_mut() else {
            log::warn!("fill_path called before begin_frame");
            return;
        };
        if let Some(path) = to_skia_path(path) {
            frame.fill_path(&path, &paint(color), FillRule::Winding, Transform::identity(), None);
        }
    }

    /// Stroke `path` with a line of `width`.
    pub fn stroke_path(&mut self, path: &BezPath, width: f32, color: Color) {
        let Some(frame) = self.frame.as_mut() else {
            log::warn!("stroke_path called before begin_frame");
            return;
        };
        if let Some(path) = to_skia_path(path) {
            let stroke = tiny_skia::Stroke {
                width,
                ..Default::default()
            };
            frame.stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }

    /// Encode the last frame in `options.format`.
    pub fn encode(&self, options: SnapshotOptions) -> RenderResult<Vec<u8>> {
        let frame = self.frame.as_ref().ok_or(RendererError::EmptySurface)?;
        let (width, height) = (frame.width(), frame.height());
        let mut bytes = Vec::new();

        match options.format {
            ImageFormat::Png => {
                let image = to_rgba_image(frame);
                PngEncoder::new(&mut bytes).write_image(
                    image.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )?;
            }
            ImageFormat::Jpeg => {
                let flattened = flatten_onto_white(frame).ok_or(RendererError::EmptySurface)?;
                JpegEncoder::new_with_quality(&mut bytes, options.quality.max(1)).write_image(
                    flattened.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )?;
            }
            ImageFormat::Webp => {
                let image = to_rgba_image(frame);
                WebPEncoder::new_lossless(&mut bytes).write_image(
                    image.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )?;
            }
        }

        log::debug!(
            "Encoded {width}x{height} snapshot as {:?}: {} bytes",
            options.format,
            bytes.len()
        );
        Ok(bytes)
    }
}

impl Renderer for RasterRenderer {
    fn begin_frame(&mut self, size: Size, background: Option<Color>) {
        if let Err(e) = self.resize(size, background) {
            log::error!("Failed to start frame: {e}");
            self.frame = None;
        }
    }

    fn paint_path(&mut self, path: &BezPath, color: Color, style: CurveStyle) {
        match style {
            CurveStyle::Fill => self.fill_path(path, color),
            CurveStyle::Stroke => self.stroke_path(path, HAIRLINE_WIDTH, color),
        }
    }
}

impl SnapshotSurface for RasterRenderer {
    type Image = RgbaImage;

    fn make_image_snapshot(&self) -> Option<RgbaImage> {
        self.frame.as_ref().map(to_rgba_image)
    }

    fn encode_to_base64(&self, options: SnapshotOptions) -> Option<String> {
        match self.encode(options) {
            Ok(bytes) => Some(STANDARD.encode(bytes)),
            Err(RendererError::EmptySurface) => None,
            Err(e) => {
                log::error!("Failed to encode snapshot: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use kurbo::Shape as _;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        Rect::new(x0, y0, x1, y1).to_path(0.1)
    }

    fn renderer(width: f64, height: f64) -> RasterRenderer {
        let mut renderer = RasterRenderer::new();
        renderer.begin_frame(Size::new(width, height), Some(Color::white()));
        renderer
    }

    fn snapshot(r: &RasterRenderer) -> RgbaImage {
        r.make_image_snapshot().expect("frame")
    }

    #[test]
    fn test_fill_covers_interior_only() {
        let mut r = renderer(10.0, 10.0);
        r.fill_path(&square(2.0, 2.0, 6.0, 6.0), Color::black());
        let frame = snapshot(&r);

        assert_eq!(*frame.get_pixel(3, 3), Rgba([0, 0, 0, 255]));
        assert_eq!(*frame.get_pixel(8, 8), Rgba([255, 255, 255, 255]));
        assert_eq!(*frame.get_pixel(0, 3), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_partial_coverage_is_antialiased() {
        let mut r = renderer(4.0, 4.0);
        r.fill_path(&square(0.0, 0.0, 1.5, 4.0), Color::black());
        let frame = snapshot(&r);
        let pixel = frame.get_pixel(1, 1);
        assert!(pixel[0] > 90 && pixel[0] < 170, "got {pixel:?}");
    }

    #[test]
    fn test_nonzero_overlap() {
        let mut path = square(0.0, 0.0, 6.0, 6.0);
        path.extend(square(2.0, 2.0, 4.0, 4.0).elements().iter().copied());
        let mut r = renderer(6.0, 6.0);
        r.fill_path(&path, Color::black());
        // Same winding direction: the inner square stays filled.
        assert_eq!(*snapshot(&r).get_pixel(3, 3), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_stroke_leaves_interior_empty() {
        let mut r = renderer(20.0, 20.0);
        r.paint_path(&square(4.0, 4.0, 16.0, 16.0), Color::black(), CurveStyle::Stroke);
        let frame = snapshot(&r);
        assert_eq!(*frame.get_pixel(10, 10), Rgba([255, 255, 255, 255]));
        assert!(frame.get_pixel(4, 10)[0] < 255);
    }

    #[test]
    fn test_translucent_blend() {
        let mut r = renderer(2.0, 2.0);
        r.fill_path(&square(0.0, 0.0, 2.0, 2.0), Color::new(0, 0, 0, 128));
        let frame = snapshot(&r);
        let pixel = frame.get_pixel(0, 0);
        assert_eq!(pixel[3], 255);
        assert!((120..=135).contains(&pixel[0]), "got {pixel:?}");
    }

    #[test]
    fn test_transparent_frame_demultiplies() {
        let mut r = RasterRenderer::new();
        r.begin_frame(Size::new(4.0, 4.0), None);
        r.fill_path(&square(0.0, 0.0, 2.0, 4.0), Color::new(255, 0, 0, 255));
        let frame = snapshot(&r);
        assert_eq!(*frame.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*frame.get_pixel(3, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_jpeg_is_flattened_onto_white() {
        let mut r = RasterRenderer::new();
        r.begin_frame(Size::new(8.0, 8.0), None);
        let options = SnapshotOptions::resolve(Some(ImageFormat::Jpeg), Some(100));
        let bytes = r.encode(options).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert!(decoded.get_pixel(4, 4)[0] > 250);
    }

    #[test]
    fn test_invalid_size() {
        let mut r = RasterRenderer::new();
        assert!(matches!(
            r.resize(Size::new(0.0, 10.0), None),
            Err(RendererError::InvalidSize { .. })
        ));
        r.begin_frame(Size::new(f64::NAN, 1.0), None);
        assert!(r.frame().is_none());
    }

    #[test]
    fn test_encode_without_frame() {
        let r = RasterRenderer::new();
        assert!(matches!(
            r.encode(SnapshotOptions::default()),
            Err(RendererError::EmptySurface)
        ));
        assert_eq!(r.encode_to_base64(SnapshotOptions::default()), None);
        assert!(r.make_image_snapshot().is_none());
    }
}
