//! Renderer trait abstraction.

use kurbo::{BezPath, Size};
use peniko::Color as PenikoColor;
use sketchink_core::{Color, CurveStyle, DerivedPaths, SessionController, Smoother};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("Nothing has been rendered yet")]
    EmptySurface,
    #[error("Encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The paths to paint.
    pub paths: &'a DerivedPaths,
    /// Surface size in pixels.
    pub viewport_size: Size,
    /// Background fill, or `None` for a transparent surface.
    pub background_color: Option<PenikoColor>,
    /// Color of the stroke being drawn.
    pub current_color: Color,
    /// Style of the stroke being drawn.
    pub current_style: CurveStyle,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(paths: &'a DerivedPaths, viewport_size: Size) -> Self {
        Self {
            paths,
            viewport_size,
            background_color: None,
            current_color: Color::black(),
            current_style: CurveStyle::default(),
        }
    }

    /// Context for everything a session currently shows.
    pub fn for_session<S: Smoother>(
        session: &'a SessionController<S>,
        viewport_size: Size,
    ) -> Self {
        let config = session.config();
        Self::new(session.paths(), viewport_size)
            .with_current_style(config.stroke_color, config.stroke_style)
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Option<PenikoColor>) -> Self {
        self.background_color = color;
        self
    }

    /// Set the paint of the stroke being drawn.
    pub fn with_current_style(mut self, color: Color, style: CurveStyle) -> Self {
        self.current_color = color;
        self.current_style = style;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Start a frame, clearing the surface to `background`.
    fn begin_frame(&mut self, size: Size, background: Option<Color>);

    /// Paint one curve outline. `Fill` paints the interior, `Stroke` a
    /// hairline along the outline.
    fn paint_path(&mut self, path: &BezPath, color: Color, style: CurveStyle);

    /// Finish the frame.
    fn end_frame(&mut self) {}

    /// Paint a whole frame: completed curves in completion order, then the
    /// stroke being drawn on top.
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.begin_frame(ctx.viewport_size, ctx.background_color.map(Color::from));
        for completed in &ctx.paths.completed {
            self.paint_path(&completed.path, completed.color, completed.style);
        }
        if let Some(current) = &ctx.paths.current {
            self.paint_path(current, ctx.current_color, ctx.current_style);
        }
        self.end_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[derive(Default)]
    struct Recorder {
        frames: usize,
        painted: Vec<(Color, CurveStyle)>,
    }

    impl Renderer for Recorder {
        fn begin_frame(&mut self, _size: Size, _background: Option<Color>) {
            self.frames += 1;
            self.painted.clear();
        }

        fn paint_path(&mut self, _path: &BezPath, color: Color, style: CurveStyle) {
            self.painted.push((color, style));
        }
    }

    #[test]
    fn test_current_stroke_is_painted_last() {
        let mut session = SessionController::default();
        session.set_stroke_color(Color::new(255, 0, 0, 255));
        session.on_pointer_down(Point::ZERO, 0);
        session.on_pointer_up();

        session.set_stroke_color(Color::new(0, 0, 255, 255));
        session.set_stroke_style(CurveStyle::Stroke);
        session.on_pointer_down(Point::new(5.0, 5.0), 1);

        let mut recorder = Recorder::default();
        recorder.build_scene(&RenderContext::for_session(&session, Size::new(10.0, 10.0)));

        assert_eq!(recorder.frames, 1);
        assert_eq!(
            recorder.painted,
            vec![
                (Color::new(255, 0, 0, 255), CurveStyle::Fill),
                (Color::new(0, 0, 255, 255), CurveStyle::Stroke),
            ]
        );
    }
}
