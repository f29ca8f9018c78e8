//! Geometry and serialization codecs.
//!
//! - outline points to a renderable [`BezPath`] and to SVG path data
//! - completed curves to a standalone SVG document
//! - the JSON form of the bulk point dump

use crate::color::Color;
use crate::curve::{Curve, CurveId, CurveStyle, CurvesDump};
use crate::smoothing::Smoother;
use kurbo::{BezPath, PathEl, Point};
use thiserror::Error;

/// Codec errors.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid point dump: {0}")]
    InvalidDump(#[from] serde_json::Error),
}

/// Build a closed path through an outline polygon.
///
/// Each outline point becomes the control point of a quadratic segment that
/// ends halfway to the next point, which rounds off the polygon corners.
pub fn to_bez_path(outline: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some(&first) = outline.first() else {
        return path;
    };

    path.move_to(first);
    for (i, &p) in outline.iter().enumerate() {
        let next = outline[(i + 1) % outline.len()];
        path.quad_to(p, p.midpoint(next));
    }
    path.close_path();
    path
}

/// SVG path data (`d` attribute) for an outline polygon.
///
/// Same geometry as [`to_bez_path`]. Returns an empty string for an empty outline.
pub fn to_path_descriptor(outline: &[Point]) -> String {
    path_data(&to_bez_path(outline))
}

/// Serialize path elements as SVG path data with compact numbers.
pub fn path_data(path: &BezPath) -> String {
    path.elements()
        .iter()
        .map(|el| match *el {
            PathEl::MoveTo(p) => format!("M {} {}", num(p.x), num(p.y)),
            PathEl::LineTo(p) => format!("L {} {}", num(p.x), num(p.y)),
            PathEl::QuadTo(c, p) => {
                format!("Q {} {} {} {}", num(c.x), num(c.y), num(p.x), num(p.y))
            }
            PathEl::CurveTo(c1, c2, p) => format!(
                "C {} {} {} {} {} {}",
                num(c1.x),
                num(c1.y),
                num(c2.x),
                num(c2.y),
                num(p.x),
                num(p.y)
            ),
            PathEl::ClosePath => "Z".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a coordinate with at most two decimals and no trailing zeros.
fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let mut s = format!("{rounded:.2}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

/// Canvas size and background for SVG export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgOptions {
    pub width: f64,
    pub height: f64,
    pub background: Option<Color>,
}

impl SvgOptions {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: None,
        }
    }

    pub fn with_background(mut self, background: Option<Color>) -> Self {
        self.background = background;
        self
    }
}

/// Render completed curves into a standalone SVG document.
///
/// Curves are emitted in iteration order, so later curves paint over
/// earlier ones.
pub fn to_svg_document<'a, S, I>(curves: I, smoother: &S, options: &SvgOptions) -> String
where
    S: Smoother + ?Sized,
    I: IntoIterator<Item = (CurveId, &'a Curve)>,
{
    let width = num(options.width);
    let height = num(options.height);

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    svg.push('\n');

    if let Some(background) = options.background {
        svg.push_str(&format!(
            r#"  <rect x="0" y="0" width="{width}" height="{height}" fill="{}"{}/>"#,
            background.to_hex_rgb(),
            opacity_attr("fill-opacity", background),
        ));
        svg.push('\n');
    }

    for (id, curve) in curves {
        let outline = smoother.outline(&curve.points, curve.width);
        let d = to_path_descriptor(&outline);
        let color = curve.color.to_hex_rgb();
        let paint = match curve.style {
            CurveStyle::Fill => format!(
                r#"fill="{color}"{} stroke="none""#,
                opacity_attr("fill-opacity", curve.color)
            ),
            CurveStyle::Stroke => format!(
                r#"fill="none" stroke="{color}"{}"#,
                opacity_attr("stroke-opacity", curve.color)
            ),
        };
        svg.push_str(&format!(r#"  <path id="curve-{id}" d="{d}" {paint}/>"#));
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    svg
}

fn opacity_attr(name: &str, color: Color) -> String {
    if color.is_opaque() {
        String::new()
    } else {
        format!(r#" {name}="{}""#, num(color.opacity()))
    }
}

/// Serialize a point dump to JSON.
pub fn dump_to_json(dump: &[(CurveId, Curve)]) -> Result<String, CodecError> {
    Ok(serde_json::to_string(dump)?)
}

/// Parse a point dump from JSON.
pub fn dump_from_json(json: &str) -> Result<CurvesDump, CodecError> {
    Ok(serde_json::from_str(json)?)
}
