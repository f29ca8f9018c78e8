//! Completed curve records and the bulk wire format.

use crate::color::Color;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Identifier of a curve, unique among the completed curves of a session.
pub type CurveId = i64;

/// Bulk import/export format: `(id, curve)` pairs in completion order.
pub type CurvesDump = Vec<(CurveId, Curve)>;

/// How a curve outline is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveStyle {
    /// Outline is stroked with a hairline.
    Stroke,
    /// Outline is filled.
    #[default]
    Fill,
}

impl CurveStyle {
    pub fn name(self) -> &'static str {
        match self {
            CurveStyle::Stroke => "stroke",
            CurveStyle::Fill => "fill",
        }
    }
}

/// A completed stroke: raw points plus the style it was drawn with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Raw pointer samples, in input order.
    #[serde(with = "point_pairs")]
    pub points: Vec<Point>,
    /// Stroke width handed to the smoother.
    pub width: f64,
    pub color: Color,
    pub style: CurveStyle,
}

impl Curve {
    pub fn new(points: Vec<Point>, width: f64, color: Color, style: CurveStyle) -> Self {
        Self {
            points,
            width,
            color,
            style,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of the raw points, grown by half the width.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        let raw = self
            .points
            .iter()
            .skip(1)
            .fold(Rect::from_points(*first, *first), |rect, p| {
                rect.union_pt(*p)
            });
        let half = self.width / 2.0;
        raw.inflate(half, half)
    }
}

/// Serialize points as `[x, y]` arrays instead of `{ "x": .., "y": .. }` objects.
mod point_pairs {
    use kurbo::Point;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
        let pairs: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
        let pairs = Vec::<[f64; 2]>::deserialize(deserializer)?;
        Ok(pairs.into_iter().map(|[x, y]| Point::new(x, y)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_include_width() {
        let curve = Curve::new(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 20.0)],
            4.0,
            Color::black(),
            CurveStyle::Fill,
        );
        let bounds = curve.bounds();
        assert!((bounds.x0 + 2.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_bounds() {
        let curve = Curve::new(Vec::new(), 4.0, Color::black(), CurveStyle::Fill);
        assert_eq!(curve.bounds(), Rect::ZERO);
    }

    #[test]
    fn test_wire_shape() {
        let curve = Curve::new(
            vec![Point::new(1.0, 2.0), Point::new(3.5, 4.0)],
            2.0,
            Color::new(255, 0, 0, 255),
            CurveStyle::Stroke,
        );
        let dump: CurvesDump = vec![(7, curve)];
        let value = serde_json::to_value(&dump).unwrap();

        assert_eq!(value[0][0], 7);
        assert_eq!(value[0][1]["points"][1][0], 3.5);
        assert_eq!(value[0][1]["style"], "stroke");
        assert_eq!(value[0][1]["color"]["r"], 255);
    }
}
