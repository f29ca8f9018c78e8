//! Freehand stroke smoothing: raw samples to a filled outline polygon.
//!
//! The outline is built from two rails offset half the stroke width on either
//! side of a streamlined centerline, joined by round caps. The result is a
//! closed polygon, ready for [`crate::codec::to_bez_path`].

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Samples closer than this to the previous kept sample are dropped.
const MIN_SAMPLE_DISTANCE: f64 = 1e-6;

/// Turns raw stroke samples into an outline polygon.
///
/// Implementations must be pure: identical input gives identical output and
/// the input is never modified. A single point must still produce a
/// non-empty outline.
pub trait Smoother {
    fn outline(&self, points: &[Point], width: f64) -> Vec<Point>;
}

impl<S: Smoother + ?Sized> Smoother for &S {
    fn outline(&self, points: &[Point], width: f64) -> Vec<Point> {
        (**self).outline(points, width)
    }
}

impl<S: Smoother + ?Sized> Smoother for Box<S> {
    fn outline(&self, points: &[Point], width: f64) -> Vec<Point> {
        (**self).outline(points, width)
    }
}

/// Tuning knobs for [`FreehandSmoother`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingOptions {
    /// How strongly each sample is pulled toward the previous one (0 = raw input).
    pub streamline: f64,
    /// Polygon segments per round end cap.
    pub cap_segments: usize,
    /// Polygon segments for a single-point dot.
    pub dot_segments: usize,
}

impl Default for SmoothingOptions {
    fn default() -> Self {
        Self {
            streamline: 0.5,
            cap_segments: 8,
            dot_segments: 16,
        }
    }
}

/// Constant-width smoother with round caps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FreehandSmoother {
    pub options: SmoothingOptions,
}

impl FreehandSmoother {
    pub fn new(options: SmoothingOptions) -> Self {
        Self { options }
    }

    /// Pull every sample toward its predecessor and drop coincident ones.
    fn streamline(&self, points: &[Point]) -> Vec<Point> {
        let t = 0.15 + (1.0 - self.options.streamline.clamp(0.0, 1.0)) * 0.85;
        let mut out: Vec<Point> = Vec::with_capacity(points.len());

        for &raw in points {
            match out.last() {
                None => out.push(raw),
                Some(&prev) => {
                    let next = prev.lerp(raw, t);
                    if (next - prev).hypot() > MIN_SAMPLE_DISTANCE {
                        out.push(next);
                    }
                }
            }
        }

        // Always finish on the last raw sample so the stroke reaches the pointer-up position.
        if let (Some(&last_raw), Some(&last_kept)) = (points.last(), out.last()) {
            if out.len() > 1 && (last_raw - last_kept).hypot() > MIN_SAMPLE_DISTANCE {
                out.push(last_raw);
            }
        }
        out
    }

    fn dot(&self, center: Point, radius: f64) -> Vec<Point> {
        let segments = self.options.dot_segments.max(3);
        (0..segments)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / segments as f64;
                center + Vec2::from_angle(angle) * radius
            })
            .collect()
    }

    /// Arc around `center` starting at `from`, turning clockwise by half a
    /// revolution. Endpoints are excluded.
    fn cap(&self, center: Point, from: Vec2, out: &mut Vec<Point>) {
        let segments = self.options.cap_segments.max(2);
        for k in 1..segments {
            let angle = -PI * k as f64 / segments as f64;
            out.push(center + rotate(from, angle));
        }
    }
}

impl Smoother for FreehandSmoother {
    fn outline(&self, points: &[Point], width: f64) -> Vec<Point> {
        let radius = width.abs() / 2.0;
        let centerline = self.streamline(points);

        match centerline.len() {
            0 => return Vec::new(),
            1 => return self.dot(centerline[0], radius),
            _ => {}
        }

        let last = centerline.len() - 1;
        let normals: Vec<Vec2> = (0..centerline.len())
            .map(|i| {
                let prev = centerline[i.saturating_sub(1)];
                let next = centerline[(i + 1).min(last)];
                let mut dir = next - prev;
                if dir.hypot() <= MIN_SAMPLE_DISTANCE {
                    // Stroke doubled back on itself; use the incoming segment.
                    dir = centerline[i] - prev;
                }
                let dir = dir.normalize();
                Vec2::new(-dir.y, dir.x)
            })
            .collect();

        let mut outline = Vec::with_capacity(centerline.len() * 2 + self.options.cap_segments * 2);

        // Left rail forward, end cap, right rail backward, start cap.
        outline.extend(
            centerline
                .iter()
                .zip(&normals)
                .map(|(&p, &n)| p + n * radius),
        );
        self.cap(centerline[last], normals[last] * radius, &mut outline);
        outline.extend(
            centerline
                .iter()
                .zip(&normals)
                .rev()
                .map(|(&p, &n)| p - n * radius),
        );
        self.cap(centerline[0], -normals[0] * radius, &mut outline);

        outline
    }
}

fn rotate(v: Vec2, angle: f64) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoother() -> FreehandSmoother {
        FreehandSmoother::default()
    }

    #[test]
    fn test_empty_input() {
        assert!(smoother().outline(&[], 4.0).is_empty());
    }

    #[test]
    fn test_single_point_is_dot() {
        let center = Point::new(10.0, 10.0);
        let outline = smoother().outline(&[center], 4.0);

        assert_eq!(outline.len(), SmoothingOptions::default().dot_segments);
        for p in outline {
            assert!(((p - center).hypot() - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_coincident_points_collapse_to_dot() {
        let p = Point::new(3.0, 3.0);
        let outline = smoother().outline(&[p, p, p], 2.0);
        assert_eq!(outline.len(), SmoothingOptions::default().dot_segments);
    }

    #[test]
    fn test_horizontal_line_outline_width() {
        let points = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let outline = smoother().outline(&points, 4.0);

        // Left rail (first point) sits one radius off the centerline.
        assert!((outline[0].y.abs() - 2.0).abs() < 1e-9);
        for p in &outline {
            assert!(p.y.abs() <= 2.0 + 1e-9);
            assert!(p.x >= -2.0 - 1e-9 && p.x <= 12.0 + 1e-9);
        }
    }

    #[test]
    fn test_reaches_last_sample() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
        ];
        let outline = smoother().outline(&points, 2.0);
        let max_x = outline.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        assert!((max_x - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic_and_pure() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 7.0),
            Point::new(9.0, 2.0),
        ];
        let before = points.clone();
        let a = smoother().outline(&points, 3.0);
        let b = smoother().outline(&points, 3.0);
        assert_eq!(a, b);
        assert_eq!(points, before);
    }
}
