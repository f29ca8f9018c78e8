//! Curve store: the in-progress stroke and the completed curves of a session.

use crate::color::Color;
use crate::curve::{Curve, CurveId, CurveStyle, CurvesDump};
use kurbo::{Point, Rect};
use std::collections::HashMap;

/// The stroke currently being drawn.
///
/// `id` and `points` are either both set (a stroke is active) or both unset.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCurve {
    id: Option<CurveId>,
    points: Option<Vec<Point>>,
    /// Width applied to the active stroke and to the next one.
    pub width: f64,
}

impl ActiveCurve {
    fn new(width: f64) -> Self {
        Self {
            id: None,
            points: None,
            width,
        }
    }

    pub fn id(&self) -> Option<CurveId> {
        self.id
    }

    pub fn points(&self) -> Option<&[Point]> {
        self.points.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.points.is_some()
    }

    fn clear(&mut self) {
        self.id = None;
        self.points = None;
    }
}

/// Authoritative in-memory state of one drawing session.
///
/// Completed curves are kept in a map plus an order vector; the order is the
/// completion order and doubles as paint order (back to front).
#[derive(Debug, Clone)]
pub struct CurveStore {
    current: ActiveCurve,
    curves: HashMap<CurveId, Curve>,
    order: Vec<CurveId>,
    current_revision: u64,
    completed_revision: u64,
}

impl Default for CurveStore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_STROKE_WIDTH)
    }
}

impl CurveStore {
    /// Create an empty store whose strokes start with `width`.
    pub fn new(width: f64) -> Self {
        Self {
            current: ActiveCurve::new(width),
            curves: HashMap::new(),
            order: Vec::new(),
            current_revision: 0,
            completed_revision: 0,
        }
    }

    /// Start a stroke. Returns `false` (and changes nothing) if one is already active.
    pub fn begin_stroke(&mut self, id: CurveId, first_point: Point, width: f64) -> bool {
        if self.current.is_active() {
            log::warn!("begin_stroke({id}) ignored: curve {:?} still active", self.current.id);
            return false;
        }
        self.current.id = Some(id);
        self.current.points = Some(vec![first_point]);
        self.current.width = width;
        self.current_revision += 1;
        true
    }

    /// Append a sample to the active stroke. Returns `false` if no stroke is active.
    pub fn extend_stroke(&mut self, point: Point) -> bool {
        match self.current.points.as_mut() {
            Some(points) => {
                points.push(point);
                self.current_revision += 1;
                true
            }
            None => false,
        }
    }

    /// Finish the active stroke and store it as a completed curve.
    ///
    /// Returns the finished entry, or `None` if no stroke was active.
    pub fn end_stroke(&mut self, color: Color, style: CurveStyle) -> Option<(CurveId, Curve)> {
        let (id, points) = match (self.current.id, self.current.points.take()) {
            (Some(id), Some(points)) if !points.is_empty() => (id, points),
            _ => {
                self.current.clear();
                return None;
            }
        };
        self.current.clear();
        self.current_revision += 1;

        let curve = Curve::new(points, self.current.width, color, style);
        self.insert(id, curve.clone());
        Some((id, curve))
    }

    /// Drop the active stroke without completing it.
    pub fn cancel_stroke(&mut self) -> Option<CurveId> {
        let id = self.current.id;
        if self.current.is_active() {
            self.current.clear();
            self.current_revision += 1;
        }
        id
    }

    /// Change the stroke width used for the active and upcoming strokes.
    pub fn set_width(&mut self, width: f64) {
        if self.current.width != width {
            self.current.width = width;
            if self.current.is_active() {
                self.current_revision += 1;
            }
        }
    }

    /// Clear everything. Returns the ids of the removed completed curves in order.
    pub fn reset(&mut self) -> Vec<CurveId> {
        self.cancel_stroke();
        let removed = std::mem::take(&mut self.order);
        self.curves.clear();
        if !removed.is_empty() {
            self.completed_revision += 1;
        }
        removed
    }

    /// Remove curves by id. Unknown ids are ignored.
    ///
    /// Returns the ids actually removed, in the order given.
    pub fn delete_curves(&mut self, ids: &[CurveId]) -> Vec<CurveId> {
        ids.iter()
            .copied()
            .filter(|&id| self.remove(id).is_some())
            .collect()
    }

    /// Remove a single curve.
    pub fn remove(&mut self, id: CurveId) -> Option<Curve> {
        let curve = self.curves.remove(&id)?;
        self.order.retain(|&existing| existing != id);
        self.completed_revision += 1;
        Some(curve)
    }

    /// Insert or replace a completed curve.
    ///
    /// A replaced curve keeps its position; a new one is appended.
    pub fn insert(&mut self, id: CurveId, curve: Curve) {
        if self.curves.insert(id, curve).is_none() {
            self.order.push(id);
        }
        self.completed_revision += 1;
    }

    /// Insert a completed curve at `index` in completion order, clamped to
    /// the end. A curve that is already stored is replaced where it is.
    pub fn insert_at(&mut self, index: usize, id: CurveId, curve: Curve) {
        if self.curves.insert(id, curve).is_none() {
            self.order.insert(index.min(self.order.len()), id);
        }
        self.completed_revision += 1;
    }

    /// Position of a completed curve in completion order.
    pub fn position(&self, id: CurveId) -> Option<usize> {
        self.order.iter().position(|&existing| existing == id)
    }

    /// Merge entries into the completed curves, last write wins per id.
    pub fn import_curves(&mut self, entries: impl IntoIterator<Item = (CurveId, Curve)>) {
        for (id, curve) in entries {
            self.insert(id, curve);
        }
    }

    /// All completed curves in completion order.
    pub fn export_curves(&self) -> CurvesDump {
        self.curves_ordered().map(|(id, curve)| (id, curve.clone())).collect()
    }

    /// Completed curves in completion order, borrowed.
    pub fn curves_ordered(&self) -> impl Iterator<Item = (CurveId, &Curve)> {
        self.order
            .iter()
            .filter_map(|&id| self.curves.get(&id).map(|curve| (id, curve)))
    }

    pub fn get(&self, id: CurveId) -> Option<&Curve> {
        self.curves.get(&id)
    }

    pub fn contains(&self, id: CurveId) -> bool {
        self.curves.contains_key(&id)
    }

    /// Completed curve ids in completion order.
    pub fn ids(&self) -> &[CurveId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn current(&self) -> &ActiveCurve {
        &self.current
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_active()
    }

    /// Samples of the active stroke.
    pub fn current_points(&self) -> Option<&[Point]> {
        self.current.points()
    }

    /// Largest completed id, if any.
    pub fn max_id(&self) -> Option<CurveId> {
        self.order.iter().copied().max()
    }

    /// Bounding box of all completed curves.
    pub fn bounds(&self) -> Option<Rect> {
        self.curves
            .values()
            .map(Curve::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }

    /// Bumped whenever the active stroke changes.
    pub fn current_revision(&self) -> u64 {
        self.current_revision
    }

    /// Bumped whenever the completed curves change.
    pub fn completed_revision(&self) -> u64 {
        self.completed_revision
    }
}
