//! Renderable projection of a [`CurveStore`].
//!
//! The view is refreshed explicitly after each store mutation. It compares the
//! store's revision counters with the ones it last saw and only rebuilds the
//! part that changed. It never writes to the store.

use crate::codec::{path_data, to_bez_path};
use crate::color::Color;
use crate::curve::{CurveId, CurveStyle};
use crate::smoothing::Smoother;
use crate::store::CurveStore;
use kurbo::BezPath;

/// A completed curve ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedPath {
    pub id: CurveId,
    pub path: BezPath,
    pub color: Color,
    pub style: CurveStyle,
}

impl CompletedPath {
    /// SVG path data for this curve.
    pub fn descriptor(&self) -> String {
        path_data(&self.path)
    }
}

/// Renderable paths for a store snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedPaths {
    /// Outline of the stroke being drawn.
    pub current: Option<BezPath>,
    /// Completed curves in completion order.
    pub completed: Vec<CompletedPath>,
}

/// One-shot projection of a store.
pub fn derive<S: Smoother + ?Sized>(store: &CurveStore, smoother: &S) -> DerivedPaths {
    DerivedPaths {
        current: derive_current(store, smoother),
        completed: derive_completed(store, smoother),
    }
}

fn derive_current<S: Smoother + ?Sized>(store: &CurveStore, smoother: &S) -> Option<BezPath> {
    let current = store.current();
    current
        .points()
        .map(|points| to_bez_path(&smoother.outline(points, current.width)))
}

fn derive_completed<S: Smoother + ?Sized>(store: &CurveStore, smoother: &S) -> Vec<CompletedPath> {
    store
        .curves_ordered()
        .map(|(id, curve)| CompletedPath {
            id,
            path: to_bez_path(&smoother.outline(&curve.points, curve.width)),
            color: curve.color,
            style: curve.style,
        })
        .collect()
}

/// Cached [`DerivedPaths`] kept in sync with a store.
#[derive(Debug, Clone, Default)]
pub struct DerivedView {
    paths: DerivedPaths,
    current_revision: Option<u64>,
    completed_revision: Option<u64>,
}

impl DerivedView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute whatever changed in `store` since the last refresh.
    ///
    /// Returns `true` if anything was recomputed.
    pub fn refresh<S: Smoother + ?Sized>(&mut self, store: &CurveStore, smoother: &S) -> bool {
        let mut changed = false;

        if self.current_revision != Some(store.current_revision()) {
            self.paths.current = derive_current(store, smoother);
            self.current_revision = Some(store.current_revision());
            changed = true;
        }

        if self.completed_revision != Some(store.completed_revision()) {
            self.paths.completed = derive_completed(store, smoother);
            self.completed_revision = Some(store.completed_revision());
            log::debug!("Derived view rebuilt {} completed paths", self.paths.completed.len());
            changed = true;
        }

        changed
    }

    /// Force a full recompute on the next refresh (e.g. after the smoother changed).
    pub fn invalidate(&mut self) {
        self.current_revision = None;
        self.completed_revision = None;
    }

    pub fn paths(&self) -> &DerivedPaths {
        &self.paths
    }

    pub fn current(&self) -> Option<&BezPath> {
        self.paths.current.as_ref()
    }

    pub fn completed(&self) -> &[CompletedPath] {
        &self.paths.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::FreehandSmoother;
    use kurbo::Point;

    #[test]
    fn test_refresh_tracks_store() {
        let smoother = FreehandSmoother::default();
        let mut store = CurveStore::new(2.0);
        let mut view = DerivedView::new();

        assert!(view.refresh(&store, &smoother));
        assert!(view.current().is_none());
        assert!(!view.refresh(&store, &smoother));

        store.begin_stroke(1, Point::new(0.0, 0.0), 2.0);
        assert!(view.refresh(&store, &smoother));
        assert!(view.current().is_some());

        store.end_stroke(Color::black(), CurveStyle::Fill);
        assert!(view.refresh(&store, &smoother));
        assert!(view.current().is_none());
        assert_eq!(view.completed().len(), 1);
        assert_eq!(view.completed()[0].id, 1);
    }

    #[test]
    fn test_order_mirrors_store() {
        let smoother = FreehandSmoother::default();
        let mut store = CurveStore::new(2.0);
        for id in [5, 1, 3] {
            store.begin_stroke(id, Point::new(id as f64, 0.0), 2.0);
            store.end_stroke(Color::black(), CurveStyle::Fill);
        }

        let mut view = DerivedView::new();
        view.refresh(&store, &smoother);
        let ids: Vec<CurveId> = view.completed().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![5, 1, 3]);
        assert_eq!(view.paths(), &derive(&store, &smoother));
    }

    #[test]
    fn test_descriptor_matches_codec() {
        let smoother = FreehandSmoother::default();
        let mut store = CurveStore::new(3.0);
        store.begin_stroke(1, Point::new(0.0, 0.0), 3.0);
        store.extend_stroke(Point::new(4.0, 2.0));
        let (_, curve) = store.end_stroke(Color::black(), CurveStyle::Fill).unwrap();

        let paths = derive(&store, &smoother);
        let outline = smoother.outline(&curve.points, curve.width);
        let expected = crate::codec::to_path_descriptor(&outline);
        assert_eq!(paths.completed[0].descriptor(), expected);
    }
}
