//! Drawing session: the public operation surface.
//!
//! A [`SessionController`] owns one curve store, one history stack, the
//! derived view and the subscribed listeners. Every mutating operation
//! commits to the store, refreshes the view and only then notifies
//! listeners, so a listener always observes settled state.
//!
//! Listeners only ever see shared borrows of event data while the session
//! is mutably borrowed, so they cannot mutate the session from inside a
//! callback.

use crate::codec::{self, CodecError, SvgOptions};
use crate::color::Color;
use crate::config::SessionConfig;
use crate::curve::{Curve, CurveId, CurveStyle, CurvesDump};
use crate::export::{ImageFormat, SnapshotOptions, SnapshotSurface};
use crate::history::HistoryStack;
use crate::ids::CurveIdAllocator;
use crate::input::PointerEvent;
use crate::smoothing::{FreehandSmoother, Smoother};
use crate::store::CurveStore;
use crate::view::{DerivedPaths, DerivedView};
use kurbo::Point;

/// Receives session notifications.
///
/// Both methods default to doing nothing.
pub trait SessionListener {
    /// A curve was started, extended, finished or restored by redo.
    fn on_curve_update(&mut self, _id: CurveId, _curve: &Curve, _finished: bool) {}

    /// Curves were removed by undo, reset or delete.
    fn on_curves_removed(&mut self, _ids: &[CurveId]) {}
}

/// A session notification, as passed to [`FnListener`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent<'a> {
    CurveUpdated {
        id: CurveId,
        curve: &'a Curve,
        finished: bool,
    },
    CurvesRemoved {
        ids: &'a [CurveId],
    },
}

/// Adapts a closure into a [`SessionListener`].
pub struct FnListener<F>(pub F);

impl<F> FnListener<F>
where
    F: FnMut(SessionEvent<'_>),
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> SessionListener for FnListener<F>
where
    F: FnMut(SessionEvent<'_>),
{
    fn on_curve_update(&mut self, id: CurveId, curve: &Curve, finished: bool) {
        (self.0)(SessionEvent::CurveUpdated { id, curve, finished });
    }

    fn on_curves_removed(&mut self, ids: &[CurveId]) {
        (self.0)(SessionEvent::CurvesRemoved { ids });
    }
}

/// Handle returned by [`SessionController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// One drawing session.
pub struct SessionController<S: Smoother = FreehandSmoother> {
    config: SessionConfig,
    store: CurveStore,
    history: HistoryStack,
    view: DerivedView,
    ids: CurveIdAllocator,
    smoother: S,
    listeners: Vec<(ListenerId, Box<dyn SessionListener>)>,
    next_listener: u64,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SessionController {
    /// Create an empty session using the freehand smoother.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_curves(config, Vec::new())
    }

    /// Create a session that starts out with `curves` completed.
    ///
    /// The history is seeded from them, so they can be undone.
    pub fn with_curves(config: SessionConfig, curves: CurvesDump) -> Self {
        let smoother = FreehandSmoother::new(config.smoothing);
        Self::with_smoother(config, smoother, curves)
    }
}

impl<S: Smoother> SessionController<S> {
    /// Create a session with a custom smoother.
    pub fn with_smoother(config: SessionConfig, smoother: S, curves: CurvesDump) -> Self {
        let mut store = CurveStore::new(config.stroke_width);
        let mut ids = CurveIdAllocator::new(config.id_policy);
        for (id, _) in &curves {
            ids.observe(*id);
        }
        store.import_curves(curves);

        // Seed from the store so duplicate ids in the input collapse the same way.
        let history = HistoryStack::new(store.export_curves(), config.redo_policy);
        let mut view = DerivedView::new();
        view.refresh(&store, &smoother);

        log::debug!("Session created with {} curves", store.len());

        Self {
            config,
            store,
            history,
            view,
            ids,
            smoother,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    // --- listeners ---

    /// Register a listener. Listeners are notified in subscription order.
    pub fn subscribe(&mut self, listener: impl SessionListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn emit_update(&mut self, id: CurveId, curve: &Curve, finished: bool) {
        for (_, listener) in &mut self.listeners {
            listener.on_curve_update(id, curve, finished);
        }
    }

    fn emit_removed(&mut self, ids: &[CurveId]) {
        if ids.is_empty() {
            return;
        }
        for (_, listener) in &mut self.listeners {
            listener.on_curves_removed(ids);
        }
    }

    fn refresh(&mut self) {
        self.view.refresh(&self.store, &self.smoother);
    }

    /// The active stroke as a curve with the current color and style.
    fn active_curve(&self) -> Option<(CurveId, Curve)> {
        let current = self.store.current();
        let id = current.id()?;
        let points = current.points()?.to_vec();
        Some((
            id,
            Curve::new(
                points,
                current.width,
                self.config.stroke_color,
                self.config.stroke_style,
            ),
        ))
    }

    // --- pointer lifecycle ---

    /// Start a stroke at `point`. Returns the new curve id.
    ///
    /// Ignored while read-only or while another stroke is active.
    pub fn on_pointer_down(&mut self, point: Point, timestamp: i64) -> Option<CurveId> {
        if self.config.readonly || self.store.is_drawing() {
            return None;
        }

        let store = &self.store;
        let id = self.ids.allocate(timestamp, |id| store.contains(id));
        if !self.store.begin_stroke(id, point, self.config.stroke_width) {
            return None;
        }
        self.refresh();
        log::debug!("Stroke {id} started at ({}, {})", point.x, point.y);

        if let Some((id, curve)) = self.active_curve() {
            self.emit_update(id, &curve, false);
        }
        Some(id)
    }

    /// Extend the active stroke. Returns `false` if nothing was drawn.
    pub fn on_pointer_move(&mut self, point: Point) -> bool {
        if self.config.readonly || !self.store.extend_stroke(point) {
            return false;
        }
        self.refresh();

        if !self.listeners.is_empty() {
            if let Some((id, curve)) = self.active_curve() {
                self.emit_update(id, &curve, false);
            }
        }
        true
    }

    /// Finish the active stroke and record it in the history.
    pub fn on_pointer_up(&mut self) -> Option<CurveId> {
        if self.config.readonly {
            return None;
        }
        let (id, curve) = self
            .store
            .end_stroke(self.config.stroke_color, self.config.stroke_style)?;
        self.history.push(id, curve.clone());
        self.refresh();
        log::debug!("Stroke {id} finished with {} points", curve.len());

        self.emit_update(id, &curve, true);
        Some(id)
    }

    /// Dispatch a raw pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                timestamp,
            } => {
                self.on_pointer_down(position, timestamp);
            }
            PointerEvent::Move { position, .. } => {
                self.on_pointer_move(position);
            }
            PointerEvent::Up { .. } => {
                self.on_pointer_up();
            }
        }
    }

    // --- history ---

    /// Remove the most recently completed curve. Returns its id.
    pub fn undo(&mut self) -> Option<CurveId> {
        if self.config.readonly {
            return None;
        }
        let store = &self.store;
        let id = self.history.undo_from(|id| store.position(id))?;
        if self.store.remove(id).is_none() {
            log::warn!("Undo of curve {id} that is no longer in the store");
        }
        self.refresh();

        self.emit_removed(&[id]);
        Some(id)
    }

    /// Restore the most recently undone curve. Returns its id.
    pub fn redo(&mut self) -> Option<CurveId> {
        if self.config.readonly {
            return None;
        }
        let (id, curve, position) = self.history.redo_with_position()?;
        self.ids.observe(id);
        match position {
            Some(index) => self.store.insert_at(index, id, curve.clone()),
            None => self.store.insert(id, curve.clone()),
        }
        self.refresh();

        self.emit_update(id, &curve, true);
        Some(id)
    }

    /// Clear the active stroke, all completed curves and the whole history.
    ///
    /// Returns the removed ids.
    pub fn reset(&mut self) -> Vec<CurveId> {
        if self.config.readonly {
            return Vec::new();
        }
        let removed = self.store.reset();
        self.history.clear_all();
        self.refresh();
        log::debug!("Session reset, {} curves removed", removed.len());

        self.emit_removed(&removed);
        removed
    }

    /// Delete curves by id. Unknown ids are skipped.
    ///
    /// Returns the ids that were removed. Deleted curves also leave the
    /// history, so undo never targets a curve that is gone.
    pub fn delete_curves(&mut self, ids: &[CurveId]) -> Vec<CurveId> {
        let removed = self.store.delete_curves(ids);
        if removed.is_empty() {
            return removed;
        }
        self.history.forget(&removed);
        self.refresh();

        self.emit_removed(&removed);
        removed
    }

    // --- bulk import/export ---

    /// Merge curves into the session, last write wins per id.
    ///
    /// Imported curves are not part of the undo history.
    pub fn import_curves(&mut self, curves: CurvesDump) {
        let imported: Vec<CurveId> = curves.iter().map(|(id, _)| *id).collect();
        for &id in &imported {
            self.ids.observe(id);
        }
        self.history.forget(&imported);
        self.store.import_curves(curves);
        self.refresh();
        log::debug!("Imported {} curves", imported.len());
    }

    /// All completed curves in completion order.
    pub fn export_curves(&self) -> CurvesDump {
        self.store.export_curves()
    }

    /// Parse a JSON point dump and import it. Returns the number of curves read.
    pub fn import_json(&mut self, json: &str) -> Result<usize, CodecError> {
        let curves = codec::dump_from_json(json)?;
        let count = curves.len();
        self.import_curves(curves);
        Ok(count)
    }

    /// Serialize all completed curves as a JSON point dump.
    pub fn export_json(&self) -> Result<String, CodecError> {
        codec::dump_to_json(&self.export_curves())
    }

    /// Render the completed curves as an SVG document.
    pub fn to_svg(&self, width: f64, height: f64, background: Option<Color>) -> String {
        let options = SvgOptions::new(width, height).with_background(background);
        codec::to_svg_document(self.store.curves_ordered(), &self.smoother, &options)
    }

    /// Ask `surface` for a base64-encoded snapshot (PNG at quality 100 by default).
    pub fn to_base64<T: SnapshotSurface>(
        &self,
        surface: &T,
        format: Option<ImageFormat>,
        quality: Option<u8>,
    ) -> Option<String> {
        let options = SnapshotOptions::resolve(format, quality);
        let encoded = surface.encode_to_base64(options);
        if encoded.is_none() {
            log::debug!("Snapshot export produced no image ({:?})", options.format);
        }
        encoded
    }

    /// Ask `surface` for its current image.
    pub fn to_image<T: SnapshotSurface>(&self, surface: &T) -> Option<T::Image> {
        surface.make_image_snapshot()
    }

    // --- style and mode ---

    /// Change the stroke width. Applies to the active stroke as well.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.config.stroke_width = width;
        self.store.set_width(width);
        self.refresh();
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.config.stroke_color = color;
    }

    pub fn set_stroke_style(&mut self, style: CurveStyle) {
        self.config.stroke_style = style;
    }

    /// Enter or leave read-only mode. Entering it drops any active stroke.
    pub fn set_readonly(&mut self, readonly: bool) {
        self.config.readonly = readonly;
        if readonly && self.store.cancel_stroke().is_some() {
            self.refresh();
        }
    }

    // --- queries ---

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &CurveStore {
        &self.store
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn view(&self) -> &DerivedView {
        &self.view
    }

    pub fn paths(&self) -> &DerivedPaths {
        self.view.paths()
    }

    pub fn smoother(&self) -> &S {
        &self.smoother
    }

    pub fn is_readonly(&self) -> bool {
        self.config.readonly
    }

    pub fn is_drawing(&self) -> bool {
        self.store.is_drawing()
    }

    pub fn can_undo(&self) -> bool {
        !self.config.readonly && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.config.readonly && self.history.can_redo()
    }
}
