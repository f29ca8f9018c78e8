//! Undo/redo history over completed curves.
//!
//! Two stacks of `(id, curve)` pairs. Undo moves the most recently pushed
//! entry from the undo stack to the redo stack; redo moves it back. "Most
//! recent" is push order, never id order.

use crate::curve::{Curve, CurveId};
use serde::{Deserialize, Serialize};

/// What `push` does to previously undone curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedoPolicy {
    /// A new curve discards everything that could be redone.
    #[default]
    Truncate,
    /// Undone curves stay redoable after new curves are pushed.
    Preserve,
}

/// An undone curve and where it sat among the completed curves.
#[derive(Debug, Clone)]
struct Undone {
    id: CurveId,
    curve: Curve,
    position: Option<usize>,
}

/// Two-stack undo/redo engine.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    undoable: Vec<(CurveId, Curve)>,
    redoable: Vec<Undone>,
    policy: RedoPolicy,
}

impl HistoryStack {
    /// Create a history seeded with already completed curves (oldest first).
    pub fn new(seed: impl IntoIterator<Item = (CurveId, Curve)>, policy: RedoPolicy) -> Self {
        Self {
            undoable: seed.into_iter().collect(),
            redoable: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> RedoPolicy {
        self.policy
    }

    /// Record a newly completed curve.
    pub fn push(&mut self, id: CurveId, curve: Curve) {
        match self.policy {
            RedoPolicy::Truncate => self.redoable.clear(),
            // An id may only live on one stack.
            RedoPolicy::Preserve => self.redoable.retain(|undone| undone.id != id),
        }
        self.undoable.push((id, curve));
    }

    /// Move the most recent curve to the redo stack and return its id.
    pub fn undo(&mut self) -> Option<CurveId> {
        self.undo_from(|_| None)
    }

    /// Like [`undo`](Self::undo), remembering the curve's position in the
    /// store as reported by `position_of` so redo can put it back there.
    pub fn undo_from(
        &mut self,
        position_of: impl FnOnce(CurveId) -> Option<usize>,
    ) -> Option<CurveId> {
        let (id, curve) = self.undoable.pop()?;
        let position = position_of(id);
        self.redoable.push(Undone { id, curve, position });
        Some(id)
    }

    /// Move the most recently undone curve back and return it.
    pub fn redo(&mut self) -> Option<(CurveId, Curve)> {
        self.redo_with_position().map(|(id, curve, _)| (id, curve))
    }

    /// Like [`redo`](Self::redo), also returning the position recorded at undo time.
    pub fn redo_with_position(&mut self) -> Option<(CurveId, Curve, Option<usize>)> {
        let Undone { id, curve, position } = self.redoable.pop()?;
        self.undoable.push((id, curve.clone()));
        Some((id, curve, position))
    }

    /// Empty the undo stack. The redo stack is left alone.
    pub fn clear(&mut self) {
        self.undoable.clear();
    }

    /// Empty both stacks.
    pub fn clear_all(&mut self) {
        self.undoable.clear();
        self.redoable.clear();
    }

    /// Drop the given ids from both stacks.
    pub fn forget(&mut self, ids: &[CurveId]) {
        if ids.is_empty() {
            return;
        }
        self.undoable.retain(|(id, _)| !ids.contains(id));
        self.redoable.retain(|undone| !ids.contains(&undone.id));
    }

    pub fn can_undo(&self) -> bool {
        !self.undoable.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redoable.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undoable.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redoable.len()
    }
}
