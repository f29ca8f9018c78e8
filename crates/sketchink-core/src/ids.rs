//! Curve id allocation.

use crate::curve::CurveId;
use serde::{Deserialize, Serialize};

/// How new curve ids are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Increasing counter, always above every id seen so far.
    #[default]
    Monotonic,
    /// Pointer-down timestamp, bumped past the last id on collision.
    Timestamp,
}

/// Hands out ids that never collide with completed curves.
#[derive(Debug, Clone, Default)]
pub struct CurveIdAllocator {
    policy: IdPolicy,
    last: Option<CurveId>,
}

impl CurveIdAllocator {
    pub fn new(policy: IdPolicy) -> Self {
        Self { policy, last: None }
    }

    pub fn policy(&self) -> IdPolicy {
        self.policy
    }

    /// Record an id that entered the session from outside (seed or import).
    pub fn observe(&mut self, id: CurveId) {
        self.last = Some(self.last.map_or(id, |last| last.max(id)));
    }

    /// Allocate an id for a stroke that started at `timestamp`.
    ///
    /// `taken` reports ids already in use by completed curves. Once the id
    /// space above the last id is used up, allocation wraps around to the
    /// smallest free positive id.
    pub fn allocate(&mut self, timestamp: i64, taken: impl Fn(CurveId) -> bool) -> CurveId {
        let candidate = match (self.policy, self.last) {
            (IdPolicy::Monotonic, Some(last)) => last.checked_add(1),
            (IdPolicy::Monotonic, None) => Some(1),
            (IdPolicy::Timestamp, Some(last)) if timestamp <= last => {
                let next = last.checked_add(1);
                if let Some(next) = next {
                    log::warn!(
                        "Curve id {timestamp} collides with previous id {last}; using {next}"
                    );
                }
                next
            }
            (IdPolicy::Timestamp, _) => Some(timestamp),
        };
        let start = candidate.unwrap_or_else(|| {
            log::warn!("Curve ids exhausted above {}; wrapping around", CurveId::MAX);
            1
        });

        let id = (start..=CurveId::MAX)
            .chain(1..start)
            .find(|&id| {
                let used = taken(id);
                if used {
                    log::warn!("Curve id {id} already in use; skipping");
                }
                !used
            })
            .unwrap_or(start);
        self.last = Some(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic() {
        let mut ids = CurveIdAllocator::new(IdPolicy::Monotonic);
        assert_eq!(ids.allocate(500, |_| false), 1);
        assert_eq!(ids.allocate(500, |_| false), 2);
        ids.observe(40);
        assert_eq!(ids.allocate(0, |_| false), 41);
    }

    #[test]
    fn test_timestamp_collision_is_bumped() {
        let mut ids = CurveIdAllocator::new(IdPolicy::Timestamp);
        assert_eq!(ids.allocate(1000, |_| false), 1000);
        assert_eq!(ids.allocate(1000, |_| false), 1001);
        assert_eq!(ids.allocate(2000, |_| false), 2000);
    }

    #[test]
    fn test_skips_taken_ids() {
        let mut ids = CurveIdAllocator::new(IdPolicy::Timestamp);
        assert_eq!(ids.allocate(7, |id| id == 7 || id == 8), 9);
    }

    #[test]
    fn test_wraps_around_when_exhausted() {
        let mut ids = CurveIdAllocator::new(IdPolicy::Monotonic);
        ids.observe(CurveId::MAX);
        assert_eq!(ids.allocate(0, |id| id == CurveId::MAX), 1);
        assert_eq!(ids.allocate(0, |id| id == CurveId::MAX || id == 1), 2);

        let mut ids = CurveIdAllocator::new(IdPolicy::Timestamp);
        ids.observe(CurveId::MAX);
        assert_eq!(ids.allocate(5, |id| id == CurveId::MAX || id == 1), 2);
    }
}
