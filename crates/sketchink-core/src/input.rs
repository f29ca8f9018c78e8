//! Pointer samples delivered by a mouse/touch source.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event type for unified mouse/touch handling.
///
/// `timestamp` is in milliseconds from an arbitrary origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    Down { position: Point, timestamp: i64 },
    Move { position: Point, timestamp: i64 },
    Up { position: Point, timestamp: i64 },
}

impl PointerEvent {
    pub fn down(x: f64, y: f64, timestamp: i64) -> Self {
        PointerEvent::Down {
            position: Point::new(x, y),
            timestamp,
        }
    }

    pub fn moved(x: f64, y: f64, timestamp: i64) -> Self {
        PointerEvent::Move {
            position: Point::new(x, y),
            timestamp,
        }
    }

    pub fn up(x: f64, y: f64, timestamp: i64) -> Self {
        PointerEvent::Up {
            position: Point::new(x, y),
            timestamp,
        }
    }

    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position, .. } => position,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match *self {
            PointerEvent::Down { timestamp, .. }
            | PointerEvent::Move { timestamp, .. }
            | PointerEvent::Up { timestamp, .. } => timestamp,
        }
    }
}
