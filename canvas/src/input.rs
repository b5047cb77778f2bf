//! Pointer input types and the drag gesture state machine.
//!
//! The host performs hit-testing (it owns the rendered sprites) and reports
//! which placement, if any, sits under the pointer on press. The engine only
//! tracks the gesture and turns pointer deltas into position updates.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::doc::PlacementId;

/// A pointer position in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn delta_from(self, other: Point) -> (f64, f64) {
        (self.x - other.x, self.y - other.y)
    }
}

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No pointer is held.
    #[default]
    Idle,
    /// A placement is being dragged.
    Dragging {
        /// Placement under the pointer at press time.
        id: PlacementId,
        /// Pointer position at the previous event.
        last: Point,
        /// Whether the pointer has moved since press.
        moved: bool,
    },
}

impl Gesture {
    /// The placement being dragged, if any.
    #[must_use]
    pub fn dragging(&self) -> Option<PlacementId> {
        match self {
            Self::Dragging { id, .. } => Some(*id),
            Self::Idle => None,
        }
    }
}
