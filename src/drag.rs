//! Element move: converts pointer deltas into model-space position updates.
//!
//! Deltas are taken between consecutive pointer events and divided by the
//! current scale, so a drag keeps working if the scale changes mid-gesture.
//! With a grid, the unsnapped position keeps accumulating and only the
//! committed position is rounded, so slow drags still cross cell boundaries.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use crate::element::ElementId;
use crate::geometry::{Point, screen_delta_to_model, snap_point};

/// Live state of one element drag, between pointer-down and pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Element being moved.
    pub id: ElementId,
    /// Screen position of the previous pointer event.
    pub last_screen: Point,
    /// Element position when the drag began.
    pub origin: Point,
    /// Unsnapped model position accumulated so far.
    raw: Point,
    /// Last position handed back to the caller.
    committed: Point,
}

impl DragSession {
    #[must_use]
    pub fn begin(id: ElementId, element_position: Point, screen: Point) -> Self {
        Self { id, last_screen: screen, origin: element_position, raw: element_position, committed: element_position }
    }

    /// Feed the next pointer position. Returns the new element position, or
    /// `None` when it did not change.
    pub fn update(&mut self, screen: Point, scale: f64, grid: Option<f64>) -> Option<Point> {
        let delta = screen_delta_to_model(screen - self.last_screen, scale);
        self.last_screen = screen;
        self.raw = self.raw + delta;
        let next = match grid {
            Some(cell) => snap_point(self.raw, cell),
            None => self.raw,
        };
        if next == self.committed {
            return None;
        }
        self.committed = next;
        Some(next)
    }

    /// Current committed position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.committed
    }

    /// Whether the element ends up somewhere other than where it started.
    #[must_use]
    pub fn moved(&self) -> bool {
        self.committed != self.origin
    }
}
