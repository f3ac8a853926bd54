//! Corner-handle resize with a minimum-size floor and frame coalescing.
//!
//! Geometry is always recomputed from the element's bounds at gesture start
//! plus the total pointer travel, never incrementally, so rounding and
//! clamping cannot drift. For handles on the left or top edge the opposite
//! edge stays pinned: position is derived from the fixed edge minus the new
//! size, which keeps position and size coupled when the floor clamps.

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use crate::element::{ElementId, PlacedElement};
use crate::geometry::{Point, screen_delta_to_model};

/// One of the four corner handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [Self::TopLeft, Self::TopRight, Self::BottomLeft, Self::BottomRight];

    /// Whether dragging this handle moves the left edge.
    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    /// Whether dragging this handle moves the top edge.
    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    /// CSS cursor for hovering this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::TopLeft | Self::BottomRight => "nwse-resize",
            Self::TopRight | Self::BottomLeft => "nesw-resize",
        }
    }
}

/// Axis-aligned box in model units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<&PlacedElement> for Bounds {
    fn from(e: &PlacedElement) -> Self {
        Self { x: e.x, y: e.y, width: e.width, height: e.height }
    }
}

/// Apply a model-space pointer delta to `orig` for `handle`.
///
/// Sizes are rounded to whole units and floored at `min_size` before the
/// position is derived, so a pinned edge lands exactly where it started.
#[must_use]
pub fn resize_bounds(orig: Bounds, handle: ResizeHandle, delta: Point, min_size: f64) -> Bounds {
    let raw_w = if handle.moves_left() { orig.width - delta.x } else { orig.width + delta.x };
    let raw_h = if handle.moves_top() { orig.height - delta.y } else { orig.height + delta.y };
    let width = raw_w.round().max(min_size);
    let height = raw_h.round().max(min_size);

    let x = if handle.moves_left() { orig.x + orig.width - width } else { orig.x };
    let y = if handle.moves_top() { orig.y + orig.height - height } else { orig.y };

    Bounds { x, y, width, height }
}

/// Live state of one resize gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    /// Element being resized.
    pub id: ElementId,
    pub handle: ResizeHandle,
    /// Screen position of the pointer at gesture start.
    pub start_screen: Point,
    /// Element bounds at gesture start.
    pub orig: Bounds,
    /// Screen position of the most recent pointer sample.
    pub last_screen: Point,
    /// Most recent bounds handed back to the caller.
    committed: Bounds,
    /// Computed bounds held back by coalescing.
    pending: Option<Bounds>,
    last_commit_ms: Option<f64>,
}

impl ResizeSession {
    #[must_use]
    pub fn begin(element: &PlacedElement, handle: ResizeHandle, screen: Point) -> Self {
        let orig = Bounds::from(element);
        Self {
            id: element.id,
            handle,
            start_screen: screen,
            orig,
            last_screen: screen,
            committed: orig,
            pending: None,
            last_commit_ms: None,
        }
    }

    /// Feed the next pointer position at time `now_ms`.
    ///
    /// Returns bounds to write now, or `None` when nothing changed or the
    /// write is held back until the next frame (`frame_ms` since the last
    /// write). A `frame_ms` of zero disables coalescing.
    pub fn update(&mut self, screen: Point, scale: f64, min_size: f64, now_ms: f64, frame_ms: f64) -> Option<Bounds> {
        self.last_screen = screen;
        let delta = screen_delta_to_model(screen - self.start_screen, scale);
        let next = resize_bounds(self.orig, self.handle, delta, min_size);
        if next == self.committed {
            self.pending = None;
            return None;
        }
        let due = match self.last_commit_ms {
            Some(last) => frame_ms <= 0.0 || now_ms - last >= frame_ms,
            None => true,
        };
        if due {
            self.pending = None;
            self.commit(next, now_ms);
            Some(next)
        } else {
            self.pending = Some(next);
            None
        }
    }

    /// Emit held-back bounds if a frame has elapsed since the last write.
    pub fn tick(&mut self, now_ms: f64, frame_ms: f64) -> Option<Bounds> {
        let last = self.last_commit_ms?;
        if now_ms - last < frame_ms {
            return None;
        }
        let next = self.pending.take()?;
        self.commit(next, now_ms);
        Some(next)
    }

    /// Emit held-back bounds unconditionally. Called on pointer-up so the
    /// final geometry is never dropped.
    pub fn flush(&mut self) -> Option<Bounds> {
        let next = self.pending.take()?;
        self.committed = next;
        Some(next)
    }

    /// Whether any bounds different from the starting ones were written.
    #[must_use]
    pub fn moved(&self) -> bool {
        self.committed != self.orig
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn commit(&mut self, next: Bounds, now_ms: f64) {
        self.committed = next;
        self.last_commit_ms = Some(now_ms);
    }
}
