//! Input model: modifier keys, buttons, keys, and the interaction state machine.
//!
//! `InputState` is the one gesture being tracked between pointer-down and
//! pointer-up. Because it is a single enum value, an element can never be
//! dragged and resized at the same time, and a pinch excludes both.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::drag::DragSession;
use crate::element::ElementId;
use crate::geometry::Point;
use crate::resize::ResizeSession;
use crate::viewport::PinchGesture;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on Windows/Linux or Cmd on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"ArrowLeft"`, `" "`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// Whether this is the space bar.
    #[must_use]
    pub fn is_space(&self) -> bool {
        self.0 == " " || self.0 == "Space" || self.0 == "Spacebar"
    }

    /// Unit direction for arrow keys, `None` otherwise.
    #[must_use]
    pub fn arrow_direction(&self) -> Option<Point> {
        match self.0.as_str() {
            "ArrowLeft" => Some(Point::new(-1.0, 0.0)),
            "ArrowRight" => Some(Point::new(1.0, 0.0)),
            "ArrowUp" => Some(Point::new(0.0, -1.0)),
            "ArrowDown" => Some(Point::new(0.0, 1.0)),
            _ => None,
        }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// One active touch point, as listed in a browser `TouchEvent.touches`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    /// Browser-assigned identifier, stable for the life of the touch.
    pub id: i32,
    /// Canvas-relative position.
    pub screen: Point,
}

impl Touch {
    #[must_use]
    pub fn new(id: i32, x: f64, y: f64) -> Self {
        Self { id, screen: Point::new(x, y) }
    }
}

/// The gesture currently in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The canvas is being panned by a pointer or single touch.
    Panning {
        /// Screen position of the previous event, used to compute the pan delta.
        last_screen: Point,
    },
    /// An element is being moved.
    DraggingElement(DragSession),
    /// An element is being resized by one of its corner handles.
    ResizingElement(ResizeSession),
    /// Two touches are pinch-zooming the canvas.
    Pinching(PinchGesture),
}

impl InputState {
    /// The element this gesture operates on, if any.
    #[must_use]
    pub fn element_id(&self) -> Option<ElementId> {
        match self {
            Self::DraggingElement(s) => Some(s.id),
            Self::ResizingElement(s) => Some(s.id),
            Self::Idle | Self::Panning { .. } | Self::Pinching(_) => None,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
