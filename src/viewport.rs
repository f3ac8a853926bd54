//! Pan/zoom state for one canvas instance.
//!
//! `Viewport` is the only mutable owner of `scale` and `pan`; every other
//! controller reads it. Zoom always preserves a focal point: the model point
//! under the cursor (or under the viewport center for button/slider zoom)
//! renders at the same screen position before and after the scale change.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::geometry::{self, Point};

/// Inclusive scale range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
}

impl ZoomBounds {
    /// Clamp `scale` into the range. Inverted bounds resolve to `max`
    /// instead of panicking.
    #[must_use]
    pub fn clamp(self, scale: f64) -> f64 {
        scale.max(self.min).min(self.max)
    }

    /// Bounds are usable when both are finite, positive, and ordered.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }
}

/// Scale and pan offset. `pan` is in model units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scale: 1.0, pan: Point::default() }
    }
}

impl Viewport {
    #[must_use]
    pub fn screen_to_model(&self, screen: Point) -> Point {
        geometry::screen_to_model(screen, self.scale, self.pan)
    }

    #[must_use]
    pub fn model_to_screen(&self, model: Point) -> Point {
        geometry::model_to_screen(model, self.scale, self.pan)
    }

    /// Convert a screen-space distance (pixels) to model units.
    #[must_use]
    pub fn screen_dist_to_model(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// Shift the view by a screen-space delta.
    pub fn pan_by_screen(&mut self, delta: Point) {
        let d = geometry::screen_delta_to_model(delta, self.scale);
        self.pan = self.pan + d;
    }

    /// Multiply the scale by `factor` (clamped), keeping `focal` stationary.
    /// Returns whether the scale actually changed.
    pub fn zoom_at(&mut self, focal: Point, factor: f64, bounds: ZoomBounds) -> bool {
        self.set_scale_at(self.scale * factor, focal, bounds)
    }

    /// Set an absolute scale (clamped), keeping `focal` stationary.
    /// Returns whether the scale actually changed.
    pub fn set_scale_at(&mut self, scale: f64, focal: Point, bounds: ZoomBounds) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            return false;
        }
        let new_scale = bounds.clamp(scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }
        let anchor = self.screen_to_model(focal);
        self.scale = new_scale;
        // Solve model_to_screen(anchor) == focal for pan.
        self.pan = Point::new(focal.x / new_scale - anchor.x, focal.y / new_scale - anchor.y);
        true
    }

    /// Back to scale 1 with no pan.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Zoom multiplier for one wheel event: scrolling up zooms in.
#[must_use]
pub fn wheel_zoom_factor(dy: f64, step: f64) -> f64 {
    if dy < 0.0 {
        step
    } else if dy > 0.0 {
        1.0 / step
    } else {
        1.0
    }
}

/// Two-finger pinch tracking. Scale is derived from the ratio of the current
/// inter-touch distance to the distance at gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchGesture {
    pub start_distance: f64,
    pub start_scale: f64,
}

impl PinchGesture {
    /// Begin a pinch. Returns `None` when both touches coincide.
    #[must_use]
    pub fn begin(a: Point, b: Point, scale: f64) -> Option<Self> {
        let start_distance = a.distance(b);
        if start_distance <= f64::EPSILON {
            return None;
        }
        Some(Self { start_distance, start_scale: scale })
    }

    /// Apply the pinch for the current touch pair to `viewport`, preserving
    /// the touch midpoint. Returns whether the scale changed.
    pub fn update(&self, a: Point, b: Point, viewport: &mut Viewport, bounds: ZoomBounds) -> bool {
        let ratio = a.distance(b) / self.start_distance;
        viewport.set_scale_at(self.start_scale * ratio, a.midpoint(b), bounds)
    }
}
