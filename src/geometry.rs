//! Coordinate mapping between screen space and floorplan model space.
//!
//! Screen points are CSS pixels relative to the canvas element's own origin;
//! callers subtract the canvas bounding-box offset before calling in. The
//! pan offset is expressed in model units and applied before scaling:
//!
//! ```text
//! screen = (model + pan) * scale
//! model  = screen / scale - pan
//! ```
//!
//! Every controller goes through these functions so the math lives in one
//! place.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A point in either screen or model space.
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

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height in model units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Convert a canvas-relative screen point to model coordinates.
#[must_use]
pub fn screen_to_model(screen: Point, scale: f64, pan: Point) -> Point {
    Point {
        x: screen.x / scale - pan.x,
        y: screen.y / scale - pan.y,
    }
}

/// Convert a model point to canvas-relative screen coordinates.
#[must_use]
pub fn model_to_screen(model: Point, scale: f64, pan: Point) -> Point {
    Point {
        x: (model.x + pan.x) * scale,
        y: (model.y + pan.y) * scale,
    }
}

/// Convert a screen-space delta (pixels) to a model-space delta. Pan does not
/// participate; only scale does.
#[must_use]
pub fn screen_delta_to_model(delta: Point, scale: f64) -> Point {
    Point::new(delta.x / scale, delta.y / scale)
}

/// Round `value` to the nearest multiple of `cell`. A non-positive cell
/// leaves the value untouched.
#[must_use]
pub fn snap_to_grid(value: f64, cell: f64) -> f64 {
    if cell <= 0.0 {
        return value;
    }
    (value / cell).round() * cell
}

/// Snap both coordinates of `point` to the grid.
#[must_use]
pub fn snap_point(point: Point, cell: f64) -> Point {
    Point::new(snap_to_grid(point.x, cell), snap_to_grid(point.y, cell))
}

/// Normalize an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_rotation(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs due to rounding.
    if r >= 360.0 { 0.0 } else { r }
}
