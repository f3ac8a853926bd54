//! Hit-testing: which element, and which part of it, is under a screen point.
//!
//! Handles are tested in screen space so their grab radius stays constant
//! across zoom levels. Bodies are tested in each element's local frame so
//! rotated elements are hit where they are drawn.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::HANDLE_RADIUS_PX;
use crate::element::{ElementId, PlacedElement};
use crate::geometry::Point;
use crate::resize::ResizeHandle;
use crate::store::Floorplan;
use crate::viewport::Viewport;

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeHandle),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Rotate `p` about `center` by `degrees` (clockwise on a y-down canvas).
#[must_use]
pub fn rotate_about(p: Point, center: Point, degrees: f64) -> Point {
    if degrees.abs() < f64::EPSILON {
        return p;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
}

/// Model-space position of each corner handle, following the element's rotation.
#[must_use]
pub fn handle_positions(e: &PlacedElement) -> [(ResizeHandle, Point); 4] {
    let c = e.center();
    let corner = |h: ResizeHandle| {
        let x = if h.moves_left() { e.x } else { e.x + e.width };
        let y = if h.moves_top() { e.y } else { e.y + e.height };
        (h, rotate_about(Point::new(x, y), c, e.rotation))
    };
    ResizeHandle::ALL.map(corner)
}

/// Whether the model point lies inside the element's (rotated) box.
#[must_use]
pub fn contains(e: &PlacedElement, model_pt: Point) -> bool {
    let local = rotate_about(model_pt, e.center(), -e.rotation);
    local.x >= e.x && local.x <= e.x + e.width && local.y >= e.y && local.y <= e.y + e.height
}

/// Test what is under `screen_pt`.
///
/// Resize handles of the selected element win, then the selected element's
/// body (it paints on top), then other bodies from top to bottom.
#[must_use]
pub fn hit_test(screen_pt: Point, floorplan: &Floorplan, viewport: &Viewport, selected: Option<ElementId>) -> Option<Hit> {
    let selected_el = selected.and_then(|id| floorplan.get(&id));

    if let Some(e) = selected_el {
        for (handle, pos) in handle_positions(e) {
            if viewport.model_to_screen(pos).distance(screen_pt) <= HANDLE_RADIUS_PX {
                return Some(Hit { element_id: e.id, part: HitPart::ResizeHandle(handle) });
            }
        }
    }

    let model_pt = viewport.screen_to_model(screen_pt);

    if let Some(e) = selected_el {
        if contains(e, model_pt) {
            return Some(Hit { element_id: e.id, part: HitPart::Body });
        }
    }

    floorplan
        .elements()
        .iter()
        .rev()
        .find(|e| contains(e, model_pt))
        .map(|e| Hit { element_id: e.id, part: HitPart::Body })
}
