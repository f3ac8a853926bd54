//! Rendering projection: where each element lands on screen.
//!
//! The projection is read-only. Rotation stays a visual transform about the
//! box center and never feeds back into model geometry. The selected element
//! is drawn last so it sits above its neighbours without being reordered in
//! the floorplan.

#[cfg(test)]
#[path = "projection_test.rs"]
mod projection_test;

use crate::element::{ElementId, PlacedElement};
use crate::geometry::Point;
use crate::store::Floorplan;
use crate::viewport::Viewport;

/// On-screen box for one element, in canvas-relative CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, applied about the box center.
    pub rotation: f64,
}

impl ScreenBox {
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Project a model-space element through the viewport.
#[must_use]
pub fn project(e: &PlacedElement, viewport: &Viewport) -> ScreenBox {
    let origin = viewport.model_to_screen(e.position());
    ScreenBox {
        x: origin.x,
        y: origin.y,
        width: e.width * viewport.scale,
        height: e.height * viewport.scale,
        rotation: e.rotation,
    }
}

/// Elements in draw order: floorplan order, with the selected element moved
/// to the end.
#[must_use]
pub fn paint_order(floorplan: &Floorplan, selected: Option<ElementId>) -> Vec<&PlacedElement> {
    let (mut order, top): (Vec<_>, Vec<_>) =
        floorplan.elements().iter().partition(|e| Some(e.id) != selected);
    order.extend(top);
    order
}

/// One projected element ready to draw.
#[derive(Debug, Clone, Copy)]
pub struct ProjectedElement<'a> {
    pub element: &'a PlacedElement,
    pub screen: ScreenBox,
    pub selected: bool,
}

/// Project the whole floorplan in paint order.
#[must_use]
pub fn project_scene<'a>(
    floorplan: &'a Floorplan,
    viewport: &Viewport,
    selected: Option<ElementId>,
) -> Vec<ProjectedElement<'a>> {
    paint_order(floorplan, selected)
        .into_iter()
        .map(|element| ProjectedElement {
            element,
            screen: project(element, viewport),
            selected: Some(element.id) == selected,
        })
        .collect()
}
