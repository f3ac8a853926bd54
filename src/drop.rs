//! Drop-to-place from the external template palette.
//!
//! Decorative templates become elements as soon as they are dropped.
//! Reservable templates are staged instead: the drop records the template
//! and position, the host asks the operator for a name and capacity, and the
//! element is created only when that form is confirmed. Cancelling discards
//! the staged placement without touching the store.

#[cfg(test)]
#[path = "drop_test.rs"]
mod drop_test;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::consts::TEMPLATE_TRANSFER_TYPE;
use crate::element::{Capacity, ElementCategory, ElementTemplate, NewElement, PlacedElement};
use crate::error::FloorplanError;
use crate::geometry::{Point, Size, snap_point};
use crate::store::{Catalog, FloorplanStore};
use crate::viewport::Viewport;

/// Drag payload as transferred from the palette. Every field is optional
/// here so that missing fields surface as `MalformedPayload` rather than a
/// serde error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub id: Option<String>,
    pub category: Option<ElementCategory>,
    #[serde(alias = "defaultWidth")]
    pub width: Option<f64>,
    #[serde(alias = "defaultHeight")]
    pub height: Option<f64>,
    pub name: Option<String>,
    pub icon_ref: Option<String>,
}

/// Parse a palette payload into a template.
///
/// `id` and `category` are required. Missing size, name, or icon fall back to
/// the catalog entry with the same id.
///
/// # Errors
///
/// Returns `MalformedPayload` for invalid JSON, a missing `id` or
/// `category`, or a size that is absent from both payload and catalog or is
/// not positive.
pub fn parse_payload(raw: &str, catalog: &Catalog) -> Result<ElementTemplate, FloorplanError> {
    let payload: DragPayload =
        serde_json::from_str(raw).map_err(|e| FloorplanError::MalformedPayload(format!("invalid payload: {e}")))?;

    let id = payload
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| FloorplanError::MalformedPayload("payload is missing `id`".into()))?;
    let category = payload
        .category
        .ok_or_else(|| FloorplanError::MalformedPayload("payload is missing `category`".into()))?;

    let known = catalog.get(&id);
    let width = payload.width.or(known.map(|t| t.default_width));
    let height = payload.height.or(known.map(|t| t.default_height));
    let (Some(width), Some(height)) = (width, height) else {
        return Err(FloorplanError::MalformedPayload(format!("payload `{id}` has no size")));
    };
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return Err(FloorplanError::MalformedPayload(format!("payload `{id}` has invalid size {width}x{height}")));
    }

    let name = payload
        .name
        .or_else(|| known.map(|t| t.name.clone()))
        .unwrap_or_else(|| id.clone());
    let icon_ref = payload
        .icon_ref
        .or_else(|| known.map(|t| t.icon_ref.clone()))
        .unwrap_or_default();

    Ok(ElementTemplate { id, name, category, default_width: width, default_height: height, icon_ref })
}

/// Top-left model position that centers `size` under `screen`, optionally
/// snapped to the grid.
#[must_use]
pub fn placement_for(screen: Point, size: Size, viewport: &Viewport, grid: Option<f64>) -> Point {
    let cursor = viewport.screen_to_model(screen);
    let top_left = Point::new(cursor.x - size.width / 2.0, cursor.y - size.height / 2.0);
    match grid {
        Some(cell) => snap_point(top_left, cell),
        None => top_left,
    }
}

/// A reservable template dropped but not yet created.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPlacement {
    pub template: ElementTemplate,
    pub x: f64,
    pub y: f64,
}

/// Values collected by the capacity-configuration step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityForm {
    pub name: String,
    pub min_capacity: u32,
    pub max_capacity: u32,
}

/// What a drop produced.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// A decorative element was created immediately.
    Created(PlacedElement),
    /// A reservable placement is staged and waiting for capacity confirmation.
    NeedsCapacity(PendingPlacement),
}

/// Live drop-preview: where the template would land.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropPreview {
    pub position: Point,
    pub size: Option<Size>,
}

/// Drop controller state for one canvas.
#[derive(Debug, Clone, Default)]
pub struct DropController {
    pending: Option<PendingPlacement>,
    preview: Option<DropPreview>,
}

impl DropController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag carrying `transfer_type` may be dropped here.
    #[must_use]
    pub fn accepts(transfer_type: &str) -> bool {
        transfer_type == TEMPLATE_TRANSFER_TYPE
    }

    /// Update the live preview while a palette item hovers the canvas.
    ///
    /// Browsers usually hide payload contents during drag-over, so `size` is
    /// optional; without it the preview marks the cursor position. Returns the
    /// preview position, or `None` when the transfer type is not accepted.
    pub fn drag_over(
        &mut self,
        transfer_type: &str,
        screen: Point,
        size: Option<Size>,
        viewport: &Viewport,
        grid: Option<f64>,
    ) -> Option<Point> {
        if !Self::accepts(transfer_type) {
            self.preview = None;
            return None;
        }
        let position = placement_for(screen, size.unwrap_or(Size::new(0.0, 0.0)), viewport, grid);
        self.preview = Some(DropPreview { position, size });
        Some(position)
    }

    /// The pointer left the canvas without dropping.
    pub fn drag_leave(&mut self) {
        self.preview = None;
    }

    #[must_use]
    pub fn preview(&self) -> Option<DropPreview> {
        self.preview
    }

    /// Handle a drop at `screen`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedPayload` for an unaccepted transfer type or an
    /// unusable payload (nothing is created or staged), or the store's error
    /// if a decorative element fails validation.
    pub fn drop(
        &mut self,
        transfer_type: &str,
        raw: &str,
        screen: Point,
        viewport: &Viewport,
        grid: Option<f64>,
        store: &mut FloorplanStore,
    ) -> Result<DropOutcome, FloorplanError> {
        self.preview = None;
        if !Self::accepts(transfer_type) {
            return Err(FloorplanError::MalformedPayload(format!("unsupported transfer type `{transfer_type}`")));
        }
        let template = parse_payload(raw, store.catalog()).inspect_err(|e| warn!(error = %e, "drop rejected"))?;
        let at = placement_for(screen, template.default_size(), viewport, grid);

        match template.category {
            ElementCategory::Decorative => {
                let element = store.add_element(NewElement::from_template(&template, at))?;
                Ok(DropOutcome::Created(element))
            }
            ElementCategory::Reservable => {
                if let Some(old) = &self.pending {
                    debug!(template = %old.template.id, "replacing unconfirmed placement");
                }
                let pending = PendingPlacement { template, x: at.x, y: at.y };
                info!(template = %pending.template.id, x = pending.x, y = pending.y, "reservable placement staged");
                self.pending = Some(pending.clone());
                Ok(DropOutcome::NeedsCapacity(pending))
            }
        }
    }

    /// The staged reservable placement, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingPlacement> {
        self.pending.as_ref()
    }

    /// Create the staged element with the collected name and capacity.
    ///
    /// On a validation error the placement stays staged so the form can be
    /// corrected and confirmed again.
    ///
    /// # Errors
    ///
    /// Returns `Invariant` when nothing is staged, or `Validation` for an
    /// empty name, an invalid capacity range, or a duplicate table name.
    pub fn confirm(&mut self, form: &CapacityForm, store: &mut FloorplanStore) -> Result<PlacedElement, FloorplanError> {
        let pending = self
            .pending
            .as_ref()
            .ok_or_else(|| FloorplanError::Invariant("no placement is awaiting confirmation".into()))?;

        let name = form.name.trim();
        if name.is_empty() {
            return Err(FloorplanError::validation("table name must not be empty"));
        }
        let capacity = Capacity::new(form.min_capacity, form.max_capacity)?;

        let new = NewElement::from_template(&pending.template, Point::new(pending.x, pending.y))
            .with_name(name)
            .with_capacity(capacity);
        let element = store.add_element(new)?;
        self.pending = None;
        Ok(element)
    }

    /// Discard the staged placement. Returns whether one was staged.
    pub fn cancel(&mut self) -> bool {
        let had = self.pending.take().is_some();
        if had {
            debug!("staged placement discarded");
        }
        had
    }
}
