//! Element model: catalog templates, placed elements, and sparse updates.
//!
//! Templates come from an external catalog and are read-only. A
//! `PlacedElement` is an instance of a template on a floorplan; its geometry
//! is in model units with the origin at the top-left of its unrotated box.
//! Rotation is visual only and never changes `x`, `y`, `width` or `height`.
//!
//! Wire names are camelCase to match the persistence payload.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FloorplanError;
use crate::geometry::{Point, Size};

/// Unique identifier for a placed element.
pub type ElementId = Uuid;

/// Catalog identifier for a template. Opaque to the core.
pub type TemplateId = String;

/// Whether an element is a bookable table or pure decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementCategory {
    /// Bookable table carrying capacity bounds.
    Reservable,
    /// Walls, plants, bars and the like. No booking semantics.
    Decorative,
}

/// Booking status of a reservable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementStatus {
    Available,
    Booked,
    Cancelled,
}

/// A placeable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementTemplate {
    pub id: TemplateId,
    pub name: String,
    pub category: ElementCategory,
    pub default_width: f64,
    pub default_height: f64,
    pub icon_ref: String,
}

impl ElementTemplate {
    #[must_use]
    pub fn default_size(&self) -> Size {
        Size::new(self.default_width, self.default_height)
    }
}

/// Seating bounds for a reservable element. Always `1 <= min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    #[serde(rename = "minCapacity")]
    pub min: u32,
    #[serde(rename = "maxCapacity")]
    pub max: u32,
}

impl Capacity {
    /// Validate and build a capacity range.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `min < 1` or `max < min`.
    pub fn new(min: u32, max: u32) -> Result<Self, FloorplanError> {
        if min < 1 {
            return Err(FloorplanError::validation(format!("minCapacity must be at least 1, got {min}")));
        }
        if max < min {
            return Err(FloorplanError::validation(format!(
                "maxCapacity ({max}) must not be less than minCapacity ({min})"
            )));
        }
        Ok(Self { min, max })
    }
}

/// An element instance on a floorplan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedElement {
    /// Assigned at creation and never reused.
    pub id: ElementId,
    /// Weak reference into the catalog; lookup only.
    pub template_id: TemplateId,
    pub category: ElementCategory,
    /// Left edge of the unrotated box in model units.
    pub x: f64,
    /// Top edge of the unrotated box in model units.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise degrees about the box center, in `[0, 360)`.
    pub rotation: f64,
    pub name: String,
    /// Present exactly when `category` is reservable.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Capacity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ElementStatus>,
}

impl PlacedElement {
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Center of the box; the rotation pivot.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    #[must_use]
    pub fn is_reservable(&self) -> bool {
        self.category == ElementCategory::Reservable
    }
}

/// Fields for a new element. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewElement {
    pub template_id: TemplateId,
    pub category: ElementCategory,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub capacity: Option<Capacity>,
    pub status: Option<ElementStatus>,
}

impl NewElement {
    /// A new element using the template's name and default size with its
    /// top-left corner at `at`.
    #[must_use]
    pub fn from_template(template: &ElementTemplate, at: Point) -> Self {
        Self {
            template_id: template.id.clone(),
            category: template.category,
            name: template.name.clone(),
            x: at.x,
            y: at.y,
            width: template.default_width,
            height: template.default_height,
            rotation: 0.0,
            capacity: None,
            status: None,
        }
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Sparse update for a placed element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ElementStatus>,
}

impl ElementUpdate {
    /// Update moving the element to `(x, y)`.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }

    /// Update setting the full box.
    #[must_use]
    pub fn bounds(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x: Some(x), y: Some(y), width: Some(width), height: Some(height), ..Default::default() }
    }

    /// Whether this update touches capacity fields.
    #[must_use]
    pub fn touches_capacity(&self) -> bool {
        self.min_capacity.is_some() || self.max_capacity.is_some()
    }
}
