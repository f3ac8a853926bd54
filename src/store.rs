//! Element model store: floorplans, their elements, the template catalog,
//! and the single active selection.
//!
//! Every mutation validates a candidate copy first and commits only on
//! success, so a rejected operation leaves the store exactly as it was.
//! Element order within a floorplan is paint order: later entries draw on top.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::consts::MIN_ELEMENT_SIZE;
use crate::element::{Capacity, ElementCategory, ElementId, ElementTemplate, ElementUpdate, NewElement, PlacedElement};
use crate::error::FloorplanError;
use crate::geometry::normalize_rotation;

/// Unique identifier for a floorplan.
pub type FloorplanId = Uuid;

/// A named, ordered collection of placed elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Floorplan {
    pub id: FloorplanId,
    pub name: String,
    elements: Vec<PlacedElement>,
}

impl Floorplan {
    fn new(name: String) -> Self {
        Self { id: Uuid::new_v4(), name, elements: Vec::new() }
    }

    /// Elements in paint order (bottom first).
    #[must_use]
    pub fn elements(&self) -> &[PlacedElement] {
        &self.elements
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&PlacedElement> {
        self.elements.iter().find(|e| e.id == *id)
    }

    fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == *id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Persistence payload emitted on publish and accepted on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorplanSnapshot {
    pub floorplan_id: FloorplanId,
    pub name: String,
    pub elements: Vec<PlacedElement>,
}

/// Read-only template catalog, resolved before interaction begins.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: Vec<ElementTemplate>,
}

impl Catalog {
    #[must_use]
    pub fn new(templates: Vec<ElementTemplate>) -> Self {
        Self { templates }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ElementTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementTemplate> {
        self.templates.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// In-memory store of floorplans. At least one floorplan always exists and
/// exactly one is active.
#[derive(Debug, Clone)]
pub struct FloorplanStore {
    floorplans: Vec<Floorplan>,
    active: FloorplanId,
    selected: Option<ElementId>,
    catalog: Catalog,
    unique_table_names: bool,
    min_element_size: f64,
}

impl Default for FloorplanStore {
    fn default() -> Self {
        Self::new("Main floor")
    }
}

impl FloorplanStore {
    /// Create a store holding one empty floorplan named `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let first = Floorplan::new(name.to_string());
        Self {
            active: first.id,
            floorplans: vec![first],
            selected: None,
            catalog: Catalog::default(),
            unique_table_names: false,
            min_element_size: MIN_ELEMENT_SIZE,
        }
    }

    /// Install the template catalog.
    pub fn set_catalog(&mut self, catalog: Catalog) {
        info!(templates = catalog.len(), "catalog loaded");
        self.catalog = catalog;
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Require reservable element names to be unique within a floorplan.
    pub fn set_unique_table_names(&mut self, on: bool) {
        self.unique_table_names = on;
    }

    /// Smallest width or height any stored element may have.
    pub fn set_min_element_size(&mut self, size: f64) {
        self.min_element_size = size;
    }

    #[must_use]
    pub fn min_element_size(&self) -> f64 {
        self.min_element_size
    }

    // --- Queries ---

    /// The active floorplan.
    #[must_use]
    pub fn active(&self) -> &Floorplan {
        // `active` always names an existing floorplan; fall back to the first
        // one so this accessor stays total.
        self.floorplans
            .iter()
            .find(|f| f.id == self.active)
            .unwrap_or(&self.floorplans[0])
    }

    #[must_use]
    pub fn active_id(&self) -> FloorplanId {
        self.active
    }

    #[must_use]
    pub fn floorplans(&self) -> &[Floorplan] {
        &self.floorplans
    }

    /// Look up an element on the active floorplan.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&PlacedElement> {
        self.active().get(id)
    }

    /// The selected element id, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.selected
    }

    /// The selected element, if any.
    #[must_use]
    pub fn selected_element(&self) -> Option<&PlacedElement> {
        self.selected.and_then(|id| self.get(&id))
    }

    /// Whether `name` is already used by a reservable element on the active
    /// floorplan, ignoring `except`. Comparison is trimmed and case-insensitive.
    #[must_use]
    pub fn table_name_taken(&self, name: &str, except: Option<ElementId>) -> bool {
        let wanted = name.trim().to_lowercase();
        self.active()
            .elements
            .iter()
            .filter(|e| e.is_reservable() && Some(e.id) != except)
            .any(|e| e.name.trim().to_lowercase() == wanted)
    }

    // --- Element operations ---

    /// Add an element to the active floorplan and select it.
    ///
    /// Width and height are rounded to whole units.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a size below the floor, non-finite coordinates,
    /// capacity on a decorative element, missing capacity on a reservable
    /// element, or an empty/duplicate table name.
    pub fn add_element(&mut self, new: NewElement) -> Result<PlacedElement, FloorplanError> {
        let name = if new.name.trim().is_empty() {
            self.catalog
                .get(&new.template_id)
                .map_or(new.name, |t| t.name.clone())
        } else {
            new.name
        };
        let element = PlacedElement {
            id: Uuid::new_v4(),
            template_id: new.template_id,
            category: new.category,
            x: new.x,
            y: new.y,
            width: new.width.round(),
            height: new.height.round(),
            rotation: normalize_rotation(new.rotation),
            name,
            capacity: new.capacity,
            status: new.status,
        };
        self.validate(&element, true)
            .inspect_err(|e| warn!(error = %e, "add_element rejected"))?;

        info!(id = %element.id, category = ?element.category, name = %element.name, "element added");
        self.selected = Some(element.id);
        self.active_mut().elements.push(element.clone());
        Ok(element)
    }

    /// Merge `update` into an element on the active floorplan.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` for an unknown id, or `Validation` when the
    /// merged element breaks a size, capacity, status, or name rule. The
    /// element is unchanged on error.
    pub fn update_element(&mut self, id: &ElementId, update: &ElementUpdate) -> Result<PlacedElement, FloorplanError> {
        let current = self.get(id).ok_or(FloorplanError::ElementNotFound(*id))?;
        let mut candidate = current.clone();

        if let Some(x) = update.x {
            candidate.x = x;
        }
        if let Some(y) = update.y {
            candidate.y = y;
        }
        if let Some(w) = update.width {
            candidate.width = w.round();
        }
        if let Some(h) = update.height {
            candidate.height = h.round();
        }
        if let Some(r) = update.rotation {
            candidate.rotation = normalize_rotation(r);
        }
        if let Some(ref name) = update.name {
            candidate.name.clone_from(name);
        }
        if update.touches_capacity() {
            let Some(existing) = candidate.capacity else {
                return Err(FloorplanError::validation("capacity applies only to reservable elements"));
            };
            let min = update.min_capacity.unwrap_or(existing.min);
            let max = update.max_capacity.unwrap_or(existing.max);
            candidate.capacity = Some(
                Capacity::new(min, max).inspect_err(|e| warn!(%id, error = %e, "capacity update rejected"))?,
            );
        }
        if let Some(status) = update.status {
            candidate.status = Some(status);
        }

        self.validate(&candidate, update.name.is_some())
            .inspect_err(|e| warn!(%id, error = %e, "update_element rejected"))?;

        let fp = self.active_mut();
        if let Some(idx) = fp.index_of(id) {
            fp.elements[idx] = candidate.clone();
        }
        Ok(candidate)
    }

    /// Rotate an element by `degrees`, normalizing into `[0, 360)`.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` for an unknown id.
    pub fn rotate_element(&mut self, id: &ElementId, degrees: f64) -> Result<PlacedElement, FloorplanError> {
        let current = self.get(id).ok_or(FloorplanError::ElementNotFound(*id))?;
        let update = ElementUpdate { rotation: Some(current.rotation + degrees), ..Default::default() };
        self.update_element(id, &update)
    }

    /// Remove an element from the active floorplan, clearing the selection if
    /// it pointed at it.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` for an unknown id.
    pub fn delete_element(&mut self, id: &ElementId) -> Result<PlacedElement, FloorplanError> {
        let fp = self.active_mut();
        let idx = fp.index_of(id).ok_or(FloorplanError::ElementNotFound(*id))?;
        let removed = fp.elements.remove(idx);
        if self.selected == Some(*id) {
            self.selected = None;
        }
        info!(%id, "element deleted");
        Ok(removed)
    }

    /// Set or clear the selection. Returns whether the selection changed.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` when `id` names no element on the active
    /// floorplan.
    pub fn select_element(&mut self, id: Option<ElementId>) -> Result<bool, FloorplanError> {
        if let Some(id) = id {
            if self.get(&id).is_none() {
                return Err(FloorplanError::ElementNotFound(id));
            }
        }
        if self.selected == id {
            return Ok(false);
        }
        debug!(selected = ?id, "selection changed");
        self.selected = id;
        Ok(true)
    }

    // --- Floorplan operations ---

    /// Create an empty floorplan. The active floorplan does not change.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty name.
    pub fn add_floorplan(&mut self, name: &str) -> Result<FloorplanId, FloorplanError> {
        let name = validate_floorplan_name(name)?;
        let fp = Floorplan::new(name);
        let id = fp.id;
        info!(%id, name = %fp.name, "floorplan added");
        self.floorplans.push(fp);
        Ok(id)
    }

    /// Rename a floorplan.
    ///
    /// # Errors
    ///
    /// Returns `FloorplanNotFound` or `Validation` for an empty name.
    pub fn rename_floorplan(&mut self, id: &FloorplanId, name: &str) -> Result<(), FloorplanError> {
        let name = validate_floorplan_name(name)?;
        let fp = self
            .floorplans
            .iter_mut()
            .find(|f| f.id == *id)
            .ok_or(FloorplanError::FloorplanNotFound(*id))?;
        fp.name = name;
        Ok(())
    }

    /// Delete a floorplan. Deleting the active floorplan activates the first
    /// remaining one and clears the selection.
    ///
    /// # Errors
    ///
    /// Returns `FloorplanNotFound`, or `Invariant` when `id` is the last
    /// remaining floorplan.
    pub fn delete_floorplan(&mut self, id: &FloorplanId) -> Result<(), FloorplanError> {
        let idx = self
            .floorplans
            .iter()
            .position(|f| f.id == *id)
            .ok_or(FloorplanError::FloorplanNotFound(*id))?;
        if self.floorplans.len() == 1 {
            warn!(%id, "refusing to delete the last floorplan");
            return Err(FloorplanError::Invariant("at least one floorplan must exist".into()));
        }
        self.floorplans.remove(idx);
        if self.active == *id {
            self.active = self.floorplans[0].id;
            self.selected = None;
        }
        info!(%id, "floorplan deleted");
        Ok(())
    }

    /// Make another floorplan active, clearing the selection.
    ///
    /// # Errors
    ///
    /// Returns `FloorplanNotFound` for an unknown id.
    pub fn set_active_floorplan(&mut self, id: &FloorplanId) -> Result<(), FloorplanError> {
        if !self.floorplans.iter().any(|f| f.id == *id) {
            return Err(FloorplanError::FloorplanNotFound(*id));
        }
        if self.active != *id {
            self.active = *id;
            self.selected = None;
        }
        Ok(())
    }

    /// Insert or replace a floorplan from a persisted snapshot and make it
    /// active. Element ids are preserved.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if any element is invalid after rounding or ids
    /// repeat. Nothing is loaded on error.
    pub fn load_floorplan(&mut self, snapshot: FloorplanSnapshot) -> Result<(), FloorplanError> {
        let name = validate_floorplan_name(&snapshot.name)?;
        let mut seen = HashSet::new();
        let mut elements = snapshot.elements;
        for e in &mut elements {
            if !seen.insert(e.id) {
                return Err(FloorplanError::validation(format!("duplicate element id {}", e.id)));
            }
            e.width = e.width.round();
            e.height = e.height.round();
            e.rotation = normalize_rotation(e.rotation);
            validate_element_shape(e, self.min_element_size)
                .inspect_err(|err| warn!(id = %e.id, error = %err, "load_floorplan rejected"))?;
        }

        let id = snapshot.floorplan_id;
        info!(%id, elements = elements.len(), "floorplan loaded");
        if let Some(fp) = self.floorplans.iter_mut().find(|f| f.id == id) {
            fp.name = name;
            fp.elements = elements;
        } else {
            self.floorplans.push(Floorplan { id, name, elements });
        }
        self.active = id;
        self.selected = None;
        Ok(())
    }

    /// Serializable snapshot of the active floorplan.
    #[must_use]
    pub fn snapshot(&self) -> FloorplanSnapshot {
        let fp = self.active();
        FloorplanSnapshot { floorplan_id: fp.id, name: fp.name.clone(), elements: fp.elements.clone() }
    }

    // --- Internals ---

    fn active_mut(&mut self) -> &mut Floorplan {
        let active = self.active;
        let idx = self.floorplans.iter().position(|f| f.id == active).unwrap_or(0);
        &mut self.floorplans[idx]
    }

    /// Full element validation against the active floorplan. Name uniqueness
    /// is only checked when the name is being set.
    fn validate(&self, e: &PlacedElement, name_changed: bool) -> Result<(), FloorplanError> {
        validate_element_shape(e, self.min_element_size)?;
        if name_changed && e.is_reservable() && self.unique_table_names && self.table_name_taken(&e.name, Some(e.id)) {
            return Err(FloorplanError::validation(format!("table name '{}' is already in use", e.name.trim())));
        }
        Ok(())
    }
}

/// Checks that need only the element and the size floor.
fn validate_element_shape(e: &PlacedElement, min_size: f64) -> Result<(), FloorplanError> {
    if !(e.x.is_finite() && e.y.is_finite()) {
        return Err(FloorplanError::validation("position must be finite"));
    }
    if !(e.width.is_finite() && e.height.is_finite()) || e.width <= 0.0 || e.height <= 0.0 {
        return Err(FloorplanError::validation(format!(
            "width and height must be positive, got {}x{}",
            e.width, e.height
        )));
    }
    if e.width < min_size || e.height < min_size {
        return Err(FloorplanError::validation(format!(
            "width and height must be at least {min_size}, got {}x{}",
            e.width, e.height
        )));
    }
    match (e.category, e.capacity) {
        (ElementCategory::Reservable, Some(c)) => {
            Capacity::new(c.min, c.max)?;
            if e.name.trim().is_empty() {
                return Err(FloorplanError::validation("reservable elements need a name"));
            }
        }
        (ElementCategory::Reservable, None) => {
            return Err(FloorplanError::validation("reservable elements need a capacity"));
        }
        (ElementCategory::Decorative, Some(_)) => {
            return Err(FloorplanError::validation("capacity applies only to reservable elements"));
        }
        (ElementCategory::Decorative, None) => {
            if e.status.is_some() {
                return Err(FloorplanError::validation("status applies only to reservable elements"));
            }
        }
    }
    Ok(())
}

fn validate_floorplan_name(name: &str) -> Result<String, FloorplanError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FloorplanError::validation("floorplan name must not be empty"));
    }
    Ok(trimmed.to_string())
}
