use tracing::{debug, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::config::CanvasConfig;
use crate::drag::DragSession;
use crate::drop::{CapacityForm, DropController, DropOutcome, PendingPlacement};
use crate::element::{ElementId, ElementUpdate, PlacedElement};
use crate::error::FloorplanError;
use crate::geometry::{Point, Size, snap_point};
use crate::hit::{HitPart, hit_test};
use crate::input::{Button, InputState, Key, Modifiers, Touch, WheelDelta};
use crate::render;
use crate::resize::{Bounds, ResizeSession};
use crate::store::{Catalog, FloorplanId, FloorplanSnapshot, FloorplanStore};
use crate::viewport::{PinchGesture, Viewport, wheel_zoom_factor};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

const CURSOR_DEFAULT: &str = "default";
const CURSOR_GRAB: &str = "grab";
const CURSOR_GRABBING: &str = "grabbing";
const CURSOR_MOVE: &str = "move";

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ElementCreated(PlacedElement),
    ElementUpdated { id: ElementId, element: PlacedElement },
    ElementDeleted { id: ElementId },
    SelectionChanged(Option<ElementId>),
    /// A reservable template was dropped; the host must collect a name and
    /// capacity, then call `confirm_capacity` or `cancel_placement`.
    CapacityConfigRequested(PendingPlacement),
    /// A rejected operation the host may surface as a toast.
    Warning { code: &'static str, message: String },
    SetCursor(String),
    Publish(FloorplanSnapshot),
    RenderNeeded,
}

impl Action {
    fn warning(err: &FloorplanError) -> Self {
        Self::Warning { code: err.error_code(), message: err.to_string() }
    }
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub store: FloorplanStore,
    pub viewport: Viewport,
    pub config: CanvasConfig,
    pub input: InputState,
    pub drop: DropController,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    space_held: bool,
    cursor: String,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: CanvasConfig) -> Self {
        let config = config.sanitized();
        let mut store = FloorplanStore::default();
        store.set_unique_table_names(config.unique_table_names);
        store.set_min_element_size(config.min_element_size);
        Self {
            store,
            viewport: Viewport::default(),
            config,
            input: InputState::default(),
            drop: DropController::new(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            space_held: false,
            cursor: CURSOR_DEFAULT.to_string(),
        }
    }

    // --- Data inputs ---

    /// Install the template catalog used to complete drop payloads.
    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.store.set_catalog(catalog);
    }

    /// Hydrate a floorplan from a persisted snapshot and make it active.
    pub fn load_floorplan(&mut self, snapshot: FloorplanSnapshot) -> Vec<Action> {
        let mut actions = Vec::new();
        self.abort_gesture();
        match self.store.load_floorplan(snapshot) {
            Ok(()) => {
                actions.push(Action::SelectionChanged(None));
                actions.push(Action::RenderNeeded);
            }
            Err(e) => warn_into(&e, &mut actions),
        }
        actions
    }

    /// Switch the active floorplan. Any gesture in progress is dropped.
    pub fn set_active_floorplan(&mut self, id: &FloorplanId) -> Vec<Action> {
        let mut actions = Vec::new();
        self.abort_gesture();
        match self.store.set_active_floorplan(id) {
            Ok(()) => {
                actions.push(Action::SelectionChanged(None));
                actions.push(Action::RenderNeeded);
            }
            Err(e) => warn_into(&e, &mut actions),
        }
        actions
    }

    /// Apply a property edit (name, capacity, status, geometry).
    pub fn update_element(&mut self, id: &ElementId, update: &ElementUpdate) -> Vec<Action> {
        let mut actions = Vec::new();
        self.apply_update(*id, update, &mut actions);
        actions
    }

    /// Rotate an element by `degrees` relative to its current rotation.
    pub fn rotate_element(&mut self, id: &ElementId, degrees: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        match self.store.rotate_element(id, degrees) {
            Ok(element) => {
                actions.push(Action::ElementUpdated { id: *id, element });
                actions.push(Action::RenderNeeded);
            }
            Err(e) => warn_into(&e, &mut actions),
        }
        actions
    }

    pub fn delete_element(&mut self, id: &ElementId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.input.element_id() == Some(*id) {
            self.input = InputState::Idle;
        }
        let was_selected = self.store.selection() == Some(*id);
        match self.store.delete_element(id) {
            Ok(_) => {
                actions.push(Action::ElementDeleted { id: *id });
                if was_selected {
                    actions.push(Action::SelectionChanged(None));
                }
                actions.push(Action::RenderNeeded);
            }
            Err(e) => warn_into(&e, &mut actions),
        }
        actions
    }

    pub fn select_element(&mut self, id: Option<ElementId>) -> Vec<Action> {
        let mut actions = Vec::new();
        self.select(id, &mut actions);
        actions
    }

    /// Emit the active floorplan for persistence.
    pub fn publish(&mut self) -> Vec<Action> {
        let snapshot = self.store.snapshot();
        info!(floorplan = %snapshot.floorplan_id, elements = snapshot.elements.len(), "floorplan published");
        vec![Action::Publish(snapshot)]
    }

    // --- Queries ---

    /// The currently selected element, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.store.selection()
    }

    /// The current viewport state.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Look up an element on the active floorplan.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&PlacedElement> {
        self.store.get(id)
    }

    /// The staged reservable placement awaiting capacity confirmation.
    #[must_use]
    pub fn pending_placement(&self) -> Option<&PendingPlacement> {
        self.drop.pending()
    }

    #[must_use]
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    // --- Viewport ---

    /// Update viewport dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = dpr;
    }

    fn viewport_center(&self) -> Point {
        Point::new(self.viewport_width * 0.5, self.viewport_height * 0.5)
    }

    /// Zoom in one button step about the viewport center.
    pub fn zoom_in(&mut self) -> Vec<Action> {
        let factor = self.config.button_zoom_factor;
        self.zoom_about(self.viewport_center(), factor)
    }

    /// Zoom out one button step about the viewport center.
    pub fn zoom_out(&mut self) -> Vec<Action> {
        let factor = 1.0 / self.config.button_zoom_factor;
        self.zoom_about(self.viewport_center(), factor)
    }

    /// Set an absolute scale (slider), keeping the viewport center fixed.
    pub fn set_zoom(&mut self, scale: f64) -> Vec<Action> {
        if self.viewport.set_scale_at(scale, self.viewport_center(), self.config.zoom) {
            debug!(scale = self.viewport.scale, "zoom set");
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Back to scale 1 with no pan.
    pub fn reset_view(&mut self) -> Vec<Action> {
        if self.viewport == Viewport::default() {
            return Vec::new();
        }
        self.viewport.reset();
        vec![Action::RenderNeeded]
    }

    fn zoom_about(&mut self, focal: Point, factor: f64) -> Vec<Action> {
        if self.viewport.zoom_at(focal, factor, self.config.zoom) {
            debug!(scale = self.viewport.scale, "zoom changed");
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.input.is_idle() {
            self.finish_gesture(screen_pt, &mut actions);
        }

        match button {
            Button::Secondary => return actions,
            Button::Middle => {
                self.begin_pan(screen_pt, &mut actions);
                return actions;
            }
            Button::Primary if self.space_held => {
                self.begin_pan(screen_pt, &mut actions);
                return actions;
            }
            Button::Primary => {}
        }

        let hit = hit_test(screen_pt, self.store.active(), &self.viewport, self.store.selection());
        let Some(hit) = hit else {
            // Background: deselect, then pan.
            self.select(None, &mut actions);
            self.begin_pan(screen_pt, &mut actions);
            return actions;
        };

        self.select(Some(hit.element_id), &mut actions);
        let Some(element) = self.store.get(&hit.element_id) else {
            return actions;
        };
        match hit.part {
            HitPart::ResizeHandle(handle) => {
                debug!(id = %element.id, ?handle, "resize start");
                self.input = InputState::ResizingElement(ResizeSession::begin(element, handle, screen_pt));
                self.set_cursor(handle.cursor(), &mut actions);
            }
            HitPart::Body => {
                debug!(id = %element.id, "drag start");
                self.input = InputState::DraggingElement(DragSession::begin(element.id, element.position(), screen_pt));
                self.set_cursor(CURSOR_MOVE, &mut actions);
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers, now_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.input.is_idle() {
            self.update_hover_cursor(screen_pt, &mut actions);
            return actions;
        }
        let scale = self.viewport.scale;
        let change = match &mut self.input {
            InputState::Idle | InputState::Pinching(_) => None,
            InputState::Panning { last_screen } => {
                let delta = screen_pt - *last_screen;
                *last_screen = screen_pt;
                self.viewport.pan_by_screen(delta);
                actions.push(Action::RenderNeeded);
                None
            }
            InputState::DraggingElement(session) => session
                .update(screen_pt, scale, self.config.drag_grid())
                .map(|p| (session.id, ElementUpdate::position(p.x, p.y))),
            InputState::ResizingElement(session) => session
                .update(screen_pt, scale, self.config.min_element_size, now_ms, self.config.resize_frame_ms)
                .map(|b| (session.id, bounds_update(b))),
        };
        if let Some((id, update)) = change {
            self.apply_update(id, &update, &mut actions);
        }
        actions
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        self.finish_gesture(screen_pt, &mut actions);
        actions
    }

    /// Flush a coalesced resize frame. Call once per animation frame.
    pub fn on_animation_frame(&mut self, now_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        let frame_ms = self.config.resize_frame_ms;
        let change = match &mut self.input {
            InputState::ResizingElement(session) => session.tick(now_ms, frame_ms).map(|b| (session.id, bounds_update(b))),
            _ => None,
        };
        if let Some((id, update)) = change {
            self.apply_update(id, &update, &mut actions);
        }
        actions
    }

    /// Plain wheel pans; Ctrl/Cmd+wheel zooms about the cursor.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.command() {
            let factor = wheel_zoom_factor(delta.dy, self.config.wheel_zoom_factor);
            return self.zoom_about(screen_pt, factor);
        }
        if delta.dx == 0.0 && delta.dy == 0.0 {
            return Vec::new();
        }
        self.viewport.pan_by_screen(Point::new(-delta.dx, -delta.dy));
        vec![Action::RenderNeeded]
    }

    // --- Keyboard input ---

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if key.is_space() {
            self.space_held = true;
            if self.input.is_idle() {
                self.set_cursor(CURSOR_GRAB, &mut actions);
            }
            return actions;
        }
        if !self.input.is_idle() {
            return actions;
        }

        if let Some(dir) = key.arrow_direction() {
            self.nudge(dir, modifiers, &mut actions);
            return actions;
        }
        match key.0.as_str() {
            "Delete" | "Backspace" => {
                if let Some(id) = self.store.selection() {
                    actions = self.delete_element(&id);
                }
            }
            "Escape" => {
                if self.drop.cancel() {
                    actions.push(Action::RenderNeeded);
                }
                self.select(None, &mut actions);
            }
            _ => {}
        }
        actions
    }

    pub fn on_key_up(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if key.is_space() {
            self.space_held = false;
            if self.input.is_idle() {
                self.set_cursor(CURSOR_DEFAULT, &mut actions);
            }
        }
        actions
    }

    fn nudge(&mut self, dir: Point, modifiers: Modifiers, actions: &mut Vec<Action>) {
        let Some(element) = self.store.selected_element() else {
            return;
        };
        let step = if modifiers.shift { self.config.nudge_step_large } else { self.config.nudge_step };
        let grid = self.config.drag_grid();
        // On a grid a nudge moves at least one cell.
        let step = grid.map_or(step, |cell| step.max(cell));
        let moved = Point::new(element.x + dir.x * step, element.y + dir.y * step);
        let target = match grid {
            Some(cell) => snap_point(moved, cell),
            None => moved,
        };
        if target == element.position() {
            return;
        }
        let id = element.id;
        self.apply_update(id, &ElementUpdate::position(target.x, target.y), actions);
    }

    // --- Touch input ---

    /// `touches` is every touch currently on the surface.
    pub fn on_touch_start(&mut self, touches: &[Touch], now_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        match touches {
            [a, b, ..] => {
                self.finish_gesture(a.screen, &mut actions);
                if let Some(pinch) = PinchGesture::begin(a.screen, b.screen, self.viewport.scale) {
                    debug!(scale = self.viewport.scale, "pinch start");
                    self.input = InputState::Pinching(pinch);
                }
            }
            [only] if self.input.is_idle() => {
                actions = self.on_pointer_down(only.screen, Button::Primary, Modifiers::default());
            }
            [only] => {
                actions = self.on_pointer_move(only.screen, Modifiers::default(), now_ms);
            }
            [] => {}
        }
        actions
    }

    pub fn on_touch_move(&mut self, touches: &[Touch], now_ms: f64) -> Vec<Action> {
        let pinch = match &self.input {
            InputState::Pinching(p) => Some(*p),
            _ => None,
        };
        match (pinch, touches) {
            (Some(pinch), [a, b, ..]) => {
                if pinch.update(a.screen, b.screen, &mut self.viewport, self.config.zoom) {
                    vec![Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            (None, [only]) => self.on_pointer_move(only.screen, Modifiers::default(), now_ms),
            // Multi-touch outside a pinch is ignored.
            _ => Vec::new(),
        }
    }

    /// `remaining` is every touch still on the surface after the release.
    pub fn on_touch_end(&mut self, remaining: &[Touch], _now_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        let pinching = matches!(self.input, InputState::Pinching(_));
        if pinching {
            if remaining.len() < 2 {
                debug!(scale = self.viewport.scale, "pinch end");
                self.input = InputState::Idle;
            }
        } else if remaining.is_empty() {
            match self.last_screen() {
                Some(last) => self.finish_gesture(last, &mut actions),
                None => self.abort_gesture(),
            }
        }
        actions
    }

    fn last_screen(&self) -> Option<Point> {
        match &self.input {
            InputState::Panning { last_screen } => Some(*last_screen),
            InputState::DraggingElement(s) => Some(s.last_screen),
            InputState::ResizingElement(s) => Some(s.last_screen),
            InputState::Idle | InputState::Pinching(_) => None,
        }
    }

    // --- Palette drop ---

    pub fn on_drag_over(&mut self, transfer_type: &str, screen_pt: Point, size: Option<Size>) -> Vec<Action> {
        let before = self.drop.preview();
        self.drop.drag_over(transfer_type, screen_pt, size, &self.viewport, self.config.drop_grid());
        if self.drop.preview() == before { Vec::new() } else { vec![Action::RenderNeeded] }
    }

    pub fn on_drag_leave(&mut self) -> Vec<Action> {
        if self.drop.preview().is_none() {
            return Vec::new();
        }
        self.drop.drag_leave();
        vec![Action::RenderNeeded]
    }

    pub fn on_drop(&mut self, transfer_type: &str, payload: &str, screen_pt: Point) -> Vec<Action> {
        let mut actions = Vec::new();
        let grid = self.config.drop_grid();
        match self.drop.drop(transfer_type, payload, screen_pt, &self.viewport, grid, &mut self.store) {
            Ok(DropOutcome::Created(element)) => {
                actions.push(Action::SelectionChanged(Some(element.id)));
                actions.push(Action::ElementCreated(element));
            }
            Ok(DropOutcome::NeedsCapacity(pending)) => actions.push(Action::CapacityConfigRequested(pending)),
            Err(e) => warn_into(&e, &mut actions),
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Complete a staged reservable placement.
    pub fn confirm_capacity(&mut self, form: &CapacityForm) -> Vec<Action> {
        let mut actions = Vec::new();
        match self.drop.confirm(form, &mut self.store) {
            Ok(element) => {
                actions.push(Action::SelectionChanged(Some(element.id)));
                actions.push(Action::ElementCreated(element));
                actions.push(Action::RenderNeeded);
            }
            Err(e) => warn_into(&e, &mut actions),
        }
        actions
    }

    /// Discard a staged reservable placement.
    pub fn cancel_placement(&mut self) -> Vec<Action> {
        if self.drop.cancel() { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    // --- Internal helpers ---

    fn begin_pan(&mut self, screen_pt: Point, actions: &mut Vec<Action>) {
        self.input = InputState::Panning { last_screen: screen_pt };
        self.set_cursor(CURSOR_GRABBING, actions);
    }

    /// End the current gesture at `screen_pt`, committing its last geometry.
    fn finish_gesture(&mut self, screen_pt: Point, actions: &mut Vec<Action>) {
        let scale = self.viewport.scale;
        let change = match std::mem::take(&mut self.input) {
            InputState::Idle => return,
            InputState::Panning { .. } => None,
            InputState::Pinching(_) => {
                debug!(scale, "pinch end");
                None
            }
            InputState::DraggingElement(mut session) => {
                let last = session.update(screen_pt, scale, self.config.drag_grid());
                debug!(id = %session.id, moved = session.moved(), "drag end");
                last.map(|p| (session.id, ElementUpdate::position(p.x, p.y)))
            }
            InputState::ResizingElement(mut session) => {
                // Feed the release point with coalescing off, then flush anything held back.
                let last = session
                    .update(screen_pt, scale, self.config.min_element_size, 0.0, 0.0)
                    .or_else(|| session.flush());
                debug!(id = %session.id, moved = session.moved(), "resize end");
                last.map(|b| (session.id, bounds_update(b)))
            }
        };
        if let Some((id, update)) = change {
            self.apply_update(id, &update, actions);
        }
        let cursor = if self.space_held { CURSOR_GRAB } else { CURSOR_DEFAULT };
        self.set_cursor(cursor, actions);
    }

    /// Drop the current gesture without committing anything further.
    fn abort_gesture(&mut self) {
        if !self.input.is_idle() {
            debug!("gesture aborted");
            self.input = InputState::Idle;
        }
    }

    fn apply_update(&mut self, id: ElementId, update: &ElementUpdate, actions: &mut Vec<Action>) {
        match self.store.update_element(&id, update) {
            Ok(element) => {
                actions.push(Action::ElementUpdated { id, element });
                actions.push(Action::RenderNeeded);
            }
            Err(e) => warn_into(&e, actions),
        }
    }

    fn select(&mut self, id: Option<ElementId>, actions: &mut Vec<Action>) {
        match self.store.select_element(id) {
            Ok(true) => {
                actions.push(Action::SelectionChanged(id));
                actions.push(Action::RenderNeeded);
            }
            Ok(false) => {}
            Err(e) => warn_into(&e, actions),
        }
    }

    fn update_hover_cursor(&mut self, screen_pt: Point, actions: &mut Vec<Action>) {
        let cursor = if self.space_held {
            CURSOR_GRAB
        } else {
            match hit_test(screen_pt, self.store.active(), &self.viewport, self.store.selection()) {
                Some(hit) => match hit.part {
                    HitPart::ResizeHandle(handle) => handle.cursor(),
                    HitPart::Body => CURSOR_MOVE,
                },
                None => CURSOR_DEFAULT,
            }
        };
        self.set_cursor(cursor, actions);
    }

    fn set_cursor(&mut self, cursor: &str, actions: &mut Vec<Action>) {
        if self.cursor != cursor {
            self.cursor = cursor.to_string();
            actions.push(Action::SetCursor(self.cursor.clone()));
        }
    }
}

fn bounds_update(b: Bounds) -> ElementUpdate {
    ElementUpdate::bounds(b.x, b.y, b.width, b.height)
}

fn warn_into(err: &FloorplanError, actions: &mut Vec<Action>) {
    warn!(code = err.error_code(), error = %err, "operation rejected");
    actions.push(Action::warning(err));
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, config: CanvasConfig) -> Self {
        Self { canvas, core: EngineCore::new(config) }
    }

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
    }

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("context is not a CanvasRenderingContext2d"))?;
        let scene = render::Scene {
            floorplan: self.core.store.active(),
            viewport: &self.core.viewport,
            selected: self.core.store.selection(),
            preview: self.core.drop.preview(),
        };
        render::draw(&ctx, &scene, self.core.viewport_width, self.core.viewport_height, self.core.dpr)
    }
}
