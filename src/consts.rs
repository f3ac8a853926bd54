//! Shared numeric constants for the floorplan canvas.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width or height an element may have, in model units.
pub const MIN_ELEMENT_SIZE: f64 = 10.0;

/// Default grid cell size, in model units.
pub const DEFAULT_GRID_CELL: f64 = 10.0;

// ── Zoom ────────────────────────────────────────────────────────

/// Scale bounds for the free-pan canvas.
pub const FREE_CANVAS_MIN_SCALE: f64 = 0.2;
pub const FREE_CANVAS_MAX_SCALE: f64 = 5.0;

/// Scale bounds for the grid-based floor editor.
pub const FLOOR_EDITOR_MIN_SCALE: f64 = 0.5;
pub const FLOOR_EDITOR_MAX_SCALE: f64 = 3.0;

/// Multiplier applied per ctrl+wheel notch.
pub const WHEEL_ZOOM_FACTOR: f64 = 1.1;

/// Multiplier applied per zoom-in / zoom-out button press.
pub const BUTTON_ZOOM_FACTOR: f64 = 1.2;

// ── Interaction ─────────────────────────────────────────────────

/// Resize updates are coalesced to roughly one per animation frame.
pub const RESIZE_FRAME_MS: f64 = 16.0;

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Arrow-key nudge distance in model units, without and with Shift.
pub const NUDGE_STEP: f64 = 1.0;
pub const NUDGE_STEP_LARGE: f64 = 10.0;

/// Drag-and-drop transfer type accepted by the drop controller.
pub const TEMPLATE_TRANSFER_TYPE: &str = "application/x-floorplan-template";
