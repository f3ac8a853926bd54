//! Per-canvas configuration.
//!
//! The free-pan canvas and the grid-based floor editor share one engine and
//! differ only in the values held here: scale bounds, grid snapping, and
//! table-name policy.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{
    BUTTON_ZOOM_FACTOR, DEFAULT_GRID_CELL, FLOOR_EDITOR_MAX_SCALE, FLOOR_EDITOR_MIN_SCALE, FREE_CANVAS_MAX_SCALE,
    FREE_CANVAS_MIN_SCALE, MIN_ELEMENT_SIZE, NUDGE_STEP, NUDGE_STEP_LARGE, RESIZE_FRAME_MS, WHEEL_ZOOM_FACTOR,
};
use crate::viewport::ZoomBounds;

/// Tuning knobs for one canvas instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Allowed range for the viewport scale.
    pub zoom: ZoomBounds,
    /// Grid cell size in model units. `None` disables the grid entirely.
    pub grid_cell: Option<f64>,
    /// Snap dropped templates to the grid.
    pub snap_drops: bool,
    /// Snap dragged and nudged elements to the grid.
    pub snap_drag: bool,
    /// Floor applied to width and height during resize.
    pub min_element_size: f64,
    /// Scale multiplier per ctrl+wheel notch.
    pub wheel_zoom_factor: f64,
    /// Scale multiplier per zoom button press.
    pub button_zoom_factor: f64,
    /// Minimum interval between committed resize frames, in milliseconds.
    /// Zero commits every pointer move.
    pub resize_frame_ms: f64,
    /// Arrow-key nudge distance in model units.
    pub nudge_step: f64,
    /// Arrow-key nudge distance with Shift held.
    pub nudge_step_large: f64,
    /// Reject reservable elements whose name duplicates another on the same floorplan.
    pub unique_table_names: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::free_canvas()
    }
}

impl CanvasConfig {
    /// Free-pan canvas: wide zoom range, no snapping.
    #[must_use]
    pub fn free_canvas() -> Self {
        Self {
            zoom: ZoomBounds { min: FREE_CANVAS_MIN_SCALE, max: FREE_CANVAS_MAX_SCALE },
            grid_cell: None,
            snap_drops: false,
            snap_drag: false,
            min_element_size: MIN_ELEMENT_SIZE,
            wheel_zoom_factor: WHEEL_ZOOM_FACTOR,
            button_zoom_factor: BUTTON_ZOOM_FACTOR,
            resize_frame_ms: RESIZE_FRAME_MS,
            nudge_step: NUDGE_STEP,
            nudge_step_large: NUDGE_STEP_LARGE,
            unique_table_names: false,
        }
    }

    /// Grid-based floor editor: narrower zoom range, snapped drops and drags,
    /// unique table names.
    #[must_use]
    pub fn floor_editor() -> Self {
        Self {
            zoom: ZoomBounds { min: FLOOR_EDITOR_MIN_SCALE, max: FLOOR_EDITOR_MAX_SCALE },
            grid_cell: Some(DEFAULT_GRID_CELL),
            snap_drops: true,
            snap_drag: true,
            unique_table_names: true,
            ..Self::free_canvas()
        }
    }

    /// Free-canvas preset overridden by `FLOORPLAN_*` environment variables.
    ///
    /// Native hosts only: under wasm there is no process environment and
    /// this returns the free-canvas preset. Browser hosts deserialize a
    /// `CanvasConfig` from JSON instead.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(v) => Some(v),
            Err(_) => None,
        })
    }

    /// Build a config from an arbitrary key lookup. Unparseable values fall
    /// back to the free-canvas defaults; an inverted zoom range is discarded.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::free_canvas();
        let parse = |key: &str, default: f64| -> f64 {
            match lookup(key) {
                Some(raw) => raw.trim().parse::<f64>().unwrap_or_else(|_| {
                    warn!(key, raw = %raw, "ignoring unparseable config value");
                    default
                }),
                None => default,
            }
        };
        let flag = |key: &str, default: bool| -> bool {
            match lookup(key).as_deref().map(str::trim) {
                Some("1" | "true" | "yes") => true,
                Some("0" | "false" | "no") => false,
                _ => default,
            }
        };

        let zoom = ZoomBounds {
            min: parse("FLOORPLAN_MIN_SCALE", base.zoom.min),
            max: parse("FLOORPLAN_MAX_SCALE", base.zoom.max),
        };
        let zoom = if zoom.is_valid() {
            zoom
        } else {
            warn!(min = zoom.min, max = zoom.max, "invalid zoom bounds; using defaults");
            base.zoom
        };

        let grid = parse("FLOORPLAN_GRID_CELL", 0.0);

        Self {
            zoom,
            grid_cell: (grid > 0.0).then_some(grid),
            snap_drops: flag("FLOORPLAN_SNAP_DROPS", base.snap_drops),
            snap_drag: flag("FLOORPLAN_SNAP_DRAG", base.snap_drag),
            min_element_size: parse("FLOORPLAN_MIN_ELEMENT_SIZE", base.min_element_size).max(1.0),
            wheel_zoom_factor: parse("FLOORPLAN_WHEEL_ZOOM_FACTOR", base.wheel_zoom_factor),
            button_zoom_factor: parse("FLOORPLAN_BUTTON_ZOOM_FACTOR", base.button_zoom_factor),
            resize_frame_ms: parse("FLOORPLAN_RESIZE_FRAME_MS", base.resize_frame_ms).max(0.0),
            nudge_step: parse("FLOORPLAN_NUDGE_STEP", base.nudge_step),
            nudge_step_large: parse("FLOORPLAN_NUDGE_STEP_LARGE", base.nudge_step_large),
            unique_table_names: flag("FLOORPLAN_UNIQUE_TABLE_NAMES", base.unique_table_names),
        }
    }

    /// Replace values the engine cannot work with by the free-canvas
    /// defaults, logging each replacement. Deserialized configs skip the
    /// checks `from_lookup` applies, so the engine runs this on construction.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let base = Self::free_canvas();
        let mut cfg = self;
        if !cfg.zoom.is_valid() {
            warn!(min = cfg.zoom.min, max = cfg.zoom.max, "invalid zoom bounds; using defaults");
            cfg.zoom = base.zoom;
        }
        if let Some(cell) = cfg.grid_cell {
            if !(cell.is_finite() && cell > 0.0) {
                warn!(cell, "invalid grid cell; grid disabled");
                cfg.grid_cell = None;
            }
        }
        if !(cfg.min_element_size.is_finite() && cfg.min_element_size >= 1.0) {
            warn!(size = cfg.min_element_size, "invalid minimum element size; using default");
            cfg.min_element_size = base.min_element_size;
        }
        for (name, value, default) in [
            ("wheel_zoom_factor", &mut cfg.wheel_zoom_factor, base.wheel_zoom_factor),
            ("button_zoom_factor", &mut cfg.button_zoom_factor, base.button_zoom_factor),
            ("nudge_step", &mut cfg.nudge_step, base.nudge_step),
            ("nudge_step_large", &mut cfg.nudge_step_large, base.nudge_step_large),
        ] {
            if !(value.is_finite() && *value > 0.0) {
                warn!(key = name, value = *value, "invalid config value; using default");
                *value = default;
            }
        }
        if !(cfg.resize_frame_ms.is_finite() && cfg.resize_frame_ms >= 0.0) {
            warn!(frame_ms = cfg.resize_frame_ms, "invalid resize frame interval; using default");
            cfg.resize_frame_ms = base.resize_frame_ms;
        }
        cfg
    }

    /// Grid cell used for drops, if drop snapping is on.
    #[must_use]
    pub fn drop_grid(&self) -> Option<f64> {
        if self.snap_drops { self.grid_cell } else { None }
    }

    /// Grid cell used for drags and nudges, if drag snapping is on.
    #[must_use]
    pub fn drag_grid(&self) -> Option<f64> {
        if self.snap_drag { self.grid_cell } else { None }
    }
}
