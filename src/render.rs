//! Rendering: draws the floorplan scene to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It reads the projected scene and produces pixels; it never mutates
//! application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::consts::HANDLE_RADIUS_PX;
use crate::drop::DropPreview;
use crate::element::{ElementCategory, ElementId, ElementStatus, PlacedElement};
use crate::hit;
use crate::projection::{ProjectedElement, ScreenBox, project_scene};
use crate::store::Floorplan;
use crate::viewport::Viewport;

/// Selection and preview dash segment length in screen pixels.
const DASH_PX: f64 = 4.0;
/// Crosshair half-length for a drop preview without a known size.
const PREVIEW_MARK_PX: f64 = 6.0;
const SELECTION_COLOR: &str = "#1E90FF";
const LABEL_FONT: &str = "12px sans-serif";

/// Read-only view of everything the renderer draws.
pub struct Scene<'a> {
    pub floorplan: &'a Floorplan,
    pub viewport: &'a Viewport,
    pub selected: Option<ElementId>,
    pub preview: Option<DropPreview>,
}

/// Draw the full scene: elements, selection UI, and the drop preview.
///
/// `viewport_w` and `viewport_h` are in CSS pixels. `dpr` is the device pixel ratio.
/// Drawing happens in screen space; element boxes come from the projection.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene<'_>,
    viewport_w: f64,
    viewport_h: f64,
    dpr: f64,
) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport_w, viewport_h);

    // Selected element comes last in paint order.
    for item in project_scene(scene.floorplan, scene.viewport, scene.selected) {
        draw_element(ctx, &item)?;
        if item.selected {
            draw_selection(ctx, item.element, &item.screen, scene.viewport)?;
        }
    }

    if let Some(preview) = scene.preview {
        draw_preview(ctx, preview, scene.viewport)?;
    }
    Ok(())
}

// =============================================================
// Elements
// =============================================================

fn draw_element(ctx: &CanvasRenderingContext2d, item: &ProjectedElement<'_>) -> Result<(), JsValue> {
    let b = &item.screen;
    ctx.save();
    translate_and_rotate(ctx, b)?;

    let (fill, stroke) = element_colors(item.element);
    ctx.set_fill_style_str(fill);
    ctx.fill_rect(-b.width / 2.0, -b.height / 2.0, b.width, b.height);
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(-b.width / 2.0, -b.height / 2.0, b.width, b.height);

    draw_label(ctx, item.element, b)?;
    ctx.restore();
    Ok(())
}

fn element_colors(e: &PlacedElement) -> (&'static str, &'static str) {
    match (e.category, e.status) {
        (ElementCategory::Decorative, _) => ("#E8E4DC", "#9A948A"),
        (ElementCategory::Reservable, Some(ElementStatus::Booked)) => ("#F6D5D1", "#C0392B"),
        (ElementCategory::Reservable, Some(ElementStatus::Cancelled)) => ("#ECECEC", "#8E8E8E"),
        (ElementCategory::Reservable, Some(ElementStatus::Available) | None) => ("#D8F0DF", "#2E8B57"),
    }
}

/// Name, plus capacity range for tables, centered in the box.
fn draw_label(ctx: &CanvasRenderingContext2d, e: &PlacedElement, b: &ScreenBox) -> Result<(), JsValue> {
    let text = match e.capacity {
        Some(c) => format!("{} ({}-{})", e.name, c.min, c.max),
        None => e.name.clone(),
    };
    if text.is_empty() {
        return Ok(());
    }
    ctx.set_font(LABEL_FONT);
    let width = ctx.measure_text(&text)?.width();
    if width > b.width {
        return Ok(());
    }
    ctx.set_fill_style_str("#222");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(&text, 0.0, 0.0)?;
    Ok(())
}

// =============================================================
// Selection and preview
// =============================================================

fn draw_selection(
    ctx: &CanvasRenderingContext2d,
    e: &PlacedElement,
    b: &ScreenBox,
    viewport: &Viewport,
) -> Result<(), JsValue> {
    // Dashed outline (rotated with the element).
    ctx.save();
    translate_and_rotate(ctx, b)?;
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0);
    set_dash(ctx, DASH_PX)?;
    ctx.stroke_rect(-b.width / 2.0, -b.height / 2.0, b.width, b.height);
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();

    // Corner handles, drawn unrotated at their rotated screen positions.
    ctx.save();
    ctx.set_fill_style_str("#fff");
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0);
    let half = HANDLE_RADIUS_PX / 2.0;
    for (_, model) in hit::handle_positions(e) {
        let p = viewport.model_to_screen(model);
        ctx.fill_rect(p.x - half, p.y - half, half * 2.0, half * 2.0);
        ctx.stroke_rect(p.x - half, p.y - half, half * 2.0, half * 2.0);
    }
    ctx.restore();
    Ok(())
}

fn draw_preview(ctx: &CanvasRenderingContext2d, preview: DropPreview, viewport: &Viewport) -> Result<(), JsValue> {
    let p = viewport.model_to_screen(preview.position);
    ctx.save();
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0);
    match preview.size {
        Some(size) => {
            set_dash(ctx, DASH_PX)?;
            ctx.set_fill_style_str("rgba(30, 144, 255, 0.12)");
            let w = size.width * viewport.scale;
            let h = size.height * viewport.scale;
            ctx.fill_rect(p.x, p.y, w, h);
            ctx.stroke_rect(p.x, p.y, w, h);
            ctx.set_line_dash(&js_sys::Array::new())?;
        }
        None => {
            ctx.begin_path();
            ctx.move_to(p.x - PREVIEW_MARK_PX, p.y);
            ctx.line_to(p.x + PREVIEW_MARK_PX, p.y);
            ctx.move_to(p.x, p.y - PREVIEW_MARK_PX);
            ctx.line_to(p.x, p.y + PREVIEW_MARK_PX);
            ctx.stroke();
        }
    }
    ctx.restore();
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

/// Translate to the box center and rotate by its rotation angle.
fn translate_and_rotate(ctx: &CanvasRenderingContext2d, b: &ScreenBox) -> Result<(), JsValue> {
    let c = b.center();
    ctx.translate(c.x, c.y)?;
    ctx.rotate(b.rotation.to_radians())?;
    Ok(())
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: f64) -> Result<(), JsValue> {
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash.into());
    dash_array.push(&dash.into());
    ctx.set_line_dash(&dash_array)
}
