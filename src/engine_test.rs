#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::consts::TEMPLATE_TRANSFER_TYPE;
use crate::element::{Capacity, ElementCategory, ElementTemplate, NewElement};

// =============================================================
// Helpers
// =============================================================

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON * a.abs().max(b.abs()).max(1.0)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn new_core() -> EngineCore {
    init_tracing();
    let mut core = EngineCore::default();
    core.set_viewport(800.0, 600.0, 1.0);
    core
}

fn floor_editor() -> EngineCore {
    init_tracing();
    let mut core = EngineCore::new(CanvasConfig::floor_editor());
    core.set_viewport(800.0, 600.0, 1.0);
    core
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn no_mods() -> Modifiers {
    Modifiers::default()
}

fn shift() -> Modifiers {
    Modifiers { shift: true, ..Default::default() }
}

fn ctrl() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

fn plant_template(w: f64, h: f64) -> ElementTemplate {
    ElementTemplate {
        id: "plant".into(),
        name: "Plant".into(),
        category: ElementCategory::Decorative,
        default_width: w,
        default_height: h,
        icon_ref: "icons/plant.svg".into(),
    }
}

/// Add a decorative element directly through the store. It becomes selected.
fn add_box(core: &mut EngineCore, x: f64, y: f64, w: f64, h: f64) -> ElementId {
    core.store
        .add_element(NewElement::from_template(&plant_template(w, h), pt(x, y)))
        .unwrap()
        .id
}

fn add_table(core: &mut EngineCore, name: &str, x: f64, y: f64) -> ElementId {
    let t = ElementTemplate {
        id: "round-4".into(),
        name: "Round table".into(),
        category: ElementCategory::Reservable,
        default_width: 60.0,
        default_height: 60.0,
        icon_ref: String::new(),
    };
    core.store
        .add_element(NewElement::from_template(&t, pt(x, y)).with_name(name).with_capacity(Capacity { min: 2, max: 4 }))
        .unwrap()
        .id
}

fn el(core: &EngineCore, id: ElementId) -> PlacedElement {
    core.element(&id).unwrap().clone()
}

fn updates(actions: &[Action]) -> Vec<&PlacedElement> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::ElementUpdated { element, .. } => Some(element),
            _ => None,
        })
        .collect()
}

fn has_warning(actions: &[Action], code: &str) -> bool {
    actions.iter().any(|a| matches!(a, Action::Warning { code: c, .. } if *c == code))
}

fn drag(core: &mut EngineCore, from: Point, to: Point) -> Vec<Action> {
    let mut actions = core.on_pointer_down(from, Button::Primary, no_mods());
    actions.extend(core.on_pointer_move(to, no_mods(), 0.0));
    actions.extend(core.on_pointer_up(to, Button::Primary, no_mods()));
    actions
}

fn table_payload() -> String {
    json!({
        "id": "round-4",
        "category": "reservable",
        "width": 60.0,
        "height": 60.0,
        "name": "Round table",
        "iconRef": "icons/round.svg"
    })
    .to_string()
}

fn plant_payload() -> String {
    json!({
        "id": "plant",
        "category": "decorative",
        "width": 20.0,
        "height": 20.0,
        "name": "Plant",
        "iconRef": "icons/plant.svg"
    })
    .to_string()
}

// =============================================================
// Construction and queries
// =============================================================

#[test]
fn new_engine_is_idle_at_identity_view() {
    let core = new_core();
    assert!(core.input.is_idle());
    assert_eq!(core.viewport(), Viewport::default());
    assert_eq!(core.selection(), None);
    assert_eq!(core.cursor(), "default");
    assert!(core.store.active().is_empty());
}

#[test]
fn floor_editor_engine_enforces_unique_table_names() {
    let mut core = floor_editor();
    add_table(&mut core, "T1", 0.0, 0.0);
    let nt = NewElement::from_template(
        &ElementTemplate {
            id: "round-4".into(),
            name: "Round".into(),
            category: ElementCategory::Reservable,
            default_width: 60.0,
            default_height: 60.0,
            icon_ref: String::new(),
        },
        pt(100.0, 0.0),
    )
    .with_name("t1")
    .with_capacity(Capacity { min: 1, max: 2 });
    assert!(core.store.add_element(nt).is_err());
}

#[test]
fn set_viewport_records_dimensions() {
    let mut core = new_core();
    core.set_viewport(1024.0, 768.0, 2.0);
    assert_eq!(core.viewport_width, 1024.0);
    assert_eq!(core.viewport_height, 768.0);
    assert_eq!(core.dpr, 2.0);
}

// =============================================================
// Scenario: pan then zoom
// =============================================================

#[test]
fn scenario_pan_then_zoom_keeps_focal_point() {
    let mut core = new_core();
    core.set_viewport(400.0, 400.0, 1.0);

    // Background drag pans by the screen delta (scale 1).
    drag(&mut core, pt(10.0, 10.0), pt(110.0, 60.0));
    assert_eq!(core.viewport().pan, pt(100.0, 50.0));

    let anchor = core.viewport().screen_to_model(pt(200.0, 200.0));
    let actions = core.zoom_in();
    assert!(actions.contains(&Action::RenderNeeded));
    assert!(approx_eq(core.viewport().scale, 1.2));

    let back = core.viewport().model_to_screen(anchor);
    assert!(approx_eq(back.x, 200.0) && approx_eq(back.y, 200.0), "focal drifted to {back:?}");
}

// =============================================================
// Scenario: resize bottom-right then drag
// =============================================================

#[test]
fn scenario_resize_bottom_right_then_drag_at_scale_two() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);

    let down = core.on_pointer_down(pt(60.0, 60.0), Button::Primary, no_mods());
    assert!(matches!(core.input, InputState::ResizingElement(_)));
    assert!(down.contains(&Action::SetCursor("nwse-resize".into())));

    core.on_pointer_move(pt(80.0, 70.0), no_mods(), 0.0);
    core.on_pointer_up(pt(80.0, 70.0), Button::Primary, no_mods());
    let e = el(&core, id);
    assert_eq!((e.x, e.y, e.width, e.height), (0.0, 0.0, 80.0, 70.0));

    core.viewport.scale = 2.0;
    drag(&mut core, pt(100.0, 100.0), pt(105.0, 105.0));
    let e = el(&core, id);
    assert_eq!((e.x, e.y), (2.5, 2.5));
    assert_eq!((e.width, e.height), (80.0, 70.0));
}

// =============================================================
// Selection
// =============================================================

#[test]
fn clicking_elements_keeps_single_selection() {
    let mut core = new_core();
    let a = add_box(&mut core, 0.0, 0.0, 50.0, 50.0);
    let b = add_box(&mut core, 200.0, 0.0, 50.0, 50.0);

    let actions = drag(&mut core, pt(25.0, 25.0), pt(25.0, 25.0));
    assert!(actions.contains(&Action::SelectionChanged(Some(a))));
    assert_eq!(core.selection(), Some(a));

    let actions = drag(&mut core, pt(225.0, 25.0), pt(225.0, 25.0));
    assert!(actions.contains(&Action::SelectionChanged(Some(b))));
    assert_eq!(core.selection(), Some(b));
}

#[test]
fn background_click_deselects() {
    let mut core = new_core();
    add_box(&mut core, 0.0, 0.0, 50.0, 50.0);
    let actions = drag(&mut core, pt(500.0, 500.0), pt(500.0, 500.0));
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert_eq!(core.selection(), None);
    assert_eq!(core.viewport().pan, Point::default());
}

#[test]
fn background_click_without_selection_emits_no_selection_change() {
    let mut core = new_core();
    let actions = drag(&mut core, pt(500.0, 500.0), pt(500.0, 500.0));
    assert!(!actions.iter().any(|a| matches!(a, Action::SelectionChanged(_))));
}

#[test]
fn select_unknown_element_warns() {
    let mut core = new_core();
    let actions = core.select_element(Some(uuid::Uuid::new_v4()));
    assert!(has_warning(&actions, "E_ELEMENT_NOT_FOUND"));
}

#[test]
fn selected_element_wins_overlap() {
    let mut core = new_core();
    let below = add_box(&mut core, 0.0, 0.0, 100.0, 100.0);
    let _above = add_box(&mut core, 50.0, 50.0, 100.0, 100.0);
    core.select_element(Some(below));
    core.on_pointer_down(pt(75.0, 75.0), Button::Primary, no_mods());
    assert_eq!(core.input.element_id(), Some(below));
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_emits_update_per_move() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 50.0, 50.0);
    core.on_pointer_down(pt(25.0, 25.0), Button::Primary, no_mods());
    assert!(matches!(core.input, InputState::DraggingElement(_)));

    let a1 = core.on_pointer_move(pt(35.0, 25.0), no_mods(), 0.0);
    let a2 = core.on_pointer_move(pt(45.0, 30.0), no_mods(), 1.0);
    assert_eq!(updates(&a1)[0].x, 10.0);
    let last = updates(&a2)[0];
    assert_eq!((last.x, last.y), (20.0, 5.0));
    assert_eq!(el(&core, id).position(), pt(20.0, 5.0));
}

#[test]
fn click_without_movement_emits_no_update() {
    let mut core = new_core();
    add_box(&mut core, 0.0, 0.0, 50.0, 50.0);
    let actions = drag(&mut core, pt(25.0, 25.0), pt(25.0, 25.0));
    assert!(updates(&actions).is_empty());
    assert!(core.input.is_idle());
}

#[test]
fn release_position_is_committed() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 50.0, 50.0);
    core.on_pointer_down(pt(25.0, 25.0), Button::Primary, no_mods());
    let actions = core.on_pointer_up(pt(40.0, 25.0), Button::Primary, no_mods());
    assert_eq!(updates(&actions).len(), 1);
    assert_eq!(el(&core, id).x, 15.0);
}

#[test]
fn drag_snaps_in_floor_editor() {
    let mut core = floor_editor();
    let id = add_box(&mut core, 0.0, 0.0, 50.0, 50.0);
    core.on_pointer_down(pt(25.0, 25.0), Button::Primary, no_mods());
    let a = core.on_pointer_move(pt(29.0, 25.0), no_mods(), 0.0);
    assert!(updates(&a).is_empty(), "4 units rounds back to 0");
    core.on_pointer_move(pt(32.0, 25.0), no_mods(), 0.0);
    assert_eq!(el(&core, id).x, 10.0);
}

#[test]
fn drag_does_not_snap_on_free_canvas() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 50.0, 50.0);
    drag(&mut core, pt(25.0, 25.0), pt(29.0, 28.0));
    assert_eq!(el(&core, id).position(), pt(4.0, 3.0));
}

#[test]
fn drag_cursor_is_move_then_default() {
    let mut core = new_core();
    add_box(&mut core, 0.0, 0.0, 50.0, 50.0);
    let down = core.on_pointer_down(pt(25.0, 25.0), Button::Primary, no_mods());
    assert!(down.contains(&Action::SetCursor("move".into())));
    let up = core.on_pointer_up(pt(25.0, 25.0), Button::Primary, no_mods());
    assert!(up.contains(&Action::SetCursor("default".into())));
}

#[test]
fn deleting_dragged_element_ends_gesture() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 50.0, 50.0);
    core.on_pointer_down(pt(25.0, 25.0), Button::Primary, no_mods());
    core.delete_element(&id);
    assert!(core.input.is_idle());
    let actions = core.on_pointer_move(pt(60.0, 60.0), no_mods(), 0.0);
    assert!(updates(&actions).is_empty());
}

// =============================================================
// Resize
// =============================================================

#[test]
fn resize_top_left_moves_origin() {
    let mut core = new_core();
    let id = add_box(&mut core, 100.0, 100.0, 60.0, 60.0);
    core.on_pointer_down(pt(100.0, 100.0), Button::Primary, no_mods());
    core.on_pointer_move(pt(110.0, 120.0), no_mods(), 0.0);
    core.on_pointer_up(pt(110.0, 120.0), Button::Primary, no_mods());
    let e = el(&core, id);
    assert_eq!((e.x, e.y, e.width, e.height), (110.0, 120.0, 50.0, 40.0));
}

#[test]
fn resize_clamps_to_minimum_size() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.on_pointer_down(pt(60.0, 60.0), Button::Primary, no_mods());
    core.on_pointer_move(pt(-100.0, -100.0), no_mods(), 0.0);
    core.on_pointer_up(pt(-100.0, -100.0), Button::Primary, no_mods());
    let e = el(&core, id);
    assert_eq!((e.width, e.height), (10.0, 10.0));
    assert_eq!((e.x, e.y), (0.0, 0.0));
}

#[test]
fn resize_top_left_floor_pins_far_edge() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_mods());
    core.on_pointer_up(pt(200.0, 200.0), Button::Primary, no_mods());
    let e = el(&core, id);
    assert_eq!((e.width, e.height), (10.0, 10.0));
    assert_eq!((e.x + e.width, e.y + e.height), (60.0, 60.0));
}

#[test]
fn resize_divides_delta_by_scale() {
    let mut core = new_core();
    core.viewport.scale = 2.0;
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.on_pointer_down(pt(120.0, 120.0), Button::Primary, no_mods());
    core.on_pointer_up(pt(140.0, 140.0), Button::Primary, no_mods());
    assert_eq!(el(&core, id).width, 70.0);
}

#[test]
fn resize_moves_are_coalesced_per_frame() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.on_pointer_down(pt(60.0, 60.0), Button::Primary, no_mods());

    let first = core.on_pointer_move(pt(70.0, 60.0), no_mods(), 0.0);
    assert_eq!(updates(&first).len(), 1);

    let held = core.on_pointer_move(pt(80.0, 60.0), no_mods(), 5.0);
    assert!(updates(&held).is_empty());
    assert_eq!(el(&core, id).width, 70.0);

    let early = core.on_animation_frame(10.0);
    assert!(updates(&early).is_empty());

    let frame = core.on_animation_frame(20.0);
    assert_eq!(updates(&frame)[0].width, 80.0);
    assert_eq!(el(&core, id).width, 80.0);
}

#[test]
fn pointer_up_flushes_held_resize_frame() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.on_pointer_down(pt(60.0, 60.0), Button::Primary, no_mods());
    core.on_pointer_move(pt(70.0, 60.0), no_mods(), 0.0);
    core.on_pointer_move(pt(90.0, 60.0), no_mods(), 1.0);
    assert_eq!(el(&core, id).width, 70.0);

    let up = core.on_pointer_up(pt(90.0, 60.0), Button::Primary, no_mods());
    assert_eq!(updates(&up).len(), 1);
    assert_eq!(el(&core, id).width, 90.0);
}

#[test]
fn resize_without_movement_emits_no_update() {
    let mut core = new_core();
    add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    let actions = drag(&mut core, pt(60.0, 60.0), pt(60.0, 60.0));
    assert!(updates(&actions).is_empty());
}

#[test]
fn resize_never_snaps() {
    let mut core = floor_editor();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.on_pointer_down(pt(60.0, 60.0), Button::Primary, no_mods());
    core.on_pointer_up(pt(63.0, 64.0), Button::Primary, no_mods());
    let e = el(&core, id);
    assert_eq!((e.width, e.height), (63.0, 64.0));
}

#[test]
fn handles_only_for_selected_element() {
    let mut core = new_core();
    add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.select_element(None);
    core.on_pointer_down(pt(59.0, 59.0), Button::Primary, no_mods());
    assert!(matches!(core.input, InputState::DraggingElement(_)));
}

// =============================================================
// Pan and zoom
// =============================================================

#[test]
fn middle_button_pans_even_over_element() {
    let mut core = new_core();
    add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.on_pointer_down(pt(30.0, 30.0), Button::Middle, no_mods());
    assert!(matches!(core.input, InputState::Panning { .. }));
    core.on_pointer_move(pt(50.0, 40.0), no_mods(), 0.0);
    assert_eq!(core.viewport().pan, pt(20.0, 10.0));
}

#[test]
fn pan_delta_is_divided_by_scale() {
    let mut core = new_core();
    core.viewport.scale = 2.0;
    drag(&mut core, pt(400.0, 400.0), pt(500.0, 450.0));
    assert_eq!(core.viewport().pan, pt(50.0, 25.0));
}

#[test]
fn space_drag_pans_over_element() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    let down = core.on_key_down(Key(" ".into()), no_mods());
    assert!(down.contains(&Action::SetCursor("grab".into())));

    drag(&mut core, pt(30.0, 30.0), pt(40.0, 30.0));
    assert_eq!(core.viewport().pan, pt(10.0, 0.0));
    assert_eq!(el(&core, id).position(), pt(0.0, 0.0));

    let up = core.on_key_up(Key(" ".into()), no_mods());
    assert!(up.contains(&Action::SetCursor("default".into())));
}

#[test]
fn secondary_button_does_nothing() {
    let mut core = new_core();
    add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    let actions = core.on_pointer_down(pt(30.0, 30.0), Button::Secondary, no_mods());
    assert!(actions.is_empty());
    assert!(core.input.is_idle());
}

#[test]
fn plain_wheel_pans() {
    let mut core = new_core();
    let actions = core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 10.0, dy: 50.0 }, no_mods());
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(core.viewport().pan, pt(-10.0, -50.0));
    assert_eq!(core.viewport().scale, 1.0);
}

#[test]
fn zero_wheel_is_noop() {
    let mut core = new_core();
    assert!(core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 0.0, dy: 0.0 }, no_mods()).is_empty());
}

#[test]
fn ctrl_wheel_zooms_about_cursor() {
    let mut core = new_core();
    core.viewport.pan = pt(30.0, -20.0);
    let focal = pt(100.0, 150.0);
    let anchor = core.viewport().screen_to_model(focal);

    core.on_wheel(focal, WheelDelta { dx: 0.0, dy: -3.0 }, ctrl());
    assert!(approx_eq(core.viewport().scale, 1.1));
    let back = core.viewport().model_to_screen(anchor);
    assert!(approx_eq(back.x, focal.x) && approx_eq(back.y, focal.y));

    core.on_wheel(focal, WheelDelta { dx: 0.0, dy: 3.0 }, ctrl());
    assert!(approx_eq(core.viewport().scale, 1.0));
}

#[test]
fn meta_wheel_zooms_too() {
    let mut core = new_core();
    let meta = Modifiers { meta: true, ..Default::default() };
    core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 0.0, dy: -1.0 }, meta);
    assert!(approx_eq(core.viewport().scale, 1.1));
}

#[test]
fn zoom_is_clamped_to_config_bounds() {
    let mut core = new_core();
    core.set_zoom(10.0);
    assert_eq!(core.viewport().scale, 5.0);
    assert!(core.zoom_in().is_empty(), "already at max");
    for _ in 0..40 {
        core.zoom_out();
    }
    assert!(approx_eq(core.viewport().scale, 0.2));

    let mut editor = floor_editor();
    editor.set_zoom(10.0);
    assert_eq!(editor.viewport().scale, 3.0);
    editor.set_zoom(0.1);
    assert_eq!(editor.viewport().scale, 0.5);
}

#[test]
fn inverted_zoom_bounds_from_json_fall_back_to_defaults() {
    init_tracing();
    let cfg: CanvasConfig = serde_json::from_str(r#"{ "zoom": { "min": 3.0, "max": 0.5 } }"#).unwrap();
    let mut core = EngineCore::new(cfg);
    core.set_viewport(800.0, 600.0, 1.0);
    assert!(core.zoom_in().contains(&Action::RenderNeeded));
    assert!(approx_eq(core.viewport().scale, 1.2));
    core.set_zoom(100.0);
    assert_eq!(core.viewport().scale, 5.0);
}

#[test]
fn property_edit_below_minimum_size_warns() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    let update = ElementUpdate { width: Some(3.0), ..Default::default() };
    let actions = core.update_element(&id, &update);
    assert!(updates(&actions).is_empty());
    assert!(has_warning(&actions, "E_VALIDATION"));
    assert_eq!(el(&core, id).width, 60.0);
}

#[test]
fn set_zoom_keeps_viewport_center() {
    let mut core = new_core();
    let center = pt(400.0, 300.0);
    let anchor = core.viewport().screen_to_model(center);
    core.set_zoom(2.5);
    let back = core.viewport().model_to_screen(anchor);
    assert!(approx_eq(back.x, center.x) && approx_eq(back.y, center.y));
}

#[test]
fn set_zoom_rejects_nonsense() {
    let mut core = new_core();
    assert!(core.set_zoom(f64::NAN).is_empty());
    assert!(core.set_zoom(-1.0).is_empty());
    assert_eq!(core.viewport().scale, 1.0);
}

#[test]
fn reset_view_restores_identity() {
    let mut core = new_core();
    assert!(core.reset_view().is_empty());
    core.zoom_in();
    core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 5.0, dy: 5.0 }, no_mods());
    assert_eq!(core.reset_view(), vec![Action::RenderNeeded]);
    assert_eq!(core.viewport(), Viewport::default());
}

#[test]
fn zoom_does_not_touch_model() {
    let mut core = new_core();
    let id = add_box(&mut core, 10.0, 20.0, 30.0, 40.0);
    let before = el(&core, id);
    core.zoom_in();
    core.on_wheel(pt(5.0, 5.0), WheelDelta { dx: 0.0, dy: -1.0 }, ctrl());
    assert_eq!(el(&core, id), before);
}

// =============================================================
// Touch
// =============================================================

#[test]
fn single_touch_on_element_drags() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.select_element(None);
    core.on_touch_start(&[Touch::new(1, 30.0, 30.0)], 0.0);
    assert!(matches!(core.input, InputState::DraggingElement(_)));
    core.on_touch_move(&[Touch::new(1, 40.0, 35.0)], 1.0);
    core.on_touch_end(&[], 2.0);
    assert!(core.input.is_idle());
    assert_eq!(el(&core, id).position(), pt(10.0, 5.0));
    assert_eq!(core.selection(), Some(id));
}

#[test]
fn single_touch_on_background_pans() {
    let mut core = new_core();
    core.on_touch_start(&[Touch::new(1, 300.0, 300.0)], 0.0);
    core.on_touch_move(&[Touch::new(1, 320.0, 290.0)], 1.0);
    core.on_touch_end(&[], 2.0);
    assert_eq!(core.viewport().pan, pt(20.0, -10.0));
}

#[test]
fn touch_resize_commits_last_geometry_on_release() {
    let mut core = new_core();
    let id = add_box(&mut core, 100.0, 100.0, 60.0, 60.0);
    core.on_touch_start(&[Touch::new(1, 160.0, 160.0)], 0.0);
    assert!(matches!(core.input, InputState::ResizingElement(_)));
    core.on_touch_move(&[Touch::new(1, 170.0, 170.0)], 1.0);
    assert_eq!(el(&core, id).width, 70.0);

    let actions = core.on_touch_end(&[], 2.0);
    assert!(core.input.is_idle());
    assert!(updates(&actions).is_empty(), "release adds nothing new");
    let e = el(&core, id);
    assert_eq!((e.x, e.y, e.width, e.height), (100.0, 100.0, 70.0, 70.0));
}

#[test]
fn touch_resize_flushes_held_back_move_on_release() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.on_touch_start(&[Touch::new(1, 60.0, 60.0)], 0.0);

    let first = core.on_touch_move(&[Touch::new(1, 70.0, 70.0)], 0.0);
    assert_eq!(updates(&first).len(), 1);
    let held = core.on_touch_move(&[Touch::new(1, 80.0, 80.0)], 5.0);
    assert!(updates(&held).is_empty());
    assert_eq!(el(&core, id).width, 70.0);

    let actions = core.on_touch_end(&[], 6.0);
    assert_eq!(updates(&actions).len(), 1);
    assert_eq!((updates(&actions)[0].width, updates(&actions)[0].height), (80.0, 80.0));
    let e = el(&core, id);
    assert_eq!((e.x, e.y, e.width, e.height), (0.0, 0.0, 80.0, 80.0));
}

#[test]
fn touch_resize_from_top_left_keeps_opposite_edge() {
    let mut core = new_core();
    let id = add_box(&mut core, 100.0, 100.0, 60.0, 60.0);
    core.on_touch_start(&[Touch::new(1, 100.0, 100.0)], 0.0);
    core.on_touch_move(&[Touch::new(1, 90.0, 95.0)], 0.0);
    core.on_touch_end(&[], 1.0);
    let e = el(&core, id);
    assert_eq!((e.x, e.y, e.width, e.height), (90.0, 95.0, 70.0, 65.0));
}

#[test]
fn pinch_zooms_about_midpoint() {
    let mut core = new_core();
    core.on_touch_start(&[Touch::new(1, 100.0, 100.0)], 0.0);
    core.on_touch_start(&[Touch::new(1, 100.0, 100.0), Touch::new(2, 200.0, 100.0)], 1.0);
    assert!(matches!(core.input, InputState::Pinching(_)));

    let mid = pt(150.0, 100.0);
    let anchor = core.viewport().screen_to_model(mid);
    let actions = core.on_touch_move(&[Touch::new(1, 50.0, 100.0), Touch::new(2, 250.0, 100.0)], 2.0);
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!(approx_eq(core.viewport().scale, 2.0));
    let back = core.viewport().model_to_screen(anchor);
    assert!(approx_eq(back.x, mid.x) && approx_eq(back.y, mid.y));

    core.on_touch_end(&[Touch::new(2, 250.0, 100.0)], 3.0);
    assert!(core.input.is_idle());
}

#[test]
fn pinch_is_clamped() {
    let mut core = new_core();
    core.on_touch_start(&[Touch::new(1, 100.0, 100.0), Touch::new(2, 110.0, 100.0)], 0.0);
    core.on_touch_move(&[Touch::new(1, 0.0, 100.0), Touch::new(2, 1000.0, 100.0)], 1.0);
    assert_eq!(core.viewport().scale, 5.0);
}

#[test]
fn second_finger_ends_element_drag() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.on_touch_start(&[Touch::new(1, 30.0, 30.0)], 0.0);
    core.on_touch_move(&[Touch::new(1, 40.0, 30.0)], 1.0);
    core.on_touch_start(&[Touch::new(1, 40.0, 30.0), Touch::new(2, 140.0, 30.0)], 2.0);
    assert!(matches!(core.input, InputState::Pinching(_)));
    assert_eq!(el(&core, id).x, 10.0);
}

#[test]
fn multi_touch_move_outside_pinch_is_ignored() {
    let mut core = new_core();
    let actions = core.on_touch_move(&[Touch::new(1, 0.0, 0.0), Touch::new(2, 10.0, 0.0)], 0.0);
    assert!(actions.is_empty());
}

// =============================================================
// Keyboard
// =============================================================

#[test]
fn arrow_keys_nudge_selection() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    let actions = core.on_key_down(Key("ArrowRight".into()), no_mods());
    assert_eq!(updates(&actions).len(), 1);
    core.on_key_down(Key("ArrowDown".into()), shift());
    assert_eq!(el(&core, id).position(), pt(1.0, 10.0));
}

#[test]
fn arrow_keys_without_selection_do_nothing() {
    let mut core = new_core();
    add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.select_element(None);
    assert!(core.on_key_down(Key("ArrowLeft".into()), no_mods()).is_empty());
}

#[test]
fn nudge_moves_whole_cells_on_grid() {
    let mut core = floor_editor();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.on_key_down(Key("ArrowRight".into()), no_mods());
    assert_eq!(el(&core, id).x, 10.0);
    core.on_key_down(Key("ArrowLeft".into()), shift());
    assert_eq!(el(&core, id).x, 0.0);
}

#[test]
fn delete_key_removes_selection() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    let actions = core.on_key_down(Key("Delete".into()), no_mods());
    assert!(actions.contains(&Action::ElementDeleted { id }));
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(core.store.active().is_empty());

    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.on_key_down(Key("Backspace".into()), no_mods());
    assert!(core.element(&id).is_none());
}

#[test]
fn delete_key_without_selection_is_noop() {
    let mut core = new_core();
    assert!(core.on_key_down(Key("Delete".into()), no_mods()).is_empty());
}

#[test]
fn escape_clears_selection_and_pending_placement() {
    let mut core = new_core();
    add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.on_drop(TEMPLATE_TRANSFER_TYPE, &table_payload(), pt(300.0, 300.0));
    assert!(core.pending_placement().is_some());

    let actions = core.on_key_down(Key("Escape".into()), no_mods());
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(core.pending_placement().is_none());
}

#[test]
fn keys_are_ignored_mid_gesture() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.on_pointer_down(pt(30.0, 30.0), Button::Primary, no_mods());
    assert!(core.on_key_down(Key("Delete".into()), no_mods()).is_empty());
    assert!(core.element(&id).is_some());
}

// =============================================================
// Drop
// =============================================================

#[test]
fn scenario_reservable_drop_is_two_phase() {
    let mut core = new_core();
    let actions = core.on_drop(TEMPLATE_TRANSFER_TYPE, &table_payload(), pt(300.0, 300.0));
    let Some(Action::CapacityConfigRequested(pending)) = actions.first() else {
        panic!("expected CapacityConfigRequested, got {actions:?}");
    };
    assert_eq!((pending.x, pending.y), (270.0, 270.0));
    assert!(core.store.active().is_empty());

    let form = CapacityForm { name: "T1".into(), min_capacity: 2, max_capacity: 4 };
    let actions = core.confirm_capacity(&form);
    let created = actions
        .iter()
        .find_map(|a| match a {
            Action::ElementCreated(e) => Some(e.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(core.store.active().len(), 1);
    assert_eq!(created.name, "T1");
    assert_eq!(created.capacity, Some(Capacity { min: 2, max: 4 }));
    assert_eq!((created.x, created.y), (270.0, 270.0));
    assert_eq!(core.selection(), Some(created.id));
}

#[test]
fn invalid_capacity_form_warns_and_keeps_pending() {
    let mut core = new_core();
    core.on_drop(TEMPLATE_TRANSFER_TYPE, &table_payload(), pt(300.0, 300.0));
    let form = CapacityForm { name: "T1".into(), min_capacity: 5, max_capacity: 3 };
    let actions = core.confirm_capacity(&form);
    assert!(has_warning(&actions, "E_VALIDATION"));
    assert!(core.pending_placement().is_some());
    assert!(core.store.active().is_empty());
}

#[test]
fn cancel_placement_creates_nothing() {
    let mut core = new_core();
    core.on_drop(TEMPLATE_TRANSFER_TYPE, &table_payload(), pt(300.0, 300.0));
    assert_eq!(core.cancel_placement(), vec![Action::RenderNeeded]);
    assert!(core.cancel_placement().is_empty());
    assert!(core.store.active().is_empty());
}

#[test]
fn decorative_drop_creates_immediately() {
    let mut core = new_core();
    let actions = core.on_drop(TEMPLATE_TRANSFER_TYPE, &plant_payload(), pt(100.0, 100.0));
    assert!(actions.iter().any(|a| matches!(a, Action::ElementCreated(_))));
    assert_eq!(core.store.active().len(), 1);
    assert_eq!(core.store.active().elements()[0].position(), pt(90.0, 90.0));
}

#[test]
fn drop_respects_viewport() {
    let mut core = new_core();
    core.viewport = Viewport { scale: 2.0, pan: pt(-50.0, 0.0) };
    core.on_drop(TEMPLATE_TRANSFER_TYPE, &plant_payload(), pt(100.0, 100.0));
    // Cursor model = (100/2 + 50, 100/2) = (100, 50), minus half size.
    assert_eq!(core.store.active().elements()[0].position(), pt(90.0, 40.0));
}

#[test]
fn drop_snaps_in_floor_editor_only() {
    let mut editor = floor_editor();
    editor.on_drop(TEMPLATE_TRANSFER_TYPE, &plant_payload(), pt(104.0, 97.0));
    assert_eq!(editor.store.active().elements()[0].position(), pt(90.0, 90.0));

    let mut free = new_core();
    free.on_drop(TEMPLATE_TRANSFER_TYPE, &plant_payload(), pt(104.0, 97.0));
    assert_eq!(free.store.active().elements()[0].position(), pt(94.0, 87.0));
}

#[test]
fn malformed_drop_warns_and_creates_nothing() {
    let mut core = new_core();
    let raw = json!({ "name": "no id" }).to_string();
    let actions = core.on_drop(TEMPLATE_TRANSFER_TYPE, &raw, pt(0.0, 0.0));
    assert!(has_warning(&actions, "E_MALFORMED_PAYLOAD"));
    assert!(core.store.active().is_empty());
}

#[test]
fn foreign_transfer_type_is_rejected() {
    let mut core = new_core();
    assert!(core.on_drag_over("text/plain", pt(0.0, 0.0), None).is_empty());
    let actions = core.on_drop("text/plain", &plant_payload(), pt(0.0, 0.0));
    assert!(has_warning(&actions, "E_MALFORMED_PAYLOAD"));
    assert!(core.store.active().is_empty());
}

#[test]
fn drag_over_and_leave_toggle_preview() {
    let mut core = new_core();
    let over = core.on_drag_over(TEMPLATE_TRANSFER_TYPE, pt(50.0, 50.0), None);
    assert_eq!(over, vec![Action::RenderNeeded]);
    assert!(core.on_drag_over(TEMPLATE_TRANSFER_TYPE, pt(50.0, 50.0), None).is_empty());
    assert_eq!(core.drop.preview().unwrap().position, pt(50.0, 50.0));

    assert_eq!(core.on_drag_leave(), vec![Action::RenderNeeded]);
    assert!(core.on_drag_leave().is_empty());
    assert!(core.drop.preview().is_none());
}

#[test]
fn drop_clears_preview() {
    let mut core = new_core();
    core.on_drag_over(TEMPLATE_TRANSFER_TYPE, pt(50.0, 50.0), None);
    core.on_drop(TEMPLATE_TRANSFER_TYPE, &plant_payload(), pt(50.0, 50.0));
    assert!(core.drop.preview().is_none());
}

// =============================================================
// Property edits
// =============================================================

#[test]
fn inverted_capacity_update_warns_and_leaves_element() {
    let mut core = new_core();
    let id = add_table(&mut core, "T1", 0.0, 0.0);
    let update = ElementUpdate { min_capacity: Some(5), max_capacity: Some(3), ..Default::default() };
    let actions = core.update_element(&id, &update);
    assert!(has_warning(&actions, "E_VALIDATION"));
    assert_eq!(el(&core, id).capacity, Some(Capacity { min: 2, max: 4 }));
}

#[test]
fn rename_emits_update() {
    let mut core = new_core();
    let id = add_table(&mut core, "T1", 0.0, 0.0);
    let update = ElementUpdate { name: Some("Window".into()), ..Default::default() };
    let actions = core.update_element(&id, &update);
    assert_eq!(updates(&actions)[0].name, "Window");
}

#[test]
fn rotate_normalizes_and_emits_update() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    core.rotate_element(&id, 270.0);
    let actions = core.rotate_element(&id, 180.0);
    assert_eq!(updates(&actions)[0].rotation, 90.0);
}

#[test]
fn rotated_element_is_hit_where_drawn() {
    let mut core = new_core();
    let id = add_box(&mut core, 0.0, 0.0, 100.0, 20.0);
    core.rotate_element(&id, 90.0);
    core.select_element(None);
    // Rotated about (50, 10): the box now spans x 40..60, y -40..60.
    core.on_pointer_down(pt(50.0, 50.0), Button::Primary, no_mods());
    assert_eq!(core.input.element_id(), Some(id));
    core.on_pointer_up(pt(50.0, 50.0), Button::Primary, no_mods());

    core.select_element(None);
    core.on_pointer_down(pt(90.0, 10.0), Button::Primary, no_mods());
    assert!(matches!(core.input, InputState::Panning { .. }));
}

// =============================================================
// Floorplans and publish
// =============================================================

#[test]
fn publish_emits_snapshot_of_active_floorplan() {
    let mut core = new_core();
    let id = add_table(&mut core, "T1", 10.0, 20.0);
    let actions = core.publish();
    let [Action::Publish(snapshot)] = actions.as_slice() else {
        panic!("expected one Publish, got {actions:?}");
    };
    assert_eq!(snapshot.floorplan_id, core.store.active_id());
    assert_eq!(snapshot.elements.len(), 1);
    assert_eq!(snapshot.elements[0].id, id);

    let v = serde_json::to_value(snapshot).unwrap();
    assert_eq!(v["elements"][0]["minCapacity"], 2);
    assert_eq!(v["elements"][0]["templateId"], "round-4");
}

#[test]
fn load_floorplan_round_trips_publish() {
    let mut core = new_core();
    add_table(&mut core, "T1", 10.0, 20.0);
    let Action::Publish(snapshot) = core.publish().remove(0) else {
        panic!("expected Publish");
    };

    let mut other = new_core();
    let actions = other.load_floorplan(snapshot.clone());
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert_eq!(other.store.snapshot(), snapshot);
}

#[test]
fn load_invalid_floorplan_warns() {
    let mut core = new_core();
    let snapshot = FloorplanSnapshot { floorplan_id: uuid::Uuid::new_v4(), name: "  ".into(), elements: Vec::new() };
    let actions = core.load_floorplan(snapshot);
    assert!(has_warning(&actions, "E_VALIDATION"));
}

#[test]
fn switching_floorplan_aborts_gesture_and_clears_selection() {
    let mut core = new_core();
    add_box(&mut core, 0.0, 0.0, 60.0, 60.0);
    let second = core.store.add_floorplan("Terrace").unwrap();
    core.on_pointer_down(pt(30.0, 30.0), Button::Primary, no_mods());

    let actions = core.set_active_floorplan(&second);
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(core.input.is_idle());
    assert!(core.store.active().is_empty());
}

#[test]
fn switching_to_unknown_floorplan_warns() {
    let mut core = new_core();
    let actions = core.set_active_floorplan(&uuid::Uuid::new_v4());
    assert!(has_warning(&actions, "E_FLOORPLAN_NOT_FOUND"));
}

#[test]
fn deleting_last_floorplan_is_refused() {
    let mut core = new_core();
    let id = core.store.active_id();
    let err = core.store.delete_floorplan(&id).unwrap_err();
    assert_eq!(err.error_code(), "E_INVARIANT");
    assert_eq!(core.store.floorplans().len(), 1);
}

// =============================================================
// Cursor
// =============================================================

#[test]
fn hover_cursor_tracks_target() {
    let mut core = new_core();
    add_box(&mut core, 0.0, 0.0, 60.0, 60.0);

    let a = core.on_pointer_move(pt(30.0, 30.0), no_mods(), 0.0);
    assert_eq!(a, vec![Action::SetCursor("move".into())]);
    assert!(core.on_pointer_move(pt(31.0, 30.0), no_mods(), 0.0).is_empty());

    let b = core.on_pointer_move(pt(0.0, 60.0), no_mods(), 0.0);
    assert_eq!(b, vec![Action::SetCursor("nesw-resize".into())]);

    let c = core.on_pointer_move(pt(300.0, 300.0), no_mods(), 0.0);
    assert_eq!(c, vec![Action::SetCursor("default".into())]);
}
