//! Interactive canvas core for the restaurant floorplan editor.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! coordinate transform between screen and floorplan space, the pan/zoom
//! viewport, the drag/resize/drop interaction state machines, and the element
//! model they mutate. The host JavaScript layer wires DOM events to the engine,
//! shows the capacity form and toasts, and persists the resulting
//! [`engine::Action`]s to the backend.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`geometry`] | Points, sizes, screen/model transforms, grid snapping |
//! | [`element`] | Templates, placed elements, capacity, sparse updates |
//! | [`store`] | Floorplans, template catalog, and the single selection |
//! | [`viewport`] | Scale and pan state, focal-point zoom, pinch |
//! | [`drag`] | Element move sessions |
//! | [`resize`] | Corner-handle resize sessions with frame coalescing |
//! | [`drop`] | Palette drop, two-phase reservable placement |
//! | [`projection`] | Model-to-screen boxes and paint order |
//! | [`hit`] | Hit-testing of element bodies and resize handles |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`render`] | Scene rendering to a 2D canvas context |
//! | [`config`] | Per-canvas configuration and presets |
//! | [`error`] | Error type shared by all fallible operations |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum sizes, etc.) |

pub mod config;
pub mod consts;
pub mod drag;
pub mod drop;
pub mod element;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod projection;
pub mod render;
pub mod resize;
pub mod store;
pub mod viewport;
