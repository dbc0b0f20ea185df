//! Interactive scene canvas engine for the pose-skeleton annotator.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! canvas side of annotation: translating raw DOM pointer and wheel events into
//! drag, rect-select and rotate gestures, maintaining the bounded pan/zoom
//! viewport transform, hit-testing markers, and painting the scene. The host
//! JavaScript layer supplies the objects and control groups on every change and
//! applies the resulting [`engine::Action`]s to its annotation state.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`affine`] | Forward/inverse affine transform pair, points and rects |
//! | [`scene`] | Drawable object model and per-paint id index |
//! | [`input`] | Modifier keys, wheel deltas and the drag gesture state machine |
//! | [`hit`] | Hit-testing against markers |
//! | [`groups`] | Control groups and label directions |
//! | [`viewport`] | Bounded pan and rate-limited wheel zoom |
//! | [`render`] | Paint plan and `Canvas2D` executor |
//! | [`config`] | Host-supplied engine configuration |
//! | [`skeleton`] | Skeleton/instance to scene adapter |
//! | [`consts`] | Shared numeric constants (thresholds, zoom step, sizes) |

pub mod affine;
pub mod config;
pub mod consts;
pub mod engine;
pub mod groups;
pub mod hit;
pub mod input;
pub mod render;
pub mod scene;
pub mod skeleton;
pub mod viewport;
