//! Shared numeric constants for the canvas engine.

// ── Gestures ────────────────────────────────────────────────────

/// Movement (object units, either axis) before a press becomes a drag.
pub const DRAG_THRESHOLD: f64 = 1.0;

/// Zoom multiplier applied per wheel notch.
pub const ZOOM_STEP: f64 = 1.5;

/// Minimum wall-clock gap between two accepted zoom wheel events.
pub const WHEEL_INTERVAL_MS: f64 = 100.0;

/// Rotation requested per wheel notch while the modifier is held.
pub const ROTATE_STEP_DEG: f64 = 15.0;

// ── Drawing ─────────────────────────────────────────────────────

/// Marker radius when the object does not specify one. Also the hit half-width.
pub const DEFAULT_MARKER_RADIUS: f64 = 6.0;

/// Stroke width for lines, connectors and rectangles without an explicit width.
pub const DEFAULT_LINE_WIDTH: f64 = 1.1;

/// Growth applied to width/radius of selected objects lacking selected attributes.
pub const SELECTED_GROWTH: f64 = 1.5;

/// Label font size at zoom 1, in pixels.
pub const LABEL_FONT_PX: f64 = 12.0;

/// Screen-space gap between a marker's edge and its label.
pub const LABEL_GAP_PX: f64 = 2.0;
