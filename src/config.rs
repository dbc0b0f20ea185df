//! Engine configuration supplied by the host.
//!
//! Every field has a default from [`crate::consts`], so an empty JSON object is
//! a complete configuration.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DRAG_THRESHOLD, ROTATE_STEP_DEG, WHEEL_INTERVAL_MS, ZOOM_STEP};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Colors used by the renderer for interaction states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Style {
    /// Fill and stroke of a hovered or dragged marker.
    pub highlight_color: String,
    /// Stroke of a selected line without `selectedAttributes`.
    pub selected_line_color: String,
    /// Fill of a selected marker without `selectedAttributes`.
    pub selected_marker_fill: String,
    pub label_color: String,
    /// Fill of the in-progress rect-select region.
    pub select_fill: String,
    /// Stroke/fill used when an object leaves its color unset.
    pub default_color: String,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            highlight_color: "yellow".to_owned(),
            selected_line_color: "yellow".to_owned(),
            selected_marker_fill: "orange".to_owned(),
            label_color: "#55ccaa".to_owned(),
            select_fill: "rgba(196, 196, 196, 0.5)".to_owned(),
            default_color: "black".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub drag_threshold: f64,
    pub zoom_step: f64,
    pub wheel_interval_ms: f64,
    pub rotate_step_deg: f64,
    /// End the active gesture when the pointer leaves the canvas. Off by
    /// default: a drag survives a brief excursion outside the element.
    pub end_gesture_on_leave: bool,
    pub style: Style,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DRAG_THRESHOLD,
            zoom_step: ZOOM_STEP,
            wheel_interval_ms: WHEEL_INTERVAL_MS,
            rotate_step_deg: ROTATE_STEP_DEG,
            end_gesture_on_leave: false,
            style: Style::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check numeric ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.drag_threshold.is_finite() && self.drag_threshold >= 0.0) {
            return Err(ConfigError::Invalid(format!("dragThreshold must be >= 0, got {}", self.drag_threshold)));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(ConfigError::Invalid(format!("zoomStep must be > 1, got {}", self.zoom_step)));
        }
        if !(self.wheel_interval_ms.is_finite() && self.wheel_interval_ms >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "wheelIntervalMs must be >= 0, got {}",
                self.wheel_interval_ms
            )));
        }
        if !self.rotate_step_deg.is_finite() {
            return Err(ConfigError::Invalid(format!("rotateStepDeg must be finite, got {}", self.rotate_step_deg)));
        }
        Ok(())
    }
}
