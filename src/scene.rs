//! Scene model: the drawable primitives supplied by the host on every change.
//!
//! Objects are plain data. The engine never owns or mutates them; it reads the
//! latest list the host handed over and reports edits back as
//! [`crate::engine::Action`]s. JSON uses camelCase keys and a `type` tag, so
//! `{"type": "marker", "objectId": "n:0:head", "x": 1, "y": 2, ...}`.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::affine::Point;
use crate::consts::DEFAULT_MARKER_RADIUS;

/// Caller-assigned identifier, stable across repaints.
pub type ObjectId = String;

/// Fields shared by every object variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Common {
    pub object_id: ObjectId,
    #[serde(default)]
    pub clickable: bool,
    #[serde(default)]
    pub draggable: bool,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    #[default]
    Circle,
    Square,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkerAttributes {
    pub fill_color: Option<String>,
    pub line_color: Option<String>,
    pub shape: MarkerShape,
    pub radius: Option<f64>,
}

/// Stroke styling for lines, connectors and rectangles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeAttributes {
    pub color: String,
    /// Canvas line-dash pattern; empty means solid.
    #[serde(default)]
    pub dash: Vec<f64>,
    #[serde(default)]
    pub width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    #[serde(flatten)]
    pub common: Common,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub text_label: Option<String>,
    #[serde(default)]
    pub attributes: MarkerAttributes,
    #[serde(default)]
    pub selected_attributes: Option<MarkerAttributes>,
}

impl Marker {
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Radius in object units, falling back to the default.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.attributes.radius.unwrap_or(DEFAULT_MARKER_RADIUS)
    }
}

/// Segment from `(x, y)` to `(x + dx, y + dy)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    #[serde(flatten)]
    pub common: Common,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub attributes: StrokeAttributes,
    #[serde(default)]
    pub selected_attributes: Option<StrokeAttributes>,
}

/// Segment between two markers, resolved by id at paint time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    #[serde(flatten)]
    pub common: Common,
    pub object_id1: ObjectId,
    pub object_id2: ObjectId,
    pub attributes: StrokeAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    #[serde(flatten)]
    pub common: Common,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub attributes: StrokeAttributes,
}

/// A drawable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SceneObject {
    Marker(Marker),
    Line(Line),
    Connector(Connector),
    Rectangle(Rectangle),
}

impl SceneObject {
    #[must_use]
    pub fn common(&self) -> &Common {
        match self {
            Self::Marker(o) => &o.common,
            Self::Line(o) => &o.common,
            Self::Connector(o) => &o.common,
            Self::Rectangle(o) => &o.common,
        }
    }

    #[must_use]
    pub fn object_id(&self) -> &str {
        &self.common().object_id
    }

    #[must_use]
    pub fn as_marker(&self) -> Option<&Marker> {
        match self {
            Self::Marker(m) => Some(m),
            _ => None,
        }
    }
}

/// Parse a host-supplied JSON array of objects.
///
/// # Errors
///
/// Returns the serde error for malformed input or unknown `type` tags.
pub fn objects_from_json(raw: &str) -> Result<Vec<SceneObject>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Read-only id lookup built once per paint or interaction cycle.
pub struct SceneIndex<'a> {
    by_id: HashMap<&'a str, &'a SceneObject>,
}

impl<'a> SceneIndex<'a> {
    #[must_use]
    pub fn new(objects: &'a [SceneObject]) -> Self {
        let by_id = objects.iter().map(|o| (o.object_id(), o)).collect();
        Self { by_id }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&'a SceneObject> {
        self.by_id.get(id).copied()
    }

    /// Look up `id` and keep it only if it is a marker.
    #[must_use]
    pub fn marker(&self, id: &str) -> Option<&'a Marker> {
        self.get(id).and_then(SceneObject::as_marker)
    }
}
