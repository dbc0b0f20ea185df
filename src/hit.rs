//! Hit-testing: point → topmost object lookup.
//!
//! Objects are walked back-to-front, so the last-drawn object wins. Only
//! markers have a hit area (a square of half-width = radius); lines,
//! connectors and rectangles never intercept the pointer.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::affine::{Point, Rect};
use crate::scene::{ObjectId, SceneObject};

/// Whether `p` (object space) falls inside `obj`'s hit area.
#[must_use]
pub fn point_in_object(obj: &SceneObject, p: Point) -> bool {
    match obj {
        SceneObject::Marker(m) => {
            let r = m.radius();
            let bounds = Rect { x: m.x - r, y: m.y - r, w: 2.0 * r, h: 2.0 * r };
            bounds.contains(p)
        }
        SceneObject::Line(_) | SceneObject::Connector(_) | SceneObject::Rectangle(_) => false,
    }
}

/// Topmost object satisfying `pred` whose hit area contains `p`.
///
/// `None` means the background was hit.
#[must_use]
pub fn find_topmost<F>(objects: &[SceneObject], p: Point, pred: F) -> Option<&SceneObject>
where
    F: Fn(&SceneObject) -> bool,
{
    objects.iter().rev().find(|o| pred(o) && point_in_object(o, p))
}

/// Predicate: a marker the user may drag.
#[must_use]
pub fn is_draggable_marker(obj: &SceneObject) -> bool {
    matches!(obj, SceneObject::Marker(m) if m.common.draggable)
}

#[must_use]
pub fn is_clickable(obj: &SceneObject) -> bool {
    obj.common().clickable
}

#[must_use]
pub fn is_marker(obj: &SceneObject) -> bool {
    matches!(obj, SceneObject::Marker(_))
}

/// Ids of all markers positioned inside `rect`, in draw order.
#[must_use]
pub fn markers_in_rect(objects: &[SceneObject], rect: Rect) -> Vec<ObjectId> {
    objects
        .iter()
        .filter_map(SceneObject::as_marker)
        .filter(|m| rect.contains(m.position()))
        .map(|m| m.common.object_id.clone())
        .collect()
}
