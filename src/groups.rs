//! Control groups: sets of marker ids that move and rotate as one unit.
//!
//! The host derives the groups (one per annotated instance) and the engine
//! consults them only while the modifier key is held.

#[cfg(test)]
#[path = "groups_test.rs"]
mod groups_test;

use std::collections::HashMap;

use crate::affine::Point;
use crate::scene::{Marker, ObjectId, SceneObject};

/// Ordered list of control groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlGroups {
    groups: Vec<Vec<ObjectId>>,
}

impl From<Vec<Vec<ObjectId>>> for ControlGroups {
    fn from(groups: Vec<Vec<ObjectId>>) -> Self {
        Self { groups }
    }
}

impl ControlGroups {
    #[must_use]
    pub fn new(groups: Vec<Vec<ObjectId>>) -> Self {
        Self { groups }
    }

    /// The first group containing `object_id`, or a singleton fallback.
    #[must_use]
    pub fn resolve(&self, object_id: &str) -> Vec<ObjectId> {
        resolve(object_id, &self.groups)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Vec<ObjectId>] {
        &self.groups
    }

    /// Unit vector from each group's centroid to each of its markers.
    ///
    /// Markers sitting exactly on their centroid get no entry; callers fall
    /// back to a rightward direction.
    #[must_use]
    pub fn label_directions(&self, objects: &[SceneObject]) -> HashMap<ObjectId, Point> {
        let mut out = HashMap::new();
        for group in &self.groups {
            let members: Vec<&Marker> = objects
                .iter()
                .filter_map(SceneObject::as_marker)
                .filter(|m| group.contains(&m.common.object_id))
                .collect();
            if members.is_empty() {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let n = members.len() as f64;
            let centroid = Point::new(
                members.iter().map(|m| m.x).sum::<f64>() / n,
                members.iter().map(|m| m.y).sum::<f64>() / n,
            );
            for m in members {
                let d = m.position() - centroid;
                let norm = d.x.hypot(d.y);
                if norm > 0.0 {
                    out.insert(m.common.object_id.clone(), Point::new(d.x / norm, d.y / norm));
                }
            }
        }
        out
    }
}

/// Linear search for the group containing `object_id`; `[object_id]` if none.
#[must_use]
pub fn resolve(object_id: &str, groups: &[Vec<ObjectId>]) -> Vec<ObjectId> {
    groups
        .iter()
        .find(|g| g.iter().any(|id| id == object_id))
        .cloned()
        .unwrap_or_else(|| vec![object_id.to_owned()])
}
