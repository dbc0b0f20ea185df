//! Skeleton adapter: turns a pose skeleton and one frame's annotated
//! instances into scene objects, and maps engine callbacks back to nodes.
//!
//! Object ids encode their origin so callbacks can be routed without a
//! lookup table: markers are `n:{instance}:{node}` and connectors are
//! `e:{instance}:{node1}:{node2}`.

#[cfg(test)]
#[path = "skeleton_test.rs"]
mod skeleton_test;

use serde::{Deserialize, Serialize};

use crate::affine::Point;
use crate::scene::{Common, Connector, Marker, MarkerAttributes, ObjectId, SceneObject, StrokeAttributes};

/// Fill lightening applied to each instance colour.
const FILL_LIGHTEN: i32 = 60;

/// Instance colours, cycled by index.
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonNode {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonEdge {
    pub id1: String,
    pub id2: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skeleton {
    pub nodes: Vec<SkeletonNode>,
    pub edges: Vec<SkeletonEdge>,
}

/// A node's position in frame pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLocation {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// One annotated animal/object in a frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub node_locations: Vec<NodeLocation>,
}

/// Everything the engine needs for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonScene {
    pub objects: Vec<SceneObject>,
    pub control_groups: Vec<Vec<ObjectId>>,
}

/// Build the scene for one frame. `scale` maps frame pixels to canvas
/// object space per axis.
#[must_use]
pub fn build_scene(skeleton: &Skeleton, instances: &[Instance], scale: [f64; 2], marker_radius: f64) -> SkeletonScene {
    let mut scene = SkeletonScene::default();
    for (i, instance) in instances.iter().enumerate() {
        let color = instance_color(i);
        for node in &skeleton.nodes {
            let Some(loc) = instance.node_locations.iter().find(|l| l.id == node.id) else {
                continue;
            };
            scene.objects.push(SceneObject::Marker(Marker {
                common: Common { object_id: NodeRef::new(i, &node.id).object_id(), draggable: true, ..Default::default() },
                x: loc.x * scale[0],
                y: loc.y * scale[1],
                text_label: Some(node.id.clone()),
                attributes: MarkerAttributes {
                    fill_color: Some(lighten(color, FILL_LIGHTEN)),
                    line_color: Some(color.to_owned()),
                    radius: Some(marker_radius),
                    ..Default::default()
                },
                selected_attributes: None,
            }));
        }
        // Edges with a missing endpoint are kept; the renderer skips them.
        for edge in &skeleton.edges {
            scene.objects.push(SceneObject::Connector(Connector {
                common: Common { object_id: format!("e:{i}:{}:{}", edge.id1, edge.id2), ..Default::default() },
                object_id1: NodeRef::new(i, &edge.id1).object_id(),
                object_id2: NodeRef::new(i, &edge.id2).object_id(),
                attributes: StrokeAttributes { color: color.to_owned(), ..Default::default() },
            }));
        }
        scene
            .control_groups
            .push(instance.node_locations.iter().map(|l| NodeRef::new(i, &l.id).object_id()).collect());
    }
    scene
}

/// A marker id decoded back into its instance and skeleton node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub instance: usize,
    pub node: String,
}

impl NodeRef {
    #[must_use]
    pub fn new(instance: usize, node: &str) -> Self {
        Self { instance, node: node.to_owned() }
    }

    /// Decode `n:{instance}:{node}`. Node ids may themselves contain `:`.
    #[must_use]
    pub fn parse(object_id: &str) -> Option<Self> {
        let mut parts = object_id.splitn(3, ':');
        if parts.next()? != "n" {
            return None;
        }
        let Ok(instance) = parts.next()?.parse() else {
            return None;
        };
        let node = parts.next()?;
        Some(Self { instance, node: node.to_owned() })
    }

    #[must_use]
    pub fn object_id(&self) -> ObjectId {
        format!("n:{}:{}", self.instance, self.node)
    }

    /// Map a point in canvas object space back to frame pixels.
    #[must_use]
    pub fn to_frame_point(point: Point, scale: [f64; 2]) -> Point {
        Point::new(point.x / scale[0], point.y / scale[1])
    }
}

#[must_use]
pub fn instance_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Add `amount` to each channel of a `#rrggbb` colour, clamped to 0..=255.
/// Anything else is returned unchanged.
#[must_use]
pub fn lighten(color: &str, amount: i32) -> String {
    let Some(hex) = color.strip_prefix('#') else {
        return color.to_owned();
    };
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return color.to_owned();
    }
    let Ok(rgb) = u32::from_str_radix(hex, 16) else {
        return color.to_owned();
    };
    let channel = |shift: u32| {
        let v = (rgb >> shift) & 0xff;
        let v = i64::from(v) + i64::from(amount);
        v.clamp(0, 255)
    };
    format!("#{:02x}{:02x}{:02x}", channel(16), channel(8), channel(0))
}

/// Marker radius for a canvas of `width` CSS pixels.
#[must_use]
pub fn marker_radius_for_width(width: f64) -> f64 {
    if width > 800.0 { 5.0 } else { 3.0 }
}
