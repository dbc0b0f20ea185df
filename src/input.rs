//! Input model: modifier keys, wheel deltas, and the drag gesture state machine.
//!
//! [`DragState`] turns raw pointer-down/move/up/leave events into a drag
//! lifecycle. It is generic: it knows nothing about objects or the viewport
//! beyond the [`AnchorContext`] the caller attaches at press time. Transitions
//! are pure (`DragState::on_event` consumes the old state and returns the new
//! one).

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::affine::{AffineTransform, Point, Rect};
use crate::scene::ObjectId;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    /// Alt / Option: switches pan to rect-select, single drag to group drag,
    /// and wheel zoom to rotate.
    pub alt: bool,
    pub meta: bool,
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Gesture-scoped context captured at press time.
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorContext {
    /// Nothing draggable under the press: the gesture pans or rect-selects.
    Pan {
        /// Viewport transform at press time.
        transform: AffineTransform,
        /// Raw pixel position of the press.
        pixel: Point,
    },
    /// A draggable marker was under the press.
    ObjectDrag { object_id: ObjectId },
}

impl AnchorContext {
    #[must_use]
    pub fn grabbed_object(&self) -> bool {
        matches!(self, Self::ObjectDrag { .. })
    }
}

/// Raw pointer events, in object space.
#[derive(Debug, Clone)]
pub enum DragEvent {
    MouseDown { point: Point, alt: bool, context: AnchorContext },
    MouseMove { point: Point },
    MouseUp { point: Point },
    MouseLeave,
}

/// Drag lifecycle: `Idle → Anchored → Dragging → Idle`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    /// Pointer is down but has not yet moved past the threshold.
    Anchored { anchor: Point, alt: bool, context: AnchorContext },
    /// Pointer has moved past the threshold; every move updates `rect`.
    Dragging {
        anchor: Point,
        position: Point,
        /// Normalized rectangle from `anchor` to `position`.
        rect: Rect,
        alt: bool,
        context: AnchorContext,
    },
}

impl DragState {
    /// Apply one event. `threshold` is the movement (either axis) that turns
    /// an anchored press into a drag.
    #[must_use]
    pub fn on_event(self, event: DragEvent, threshold: f64) -> Self {
        match event {
            // A press while already dragging is a caller precondition violation;
            // it simply re-anchors.
            DragEvent::MouseDown { point, alt, context } => Self::Anchored { anchor: point, alt, context },
            DragEvent::MouseMove { point } => self.moved(point, threshold),
            DragEvent::MouseUp { .. } => Self::Idle,
            DragEvent::MouseLeave => self,
        }
    }

    fn moved(self, point: Point, threshold: f64) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Anchored { anchor, alt, context } => {
                let rect = Rect::from_corners(anchor, point);
                if rect.w >= threshold || rect.h >= threshold {
                    Self::Dragging { anchor, position: point, rect, alt, context }
                } else {
                    Self::Anchored { anchor, alt, context }
                }
            }
            Self::Dragging { anchor, alt, context, .. } => Self::Dragging {
                anchor,
                position: point,
                rect: Rect::from_corners(anchor, point),
                alt,
                context,
            },
        }
    }

    /// True once movement has exceeded the threshold.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    #[must_use]
    pub fn anchor(&self) -> Option<Point> {
        match self {
            Self::Idle => None,
            Self::Anchored { anchor, .. } | Self::Dragging { anchor, .. } => Some(*anchor),
        }
    }

    /// Latest pointer position; the anchor itself until the drag activates.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Idle => None,
            Self::Anchored { anchor, .. } => Some(*anchor),
            Self::Dragging { position, .. } => Some(*position),
        }
    }

    #[must_use]
    pub fn rect(&self) -> Option<Rect> {
        match self {
            Self::Dragging { rect, .. } => Some(*rect),
            _ => None,
        }
    }

    #[must_use]
    pub fn context(&self) -> Option<&AnchorContext> {
        match self {
            Self::Idle => None,
            Self::Anchored { context, .. } | Self::Dragging { context, .. } => Some(context),
        }
    }

    /// Whether the modifier was held at press time.
    #[must_use]
    pub fn alt_key(&self) -> bool {
        match self {
            Self::Idle => false,
            Self::Anchored { alt, .. } | Self::Dragging { alt, .. } => *alt,
        }
    }
}
