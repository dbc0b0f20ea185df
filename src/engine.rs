use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::affine::{AffineTransform, Point, Rect};
use crate::config::EngineConfig;
use crate::groups::ControlGroups;
use crate::hit::{find_topmost, is_clickable, is_draggable_marker, is_marker, markers_in_rect};
use crate::input::{AnchorContext, DragEvent, DragState, Modifiers, WheelDelta};
use crate::render::{self, SceneView};
use crate::scene::{self, ObjectId, SceneIndex, SceneObject};
use crate::viewport::Viewport;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Release without drag over a clickable object.
    ClickObject(ObjectId),
    /// Release without drag over the background, object space.
    Click(Point),
    /// A dragged marker's new position; one per moved id, fired on release.
    DragObject { id: ObjectId, point: Point },
    /// Markers inside a completed rect-select.
    SelectObjects(Vec<ObjectId>),
    SelectRect(Rect),
    RotateAroundObject { id: ObjectId, degrees: f64 },
    /// New viewport transform for the host to persist.
    SetTransform(AffineTransform),
    RenderNeeded,
}

/// What the current press is doing, decided by what was under the pointer
/// at press time and whether the modifier was held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    None,
    ObjectDrag,
    RectSelect,
    Pan,
}

/// Object-drag bookkeeping, separate from the generic drag state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DraggingObject {
    #[default]
    NotDragging,
    /// An active drag that grabbed no marker (pan or rect-select).
    Background,
    Marker {
        object_id: ObjectId,
        /// Marker position when the drag activated.
        origin: Point,
        new_point: Point,
    },
}

impl DraggingObject {
    /// Offset from the grabbed marker's origin to the pointer.
    #[must_use]
    pub fn delta(&self) -> Point {
        match self {
            Self::Marker { origin, new_point, .. } => *new_point - *origin,
            _ => Point::default(),
        }
    }
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub objects: Vec<SceneObject>,
    pub groups: ControlGroups,
    pub viewport: Viewport,
    pub drag: DragState,
    pub dragging: DraggingObject,
    /// In-progress rect-select region, object space.
    pub select_rect: Option<Rect>,
    pub hovered: Option<ObjectId>,
    pub config: EngineConfig,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            objects: Vec::new(),
            groups: ControlGroups::default(),
            viewport: Viewport::default().with_zoom(config.zoom_step, config.wheel_interval_ms),
            drag: DragState::Idle,
            dragging: DraggingObject::NotDragging,
            select_rect: None,
            hovered: None,
            config,
        }
    }

    // --- Data inputs ---

    /// Replace the object list wholesale.
    pub fn set_objects(&mut self, objects: Vec<SceneObject>) {
        self.objects = objects;
    }

    /// Replace the object list from a JSON array.
    ///
    /// # Errors
    ///
    /// Returns the parse error and leaves the current objects in place.
    pub fn set_objects_json(&mut self, raw: &str) -> Result<(), serde_json::Error> {
        self.objects = scene::objects_from_json(raw)?;
        Ok(())
    }

    pub fn set_control_groups(&mut self, groups: Vec<Vec<ObjectId>>) {
        self.groups = ControlGroups::new(groups);
    }

    /// Adopt the host's transform; `None` means the host owns no viewport.
    pub fn set_affine_transform(&mut self, transform: Option<AffineTransform>) {
        self.viewport.set_transform(transform);
    }

    /// Adopt a transform given as a JSON 2x3 matrix, or `null`.
    ///
    /// # Errors
    ///
    /// Returns the parse error for malformed or singular matrices; the current
    /// transform is kept.
    pub fn set_affine_transform_json(&mut self, raw: &str) -> Result<(), serde_json::Error> {
        match serde_json::from_str::<Option<AffineTransform>>(raw) {
            Ok(transform) => {
                self.viewport.set_transform(transform);
                Ok(())
            }
            Err(e) => {
                log::warn!("rejected viewport transform: {e}");
                Err(e)
            }
        }
    }

    /// Canvas size in CSS pixels.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    // --- Queries ---

    #[must_use]
    pub fn transform(&self) -> AffineTransform {
        *self.viewport.transform()
    }

    /// Interpret the current press. Object drag takes priority over
    /// modifier rect-select, which takes priority over pan.
    #[must_use]
    pub fn gesture(&self) -> Gesture {
        match self.drag.context() {
            None => Gesture::None,
            Some(AnchorContext::ObjectDrag { .. }) => Gesture::ObjectDrag,
            Some(AnchorContext::Pan { .. }) if self.drag.alt_key() => Gesture::RectSelect,
            Some(AnchorContext::Pan { .. }) => Gesture::Pan,
        }
    }

    /// Ids that move with the current object drag.
    #[must_use]
    pub fn moving_ids(&self) -> Vec<ObjectId> {
        match &self.dragging {
            DraggingObject::Marker { object_id, .. } if self.drag.alt_key() => self.groups.resolve(object_id),
            DraggingObject::Marker { object_id, .. } => vec![object_id.clone()],
            _ => Vec::new(),
        }
    }

    /// Borrow everything the renderer needs for one frame.
    #[must_use]
    pub fn scene_view(&self) -> SceneView<'_> {
        let dragged = match &self.dragging {
            DraggingObject::Marker { object_id, .. } => Some(object_id.as_str()),
            _ => None,
        };
        SceneView {
            objects: &self.objects,
            groups: &self.groups,
            transform: self.viewport.transform(),
            width: self.viewport.width,
            height: self.viewport.height,
            style: &self.config.style,
            hovered: self.hovered.as_deref(),
            dragged,
            moving: self.moving_ids(),
            drag_delta: self.dragging.delta(),
            select_rect: self.select_rect,
        }
    }

    // --- Input events ---

    /// Pointer pressed at `pixel` (canvas CSS pixels).
    pub fn on_pointer_down(&mut self, pixel: Point, modifiers: Modifiers) -> Vec<Action> {
        let point = self.viewport.to_object(pixel);
        let context = match find_topmost(&self.objects, point, is_draggable_marker) {
            Some(obj) => AnchorContext::ObjectDrag { object_id: obj.object_id().to_owned() },
            None => AnchorContext::Pan { transform: *self.viewport.transform(), pixel },
        };
        let event = DragEvent::MouseDown { point, alt: modifiers.alt, context };
        self.apply_drag_event(event);
        self.dragging = DraggingObject::NotDragging;
        self.select_rect = None;
        Vec::new()
    }

    pub fn on_pointer_move(&mut self, pixel: Point, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        let point = self.viewport.to_object(pixel);

        let hovered = find_topmost(&self.objects, point, is_draggable_marker).map(|o| o.object_id().to_owned());
        if hovered != self.hovered {
            self.hovered = hovered;
            actions.push(Action::RenderNeeded);
        }

        // Pan tracks from the press onward, before the drag threshold.
        if self.gesture() == Gesture::Pan
            && let Some(AnchorContext::Pan { transform, pixel: anchor }) = self.drag.context()
        {
            let (snapshot, anchor) = (*transform, *anchor);
            if let Some(t) = self.viewport.pan(&snapshot, anchor, pixel) {
                actions.push(Action::SetTransform(t));
                push_render(&mut actions);
            }
        }

        let drag_point = self.drag_point(pixel);
        self.apply_drag_event(DragEvent::MouseMove { point: drag_point });
        if self.drag.is_active() {
            self.track_active_drag();
            push_render(&mut actions);
        }
        actions
    }

    pub fn on_pointer_up(&mut self, pixel: Point, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        let point = self.viewport.to_object(pixel);

        if !self.drag.is_active() {
            if let Some(obj) = find_topmost(&self.objects, point, is_clickable) {
                actions.push(Action::ClickObject(obj.object_id().to_owned()));
            } else if !matches!(self.dragging, DraggingObject::Marker { .. }) {
                actions.push(Action::Click(point));
            }
        }

        if let DraggingObject::Marker { object_id, .. } = &self.dragging {
            let delta = self.dragging.delta();
            let index = SceneIndex::new(&self.objects);
            for id in self.moving_ids() {
                if let Some(m) = index.marker(&id) {
                    actions.push(Action::DragObject { point: m.position() + delta, id });
                }
            }
            log::debug!("object drag of {object_id} finished, delta ({:.1}, {:.1})", delta.x, delta.y);
        }

        if let Some(rect) = self.select_rect.take() {
            let ids = markers_in_rect(&self.objects, rect);
            log::debug!("rect-select finished with {} markers", ids.len());
            actions.push(Action::SelectObjects(ids));
            actions.push(Action::SelectRect(rect));
        }

        let was_dragging = self.dragging != DraggingObject::NotDragging;
        let drag_point = self.drag_point(pixel);
        self.apply_drag_event(DragEvent::MouseUp { point: drag_point });
        self.dragging = DraggingObject::NotDragging;
        if was_dragging {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Pointer left the canvas. The gesture survives unless
    /// `end_gesture_on_leave` is configured, in which case it is dropped
    /// without firing completion callbacks.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        if !self.config.end_gesture_on_leave {
            self.apply_drag_event(DragEvent::MouseLeave);
            return Vec::new();
        }
        if self.drag == DragState::Idle {
            return Vec::new();
        }
        log::debug!("pointer left canvas, cancelling {:?}", self.gesture());
        self.drag = DragState::Idle;
        self.dragging = DraggingObject::NotDragging;
        self.select_rect = None;
        vec![Action::RenderNeeded]
    }

    /// Wheel at `pixel`. With the modifier it requests a rotation about the
    /// marker under the cursor; otherwise it zooms. `now_ms` is a wall-clock
    /// timestamp for the zoom rate limit.
    pub fn on_wheel(&mut self, pixel: Point, delta: WheelDelta, modifiers: Modifiers, now_ms: f64) -> Vec<Action> {
        if modifiers.alt {
            let point = self.viewport.to_object(pixel);
            let Some(obj) = find_topmost(&self.objects, point, is_marker) else {
                return Vec::new();
            };
            let step = self.config.rotate_step_deg;
            let degrees = if delta.dy > 0.0 { step } else { -step };
            return vec![Action::RotateAroundObject { id: obj.object_id().to_owned(), degrees }];
        }
        match self.viewport.zoom(pixel, delta.dy, now_ms) {
            Some(t) => vec![Action::SetTransform(t), Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    // --- Internals ---

    /// Object-space point fed to the drag state machine. A pan measures
    /// movement through the press-time snapshot, since the live transform
    /// follows the pointer.
    fn drag_point(&self, pixel: Point) -> Point {
        match self.drag.context() {
            Some(AnchorContext::Pan { transform, .. }) if self.gesture() == Gesture::Pan => transform.apply_inverse(pixel),
            _ => self.viewport.to_object(pixel),
        }
    }

    fn apply_drag_event(&mut self, event: DragEvent) {
        let state = std::mem::take(&mut self.drag);
        self.drag = state.on_event(event, self.config.drag_threshold);
    }

    /// Start or update the object/background drag once past the threshold.
    fn track_active_drag(&mut self) {
        let Some(position) = self.drag.position() else {
            return;
        };
        if self.dragging == DraggingObject::NotDragging {
            self.dragging = self.start_drag(position);
        } else if let DraggingObject::Marker { new_point, .. } = &mut self.dragging {
            *new_point = position;
        }
        if self.gesture() == Gesture::RectSelect {
            self.select_rect = self.drag.rect();
        }
    }

    fn start_drag(&self, position: Point) -> DraggingObject {
        let grabbed = match self.drag.context() {
            Some(AnchorContext::ObjectDrag { object_id }) => SceneIndex::new(&self.objects).marker(object_id),
            _ => None,
        };
        match grabbed {
            Some(m) => {
                log::debug!("object drag of {} started", m.common.object_id);
                DraggingObject::Marker { object_id: m.common.object_id.clone(), origin: m.position(), new_point: position }
            }
            None => {
                log::debug!("background drag started ({:?})", self.gesture());
                DraggingObject::Background
            }
        }
    }
}

fn push_render(actions: &mut Vec<Action>) {
    if !actions.contains(&Action::RenderNeeded) {
        actions.push(Action::RenderNeeded);
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
    dpr: f64,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self::with_config(canvas, EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(canvas: HtmlCanvasElement, config: EngineConfig) -> Self {
        Self { canvas, core: EngineCore::with_config(config), dpr: 1.0 }
    }

    // --- Delegated data inputs ---

    pub fn set_objects(&mut self, objects: Vec<SceneObject>) {
        self.core.set_objects(objects);
    }

    /// # Errors
    ///
    /// See [`EngineCore::set_objects_json`].
    pub fn set_objects_json(&mut self, raw: &str) -> Result<(), serde_json::Error> {
        self.core.set_objects_json(raw)
    }

    pub fn set_control_groups(&mut self, groups: Vec<Vec<ObjectId>>) {
        self.core.set_control_groups(groups);
    }

    pub fn set_affine_transform(&mut self, transform: Option<AffineTransform>) {
        self.core.set_affine_transform(transform);
    }

    // --- Viewport ---

    /// Update canvas size (CSS pixels) and device pixel ratio, resizing the
    /// backing store to match.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_size(width_css, height_css);
        self.dpr = dpr;
        self.canvas.set_width((width_css * dpr).round() as u32);
        self.canvas.set_height((height_css * dpr).round() as u32);
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pixel: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(pixel, modifiers)
    }

    pub fn on_pointer_move(&mut self, pixel: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(pixel, modifiers)
    }

    pub fn on_pointer_up(&mut self, pixel: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(pixel, modifiers)
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.core.on_pointer_leave()
    }

    pub fn on_wheel(&mut self, pixel: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(pixel, delta, modifiers, js_sys::Date::now())
    }

    // --- Render ---

    /// Draw the current state to the canvas. A frame with non-finite geometry
    /// is skipped.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self.context()?;
        let view = self.core.scene_view();
        if let Some(plan) = render::plan(&view) {
            render::draw(&ctx, &plan, self.dpr)?;
        }
        Ok(())
    }

    fn context(&self) -> Result<CanvasRenderingContext2d, JsValue> {
        self.canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn transform(&self) -> AffineTransform {
        self.core.transform()
    }
}
