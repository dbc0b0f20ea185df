//! Rendering: draws the full scene to a 2D context.
//!
//! Painting happens in two steps. [`plan`] turns a read-only [`SceneView`] into
//! a flat list of [`PaintOp`]s in content coordinates, resolving drag previews,
//! connector endpoints, hover/selection styling and zoom-compensated sizes.
//! [`draw`] then replays the plan on a [`web_sys::CanvasRenderingContext2d`];
//! it is the only place that touches the browser canvas.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::affine::{AffineTransform, Point, Rect};
use crate::config::Style;
use crate::consts::{DEFAULT_LINE_WIDTH, DEFAULT_MARKER_RADIUS, LABEL_FONT_PX, LABEL_GAP_PX, SELECTED_GROWTH};
use crate::groups::ControlGroups;
use crate::scene::{Connector, Line, Marker, MarkerShape, ObjectId, Rectangle, SceneIndex, SceneObject};

/// Everything a paint needs, borrowed from the engine for one frame.
pub struct SceneView<'a> {
    pub objects: &'a [SceneObject],
    pub groups: &'a ControlGroups,
    pub transform: &'a AffineTransform,
    pub width: f64,
    pub height: f64,
    pub style: &'a Style,
    /// Marker under the cursor.
    pub hovered: Option<&'a str>,
    /// Marker grabbed by the active drag.
    pub dragged: Option<&'a str>,
    /// Ids drawn at their position plus `drag_delta`.
    pub moving: Vec<ObjectId>,
    pub drag_delta: Point,
    /// In-progress rect-select region, object space.
    pub select_rect: Option<Rect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Middle,
    Bottom,
}

impl TextBaseline {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        }
    }
}

/// One drawing primitive in content coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp<'a> {
    FillRect {
        rect: Rect,
        color: &'a str,
    },
    /// Open or closed polyline.
    Stroke {
        points: Vec<Point>,
        closed: bool,
        color: &'a str,
        width: f64,
        dash: &'a [f64],
    },
    Marker {
        center: Point,
        radius: f64,
        shape: MarkerShape,
        fill: Option<&'a str>,
        stroke: Option<&'a str>,
        line_width: f64,
    },
    Label {
        text: &'a str,
        at: Point,
        font_px: f64,
        align: TextAlign,
        baseline: TextBaseline,
        color: &'a str,
    },
}

/// A fully resolved frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenePlan<'a> {
    pub transform: [f64; 6],
    pub width: f64,
    pub height: f64,
    pub ops: Vec<PaintOp<'a>>,
}

/// Resolve a frame. Returns `None` when the transform yields non-finite
/// geometry; the caller skips drawing that frame.
#[must_use]
pub fn plan<'a>(view: &SceneView<'a>) -> Option<ScenePlan<'a>> {
    let transform = view.transform.canvas_args();
    let zoom_scale = 1.0 / view.transform.scale();
    if !zoom_scale.is_finite() || transform.iter().any(|v| !v.is_finite()) {
        log::warn!("skipping frame: non-finite viewport transform {transform:?}");
        return None;
    }

    let style: &'a Style = view.style;
    let mut painter = Painter {
        view,
        style,
        index: SceneIndex::new(view.objects),
        label_dirs: view.groups.label_directions(view.objects),
        zoom_scale,
        ops: Vec::with_capacity(view.objects.len() * 2 + 1),
    };

    if let Some(rect) = view.select_rect {
        painter.ops.push(PaintOp::FillRect { rect, color: &style.select_fill });
    }
    for obj in view.objects {
        match obj {
            SceneObject::Line(l) => painter.line(l),
            SceneObject::Marker(m) => painter.marker(m),
            SceneObject::Rectangle(r) => painter.rectangle(r),
            SceneObject::Connector(c) => painter.connector(c),
        }
    }

    Some(ScenePlan { transform, width: view.width, height: view.height, ops: painter.ops })
}

struct Painter<'v, 'a> {
    view: &'v SceneView<'a>,
    style: &'a Style,
    index: SceneIndex<'a>,
    label_dirs: HashMap<ObjectId, Point>,
    zoom_scale: f64,
    ops: Vec<PaintOp<'a>>,
}

impl<'a> Painter<'_, 'a> {
    /// Stored position, shifted by the drag preview when `id` is moving.
    fn effective(&self, id: &str, p: Point) -> Point {
        if self.view.moving.iter().any(|m| m == id) {
            p + self.view.drag_delta
        } else {
            p
        }
    }

    fn color(&self, c: &'a str) -> &'a str {
        let style = self.style;
        if c.is_empty() { &style.default_color } else { c }
    }

    fn line(&mut self, l: &'a Line) {
        let p = self.effective(&l.common.object_id, Point::new(l.x, l.y));
        let (color, width, dash) = match (&l.selected_attributes, l.common.selected) {
            (Some(sel), true) => (sel.color.as_str(), sel.width.unwrap_or(DEFAULT_LINE_WIDTH), sel.dash.as_slice()),
            (None, true) => (
                self.style.selected_line_color.as_str(),
                l.attributes.width.unwrap_or(DEFAULT_LINE_WIDTH) * SELECTED_GROWTH,
                l.attributes.dash.as_slice(),
            ),
            (_, false) => (
                l.attributes.color.as_str(),
                l.attributes.width.unwrap_or(DEFAULT_LINE_WIDTH),
                l.attributes.dash.as_slice(),
            ),
        };
        let color = self.color(color);
        let width = width * self.zoom_scale;
        self.ops.push(PaintOp::Stroke {
            points: vec![p, Point::new(p.x + l.dx, p.y + l.dy)],
            closed: false,
            color,
            width,
            dash,
        });
    }

    fn rectangle(&mut self, r: &'a Rectangle) {
        let a = &r.attributes;
        let color = self.color(&a.color);
        let width = a.width.unwrap_or(DEFAULT_LINE_WIDTH) * self.zoom_scale;
        self.ops.push(PaintOp::Stroke {
            points: vec![
                Point::new(r.x, r.y),
                Point::new(r.x + r.w, r.y),
                Point::new(r.x + r.w, r.y + r.h),
                Point::new(r.x, r.y + r.h),
            ],
            closed: true,
            color,
            width,
            dash: &a.dash,
        });
    }

    fn connector(&mut self, c: &'a Connector) {
        // Dangling references are tolerated: the connector is just not drawn.
        let (Some(m1), Some(m2)) = (self.index.marker(&c.object_id1), self.index.marker(&c.object_id2)) else {
            return;
        };
        let p1 = self.effective(&m1.common.object_id, m1.position());
        let p2 = self.effective(&m2.common.object_id, m2.position());
        let a = &c.attributes;
        let color = self.color(&a.color);
        let width = a.width.unwrap_or(DEFAULT_LINE_WIDTH) * self.zoom_scale;
        self.ops.push(PaintOp::Stroke { points: vec![p1, p2], closed: false, color, width, dash: &a.dash });
    }

    fn marker(&mut self, m: &'a Marker) {
        let id = m.common.object_id.as_str();
        let p = self.effective(id, m.position());
        let style = self.style;

        let (fill, stroke, radius) = match (&m.selected_attributes, m.common.selected) {
            (Some(sel), true) => (
                sel.fill_color.as_deref(),
                sel.line_color.as_deref(),
                sel.radius.unwrap_or(DEFAULT_MARKER_RADIUS),
            ),
            (None, true) => (
                Some(style.selected_marker_fill.as_str()),
                m.attributes.line_color.as_deref(),
                m.radius() * SELECTED_GROWTH,
            ),
            (_, false) => (m.attributes.fill_color.as_deref(), m.attributes.line_color.as_deref(), m.radius()),
        };
        let highlighted = self.view.hovered == Some(id) || self.view.dragged == Some(id);
        let paint = move |c: &'a str| -> &'a str { if highlighted { &style.highlight_color } else { c } };
        let radius = radius * self.zoom_scale;

        self.ops.push(PaintOp::Marker {
            center: p,
            radius,
            shape: m.attributes.shape,
            fill: fill.map(paint),
            stroke: stroke.map(paint),
            line_width: DEFAULT_LINE_WIDTH * self.zoom_scale,
        });

        if let Some(text) = m.text_label.as_deref() {
            let dir = self.label_dirs.get(id).copied().unwrap_or(Point::new(1.0, 0.0));
            // `radius` is already zoom-scaled; only the gap is scaled here.
            let offset = radius + LABEL_GAP_PX * self.zoom_scale;
            let (align, baseline) = label_alignment(dir);
            self.ops.push(PaintOp::Label {
                text,
                at: Point::new(p.x + offset * dir.x, p.y + offset * dir.y),
                font_px: LABEL_FONT_PX * self.zoom_scale.sqrt(),
                align,
                baseline,
                color: &style.label_color,
            });
        }
    }
}

/// Text anchor chosen from the quadrant of the label offset direction.
#[must_use]
pub fn label_alignment(dir: Point) -> (TextAlign, TextBaseline) {
    let align = if dir.x > 0.5 {
        TextAlign::Left
    } else if dir.x < -0.5 {
        TextAlign::Right
    } else {
        TextAlign::Center
    };
    let baseline = if dir.y > 0.5 {
        TextBaseline::Top
    } else if dir.y < -0.5 {
        TextBaseline::Bottom
    } else {
        TextBaseline::Middle
    };
    (align, baseline)
}

// =============================================================
// Canvas2D executor
// =============================================================

/// Replay a plan on the canvas. `dpr` is the device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(ctx: &CanvasRenderingContext2d, plan: &ScenePlan<'_>, dpr: f64) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, plan.width, plan.height);
    ctx.save();
    let [a, b, c, d, e, f] = plan.transform;
    ctx.transform(a, b, c, d, e, f)?;

    for op in &plan.ops {
        draw_op(ctx, op)?;
    }

    ctx.restore();
    Ok(())
}

fn draw_op(ctx: &CanvasRenderingContext2d, op: &PaintOp<'_>) -> Result<(), JsValue> {
    match op {
        PaintOp::FillRect { rect, color } => {
            ctx.set_fill_style_str(color);
            ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
        }
        PaintOp::Stroke { points, closed, color, width, dash } => {
            let Some((first, rest)) = points.split_first() else {
                return Ok(());
            };
            set_dash(ctx, dash)?;
            ctx.set_line_width(*width);
            ctx.set_stroke_style_str(color);
            ctx.begin_path();
            ctx.move_to(first.x, first.y);
            for p in rest {
                ctx.line_to(p.x, p.y);
            }
            if *closed {
                ctx.close_path();
            }
            ctx.stroke();
            set_dash(ctx, &[])?;
        }
        PaintOp::Marker { center, radius, shape, fill, stroke, line_width } => {
            ctx.begin_path();
            match shape {
                MarkerShape::Circle => ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI)?,
                MarkerShape::Square => ctx.rect(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0),
            }
            if let Some(fill) = fill {
                ctx.set_fill_style_str(fill);
                ctx.fill();
            }
            if let Some(stroke) = stroke {
                ctx.set_line_width(*line_width);
                ctx.set_stroke_style_str(stroke);
                ctx.stroke();
            }
        }
        PaintOp::Label { text, at, font_px, align, baseline, color } => {
            ctx.set_fill_style_str(color);
            ctx.set_font(&format!("bold {font_px}px Arial"));
            ctx.set_text_align(align.as_str());
            ctx.set_text_baseline(baseline.as_str());
            ctx.fill_text(text, at.x, at.y)?;
        }
    }
    Ok(())
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: &[f64]) -> Result<(), JsValue> {
    let dash_array = js_sys::Array::new();
    for d in dash {
        dash_array.push(&(*d).into());
    }
    ctx.set_line_dash(&dash_array)
}
