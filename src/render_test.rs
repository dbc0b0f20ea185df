#![allow(clippy::float_cmp)]

use super::*;
use crate::scene::{Common, MarkerAttributes, StrokeAttributes};

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn common(id: &str) -> Common {
    Common { object_id: id.to_owned(), ..Default::default() }
}

fn marker(id: &str, x: f64, y: f64) -> Marker {
    Marker {
        common: common(id),
        x,
        y,
        text_label: None,
        attributes: MarkerAttributes {
            fill_color: Some("white".to_owned()),
            line_color: Some("red".to_owned()),
            ..Default::default()
        },
        selected_attributes: None,
    }
}

fn stroke(color: &str) -> StrokeAttributes {
    StrokeAttributes { color: color.to_owned(), dash: Vec::new(), width: Some(2.0) }
}

fn connector(id: &str, a: &str, b: &str) -> SceneObject {
    SceneObject::Connector(Connector {
        common: common(id),
        object_id1: a.to_owned(),
        object_id2: b.to_owned(),
        attributes: stroke("blue"),
    })
}

fn view<'a>(
    objects: &'a [SceneObject],
    groups: &'a ControlGroups,
    transform: &'a AffineTransform,
    style: &'a Style,
) -> SceneView<'a> {
    SceneView {
        objects,
        groups,
        transform,
        width: 400.0,
        height: 300.0,
        style,
        hovered: None,
        dragged: None,
        moving: Vec::new(),
        drag_delta: Point::default(),
        select_rect: None,
    }
}

fn markers<'p>(plan: &'p ScenePlan<'_>) -> Vec<&'p PaintOp<'p>> {
    plan.ops.iter().filter(|op| matches!(op, PaintOp::Marker { .. })).collect()
}

fn strokes<'p>(plan: &'p ScenePlan<'_>) -> Vec<&'p PaintOp<'p>> {
    plan.ops.iter().filter(|op| matches!(op, PaintOp::Stroke { .. })).collect()
}

// =============================================================
// Frame setup
// =============================================================

#[test]
fn plan_carries_canvas_transform_args() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::new([[2.0, 0.0, 10.0], [0.0, 2.0, 20.0]]).unwrap();
    let p = plan(&view(&[], &groups, &t, &style)).unwrap();
    assert_eq!(p.transform, [2.0, 0.0, 0.0, 2.0, 10.0, 20.0]);
    assert_eq!(p.width, 400.0);
    assert!(p.ops.is_empty());
}

#[test]
fn non_finite_transform_skips_frame() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::scale_about(f64::INFINITY, pt(0.0, 0.0));
    assert!(plan(&view(&[], &groups, &t, &style)).is_none());
}

#[test]
fn select_rect_is_painted_first() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::identity();
    let objects = vec![SceneObject::Marker(marker("m", 5.0, 5.0))];
    let mut v = view(&objects, &groups, &t, &style);
    let rect = Rect { x: 1.0, y: 2.0, w: 30.0, h: 40.0 };
    v.select_rect = Some(rect);
    let p = plan(&v).unwrap();
    assert_eq!(p.ops[0], PaintOp::FillRect { rect, color: "rgba(196, 196, 196, 0.5)" });
    assert_eq!(p.ops.len(), 2);
}

#[test]
fn ops_follow_object_order() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::identity();
    let objects = vec![
        SceneObject::Marker(marker("a", 0.0, 0.0)),
        SceneObject::Marker(marker("b", 10.0, 0.0)),
        connector("c", "a", "b"),
    ];
    let p = plan(&view(&objects, &groups, &t, &style)).unwrap();
    assert!(matches!(p.ops[0], PaintOp::Marker { center, .. } if center == pt(0.0, 0.0)));
    assert!(matches!(p.ops[1], PaintOp::Marker { center, .. } if center == pt(10.0, 0.0)));
    assert!(matches!(p.ops[2], PaintOp::Stroke { .. }));
}

// =============================================================
// Zoom compensation
// =============================================================

#[test]
fn stroke_width_shrinks_with_zoom() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::scale_about(2.0, pt(0.0, 0.0));
    let objects = vec![SceneObject::Line(Line {
        common: common("l"),
        x: 0.0,
        y: 0.0,
        dx: 10.0,
        dy: 0.0,
        attributes: stroke("green"),
        selected_attributes: None,
    })];
    let p = plan(&view(&objects, &groups, &t, &style)).unwrap();
    let PaintOp::Stroke { width, points, .. } = &p.ops[0] else { panic!("expected stroke") };
    assert!(approx_eq(*width, 1.0));
    assert_eq!(points, &vec![pt(0.0, 0.0), pt(10.0, 0.0)]);
}

#[test]
fn marker_radius_and_line_width_shrink_with_zoom() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::scale_about(3.0, pt(0.0, 0.0));
    let objects = vec![SceneObject::Marker(marker("m", 0.0, 0.0))];
    let p = plan(&view(&objects, &groups, &t, &style)).unwrap();
    let PaintOp::Marker { radius, line_width, .. } = p.ops[0] else { panic!("expected marker") };
    assert!(approx_eq(radius, DEFAULT_MARKER_RADIUS / 3.0));
    assert!(approx_eq(line_width, DEFAULT_LINE_WIDTH / 3.0));
}

// =============================================================
// Connectors and drag preview
// =============================================================

#[test]
fn connector_follows_drag_preview() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::identity();
    let objects = vec![
        SceneObject::Marker(marker("n:0:head", 50.0, 50.0)),
        SceneObject::Marker(marker("n:0:thorax", 50.0, 100.0)),
        connector("e:0:head:thorax", "n:0:head", "n:0:thorax"),
    ];
    let mut v = view(&objects, &groups, &t, &style);
    v.moving = vec!["n:0:head".to_owned()];
    v.drag_delta = pt(30.0, 10.0);
    v.dragged = Some("n:0:head");
    let p = plan(&v).unwrap();

    let lines = strokes(&p);
    let PaintOp::Stroke { points, .. } = lines[0] else { panic!("expected stroke") };
    assert!(point_approx_eq(points[0], pt(80.0, 60.0)));
    assert!(point_approx_eq(points[1], pt(50.0, 100.0)));

    let ms = markers(&p);
    assert!(matches!(ms[0], PaintOp::Marker { center, .. } if point_approx_eq(*center, pt(80.0, 60.0))));
    assert!(matches!(ms[1], PaintOp::Marker { center, .. } if point_approx_eq(*center, pt(50.0, 100.0))));
}

#[test]
fn connector_with_missing_marker_is_skipped() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::identity();
    let objects = vec![SceneObject::Marker(marker("a", 0.0, 0.0)), connector("c", "a", "ghost")];
    let p = plan(&view(&objects, &groups, &t, &style)).unwrap();
    assert!(strokes(&p).is_empty());
    assert_eq!(p.ops.len(), 1);
}

#[test]
fn connector_to_non_marker_is_skipped() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::identity();
    let objects = vec![
        SceneObject::Marker(marker("a", 0.0, 0.0)),
        SceneObject::Rectangle(Rectangle {
            common: common("r"),
            x: 0.0,
            y: 0.0,
            w: 5.0,
            h: 5.0,
            attributes: stroke("gray"),
        }),
        connector("c", "a", "r"),
    ];
    let p = plan(&view(&objects, &groups, &t, &style)).unwrap();
    // Only the rectangle outline is stroked.
    assert_eq!(strokes(&p).len(), 1);
}

#[test]
fn rectangle_is_closed_outline() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::identity();
    let objects = vec![SceneObject::Rectangle(Rectangle {
        common: common("r"),
        x: 1.0,
        y: 2.0,
        w: 10.0,
        h: 20.0,
        attributes: stroke("gray"),
    })];
    let p = plan(&view(&objects, &groups, &t, &style)).unwrap();
    let PaintOp::Stroke { points, closed, .. } = &p.ops[0] else { panic!("expected stroke") };
    assert!(*closed);
    assert_eq!(points.len(), 4);
    assert_eq!(points[2], pt(11.0, 22.0));
}

// =============================================================
// Highlight and selection styling
// =============================================================

#[test]
fn hovered_marker_uses_highlight_color() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::identity();
    let objects = vec![SceneObject::Marker(marker("a", 0.0, 0.0)), SceneObject::Marker(marker("b", 9.0, 0.0))];
    let mut v = view(&objects, &groups, &t, &style);
    v.hovered = Some("a");
    let p = plan(&v).unwrap();
    let ms = markers(&p);
    assert!(matches!(ms[0], PaintOp::Marker { fill: Some("yellow"), stroke: Some("yellow"), .. }));
    assert!(matches!(ms[1], PaintOp::Marker { fill: Some("white"), stroke: Some("red"), .. }));
}

#[test]
fn highlight_keeps_unset_fill_unset() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::identity();
    let mut m = marker("a", 0.0, 0.0);
    m.attributes.fill_color = None;
    let objects = vec![SceneObject::Marker(m)];
    let mut v = view(&objects, &groups, &t, &style);
    v.dragged = Some("a");
    let p = plan(&v).unwrap();
    assert!(matches!(p.ops[0], PaintOp::Marker { fill: None, stroke: Some("yellow"), .. }));
}

#[test]
fn selected_marker_without_attributes_uses_defaults() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::identity();
    let mut m = marker("a", 0.0, 0.0);
    m.common.selected = true;
    let objects = vec![SceneObject::Marker(m)];
    let p = plan(&view(&objects, &groups, &t, &style)).unwrap();
    let PaintOp::Marker { fill, radius, .. } = p.ops[0] else { panic!("expected marker") };
    assert_eq!(fill, Some("orange"));
    assert!(approx_eq(radius, DEFAULT_MARKER_RADIUS * SELECTED_GROWTH));
}

#[test]
fn selected_marker_uses_selected_attributes() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::identity();
    let mut m = marker("a", 0.0, 0.0);
    m.common.selected = true;
    m.selected_attributes = Some(MarkerAttributes {
        fill_color: Some("purple".to_owned()),
        radius: Some(9.0),
        ..Default::default()
    });
    let objects = vec![SceneObject::Marker(m)];
    let p = plan(&view(&objects, &groups, &t, &style)).unwrap();
    let PaintOp::Marker { fill, stroke, radius, .. } = p.ops[0] else { panic!("expected marker") };
    assert_eq!(fill, Some("purple"));
    assert_eq!(stroke, None);
    assert!(approx_eq(radius, 9.0));
}

#[test]
fn selected_line_without_attributes_grows_and_turns_yellow() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::identity();
    let objects = vec![SceneObject::Line(Line {
        common: Common { selected: true, ..common("l") },
        x: 0.0,
        y: 0.0,
        dx: 1.0,
        dy: 1.0,
        attributes: stroke("green"),
        selected_attributes: None,
    })];
    let p = plan(&view(&objects, &groups, &t, &style)).unwrap();
    let PaintOp::Stroke { color, width, .. } = &p.ops[0] else { panic!("expected stroke") };
    assert_eq!(*color, "yellow");
    assert!(approx_eq(*width, 2.0 * SELECTED_GROWTH));
}

#[test]
fn empty_color_falls_back_to_default() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::identity();
    let objects = vec![SceneObject::Rectangle(Rectangle {
        common: common("r"),
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
        attributes: StrokeAttributes::default(),
    })];
    let p = plan(&view(&objects, &groups, &t, &style)).unwrap();
    let PaintOp::Stroke { color, width, .. } = &p.ops[0] else { panic!("expected stroke") };
    assert_eq!(*color, "black");
    assert!(approx_eq(*width, DEFAULT_LINE_WIDTH));
}

// =============================================================
// Labels
// =============================================================

#[test]
fn label_defaults_to_right_of_marker() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::identity();
    let mut m = marker("a", 10.0, 10.0);
    m.text_label = Some("head".to_owned());
    let objects = vec![SceneObject::Marker(m)];
    let p = plan(&view(&objects, &groups, &t, &style)).unwrap();
    let PaintOp::Label { text, at, align, baseline, font_px, color } = &p.ops[1] else {
        panic!("expected label")
    };
    assert_eq!(*text, "head");
    assert!(point_approx_eq(*at, pt(10.0 + DEFAULT_MARKER_RADIUS + LABEL_GAP_PX, 10.0)));
    assert_eq!(*align, TextAlign::Left);
    assert_eq!(*baseline, TextBaseline::Middle);
    assert!(approx_eq(*font_px, LABEL_FONT_PX));
    assert_eq!(*color, "#55ccaa");
}

#[test]
fn label_points_away_from_group_centroid() {
    let style = Style::default();
    let groups = ControlGroups::new(vec![vec!["a".to_owned(), "b".to_owned()]]);
    let t = AffineTransform::identity();
    let mut a = marker("a", 0.0, 0.0);
    a.text_label = Some("a".to_owned());
    let objects = vec![SceneObject::Marker(a), SceneObject::Marker(marker("b", 0.0, 20.0))];
    let p = plan(&view(&objects, &groups, &t, &style)).unwrap();
    let label = p.ops.iter().find(|op| matches!(op, PaintOp::Label { .. })).unwrap();
    let PaintOp::Label { at, align, baseline, .. } = label else { panic!("expected label") };
    assert!(point_approx_eq(*at, pt(0.0, -(DEFAULT_MARKER_RADIUS + LABEL_GAP_PX))));
    assert_eq!(*align, TextAlign::Center);
    assert_eq!(*baseline, TextBaseline::Bottom);
}

#[test]
fn label_font_scales_with_sqrt_of_zoom() {
    let style = Style::default();
    let groups = ControlGroups::default();
    let t = AffineTransform::scale_about(4.0, pt(0.0, 0.0));
    let mut m = marker("a", 0.0, 0.0);
    m.text_label = Some("x".to_owned());
    let objects = vec![SceneObject::Marker(m)];
    let p = plan(&view(&objects, &groups, &t, &style)).unwrap();
    let PaintOp::Label { font_px, at, .. } = &p.ops[1] else { panic!("expected label") };
    assert!(approx_eq(*font_px, LABEL_FONT_PX * 0.5));
    assert!(approx_eq(at.x, (DEFAULT_MARKER_RADIUS + LABEL_GAP_PX) / 4.0));
}

#[test]
fn label_alignment_quadrants() {
    assert_eq!(label_alignment(pt(1.0, 0.0)), (TextAlign::Left, TextBaseline::Middle));
    assert_eq!(label_alignment(pt(-1.0, 0.0)), (TextAlign::Right, TextBaseline::Middle));
    assert_eq!(label_alignment(pt(0.0, 1.0)), (TextAlign::Center, TextBaseline::Top));
    assert_eq!(label_alignment(pt(0.0, -1.0)), (TextAlign::Center, TextBaseline::Bottom));
    assert_eq!(label_alignment(pt(0.3, 0.3)), (TextAlign::Center, TextBaseline::Middle));
}

#[test]
fn align_strings_match_canvas_keywords() {
    assert_eq!(TextAlign::Left.as_str(), "left");
    assert_eq!(TextBaseline::Middle.as_str(), "middle");
}
