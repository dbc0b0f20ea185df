#![allow(clippy::float_cmp)]

use super::*;

const THRESHOLD: f64 = 1.0;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn pan_context() -> AnchorContext {
    AnchorContext::Pan { transform: AffineTransform::identity(), pixel: pt(0.0, 0.0) }
}

fn down(state: DragState, x: f64, y: f64, alt: bool) -> DragState {
    state.on_event(DragEvent::MouseDown { point: pt(x, y), alt, context: pan_context() }, THRESHOLD)
}

fn mv(state: DragState, x: f64, y: f64) -> DragState {
    state.on_event(DragEvent::MouseMove { point: pt(x, y) }, THRESHOLD)
}

fn up(state: DragState, x: f64, y: f64) -> DragState {
    state.on_event(DragEvent::MouseUp { point: pt(x, y) }, THRESHOLD)
}

// =============================================================
// Modifiers / WheelDelta
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
}

#[test]
fn anchor_context_grabbed_object() {
    assert!(!pan_context().grabbed_object());
    assert!(AnchorContext::ObjectDrag { object_id: "a".into() }.grabbed_object());
}

// =============================================================
// DragState
// =============================================================

#[test]
fn default_is_idle() {
    let s = DragState::default();
    assert_eq!(s, DragState::Idle);
    assert!(!s.is_active());
    assert!(s.anchor().is_none());
    assert!(s.rect().is_none());
    assert!(s.context().is_none());
}

#[test]
fn mouse_down_anchors() {
    let s = down(DragState::Idle, 3.0, 4.0, true);
    assert!(!s.is_active());
    assert_eq!(s.anchor(), Some(pt(3.0, 4.0)));
    assert_eq!(s.position(), Some(pt(3.0, 4.0)));
    assert!(s.rect().is_none());
    assert!(s.alt_key());
    assert_eq!(s.context(), Some(&pan_context()));
}

#[test]
fn small_move_stays_anchored() {
    let s = mv(down(DragState::Idle, 0.0, 0.0, false), 0.5, 0.5);
    assert!(!s.is_active());
    assert!(s.rect().is_none());
}

#[test]
fn threshold_then_active_with_rect() {
    let s = mv(down(DragState::Idle, 0.0, 0.0, false), 0.5, 0.5);
    let s = mv(s, 2.0, 0.0);
    assert!(s.is_active());
    assert_eq!(s.rect(), Some(Rect { x: 0.0, y: 0.0, w: 2.0, h: 0.0 }));
    assert_eq!(s.position(), Some(pt(2.0, 0.0)));
}

#[test]
fn exactly_threshold_activates() {
    let s = mv(down(DragState::Idle, 0.0, 0.0, false), 0.0, 1.0);
    assert!(s.is_active());
}

#[test]
fn rect_is_normalized_for_backwards_drag() {
    let s = mv(down(DragState::Idle, 10.0, 10.0, false), 4.0, 7.0);
    assert_eq!(s.rect(), Some(Rect { x: 4.0, y: 7.0, w: 6.0, h: 3.0 }));
}

#[test]
fn active_drag_tracks_every_move() {
    let s = mv(down(DragState::Idle, 0.0, 0.0, false), 5.0, 5.0);
    // Moving back inside the threshold keeps the drag active.
    let s = mv(s, 0.2, 0.1);
    assert!(s.is_active());
    assert_eq!(s.position(), Some(pt(0.2, 0.1)));
    let r = s.rect().unwrap();
    assert!(r.w >= 0.0 && r.h >= 0.0);
}

#[test]
fn move_while_idle_is_ignored() {
    let s = mv(DragState::Idle, 50.0, 50.0);
    assert_eq!(s, DragState::Idle);
}

#[test]
fn mouse_up_from_dragging_returns_idle() {
    let s = mv(down(DragState::Idle, 0.0, 0.0, true), 5.0, 0.0);
    let s = up(s, 5.0, 0.0);
    assert_eq!(s, DragState::Idle);
    assert!(!s.alt_key());
}

#[test]
fn mouse_up_from_anchored_returns_idle() {
    let s = up(down(DragState::Idle, 0.0, 0.0, false), 0.0, 0.0);
    assert_eq!(s, DragState::Idle);
}

#[test]
fn mouse_up_without_down_is_idle() {
    assert_eq!(up(DragState::Idle, 1.0, 1.0), DragState::Idle);
}

#[test]
fn mouse_leave_is_pass_through() {
    let s = mv(down(DragState::Idle, 0.0, 0.0, false), 5.0, 0.0);
    let before = s.clone();
    let s = s.on_event(DragEvent::MouseLeave, THRESHOLD);
    assert_eq!(s, before);
}

#[test]
fn new_press_re_anchors() {
    let s = mv(down(DragState::Idle, 0.0, 0.0, false), 5.0, 0.0);
    let s = down(s, 9.0, 9.0, false);
    assert!(!s.is_active());
    assert_eq!(s.anchor(), Some(pt(9.0, 9.0)));
}

#[test]
fn custom_threshold() {
    let s = DragState::Idle.on_event(
        DragEvent::MouseDown { point: pt(0.0, 0.0), alt: false, context: pan_context() },
        4.0,
    );
    let s = s.on_event(DragEvent::MouseMove { point: pt(3.0, 3.0) }, 4.0);
    assert!(!s.is_active());
    let s = s.on_event(DragEvent::MouseMove { point: pt(4.0, 0.0) }, 4.0);
    assert!(s.is_active());
}
