#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::surface::MemorySurface;

fn setup(mode: BrushMode) -> (MemorySurface, ElementId, BrushController) {
    let mut s = MemorySurface::new();
    let root = s.create_root("svg");
    let config = BrushConfig::new(Rect::new(0.0, 0.0, 100.0, 50.0)).with_mode(mode);
    let brush = BrushController::attach(&mut s, root, config).expect("root is in the scene");
    (s, root, brush)
}

fn at(pointer: PointerId, target: ElementId, x: f64, y: f64) -> PointerEvent {
    PointerEvent::new(pointer, target, Point::new(x, y))
}

fn gesture(s: &mut MemorySurface, brush: &mut BrushController, from: (f64, f64), to: (f64, f64)) {
    let overlay = brush.overlay();
    brush.on_pointer_down(s, &at(1, overlay, from.0, from.1));
    brush.on_pointer_move(s, &at(1, overlay, to.0, to.1));
    brush.on_pointer_up(s, &at(1, overlay, to.0, to.1));
}

fn record(brush: &BrushController) -> Rc<RefCell<Vec<BrushEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let _sub = brush.events().subscribe(move |e: &BrushEvent| sink.borrow_mut().push(e.clone()));
    log
}

// =============================================================================
// ATTACH / DESTROY
// =============================================================================

#[test]
fn attach_creates_overlay_and_hidden_selection() {
    let (s, root, brush) = setup(BrushMode::Xy);
    assert_eq!(s.children(root), &[brush.overlay(), brush.feedback()]);
    assert!(s.has_class(brush.overlay(), CLASS_BRUSH_OVERLAY));
    assert_eq!(s.attribute(brush.overlay(), "width").as_deref(), Some("100"));
    assert_eq!(s.attribute(brush.overlay(), "height").as_deref(), Some("50"));
    assert!(s.has_class(brush.feedback(), CLASS_BRUSH_SELECTION));
    assert_eq!(s.attribute(brush.feedback(), "display").as_deref(), Some("none"));
    assert_eq!(brush.selection(), None);
}

#[test]
fn attach_to_unknown_parent_fails() {
    let mut s = MemorySurface::new();
    let brush = BrushController::attach(&mut s, ElementId::new_v4(), BrushConfig::new(Rect::default()));
    assert!(brush.is_none());
    assert!(s.is_empty());
}

#[test]
fn destroy_removes_synthesized_nodes() {
    let (mut s, root, mut brush) = setup(BrushMode::Xy);
    brush.on_pointer_down(&mut s, &at(1, brush.overlay(), 1.0, 1.0));
    brush.destroy(&mut s);
    assert!(s.children(root).is_empty());
    assert_eq!(s.len(), 1);
    assert_eq!(s.capture_count(), 0);
    assert_eq!(brush.on_pointer_down(&mut s, &at(2, root, 0.0, 0.0)), Response::Ignored);
}

// =============================================================================
// GESTURES
// =============================================================================

#[test]
fn tiny_gesture_clears_instead_of_emitting_box() {
    let (mut s, _, mut brush) = setup(BrushMode::Xy);
    let log = record(&brush);
    gesture(&mut s, &mut brush, (10.0, 10.0), (12.0, 11.0));
    assert_eq!(brush.selection(), None);
    assert_eq!(log.borrow().last(), Some(&BrushEvent::Ended { selection: None }));
    assert_eq!(s.attribute(brush.feedback(), "display").as_deref(), Some("none"));
}

#[test]
fn gesture_selects_normalized_box() {
    let (mut s, _, mut brush) = setup(BrushMode::Xy);
    let log = record(&brush);
    gesture(&mut s, &mut brush, (40.0, 30.0), (10.0, 5.0));
    let expected = BrushSelection::Xy(Rect::new(10.0, 5.0, 40.0, 30.0));
    assert_eq!(brush.selection(), Some(expected));
    assert_eq!(log.borrow().last(), Some(&BrushEvent::Ended { selection: Some(expected) }));

    let fb = brush.feedback();
    assert_eq!(s.attribute(fb, "x").as_deref(), Some("10"));
    assert_eq!(s.attribute(fb, "y").as_deref(), Some("5"));
    assert_eq!(s.attribute(fb, "width").as_deref(), Some("30"));
    assert_eq!(s.attribute(fb, "height").as_deref(), Some("25"));
    assert!(s.attribute(fb, "display").is_none());
}

#[test]
fn long_thin_box_survives_in_2d_mode() {
    let (mut s, _, mut brush) = setup(BrushMode::Xy);
    gesture(&mut s, &mut brush, (10.0, 10.0), (60.0, 11.0));
    assert_eq!(brush.selection(), Some(BrushSelection::Xy(Rect::new(10.0, 10.0, 60.0, 11.0))));
}

#[test]
fn points_are_clamped_to_extent() {
    let (mut s, _, mut brush) = setup(BrushMode::Xy);
    gesture(&mut s, &mut brush, (-20.0, 20.0), (500.0, 80.0));
    assert_eq!(brush.selection(), Some(BrushSelection::Xy(Rect::new(0.0, 20.0, 100.0, 50.0))));
}

#[test]
fn x_mode_reduces_to_pair_and_spans_full_height() {
    let (mut s, _, mut brush) = setup(BrushMode::X);
    gesture(&mut s, &mut brush, (70.0, 10.0), (20.0, 12.0));
    assert_eq!(brush.selection(), Some(BrushSelection::X(20.0, 70.0)));
    assert_eq!(s.attribute(brush.feedback(), "height").as_deref(), Some("50"));
}

#[test]
fn y_mode_uses_only_vertical_size() {
    let (mut s, _, mut brush) = setup(BrushMode::Y);
    gesture(&mut s, &mut brush, (0.0, 10.0), (90.0, 12.0));
    assert_eq!(brush.selection(), None);
}

#[test]
fn moves_update_selection_synchronously() {
    let (mut s, _, mut brush) = setup(BrushMode::Xy);
    let overlay = brush.overlay();
    brush.on_pointer_down(&mut s, &at(1, overlay, 0.0, 0.0));
    assert!(brush.is_active());
    brush.on_pointer_move(&mut s, &at(1, overlay, 20.0, 20.0));
    assert_eq!(brush.selection(), Some(BrushSelection::Xy(Rect::new(0.0, 0.0, 20.0, 20.0))));
    assert_eq!(s.attribute(brush.feedback(), "width").as_deref(), Some("20"));
}

#[test]
fn click_without_move_clears_previous_selection() {
    let (mut s, _, mut brush) = setup(BrushMode::Xy);
    gesture(&mut s, &mut brush, (0.0, 0.0), (30.0, 30.0));
    let log = record(&brush);
    let overlay = brush.overlay();
    brush.on_pointer_down(&mut s, &at(1, overlay, 5.0, 5.0));
    brush.on_pointer_up(&mut s, &at(1, overlay, 5.0, 5.0));
    assert_eq!(brush.selection(), None);
    assert_eq!(
        *log.borrow(),
        vec![
            BrushEvent::Started { pointer_id: 1 },
            BrushEvent::Brushed { selection: None },
            BrushEvent::Ended { selection: None },
        ]
    );
}

#[test]
fn second_pointer_while_active_is_ignored() {
    let (mut s, _, mut brush) = setup(BrushMode::Xy);
    let overlay = brush.overlay();
    brush.on_pointer_down(&mut s, &at(1, overlay, 0.0, 0.0));
    assert_eq!(brush.on_pointer_down(&mut s, &at(2, overlay, 9.0, 9.0)), Response::Ignored);
}

#[test]
fn down_on_unmarked_element_is_ignored() {
    let (mut s, root, mut brush) = setup(BrushMode::Xy);
    let node = s.create_element(root, "circle").unwrap_or(root);
    assert_eq!(brush.on_pointer_down(&mut s, &at(1, node, 0.0, 0.0)), Response::Ignored);
    s.add_class(node, CLASS_BACKGROUND);
    assert!(brush.on_pointer_down(&mut s, &at(1, node, 0.0, 0.0)).is_consumed());
}

#[test]
fn cancel_behaves_like_up() {
    let (mut s, _, mut brush) = setup(BrushMode::Xy);
    let overlay = brush.overlay();
    brush.on_pointer_down(&mut s, &at(1, overlay, 0.0, 0.0));
    brush.on_pointer_move(&mut s, &at(1, overlay, 30.0, 30.0));
    assert!(brush.on_pointer_cancel(&mut s, &at(1, overlay, 30.0, 30.0)).is_consumed());
    assert!(!brush.is_active());
    assert_eq!(s.capture_count(), 0);
}

#[test]
fn lost_capture_applies_minimum_size() {
    let (mut s, _, mut brush) = setup(BrushMode::Xy);
    let overlay = brush.overlay();
    let log = record(&brush);
    brush.on_pointer_down(&mut s, &at(1, overlay, 10.0, 10.0));
    brush.on_pointer_move(&mut s, &at(1, overlay, 12.0, 11.0));
    s.release_pointer_capture(overlay, 1);

    assert_eq!(brush.on_pointer_move(&mut s, &at(1, overlay, 13.0, 12.0)), Response::Ignored);
    assert!(!brush.is_active());
    assert_eq!(brush.selection(), None);
    assert_eq!(s.attribute(brush.feedback(), "display").as_deref(), Some("none"));
    assert_eq!(log.borrow().last(), Some(&BrushEvent::Ended { selection: None }));
}

#[test]
fn lost_capture_keeps_large_selection() {
    let (mut s, _, mut brush) = setup(BrushMode::Xy);
    let overlay = brush.overlay();
    brush.on_pointer_down(&mut s, &at(1, overlay, 10.0, 10.0));
    brush.on_pointer_move(&mut s, &at(1, overlay, 40.0, 30.0));
    s.release_pointer_capture(overlay, 1);
    brush.on_pointer_move(&mut s, &at(1, overlay, 45.0, 35.0));

    assert!(!brush.is_active());
    assert_eq!(brush.selection(), Some(BrushSelection::Xy(Rect::new(10.0, 10.0, 40.0, 30.0))));
}

// =============================================================================
// PROGRAMMATIC
// =============================================================================

#[test]
fn move_to_sets_clamped_selection_and_emits() {
    let (mut s, _, mut brush) = setup(BrushMode::Xy);
    let log = record(&brush);
    brush.move_to(&mut s, Some(BrushSelection::Xy(Rect::new(90.0, 40.0, 200.0, -5.0))));
    let expected = BrushSelection::Xy(Rect::new(90.0, 0.0, 100.0, 40.0));
    assert_eq!(brush.selection(), Some(expected));
    assert_eq!(*log.borrow(), vec![BrushEvent::Brushed { selection: Some(expected) }]);
    assert_eq!(s.attribute(brush.feedback(), "x").as_deref(), Some("90"));
}

#[test]
fn clear_hides_feedback() {
    let (mut s, _, mut brush) = setup(BrushMode::X);
    brush.move_to(&mut s, Some(BrushSelection::X(60.0, 10.0)));
    assert_eq!(brush.selection(), Some(BrushSelection::X(10.0, 60.0)));
    brush.clear(&mut s);
    assert_eq!(brush.selection(), None);
    assert_eq!(s.attribute(brush.feedback(), "display").as_deref(), Some("none"));
}

#[test]
fn selection_serializes_by_mode() {
    let json = serde_json::to_value(BrushSelection::X(1.0, 2.0)).unwrap_or_default();
    assert_eq!(json, serde_json::json!({ "x": [1.0, 2.0] }));
}
