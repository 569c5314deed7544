#![allow(clippy::float_cmp)]

use super::*;

// --- Point ---

#[test]
fn point_delta_from() {
    let d = Point::new(15.0, 5.0).delta_from(Point::new(10.0, 10.0));
    assert_eq!(d, Point::new(5.0, -5.0));
}

#[test]
fn point_scaled_down_divides_components() {
    let p = Point::new(40.0, 80.0).scaled_down(4.0);
    assert_eq!(p, Point::new(10.0, 20.0));
}

#[test]
fn point_scaled_down_ignores_non_positive_factor() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.scaled_down(0.0), p);
    assert_eq!(p.scaled_down(-2.0), p);
    assert_eq!(p.scaled_down(f64::NAN), p);
}

// --- Rect ---

#[test]
fn rect_from_corners_normalizes() {
    let r = Rect::from_corners(Point::new(30.0, 5.0), Point::new(10.0, 25.0));
    assert_eq!(r, Rect::new(10.0, 5.0, 30.0, 25.0));
    assert_eq!(r.width(), 20.0);
    assert_eq!(r.height(), 20.0);
}

#[test]
fn rect_contains_edges() {
    let r = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(r.contains(Point::new(0.0, 10.0)));
    assert!(!r.contains(Point::new(10.1, 5.0)));
}

#[test]
fn rect_clamp_pulls_point_inside() {
    let r = Rect::new(0.0, 0.0, 100.0, 50.0);
    assert_eq!(r.clamp(Point::new(-5.0, 70.0)), Point::new(0.0, 50.0));
    assert_eq!(r.clamp(Point::new(20.0, 20.0)), Point::new(20.0, 20.0));
}

#[test]
fn rect_clamp_inverted_does_not_panic() {
    let r = Rect::new(10.0, 10.0, 0.0, 0.0);
    let p = r.clamp(Point::new(5.0, 5.0));
    assert_eq!(p, Point::new(0.0, 0.0));
}
