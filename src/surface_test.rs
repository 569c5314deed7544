#![allow(clippy::float_cmp)]

use super::*;

fn tree() -> (MemorySurface, ElementId, ElementId, ElementId) {
    let mut s = MemorySurface::new();
    let root = s.create_root("svg");
    let group = s.create_element(root, "g").unwrap_or(root);
    let leaf = s.create_element(group, "circle").unwrap_or(root);
    (s, root, group, leaf)
}

// =============================================================
// Tree structure
// =============================================================

#[test]
fn create_element_links_parent_and_child() {
    let (s, root, group, leaf) = tree();
    assert_eq!(s.parent(group), Some(root));
    assert_eq!(s.parent(leaf), Some(group));
    assert_eq!(s.children(root), &[group]);
    assert_eq!(s.tag(leaf), Some("circle"));
}

#[test]
fn create_element_under_unknown_parent_returns_none() {
    let mut s = MemorySurface::new();
    assert!(s.create_element(Uuid::new_v4(), "g").is_none());
    assert!(s.is_empty());
}

#[test]
fn remove_element_drops_subtree_and_captures() {
    let (mut s, root, group, leaf) = tree();
    s.set_pointer_capture(leaf, 1);
    s.remove_element(group);
    assert!(!s.contains(group));
    assert!(!s.contains(leaf));
    assert!(s.children(root).is_empty());
    assert_eq!(s.capture_count(), 0);
    assert_eq!(s.len(), 1);
}

#[test]
fn raise_moves_element_to_end() {
    let mut s = MemorySurface::new();
    let root = s.create_root("svg");
    let a = s.create_element(root, "circle").unwrap_or(root);
    let b = s.create_element(root, "circle").unwrap_or(root);
    s.raise(a);
    assert_eq!(s.children(root), &[b, a]);
}

#[test]
fn is_within_walks_ancestors() {
    let (s, root, group, leaf) = tree();
    assert!(s.is_within(leaf, root));
    assert!(s.is_within(group, group));
    assert!(!s.is_within(root, leaf));
}

// =============================================================
// Attributes, classes, text
// =============================================================

#[test]
fn read_attribute_number_defaults_to_zero() {
    let (mut s, _, _, leaf) = tree();
    assert_eq!(s.read_attribute_number(leaf, "cx"), 0.0);
    s.set_attribute(leaf, "cx", "not a number");
    assert_eq!(s.read_attribute_number(leaf, "cx"), 0.0);
    s.set_attribute(leaf, "cx", " 42.5 ");
    assert_eq!(s.read_attribute_number(leaf, "cx"), 42.5);
    s.set_attribute(leaf, "cx", "NaN");
    assert_eq!(s.read_attribute_number(leaf, "cx"), 0.0);
}

#[test]
fn writes_to_unknown_element_are_dropped() {
    let mut s = MemorySurface::new();
    let ghost = Uuid::new_v4();
    s.set_attribute(ghost, "x", "1");
    s.add_class(ghost, "a");
    s.set_text(ghost, "t");
    assert!(s.attribute(ghost, "x").is_none());
    assert!(!s.has_class(ghost, "a"));
    assert!(s.text(ghost).is_none());
}

#[test]
fn classes_add_remove() {
    let (mut s, _, _, leaf) = tree();
    s.add_class(leaf, "b");
    s.add_class(leaf, "a");
    assert_eq!(s.classes(leaf), vec!["a".to_owned(), "b".to_owned()]);
    s.remove_class(leaf, "a");
    assert!(!s.has_class(leaf, "a"));
    assert_eq!(s.find_by_class("b"), vec![leaf]);
}

// =============================================================
// Pointer capture
// =============================================================

#[test]
fn pointer_capture_moves_between_elements() {
    let (mut s, _, group, leaf) = tree();
    s.set_pointer_capture(leaf, 3);
    s.set_pointer_capture(group, 3);
    assert!(!s.has_pointer_capture(leaf, 3));
    assert!(s.has_pointer_capture(group, 3));
    s.release_pointer_capture(group, 3);
    assert_eq!(s.capture_count(), 0);
}

// =============================================================
// Metrics
// =============================================================

#[test]
fn screen_scale_extent_bounds() {
    let (mut s, root, _, leaf) = tree();
    assert_eq!(s.screen_scale(root), 1.0);
    s.set_screen_scale(2.0);
    assert_eq!(s.screen_scale(root), 2.0);
    s.set_extent(root, Size::new(800.0, 600.0));
    assert_eq!(s.extent(root), Some(Size::new(800.0, 600.0)));
    s.set_bounds(leaf, Rect::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(s.bounds(leaf), Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
}

#[test]
fn frozen_attribute_cannot_animate() {
    let (mut s, _, _, leaf) = tree();
    assert!(s.can_animate(leaf, "fill"));
    s.freeze_attribute("fill");
    assert!(!s.can_animate(leaf, "fill"));
}

// =============================================================
// Coordinate helpers
// =============================================================

#[test]
fn root_of_walks_to_top() {
    let (s, root, group, leaf) = tree();
    assert_eq!(s.root_of(leaf), root);
    assert_eq!(s.root_of(group), root);
    assert_eq!(s.root_of(root), root);
}

#[test]
fn inherited_transform_uses_nearest_parseable_ancestor() {
    let (mut s, root, group, leaf) = tree();
    assert_eq!(s.inherited_transform(leaf), Transform::IDENTITY);

    s.set_attribute(root, "transform", "translate(1,1) scale(3)");
    assert_eq!(s.inherited_transform(leaf), Transform::new(3.0, 1.0, 1.0));

    s.set_attribute(group, "transform", "translate(10,20) scale(2)");
    assert_eq!(s.inherited_transform(leaf), Transform::new(2.0, 10.0, 20.0));

    // Unparseable values are skipped.
    s.set_attribute(group, "transform", "rotate(30)");
    assert_eq!(s.inherited_transform(leaf), Transform::new(3.0, 1.0, 1.0));
}

#[test]
fn inherited_transform_ignores_own_attribute() {
    let (mut s, _, _, leaf) = tree();
    s.set_attribute(leaf, "transform", "translate(5,5)");
    assert_eq!(s.inherited_transform(leaf), Transform::IDENTITY);
}

#[test]
fn local_point_undoes_screen_scale_and_ancestor_transform() {
    let (mut s, _, group, leaf) = tree();
    s.set_screen_scale(2.0);
    s.set_attribute(group, "transform", "translate(10,20) scale(2)");
    let p = s.local_point(leaf, Point::new(60.0, 80.0));
    // (60,80) / 2 = (30,40); invert: ((30-10)/2, (40-20)/2)
    assert_eq!(p, Point::new(10.0, 10.0));
}
