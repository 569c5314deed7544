use super::*;
use crate::surface::MemorySurface;

fn setup() -> (MemorySurface, ElementId, ElementId) {
    let mut s = MemorySurface::new();
    let root = s.create_root("svg");
    let a = s.create_element(root, "circle").unwrap_or(root);
    let b = s.create_element(root, "circle").unwrap_or(root);
    (s, a, b)
}

#[test]
fn begin_captures_pointer() {
    let (mut s, a, _) = setup();
    let mut table = SessionTable::new();
    assert!(table.begin(&mut s, 1, a, "drag"));
    assert!(s.has_pointer_capture(a, 1));
    assert!(table.is_active(1));
    assert!(table.has_element(a));
}

#[test]
fn begin_twice_for_same_pointer_is_rejected() {
    let (mut s, a, b) = setup();
    let mut table = SessionTable::new();
    assert!(table.begin(&mut s, 1, a, 1));
    assert!(!table.begin(&mut s, 1, b, 2));
    assert_eq!(table.get(1).map(|x| x.state), Some(1));
    assert!(s.has_pointer_capture(a, 1));
}

#[test]
fn distinct_pointers_have_independent_sessions() {
    let (mut s, a, b) = setup();
    let mut table = SessionTable::new();
    table.begin(&mut s, 1, a, "a");
    table.begin(&mut s, 2, b, "b");
    assert_eq!(table.len(), 2);
    let ended = table.finish(&mut s, 1);
    assert_eq!(ended.map(|x| x.element), Some(a));
    assert!(table.is_active(2));
    assert!(s.has_pointer_capture(b, 2));
    assert!(!s.has_pointer_capture(a, 1));
}

#[test]
fn poll_returns_active_session() {
    let (mut s, a, _) = setup();
    let mut table = SessionTable::new();
    table.begin(&mut s, 1, a, 0_u32);
    match table.poll(&s, 1) {
        Poll::Active(session) => session.state += 5,
        other => assert!(matches!(other, Poll::Active(_)), "unexpected {other:?}"),
    }
    assert_eq!(table.get(1).map(|x| x.state), Some(5));
}

#[test]
fn poll_unknown_pointer_is_missing() {
    let (mut s, a, _) = setup();
    let mut table = SessionTable::new();
    table.begin(&mut s, 1, a, ());
    assert_eq!(table.poll(&s, 9), Poll::Missing);
}

#[test]
fn poll_abandons_session_when_element_removed() {
    let (mut s, a, _) = setup();
    let mut table = SessionTable::new();
    table.begin(&mut s, 1, a, "x");
    s.remove_element(a);
    let polled = table.poll(&s, 1);
    assert!(matches!(polled, Poll::Abandoned(Session { element, .. }) if element == a));
    assert!(table.is_empty());
}

#[test]
fn poll_abandons_session_when_capture_lost() {
    let (mut s, a, b) = setup();
    let mut table = SessionTable::new();
    table.begin(&mut s, 1, a, "x");
    // Something else grabbed the pointer.
    s.set_pointer_capture(b, 1);
    assert!(matches!(table.poll(&s, 1), Poll::Abandoned(_)));
    assert!(!table.is_active(1));
}

#[test]
fn finish_unknown_pointer_is_none() {
    let (mut s, _, _) = setup();
    let mut table: SessionTable<()> = SessionTable::new();
    assert!(table.finish(&mut s, 4).is_none());
}

#[test]
fn finish_all_releases_every_capture() {
    let (mut s, a, b) = setup();
    let mut table = SessionTable::new();
    table.begin(&mut s, 2, b, ());
    table.begin(&mut s, 1, a, ());
    let ended = table.finish_all(&mut s);
    assert_eq!(ended.iter().map(|x| x.pointer_id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(s.capture_count(), 0);
    assert!(table.is_empty());
}

#[test]
fn pointers_for_lists_sessions_on_element() {
    let (mut s, a, b) = setup();
    let mut table = SessionTable::new();
    table.begin(&mut s, 7, a, ());
    table.begin(&mut s, 3, b, ());
    assert_eq!(table.pointers_for(a), vec![7]);
    assert!(table.pointers_for(ElementId::new_v4()).is_empty());
}
