use std::cell::Cell;
use std::rc::Rc;

use super::*;

fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
    let hits = Rc::new(Cell::new(0));
    let sink = Rc::clone(&hits);
    (hits, move || sink.set(sink.get() + 1))
}

#[test]
fn get_unknown_is_none() {
    let reg = SimulationRegistry::new();
    assert!(reg.get("missing").is_none());
    assert!(!reg.reheat("missing"));
}

#[test]
fn register_then_reheat_calls_callback() {
    let reg = SimulationRegistry::new();
    let (hits, reheat) = counter();
    reg.register("force", reheat);
    assert!(reg.reheat("force"));
    if let Some(handle) = reg.get("force") {
        handle.reheat();
    }
    assert_eq!(hits.get(), 2);
}

#[test]
fn last_registration_wins() {
    let reg = SimulationRegistry::new();
    let (first, a) = counter();
    let (second, b) = counter();
    reg.register("force", a);
    reg.register("force", b);
    reg.reheat("force");
    assert_eq!((first.get(), second.get()), (0, 1));
    assert_eq!(reg.len(), 1);
}

#[test]
fn unregister_is_idempotent() {
    let reg = SimulationRegistry::new();
    reg.register("force", || {});
    assert!(reg.unregister("force"));
    assert!(!reg.unregister("force"));
    assert!(reg.is_empty());
}

#[test]
fn clones_share_the_table() {
    let reg = SimulationRegistry::new();
    let other = reg.clone();
    other.register("b", || {});
    other.register("a", || {});
    assert!(reg.contains("a"));
    assert_eq!(reg.ids(), vec!["a".to_owned(), "b".to_owned()]);
}

#[test]
fn reheat_callback_may_touch_registry() {
    let reg = SimulationRegistry::new();
    let inner = reg.clone();
    reg.register("self-removing", move || {
        inner.unregister("self-removing");
    });
    assert!(reg.reheat("self-removing"));
    assert!(!reg.contains("self-removing"));
}
