use std::cell::RefCell;
use std::rc::Rc;

use super::*;

fn recorder() -> (Rc<RefCell<Vec<u32>>>, impl FnMut(&u32) + 'static) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    (log, move |v: &u32| sink.borrow_mut().push(*v))
}

#[test]
fn emit_reaches_all_listeners_in_order() {
    let emitter = Emitter::<u32>::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    let a = Rc::clone(&order);
    let b = Rc::clone(&order);
    let _sa = emitter.subscribe(move |v| a.borrow_mut().push(("a", *v)));
    let _sb = emitter.subscribe(move |v| b.borrow_mut().push(("b", *v)));
    emitter.emit(&1);
    assert_eq!(*order.borrow(), vec![("a", 1), ("b", 1)]);
}

#[test]
fn unsubscribe_detaches_listener() {
    let emitter = Emitter::<u32>::new();
    let (log, listener) = recorder();
    let sub = emitter.subscribe(listener);
    emitter.emit(&1);
    sub.unsubscribe();
    emitter.emit(&2);
    assert_eq!(*log.borrow(), vec![1]);
    assert_eq!(emitter.listener_count(), 0);
}

#[test]
fn unsubscribe_after_emitter_dropped_is_harmless() {
    let emitter = Emitter::<u32>::new();
    let (_log, listener) = recorder();
    let sub = emitter.subscribe(listener);
    drop(emitter);
    sub.unsubscribe();
}

#[test]
fn clear_detaches_everything() {
    let emitter = Emitter::<u32>::new();
    let (log, listener) = recorder();
    let _sub = emitter.subscribe(listener);
    emitter.clear();
    emitter.emit(&5);
    assert!(log.borrow().is_empty());
}

#[test]
fn nested_emit_is_queued_after_current_delivery() {
    let emitter = Rc::new(Emitter::<u32>::new());
    let order = Rc::new(RefCell::new(Vec::new()));

    let inner = Rc::clone(&emitter);
    let first = Rc::clone(&order);
    let _s1 = emitter.subscribe(move |v| {
        first.borrow_mut().push(("first", *v));
        if *v == 1 {
            inner.emit(&2);
        }
    });
    let second = Rc::clone(&order);
    let _s2 = emitter.subscribe(move |v| second.borrow_mut().push(("second", *v)));

    emitter.emit(&1);
    assert_eq!(
        *order.borrow(),
        vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
    );
}

#[test]
fn subscribe_during_emit_takes_effect_next_time() {
    let emitter = Rc::new(Emitter::<u32>::new());
    let (log, listener) = recorder();
    let pending = Rc::new(RefCell::new(Some(listener)));

    let inner = Rc::clone(&emitter);
    let slot = Rc::clone(&pending);
    let _s = emitter.subscribe(move |_| {
        if let Some(l) = slot.borrow_mut().take() {
            let _late = inner.subscribe(l);
        }
    });

    emitter.emit(&1);
    assert!(log.borrow().is_empty());
    emitter.emit(&2);
    assert_eq!(*log.borrow(), vec![2]);
    assert_eq!(emitter.listener_count(), 2);
}

#[test]
fn unsubscribe_during_emit_is_honoured() {
    let emitter = Emitter::<u32>::new();
    let (log, listener) = recorder();
    let victim = Rc::new(RefCell::new(None::<Subscription>));

    let slot = Rc::clone(&victim);
    let _killer = emitter.subscribe(move |_| {
        if let Some(sub) = slot.borrow_mut().take() {
            sub.unsubscribe();
        }
    });
    *victim.borrow_mut() = Some(emitter.subscribe(listener));

    emitter.emit(&1);
    emitter.emit(&2);
    // Listeners were moved out for the first delivery, so it still ran once.
    assert_eq!(*log.borrow(), vec![1]);
    assert_eq!(emitter.listener_count(), 1);
}
