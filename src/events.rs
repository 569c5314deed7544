//! Subscription hub for events emitted by controllers.
//!
//! DESIGN
//! ======
//! Each controller owns an [`Emitter`] for its own event type. Host adapters
//! call [`Emitter::subscribe`] and get back a [`Subscription`] whose
//! [`Subscription::unsubscribe`] detaches the callback; this is the whole
//! contract a host UI layer maps onto its own callback mechanism.
//!
//! Everything runs on one thread. Listeners may subscribe, unsubscribe, or
//! cause another emit on the same emitter while being called: listeners are
//! moved out of the registry for the duration of a delivery, and nested emits
//! are queued and delivered in order once the current one finishes.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<E> = Box<dyn FnMut(&E)>;

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
    emitting: bool,
    cleared_while_emitting: bool,
    removed_while_emitting: Vec<u64>,
    pending: VecDeque<E>,
}

impl<E> Registry<E> {
    fn remove(&mut self, id: u64) {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        if self.emitting && self.listeners.len() == before {
            self.removed_while_emitting.push(id);
        }
    }
}

/// Single-threaded event fan-out.
pub struct Emitter<E> {
    inner: Rc<RefCell<Registry<E>>>,
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
                emitting: false,
                cleared_while_emitting: false,
                removed_while_emitting: Vec::new(),
                pending: VecDeque::new(),
            })),
        }
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter").field("listeners", &self.listener_count()).finish()
    }
}

impl<E> Emitter<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Detach every listener.
    pub fn clear(&self) {
        let mut reg = self.inner.borrow_mut();
        reg.listeners.clear();
        if reg.emitting {
            reg.cleared_while_emitting = true;
        }
        reg.pending.clear();
    }
}

impl<E: Clone + 'static> Emitter<E> {
    /// Attach a listener; it stays attached until the returned handle's
    /// [`Subscription::unsubscribe`] runs or the emitter is cleared.
    pub fn subscribe(&self, listener: impl FnMut(&E) + 'static) -> Subscription {
        let id = {
            let mut reg = self.inner.borrow_mut();
            let id = reg.next_id;
            reg.next_id += 1;
            reg.listeners.push((id, Box::new(listener)));
            id
        };
        let weak: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.inner);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// Deliver an event to every listener in subscription order.
    pub fn emit(&self, event: &E) {
        {
            let mut reg = self.inner.borrow_mut();
            if reg.emitting {
                reg.pending.push_back(event.clone());
                return;
            }
            reg.emitting = true;
        }

        let mut next = Some(event.clone());
        while let Some(current) = next {
            let mut taken = std::mem::take(&mut self.inner.borrow_mut().listeners);
            for (_, listener) in &mut taken {
                listener(&current);
            }

            let mut reg = self.inner.borrow_mut();
            let removed = std::mem::take(&mut reg.removed_while_emitting);
            if std::mem::take(&mut reg.cleared_while_emitting) {
                taken.clear();
            }
            taken.retain(|(id, _)| !removed.contains(id));
            let added = std::mem::take(&mut reg.listeners);
            taken.extend(added);
            reg.listeners = taken;
            next = reg.pending.pop_front();
        }

        self.inner.borrow_mut().emitting = false;
    }
}

/// Handle returned by [`Emitter::subscribe`].
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("attached", &self.detach.is_some()).finish()
    }
}

impl Subscription {
    /// Detach the listener. Safe to call after the emitter is gone.
    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}
