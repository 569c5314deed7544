//! Simulation registry: physics engines addressable by id for pinned drags.
//!
//! The scene layer registers a reheat callback per simulation; a pinned drag
//! looks it up by id on pointer-down and calls it so the engine resumes
//! motion while the node is held. The registry is a cheap clonable handle so
//! the context and every drag controller share one table.

#[cfg(test)]
#[path = "simulation_test.rs"]
mod simulation_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

type Reheat = Rc<dyn Fn()>;

/// A registered simulation.
#[derive(Clone)]
pub struct SimulationHandle {
    pub id: String,
    reheat: Reheat,
}

impl SimulationHandle {
    /// Reset the engine's convergence so it resumes active motion.
    pub fn reheat(&self) {
        (self.reheat)();
    }
}

impl fmt::Debug for SimulationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationHandle").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Shared id → reheat table. Clones refer to the same table.
#[derive(Clone, Default)]
pub struct SimulationRegistry {
    handles: Rc<RefCell<HashMap<String, Reheat>>>,
}

impl fmt::Debug for SimulationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationRegistry").field("ids", &self.ids()).finish()
    }
}

impl SimulationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a simulation. Registering an existing id replaces it.
    pub fn register(&self, id: impl Into<String>, reheat: impl Fn() + 'static) {
        let id = id.into();
        debug!(simulation = %id, "simulation registered");
        self.handles.borrow_mut().insert(id, Rc::new(reheat));
    }

    /// Remove a simulation. Unknown ids are ignored.
    pub fn unregister(&self, id: &str) -> bool {
        self.handles.borrow_mut().remove(id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<SimulationHandle> {
        self.handles
            .borrow()
            .get(id)
            .map(|reheat| SimulationHandle { id: id.to_owned(), reheat: Rc::clone(reheat) })
    }

    /// Reheat by id. Returns `false` when nothing is registered under `id`.
    pub fn reheat(&self, id: &str) -> bool {
        // The callback runs outside the borrow so it may touch the registry.
        match self.get(id) {
            Some(handle) => {
                handle.reheat();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.handles.borrow().contains_key(id)
    }

    /// Registered ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.handles.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.borrow().is_empty()
    }
}
