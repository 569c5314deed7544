//! Pointer-session table: the one down → move* → up|cancel machine shared by
//! pan, drag, and brush.
//!
//! DESIGN
//! ======
//! A session is created on a qualifying pointer-down, captures the pointer on
//! the owning element, and lives until the matching up or cancel, which are
//! handled identically. Sessions are keyed by pointer id so several pointers
//! can drive independent gestures at once. What a gesture does on each phase
//! is the controller's business; this table only owns lifecycle, capture, and
//! detection of sessions whose element vanished or lost capture mid-gesture.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::HashMap;

use tracing::debug;

use crate::input::PointerId;
use crate::surface::{ElementId, Surface};

/// One active gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct Session<T> {
    pub pointer_id: PointerId,
    /// Element holding pointer capture for this session.
    pub element: ElementId,
    /// Gesture-specific state.
    pub state: T,
}

/// Result of looking up a session for a move event.
#[derive(Debug, PartialEq)]
pub enum Poll<'a, T> {
    /// No session for this pointer.
    Missing,
    /// The session is live.
    Active(&'a mut Session<T>),
    /// The session's element was removed or lost capture; it has been dropped
    /// from the table and is handed back for cleanup.
    Abandoned(Session<T>),
}

/// Active sessions keyed by pointer id.
#[derive(Debug, Clone)]
pub struct SessionTable<T> {
    sessions: HashMap<PointerId, Session<T>>,
}

impl<T> Default for SessionTable<T> {
    fn default() -> Self {
        Self { sessions: HashMap::new() }
    }
}

impl<T> SessionTable<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session and capture the pointer on `element`. Returns `false`
    /// without changing anything if the pointer already owns a session.
    pub fn begin<S: Surface>(&mut self, surface: &mut S, pointer_id: PointerId, element: ElementId, state: T) -> bool {
        if self.sessions.contains_key(&pointer_id) {
            debug!(pointer_id, "pointer already owns a session; ignoring down");
            return false;
        }
        surface.set_pointer_capture(element, pointer_id);
        self.sessions.insert(pointer_id, Session { pointer_id, element, state });
        true
    }

    /// Look up the session for a move, dropping it if it went stale.
    pub fn poll<S: Surface>(&mut self, surface: &S, pointer_id: PointerId) -> Poll<'_, T> {
        let stale = match self.sessions.get(&pointer_id) {
            None => return Poll::Missing,
            Some(session) => {
                !surface.contains(session.element) || !surface.has_pointer_capture(session.element, pointer_id)
            }
        };
        if stale {
            debug!(pointer_id, "pointer capture lost; abandoning session");
            return match self.sessions.remove(&pointer_id) {
                Some(session) => Poll::Abandoned(session),
                None => Poll::Missing,
            };
        }
        match self.sessions.get_mut(&pointer_id) {
            Some(session) => Poll::Active(session),
            None => Poll::Missing,
        }
    }

    /// End a session on pointer-up or cancel, releasing capture.
    pub fn finish<S: Surface>(&mut self, surface: &mut S, pointer_id: PointerId) -> Option<Session<T>> {
        let session = self.sessions.remove(&pointer_id)?;
        surface.release_pointer_capture(session.element, pointer_id);
        Some(session)
    }

    /// End every session, releasing all captures. Used by `destroy`.
    pub fn finish_all<S: Surface>(&mut self, surface: &mut S) -> Vec<Session<T>> {
        let mut ended: Vec<Session<T>> = self.sessions.drain().map(|(_, s)| s).collect();
        ended.sort_by_key(|s| s.pointer_id);
        for session in &ended {
            surface.release_pointer_capture(session.element, session.pointer_id);
        }
        ended
    }

    #[must_use]
    pub fn get(&self, pointer_id: PointerId) -> Option<&Session<T>> {
        self.sessions.get(&pointer_id)
    }

    #[must_use]
    pub fn is_active(&self, pointer_id: PointerId) -> bool {
        self.sessions.contains_key(&pointer_id)
    }

    /// Whether any session is driving `element`.
    #[must_use]
    pub fn has_element(&self, element: ElementId) -> bool {
        self.sessions.values().any(|s| s.element == element)
    }

    /// Pointers whose session drives `element`, sorted.
    #[must_use]
    pub fn pointers_for(&self, element: ElementId) -> Vec<PointerId> {
        let mut ids: Vec<PointerId> = self
            .sessions
            .values()
            .filter(|s| s.element == element)
            .map(|s| s.pointer_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
