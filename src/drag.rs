//! Element dragging: free-form repositioning and physics-pinned nodes.
//!
//! DESIGN
//! ======
//! Elements are bound to a [`DragMode`]; a pointer-down on a bound element
//! (or any of its descendants) opens a session on the bound element in the
//! shared [`SessionTable`]. Every mode tracks the same thing: a starting
//! position (`anchor`) in the element's local coordinate system plus the
//! pointer's local position at down. On each move the element's new position
//! is `anchor + (pointer_now - pointer_at_down)`, both pointer positions
//! converted through [`Surface::local_point`] so panned and zoomed views stay
//! correct. What differs is where that position goes:
//!
//! - `Free` writes `transform="translate(x,y)"` on the element.
//! - `Pinned` / `PinnedNested` write the datum's `fx`/`fy`, which the physics
//!   engine treats as a fixed position, and clear them to `null` on release.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::consts::{ATTR_TRANSFORM, CLASS_DRAGGING};
use crate::datum::{self, DatumTable, FIELD_FX, FIELD_FY, FIELD_X, FIELD_Y};
use crate::events::Emitter;
use crate::geometry::Point;
use crate::input::{Button, PointerEvent, PointerId, Response};
use crate::session::{Poll, Session, SessionTable};
use crate::simulation::SimulationRegistry;
use crate::surface::{ElementId, Surface};
use crate::transform::Transform;

/// Wrapper field used by [`DragMode::pinned_nested`].
pub const DEFAULT_WRAPPER: &str = "data";

/// How a bound element reacts to a drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum DragMode {
    /// Move the element's own positional transform.
    Free,
    /// Pin the datum's `fx`/`fy` while held.
    Pinned { simulation: String },
    /// Like `Pinned`, with position fields stored under `wrapper`.
    PinnedNested { simulation: String, wrapper: String },
}

impl DragMode {
    #[must_use]
    pub fn pinned(simulation: impl Into<String>) -> Self {
        Self::Pinned { simulation: simulation.into() }
    }

    #[must_use]
    pub fn pinned_nested(simulation: impl Into<String>) -> Self {
        Self::PinnedNested { simulation: simulation.into(), wrapper: DEFAULT_WRAPPER.to_owned() }
    }

    fn simulation(&self) -> Option<&str> {
        match self {
            Self::Free => None,
            Self::Pinned { simulation } | Self::PinnedNested { simulation, .. } => Some(simulation),
        }
    }

    fn wrapper(&self) -> Option<&str> {
        match self {
            Self::PinnedNested { wrapper, .. } => Some(wrapper),
            _ => None,
        }
    }
}

/// Drag lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DragEvent {
    Started { element: ElementId, pointer_id: PointerId, position: Point },
    Moved { element: ElementId, pointer_id: PointerId, position: Point },
    Ended { element: ElementId, pointer_id: PointerId },
}

#[derive(Debug, Clone, PartialEq)]
struct DragState {
    mode: DragMode,
    /// Element position at down, local coordinates.
    anchor: Point,
    /// Pointer position at down, local coordinates.
    origin: Point,
    /// The element's transform at down; `Free` keeps its scale.
    base: Transform,
}

/// Drag handling for every bound element in one scene.
#[derive(Debug)]
pub struct DragController {
    bindings: HashMap<ElementId, DragMode>,
    sessions: SessionTable<DragState>,
    simulations: SimulationRegistry,
    events: Emitter<DragEvent>,
}

impl DragController {
    #[must_use]
    pub fn new(simulations: SimulationRegistry) -> Self {
        Self { bindings: HashMap::new(), sessions: SessionTable::new(), simulations, events: Emitter::new() }
    }

    #[must_use]
    pub fn events(&self) -> &Emitter<DragEvent> {
        &self.events
    }

    /// Make `element` draggable. Rebinding replaces the mode for future drags.
    pub fn bind(&mut self, element: ElementId, mode: DragMode) {
        self.bindings.insert(element, mode);
    }

    /// Stop dragging `element`, ending any session currently holding it.
    pub fn unbind<S: Surface>(&mut self, surface: &mut S, datums: &mut DatumTable, element: ElementId) -> bool {
        for pointer_id in self.sessions.pointers_for(element) {
            if let Some(session) = self.sessions.finish(surface, pointer_id) {
                self.release(surface, datums, &session);
            }
        }
        self.bindings.remove(&element).is_some()
    }

    #[must_use]
    pub fn mode(&self, element: ElementId) -> Option<&DragMode> {
        self.bindings.get(&element)
    }

    #[must_use]
    pub fn is_dragging(&self, element: ElementId) -> bool {
        self.sessions.has_element(element)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn on_pointer_down<S: Surface>(&mut self, surface: &mut S, datums: &mut DatumTable, ev: &PointerEvent) -> Response {
        if ev.button != Button::Primary {
            return Response::Ignored;
        }
        let Some(element) = self.bound_ancestor(surface, ev.target) else {
            return Response::Ignored;
        };
        if self.sessions.has_element(element) || self.sessions.is_active(ev.pointer_id) {
            debug!(%element, pointer_id = ev.pointer_id, "element or pointer already dragging");
            return Response::Ignored;
        }
        let Some(mode) = self.bindings.get(&element).cloned() else {
            return Response::Ignored;
        };

        let origin = surface.local_point(element, ev.position);
        let base = own_transform(surface, element);
        let anchor = match &mode {
            DragMode::Free => {
                surface.raise(element);
                Point::new(base.x, base.y)
            }
            DragMode::Pinned { simulation } | DragMode::PinnedNested { simulation, .. } => {
                if !self.simulations.reheat(simulation) {
                    warn!(simulation = %simulation, %element, "drag on unregistered simulation; not reheating");
                }
                let anchor = current_position(datums, element, mode.wrapper()).unwrap_or(origin);
                write_pin(datums, element, mode.wrapper(), Some(anchor));
                anchor
            }
        };

        if !self.sessions.begin(surface, ev.pointer_id, element, DragState { mode, anchor, origin, base }) {
            return Response::Ignored;
        }
        surface.add_class(element, CLASS_DRAGGING);
        self.events.emit(&DragEvent::Started { element, pointer_id: ev.pointer_id, position: anchor });
        Response::Consumed
    }

    pub fn on_pointer_move<S: Surface>(&mut self, surface: &mut S, datums: &mut DatumTable, ev: &PointerEvent) -> Response {
        let polled = match self.sessions.poll(surface, ev.pointer_id) {
            Poll::Missing => return Response::Ignored,
            Poll::Abandoned(session) => Err(session),
            Poll::Active(session) => Ok((session.element, session.state.clone())),
        };
        let (element, state) = match polled {
            Ok(live) => live,
            Err(session) => {
                self.release(surface, datums, &session);
                return Response::Ignored;
            }
        };

        let local = surface.local_point(element, ev.position);
        let delta = local.delta_from(state.origin);
        let position = Point::new(state.anchor.x + delta.x, state.anchor.y + delta.y);

        match &state.mode {
            DragMode::Free => {
                let placed = Transform { x: position.x, y: position.y, ..state.base };
                surface.set_attribute(element, ATTR_TRANSFORM, &positional_attribute(placed));
            }
            DragMode::Pinned { .. } | DragMode::PinnedNested { .. } => {
                write_pin(datums, element, state.mode.wrapper(), Some(position));
            }
        }
        self.events.emit(&DragEvent::Moved { element, pointer_id: ev.pointer_id, position });
        Response::Consumed
    }

    pub fn on_pointer_up<S: Surface>(&mut self, surface: &mut S, datums: &mut DatumTable, ev: &PointerEvent) -> Response {
        let Some(session) = self.sessions.finish(surface, ev.pointer_id) else {
            return Response::Ignored;
        };
        self.release(surface, datums, &session);
        Response::Consumed
    }

    /// Identical to pointer-up.
    pub fn on_pointer_cancel<S: Surface>(&mut self, surface: &mut S, datums: &mut DatumTable, ev: &PointerEvent) -> Response {
        self.on_pointer_up(surface, datums, ev)
    }

    /// End every drag, drop all bindings and listeners.
    pub fn destroy<S: Surface>(&mut self, surface: &mut S, datums: &mut DatumTable) {
        for session in self.sessions.finish_all(surface) {
            self.release(surface, datums, &session);
        }
        self.bindings.clear();
        self.events.clear();
    }

    fn bound_ancestor<S: Surface>(&self, surface: &S, target: ElementId) -> Option<ElementId> {
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            if self.bindings.contains_key(&current) {
                return Some(current);
            }
            cursor = surface.parent(current);
        }
        None
    }

    fn release<S: Surface>(&self, surface: &mut S, datums: &mut DatumTable, session: &Session<DragState>) {
        if session.state.mode.simulation().is_some() {
            write_pin(datums, session.element, session.state.mode.wrapper(), None);
        }
        surface.remove_class(session.element, CLASS_DRAGGING);
        self.events.emit(&DragEvent::Ended { element: session.element, pointer_id: session.pointer_id });
    }
}

fn own_transform<S: Surface>(surface: &S, element: ElementId) -> Transform {
    match surface.attribute(element, ATTR_TRANSFORM).map(|raw| raw.parse::<Transform>()) {
        Some(Ok(t)) => t,
        Some(Err(e)) => {
            debug!(%element, error = %e, "ignoring unparseable element transform");
            Transform::IDENTITY
        }
        None => Transform::IDENTITY,
    }
}

fn positional_attribute(t: Transform) -> String {
    if (t.k - 1.0).abs() < f64::EPSILON {
        format!("translate({},{})", t.x, t.y)
    } else {
        t.to_attribute()
    }
}

fn current_position(datums: &mut DatumTable, element: ElementId, wrapper: Option<&str>) -> Option<Point> {
    let datum = datums.get_mut(element)?;
    let Some(fields) = datum::position_target(datum, wrapper) else {
        debug!(%element, ?wrapper, "datum has no position object");
        return None;
    };
    let x = datum::number_field(fields, FIELD_X)?;
    let y = datum::number_field(fields, FIELD_Y)?;
    Some(Point::new(x, y))
}

/// Write `fx`/`fy`, or clear them to `null` when `position` is `None`.
fn write_pin(datums: &mut DatumTable, element: ElementId, wrapper: Option<&str>, position: Option<Point>) {
    let Some(fields) = datums.get_mut(element).and_then(|d| datum::position_target(d, wrapper)) else {
        debug!(%element, "no datum to pin");
        return;
    };
    let (fx, fy) = match position {
        Some(p) => (Value::from(p.x), Value::from(p.y)),
        None => (Value::Null, Value::Null),
    };
    fields.insert(FIELD_FX.to_owned(), fx);
    fields.insert(FIELD_FY.to_owned(), fy);
}
