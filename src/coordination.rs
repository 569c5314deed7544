//! Coordination bus: one interaction source of truth for many scene elements.
//!
//! ARCHITECTURE
//! ============
//! Elements register an [`InteractionEntry`] into a named group. A
//! [`Trigger`] dispatched to a group visits every entry in registration
//! order: the entry's datum is re-read from the [`DatumTable`] (entries
//! without a datum are skipped), `classify` maps `(trigger, datum)` to a
//! [`State`], every state class is removed from the element, and exactly the
//! class for the new state is added. Tooltips follow the entry's
//! [`TooltipPolicy`].
//!
//! Pointer-enter on a registered element dispatches `Hover(identify(datum))`
//! to its group; pointer-leave dispatches `Clear`. Everything else arrives
//! through [`CoordinationBus::dispatch`], e.g. a brush selection.
//!
//! User callbacks run with no borrow of the bus held, so `classify` may
//! register, unregister, or dispatch.

#[cfg(test)]
#[path = "coordination_test.rs"]
mod coordination_test;

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::brush::BrushSelection;
use crate::consts::{
    CLASS_DIMMED, CLASS_PRIMARY, CLASS_RELATED, CLASS_SELECTED, CLASS_TOOLTIP, DEFAULT_GROUP, TOOLTIP_OFFSET,
};
use crate::datum::DatumTable;
use crate::events::Emitter;
use crate::geometry::Point;
use crate::input::{PointerEvent, Response};
use crate::surface::{ElementId, Surface};

/// Identifier returned by [`CoordinationBus::register`].
pub type EntryId = Uuid;

// =============================================================================
// TYPES
// =============================================================================

/// Visual state assigned by `classify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Primary,
    Related,
    Selected,
    Dimmed,
    #[default]
    Neutral,
}

impl State {
    /// Every class a state can apply.
    pub const CLASSES: [&'static str; 4] = [CLASS_PRIMARY, CLASS_RELATED, CLASS_SELECTED, CLASS_DIMMED];

    /// Class for this state; `Neutral` has none.
    #[must_use]
    pub fn class(self) -> Option<&'static str> {
        match self {
            Self::Primary => Some(CLASS_PRIMARY),
            Self::Related => Some(CLASS_RELATED),
            Self::Selected => Some(CLASS_SELECTED),
            Self::Dimmed => Some(CLASS_DIMMED),
            Self::Neutral => None,
        }
    }
}

/// Why a group's state must be recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Trigger {
    Hover(String),
    Brush(BrushSelection),
    Selection(BTreeSet<String>),
    Focus(Option<String>),
    Clear,
}

/// When an entry shows its tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TooltipPolicy {
    /// Only on the hovered element, at the pointer.
    OnHover,
    /// Whenever classified `Primary`, next to the element.
    WhenPrimary,
    /// Whenever classified `Primary` or `Related`, next to the element.
    WhenRelated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BusEvent {
    TriggerApplied { group: String, trigger: Trigger },
}

type IdentifyFn = Rc<dyn Fn(&Value) -> String>;
type ClassifyFn = Rc<dyn Fn(&Trigger, &Value) -> State>;
type ContentFn = Rc<dyn Fn(&Value) -> String>;

#[derive(Clone)]
struct Tooltip {
    policy: TooltipPolicy,
    content: ContentFn,
}

/// A registered element and the callbacks that interpret its datum.
#[derive(Clone)]
pub struct InteractionEntry {
    pub element: ElementId,
    identify: IdentifyFn,
    classify: ClassifyFn,
    tooltip: Option<Tooltip>,
}

impl InteractionEntry {
    pub fn new(
        element: ElementId,
        identify: impl Fn(&Value) -> String + 'static,
        classify: impl Fn(&Trigger, &Value) -> State + 'static,
    ) -> Self {
        Self { element, identify: Rc::new(identify), classify: Rc::new(classify), tooltip: None }
    }

    #[must_use]
    pub fn with_tooltip(mut self, policy: TooltipPolicy, content: impl Fn(&Value) -> String + 'static) -> Self {
        self.tooltip = Some(Tooltip { policy, content: Rc::new(content) });
        self
    }

    #[must_use]
    pub fn tooltip_policy(&self) -> Option<TooltipPolicy> {
        self.tooltip.as_ref().map(|t| t.policy)
    }
}

impl fmt::Debug for InteractionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionEntry")
            .field("element", &self.element)
            .field("tooltip", &self.tooltip_policy())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
enum Anchor {
    Pointer(Point),
    Element,
}

struct Slot {
    entry: InteractionEntry,
    group: String,
    seq: u64,
    state: State,
    tooltip_node: Option<ElementId>,
}

struct BusInner {
    groups: HashMap<String, Vec<EntryId>>,
    slots: HashMap<EntryId, Slot>,
    next_seq: u64,
    tooltip_layer: Option<ElementId>,
    tooltip_offset: f64,
}

// =============================================================================
// BUS
// =============================================================================

/// Shared group table. Clones refer to the same bus.
#[derive(Clone)]
pub struct CoordinationBus {
    inner: Rc<RefCell<BusInner>>,
    events: Rc<Emitter<BusEvent>>,
}

impl Default for CoordinationBus {
    fn default() -> Self {
        Self::new(TOOLTIP_OFFSET)
    }
}

impl fmt::Debug for CoordinationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinationBus")
            .field("groups", &self.groups())
            .field("entries", &self.len())
            .finish()
    }
}

impl CoordinationBus {
    #[must_use]
    pub fn new(tooltip_offset: f64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(BusInner {
                groups: HashMap::new(),
                slots: HashMap::new(),
                next_seq: 0,
                tooltip_layer: None,
                tooltip_offset,
            })),
            events: Rc::new(Emitter::new()),
        }
    }

    #[must_use]
    pub fn events(&self) -> &Emitter<BusEvent> {
        &self.events
    }

    /// Parent for tooltip nodes. Without one, tooltips go under the scene
    /// root of the element they describe.
    pub fn set_tooltip_layer(&self, layer: Option<ElementId>) {
        self.inner.borrow_mut().tooltip_layer = layer;
    }

    // --- Registration ---

    /// Add an entry to `group` ([`DEFAULT_GROUP`] when `None`).
    pub fn register(&self, entry: InteractionEntry, group: Option<&str>) -> EntryId {
        let id = Uuid::new_v4();
        let group = group.unwrap_or(DEFAULT_GROUP).to_owned();
        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        debug!(entry = %id, element = %entry.element, group = %group, "entry registered");
        inner.groups.entry(group.clone()).or_default().push(id);
        inner
            .slots
            .insert(id, Slot { entry, group, seq, state: State::Neutral, tooltip_node: None });
        id
    }

    /// Remove an entry, clearing its state classes and tooltip.
    pub fn unregister<S: Surface>(&self, surface: &mut S, id: EntryId) -> bool {
        let slot = {
            let mut inner = self.inner.borrow_mut();
            let Some(slot) = inner.slots.remove(&id) else {
                return false;
            };
            if let Some(members) = inner.groups.get_mut(&slot.group) {
                members.retain(|m| *m != id);
                if members.is_empty() {
                    inner.groups.remove(&slot.group);
                }
            }
            slot
        };
        clear_visuals(surface, &slot);
        true
    }

    // --- Pointer wiring ---

    /// Dispatch `Hover(identify(datum))` to the entered element's group.
    pub fn on_pointer_enter<S: Surface>(&self, surface: &mut S, datums: &DatumTable, ev: &PointerEvent) -> Response {
        let Some((id, entry, group)) = self.entry_under(surface, ev.target) else {
            return Response::Ignored;
        };
        let Some(datum) = datums.get(entry.element) else {
            debug!(element = %entry.element, "hovered element has no datum");
            return Response::Ignored;
        };
        let key = (entry.identify)(datum);
        self.apply(surface, datums, &group, Trigger::Hover(key), Some((id, ev.position)));
        Response::Consumed
    }

    /// Dispatch `Clear` to the left element's group.
    pub fn on_pointer_leave<S: Surface>(&self, surface: &mut S, datums: &DatumTable, ev: &PointerEvent) -> Response {
        let Some((_, _, group)) = self.entry_under(surface, ev.target) else {
            return Response::Ignored;
        };
        self.apply(surface, datums, &group, Trigger::Clear, None);
        Response::Consumed
    }

    /// Keep a visible hover tooltip under the pointer.
    pub fn on_pointer_move<S: Surface>(&self, surface: &mut S, ev: &PointerEvent) -> Response {
        let Some((id, entry, _)) = self.entry_under(surface, ev.target) else {
            return Response::Ignored;
        };
        if entry.tooltip_policy() != Some(TooltipPolicy::OnHover) {
            return Response::Ignored;
        }
        let (node, offset) = {
            let inner = self.inner.borrow();
            (inner.slots.get(&id).and_then(|s| s.tooltip_node), inner.tooltip_offset)
        };
        let Some(node) = node else {
            return Response::Ignored;
        };
        place_tooltip(surface, node, entry.element, Anchor::Pointer(ev.position), offset);
        Response::Consumed
    }

    // --- Dispatch ---

    /// Apply `trigger` to every entry in `group`. Returns how many entries
    /// were classified (entries without a datum are skipped).
    pub fn dispatch<S: Surface>(&self, surface: &mut S, datums: &DatumTable, group: &str, trigger: Trigger) -> usize {
        self.apply(surface, datums, group, trigger, None)
    }

    fn apply<S: Surface>(
        &self,
        surface: &mut S,
        datums: &DatumTable,
        group: &str,
        trigger: Trigger,
        hover: Option<(EntryId, Point)>,
    ) -> usize {
        let (members, layer, offset) = {
            let inner = self.inner.borrow();
            let members: Vec<(EntryId, InteractionEntry)> = inner
                .groups
                .get(group)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| inner.slots.get(id).map(|s| (*id, s.entry.clone())))
                        .collect()
                })
                .unwrap_or_default();
            (members, inner.tooltip_layer, inner.tooltip_offset)
        };

        let mut applied = 0;
        for (id, entry) in members {
            let Some(datum) = datums.get(entry.element) else {
                debug!(entry = %id, element = %entry.element, "no datum bound; skipping entry");
                continue;
            };
            let state = (entry.classify)(&trigger, datum);
            apply_state(surface, entry.element, state);

            let anchor = entry.tooltip.as_ref().and_then(|t| match t.policy {
                TooltipPolicy::OnHover => hover.filter(|(h, _)| *h == id).map(|(_, p)| Anchor::Pointer(p)),
                TooltipPolicy::WhenPrimary => (state == State::Primary).then_some(Anchor::Element),
                TooltipPolicy::WhenRelated => {
                    matches!(state, State::Primary | State::Related).then_some(Anchor::Element)
                }
            });
            let existing = self.inner.borrow().slots.get(&id).and_then(|s| s.tooltip_node);
            let node = match (anchor, &entry.tooltip) {
                (Some(anchor), Some(tooltip)) => {
                    let text = (tooltip.content)(datum);
                    show_tooltip(surface, existing, layer, entry.element, &text, anchor, offset)
                }
                _ => {
                    if let Some(node) = existing {
                        surface.remove_element(node);
                    }
                    None
                }
            };

            let orphaned = match self.inner.borrow_mut().slots.get_mut(&id) {
                Some(slot) => {
                    slot.state = state;
                    slot.tooltip_node = node;
                    false
                }
                None => true,
            };
            if orphaned {
                // Unregistered by a callback mid-dispatch.
                apply_state(surface, entry.element, State::Neutral);
                if let Some(node) = node {
                    surface.remove_element(node);
                }
            }
            applied += 1;
        }

        debug!(group, ?trigger, applied, "trigger applied");
        self.events.emit(&BusEvent::TriggerApplied { group: group.to_owned(), trigger });
        applied
    }

    // --- Teardown ---

    /// Unregister everything, removing all classes and tooltip nodes, and drop listeners.
    pub fn destroy<S: Surface>(&self, surface: &mut S) {
        let slots: Vec<Slot> = {
            let mut inner = self.inner.borrow_mut();
            inner.groups.clear();
            inner.slots.drain().map(|(_, s)| s).collect()
        };
        for slot in &slots {
            clear_visuals(surface, slot);
        }
        self.events.clear();
    }

    // --- Queries ---

    #[must_use]
    pub fn state(&self, id: EntryId) -> Option<State> {
        self.inner.borrow().slots.get(&id).map(|s| s.state)
    }

    /// Tooltip node currently shown for an entry.
    #[must_use]
    pub fn tooltip(&self, id: EntryId) -> Option<ElementId> {
        self.inner.borrow().slots.get(&id).and_then(|s| s.tooltip_node)
    }

    #[must_use]
    pub fn group_of(&self, id: EntryId) -> Option<String> {
        self.inner.borrow().slots.get(&id).map(|s| s.group.clone())
    }

    #[must_use]
    pub fn group_len(&self, group: &str) -> usize {
        self.inner.borrow().groups.get(group).map_or(0, Vec::len)
    }

    /// Group names, sorted.
    #[must_use]
    pub fn groups(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.borrow().groups.keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().slots.is_empty()
    }

    /// Earliest-registered entry on `target` or its nearest registered ancestor.
    fn entry_under<S: Surface>(&self, surface: &S, target: ElementId) -> Option<(EntryId, InteractionEntry, String)> {
        let inner = self.inner.borrow();
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            let found = inner
                .slots
                .iter()
                .filter(|(_, s)| s.entry.element == current)
                .min_by_key(|(_, s)| s.seq);
            if let Some((id, slot)) = found {
                return Some((*id, slot.entry.clone(), slot.group.clone()));
            }
            cursor = surface.parent(current);
        }
        None
    }
}

fn apply_state<S: Surface>(surface: &mut S, element: ElementId, state: State) {
    for class in State::CLASSES {
        surface.remove_class(element, class);
    }
    if let Some(class) = state.class() {
        surface.add_class(element, class);
    }
}

fn clear_visuals<S: Surface>(surface: &mut S, slot: &Slot) {
    apply_state(surface, slot.entry.element, State::Neutral);
    if let Some(node) = slot.tooltip_node {
        surface.remove_element(node);
    }
}

fn show_tooltip<S: Surface>(
    surface: &mut S,
    existing: Option<ElementId>,
    layer: Option<ElementId>,
    element: ElementId,
    text: &str,
    anchor: Anchor,
    offset: f64,
) -> Option<ElementId> {
    let node = match existing {
        Some(node) if surface.contains(node) => node,
        _ => {
            let parent = layer.unwrap_or_else(|| surface.root_of(element));
            let node = surface.create_element(parent, "text")?;
            surface.add_class(node, CLASS_TOOLTIP);
            node
        }
    };
    surface.set_text(node, text);
    place_tooltip(surface, node, element, anchor, offset);
    Some(node)
}

fn place_tooltip<S: Surface>(surface: &mut S, node: ElementId, element: ElementId, anchor: Anchor, offset: f64) {
    let at = match anchor {
        Anchor::Pointer(screen) => {
            let local = surface.local_point(node, screen);
            Point::new(local.x + offset, local.y + offset)
        }
        Anchor::Element => {
            // Top-right corner of the element, carried into the tooltip's space.
            let corner = surface.bounds(element).map_or(Point::new(0.0, 0.0), |b| Point::new(b.x1, b.y0));
            let shared = surface.inherited_transform(element).apply(corner);
            let local = surface.inherited_transform(node).invert(shared);
            Point::new(local.x + offset, local.y - offset)
        }
    };
    surface.set_attribute(node, "x", &at.x.to_string());
    surface.set_attribute(node, "y", &at.y.to_string());
}
