//! Region brushing: rectangular or axis-constrained selection over an extent.
//!
//! `attach` synthesizes two rects under the given parent: a transparent
//! overlay covering the extent that receives pointer-downs, and the visible
//! selection rect drawn on top of it. A brush gesture is `Idle → Active →
//! Idle`; every selection change, interactive or programmatic, updates the
//! selection rect before the corresponding event is emitted.

#[cfg(test)]
#[path = "brush_test.rs"]
mod brush_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::InteractionConfig;
use crate::consts::{CLASS_BACKGROUND, CLASS_BRUSH_OVERLAY, CLASS_BRUSH_SELECTION};
use crate::events::Emitter;
use crate::geometry::{Point, Rect};
use crate::input::{Button, PointerEvent, PointerId, Response};
use crate::session::{Poll, SessionTable};
use crate::surface::{ElementId, Surface};

/// Which axes a brush constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    /// Free rectangle.
    #[default]
    Xy,
    /// Horizontal span only.
    X,
    /// Vertical span only.
    Y,
}

/// A brushed region. Axis modes reduce to a `(min, max)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushSelection {
    /// Normalized box in 2D mode.
    Xy(Rect),
    /// `(x0, x1)` span in x mode.
    X(f64, f64),
    /// `(y0, y1)` span in y mode.
    Y(f64, f64),
}

impl BrushSelection {
    /// Box spanned by `a` and `b` under `mode`.
    #[must_use]
    pub fn between(mode: BrushMode, a: Point, b: Point) -> Self {
        match mode {
            BrushMode::Xy => Self::Xy(Rect::from_corners(a, b)),
            BrushMode::X => Self::X(a.x.min(b.x), a.x.max(b.x)),
            BrushMode::Y => Self::Y(a.y.min(b.y), a.y.max(b.y)),
        }
    }

    /// Full rectangle covered within `extent`; axis selections span the other axis.
    #[must_use]
    pub fn to_rect(&self, extent: Rect) -> Rect {
        match *self {
            Self::Xy(r) => r,
            Self::X(x0, x1) => Rect::new(x0, extent.y0, x1, extent.y1),
            Self::Y(y0, y1) => Rect::new(extent.x0, y0, extent.x1, y1),
        }
    }

    /// Whether every constrained dimension is smaller than `min_size`.
    #[must_use]
    pub fn is_below(&self, min_size: f64) -> bool {
        match *self {
            Self::Xy(r) => r.width() < min_size && r.height() < min_size,
            Self::X(a, b) | Self::Y(a, b) => (b - a) < min_size,
        }
    }

    /// Normalize ordering and clamp into `extent`.
    fn clamped(self, extent: Rect) -> Self {
        match self {
            Self::Xy(r) => {
                let a = extent.clamp(Point::new(r.x0, r.y0));
                let b = extent.clamp(Point::new(r.x1, r.y1));
                Self::Xy(Rect::from_corners(a, b))
            }
            Self::X(a, b) => {
                let lo = a.min(b).max(extent.x0).min(extent.x1);
                let hi = a.max(b).max(extent.x0).min(extent.x1);
                Self::X(lo, hi)
            }
            Self::Y(a, b) => {
                let lo = a.min(b).max(extent.y0).min(extent.y1);
                let hi = a.max(b).max(extent.y0).min(extent.y1);
                Self::Y(lo, hi)
            }
        }
    }
}

/// Brush settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushConfig {
    /// Constrained axes.
    pub mode: BrushMode,
    /// Brushable area in the parent's coordinates.
    pub extent: Rect,
    /// Gestures smaller than this clear the selection instead.
    pub min_size: f64,
}

impl BrushConfig {
    #[must_use]
    pub fn new(extent: Rect) -> Self {
        Self::from_config(extent, &InteractionConfig::default())
    }

    #[must_use]
    pub fn from_config(extent: Rect, config: &InteractionConfig) -> Self {
        Self { mode: BrushMode::Xy, extent, min_size: config.brush_min_size }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: BrushMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Brush lifecycle events. `Brushed` fires on every selection change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BrushEvent {
    /// A gesture began on the overlay or a background element.
    Started { pointer_id: PointerId },
    /// The selection changed; `None` when it was cleared.
    Brushed { selection: Option<BrushSelection> },
    /// The gesture finished with this selection.
    Ended { selection: Option<BrushSelection> },
}

/// Brush handle returned by [`BrushController::attach`].
#[derive(Debug)]
pub struct BrushController {
    parent: ElementId,
    overlay: ElementId,
    feedback: ElementId,
    config: BrushConfig,
    selection: Option<BrushSelection>,
    /// Clamped origin of the active gesture.
    sessions: SessionTable<Point>,
    events: Emitter<BrushEvent>,
    attached: bool,
}

impl BrushController {
    /// Create the overlay and selection rects under `parent`. Returns `None`
    /// when `parent` is not in the scene.
    pub fn attach<S: Surface>(surface: &mut S, parent: ElementId, config: BrushConfig) -> Option<Self> {
        let Some(overlay) = surface.create_element(parent, "rect") else {
            warn!(%parent, "brush parent not in scene");
            return None;
        };
        let Some(feedback) = surface.create_element(parent, "rect") else {
            surface.remove_element(overlay);
            return None;
        };
        surface.add_class(overlay, CLASS_BRUSH_OVERLAY);
        write_rect(surface, overlay, config.extent);
        surface.add_class(feedback, CLASS_BRUSH_SELECTION);
        surface.set_attribute(feedback, "display", "none");

        debug!(%parent, mode = ?config.mode, "brush attached");
        Some(Self {
            parent,
            overlay,
            feedback,
            config,
            selection: None,
            sessions: SessionTable::new(),
            events: Emitter::new(),
            attached: true,
        })
    }

    #[must_use]
    pub fn events(&self) -> &Emitter<BrushEvent> {
        &self.events
    }

    #[must_use]
    pub fn overlay(&self) -> ElementId {
        self.overlay
    }

    /// The visible selection rect.
    #[must_use]
    pub fn feedback(&self) -> ElementId {
        self.feedback
    }

    #[must_use]
    pub fn config(&self) -> &BrushConfig {
        &self.config
    }

    /// Current selection (`getSelection`).
    #[must_use]
    pub fn selection(&self) -> Option<BrushSelection> {
        self.selection
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.sessions.is_empty()
    }

    /// Programmatically set the selection (`move`). `None` clears it.
    pub fn move_to<S: Surface>(&mut self, surface: &mut S, selection: Option<BrushSelection>) {
        if !self.attached {
            return;
        }
        let selection = selection.map(|s| s.clamped(self.config.extent));
        self.set_selection(surface, selection);
    }

    pub fn clear<S: Surface>(&mut self, surface: &mut S) {
        self.move_to(surface, None);
    }

    pub fn on_pointer_down<S: Surface>(&mut self, surface: &mut S, ev: &PointerEvent) -> Response {
        if !self.attached || ev.button != Button::Primary || !self.sessions.is_empty() {
            return Response::Ignored;
        }
        let qualifies = ev.target == self.overlay
            || (surface.is_within(ev.target, self.parent) && surface.has_class(ev.target, CLASS_BACKGROUND));
        if !qualifies {
            return Response::Ignored;
        }
        let origin = self.config.extent.clamp(surface.local_point(self.overlay, ev.position));
        if !self.sessions.begin(surface, ev.pointer_id, self.overlay, origin) {
            return Response::Ignored;
        }
        self.events.emit(&BrushEvent::Started { pointer_id: ev.pointer_id });
        if self.selection.is_some() {
            self.set_selection(surface, None);
        }
        Response::Consumed
    }

    pub fn on_pointer_move<S: Surface>(&mut self, surface: &mut S, ev: &PointerEvent) -> Response {
        let polled = match self.sessions.poll(surface, ev.pointer_id) {
            Poll::Missing => return Response::Ignored,
            Poll::Abandoned(_) => None,
            Poll::Active(session) => Some(session.state),
        };
        let Some(origin) = polled else {
            debug!(pointer_id = ev.pointer_id, "brush gesture abandoned");
            self.end_gesture(surface);
            return Response::Ignored;
        };
        let current = self.config.extent.clamp(surface.local_point(self.overlay, ev.position));
        let selection = BrushSelection::between(self.config.mode, origin, current);
        self.set_selection(surface, Some(selection));
        Response::Consumed
    }

    pub fn on_pointer_up<S: Surface>(&mut self, surface: &mut S, ev: &PointerEvent) -> Response {
        if self.sessions.finish(surface, ev.pointer_id).is_none() {
            return Response::Ignored;
        }
        self.end_gesture(surface);
        Response::Consumed
    }

    /// Identical to pointer-up.
    pub fn on_pointer_cancel<S: Surface>(&mut self, surface: &mut S, ev: &PointerEvent) -> Response {
        self.on_pointer_up(surface, ev)
    }

    /// Remove the synthesized rects and listeners. Later input is ignored.
    pub fn destroy<S: Surface>(&mut self, surface: &mut S) {
        for session in self.sessions.finish_all(surface) {
            debug!(pointer_id = session.pointer_id, "brush gesture ended by destroy");
        }
        surface.remove_element(self.feedback);
        surface.remove_element(self.overlay);
        self.selection = None;
        self.events.clear();
        self.attached = false;
    }

    /// Close a gesture: a selection below the minimum size is cleared before `Ended`.
    fn end_gesture<S: Surface>(&mut self, surface: &mut S) {
        let keep = self.selection.filter(|s| !s.is_below(self.config.min_size));
        if keep.is_none() && self.selection.is_some() {
            debug!(min_size = self.config.min_size, "brush below minimum size; clearing");
        }
        if keep != self.selection {
            self.set_selection(surface, keep);
        }
        self.events.emit(&BrushEvent::Ended { selection: keep });
    }

    fn set_selection<S: Surface>(&mut self, surface: &mut S, selection: Option<BrushSelection>) {
        self.selection = selection;
        match selection {
            Some(s) => {
                write_rect(surface, self.feedback, s.to_rect(self.config.extent));
                surface.remove_attribute(self.feedback, "display");
            }
            None => surface.set_attribute(self.feedback, "display", "none"),
        }
        self.events.emit(&BrushEvent::Brushed { selection });
    }
}

fn write_rect<S: Surface>(surface: &mut S, el: ElementId, r: Rect) {
    surface.set_attribute(el, "x", &r.x0.to_string());
    surface.set_attribute(el, "y", &r.y0.to_string());
    surface.set_attribute(el, "width", &r.width().to_string());
    surface.set_attribute(el, "height", &r.height().to_string());
}
