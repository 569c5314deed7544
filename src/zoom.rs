//! Pan/zoom controller: wheel, pointer-drag, and pinch input over one transform.
//!
//! ARCHITECTURE
//! ============
//! A [`ZoomController`] is attached to a root element and owns exactly one
//! [`Transform`] mapping its layer's content space into the root's coordinate
//! system. Pointer positions arrive in screen pixels; dividing by the
//! surface's outer scale yields root coordinates, where zoom-around-point and
//! pan math happen. Every accepted change is clamped (scale limits, then pan
//! bounds), written to the layer's `transform` attribute, mirrored on the root
//! for readback, and emitted as [`ZoomEvent::TransformChanged`]. A change that
//! lands on the current transform is dropped without an event.
//!
//! Pans only start from the root itself or nodes marked with
//! [`CLASS_BACKGROUND`] / [`CLASS_PAN_GROUP`], so pointer-downs on data
//! elements stay available for drag, click, and hover handling.

#[cfg(test)]
#[path = "zoom_test.rs"]
mod zoom_test;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::InteractionConfig;
use crate::consts::{ATTR_TRANSFORM, ATTR_ZOOM_MIRROR, CLASS_BACKGROUND, CLASS_PAN_GROUP, TRANSFORM_TOLERANCE};
use crate::events::Emitter;
use crate::geometry::{Point, Rect, Size};
use crate::input::{Button, GestureEvent, PointerEvent, PointerId, Response, WheelEvent};
use crate::session::{Poll, SessionTable};
use crate::surface::{ElementId, Surface};
use crate::transform::Transform;

/// Zoom controller settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomConfig {
    /// Element whose `transform` attribute receives the current transform.
    pub layer: ElementId,
    /// `[scale_min, scale_max]`.
    pub scale_extent: (f64, f64),
    /// Pan bounds in content space. `None` allows unlimited panning.
    pub translate_extent: Option<Rect>,
    /// Viewport size in root coordinates. `None` asks the surface on first use.
    pub viewport: Option<Size>,
    /// Exponent per normalized wheel pixel: `factor = 2^(-delta * sensitivity)`.
    pub wheel_sensitivity: f64,
    /// Scale changes smaller than this are ignored.
    pub zoom_epsilon: f64,
}

impl ZoomConfig {
    /// Settings for `layer` using the default [`InteractionConfig`].
    #[must_use]
    pub fn new(layer: ElementId) -> Self {
        Self::from_config(layer, &InteractionConfig::default())
    }

    #[must_use]
    pub fn from_config(layer: ElementId, config: &InteractionConfig) -> Self {
        Self {
            layer,
            scale_extent: (config.scale_min, config.scale_max),
            translate_extent: None,
            viewport: None,
            wheel_sensitivity: config.wheel_sensitivity,
            zoom_epsilon: config.zoom_epsilon,
        }
    }

    #[must_use]
    pub fn with_scale_extent(mut self, min: f64, max: f64) -> Self {
        self.scale_extent = if min <= max { (min, max) } else { (max, min) };
        self
    }

    #[must_use]
    pub fn with_translate_extent(mut self, bounds: Rect) -> Self {
        self.translate_extent = Some(bounds);
        self
    }

    #[must_use]
    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = Some(viewport);
        self
    }
}

/// What produced a transform change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomSource {
    /// Wheel or ctrl-wheel trackpad pinch.
    Wheel,
    /// Pointer drag on the root or a background element.
    Pan,
    /// Platform pinch gesture.
    Gesture,
    /// `set_transform`, `zoom_to`, `zoom_by` or `reset_zoom`.
    Programmatic,
}

/// Events emitted by a [`ZoomController`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ZoomEvent {
    /// The transform was replaced and written out.
    TransformChanged { transform: Transform, source: ZoomSource },
    /// A pointer captured the root to pan.
    PanStarted { pointer_id: PointerId },
    /// The pan ended by up, cancel or lost capture.
    PanEnded { pointer_id: PointerId },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanState {
    origin_pointer: Point,
    origin_transform: Transform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GestureState {
    start: Transform,
    center: Point,
}

/// Pan/zoom handle returned by [`ZoomController::attach`].
#[derive(Debug)]
pub struct ZoomController {
    root: ElementId,
    config: ZoomConfig,
    transform: Transform,
    viewport: Option<Size>,
    pans: SessionTable<PanState>,
    gesture: Option<GestureState>,
    events: Emitter<ZoomEvent>,
    attached: bool,
}

impl ZoomController {
    /// Attach to `root`, writing the identity transform to the layer.
    pub fn attach<S: Surface>(surface: &mut S, root: ElementId, config: ZoomConfig) -> Self {
        let controller = Self {
            root,
            config,
            transform: Transform::IDENTITY,
            viewport: config.viewport,
            pans: SessionTable::new(),
            gesture: None,
            events: Emitter::new(),
            attached: true,
        };
        controller.write_out(surface);
        debug!(%root, layer = %config.layer, "zoom attached");
        controller
    }

    /// Read the transform mirrored on a zoom root, if any.
    pub fn read_mirror<S: Surface>(surface: &S, root: ElementId) -> Option<Transform> {
        let raw = surface.attribute(root, ATTR_ZOOM_MIRROR)?;
        match raw.parse::<Transform>() {
            Ok(t) => Some(t),
            Err(e) => {
                warn!(%root, error = %e, "unreadable zoom mirror attribute");
                None
            }
        }
    }

    #[must_use]
    pub fn events(&self) -> &Emitter<ZoomEvent> {
        &self.events
    }

    #[must_use]
    pub fn root(&self) -> ElementId {
        self.root
    }

    #[must_use]
    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    /// The current transform.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        !self.pans.is_empty()
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Forget the cached viewport so the next clamp re-reads it (call on resize).
    pub fn invalidate_viewport(&mut self) {
        self.viewport = self.config.viewport;
    }

    // --- Programmatic control ---

    /// Replace the transform. Returns whether anything changed.
    pub fn set_transform<S: Surface>(&mut self, surface: &mut S, transform: Transform) -> bool {
        self.commit(surface, transform, ZoomSource::Programmatic)
    }

    /// Return to the identity transform (subject to pan bounds).
    pub fn reset_zoom<S: Surface>(&mut self, surface: &mut S) -> bool {
        self.commit(surface, Transform::IDENTITY, ZoomSource::Programmatic)
    }

    /// Zoom to scale `k` around `point` (root coordinates); the viewport
    /// centre is used when no point is given.
    pub fn zoom_to<S: Surface>(&mut self, surface: &mut S, k: f64, point: Option<Point>) -> bool {
        if !self.attached {
            return false;
        }
        let focal = point.unwrap_or_else(|| self.viewport_center(surface));
        let k = self.clamp_scale(k);
        let next = self.transform.zoom_around(focal, k);
        self.commit(surface, next, ZoomSource::Programmatic)
    }

    /// Multiply the scale by `factor` around the viewport centre.
    pub fn zoom_by<S: Surface>(&mut self, surface: &mut S, factor: f64) -> bool {
        let k = self.transform.k * factor;
        self.zoom_to(surface, k, None)
    }

    /// Detach: end every pan, drop gesture state and listeners. Later input is ignored.
    pub fn destroy<S: Surface>(&mut self, surface: &mut S) {
        for session in self.pans.finish_all(surface) {
            debug!(pointer_id = session.pointer_id, "pan ended by destroy");
        }
        self.gesture = None;
        self.events.clear();
        self.attached = false;
        debug!(root = %self.root, "zoom destroyed");
    }

    // --- Wheel ---

    pub fn on_wheel<S: Surface>(&mut self, surface: &mut S, ev: &WheelEvent) -> Response {
        if !self.attached || !surface.is_within(ev.target, self.root) {
            return Response::Ignored;
        }
        let focal = ev.position.scaled_down(surface.screen_scale(self.root));
        let factor = 2_f64.powf(-ev.normalized_delta() * self.config.wheel_sensitivity);
        let k = self.clamp_scale(self.transform.k * factor);
        if (k - self.transform.k).abs() < self.config.zoom_epsilon {
            return Response::Consumed;
        }
        let next = self.transform.zoom_around(focal, k);
        self.commit(surface, next, ZoomSource::Wheel);
        Response::Consumed
    }

    // --- Pointer pan ---

    pub fn on_pointer_down<S: Surface>(&mut self, surface: &mut S, ev: &PointerEvent) -> Response {
        if !self.attached || ev.button != Button::Primary || !self.is_pan_target(surface, ev.target) {
            return Response::Ignored;
        }
        let state = PanState { origin_pointer: ev.position, origin_transform: self.transform };
        if !self.pans.begin(surface, ev.pointer_id, self.root, state) {
            return Response::Ignored;
        }
        self.events.emit(&ZoomEvent::PanStarted { pointer_id: ev.pointer_id });
        Response::Consumed
    }

    pub fn on_pointer_move<S: Surface>(&mut self, surface: &mut S, ev: &PointerEvent) -> Response {
        let state = match self.pans.poll(surface, ev.pointer_id) {
            Poll::Missing => return Response::Ignored,
            Poll::Abandoned(_) => {
                self.events.emit(&ZoomEvent::PanEnded { pointer_id: ev.pointer_id });
                return Response::Ignored;
            }
            Poll::Active(session) => session.state,
        };
        let delta = ev
            .position
            .delta_from(state.origin_pointer)
            .scaled_down(surface.screen_scale(self.root));
        let next = state.origin_transform.pan_by(delta.x, delta.y);
        self.commit(surface, next, ZoomSource::Pan);
        Response::Consumed
    }

    pub fn on_pointer_up<S: Surface>(&mut self, surface: &mut S, ev: &PointerEvent) -> Response {
        if self.pans.finish(surface, ev.pointer_id).is_none() {
            return Response::Ignored;
        }
        self.events.emit(&ZoomEvent::PanEnded { pointer_id: ev.pointer_id });
        Response::Consumed
    }

    /// Identical to pointer-up.
    pub fn on_pointer_cancel<S: Surface>(&mut self, surface: &mut S, ev: &PointerEvent) -> Response {
        self.on_pointer_up(surface, ev)
    }

    // --- Pinch gesture ---

    pub fn on_gesture_start<S: Surface>(&mut self, surface: &mut S, ev: &GestureEvent) -> Response {
        if !self.attached {
            return Response::Ignored;
        }
        let center = ev.position.scaled_down(surface.screen_scale(self.root));
        self.gesture = Some(GestureState { start: self.transform, center });
        Response::Consumed
    }

    pub fn on_gesture_change<S: Surface>(&mut self, surface: &mut S, ev: &GestureEvent) -> Response {
        let Some(gesture) = self.gesture else {
            return Response::Ignored;
        };
        let k = self.clamp_scale(gesture.start.k * ev.scale);
        if (k - self.transform.k).abs() < self.config.zoom_epsilon {
            return Response::Consumed;
        }
        let next = gesture.start.zoom_around(gesture.center, k);
        self.commit(surface, next, ZoomSource::Gesture);
        Response::Consumed
    }

    pub fn on_gesture_end(&mut self, _ev: &GestureEvent) -> Response {
        if self.gesture.take().is_some() {
            Response::Consumed
        } else {
            Response::Ignored
        }
    }

    // --- Internals ---

    fn is_pan_target<S: Surface>(&self, surface: &S, target: ElementId) -> bool {
        target == self.root
            || (surface.is_within(target, self.root)
                && (surface.has_class(target, CLASS_BACKGROUND) || surface.has_class(target, CLASS_PAN_GROUP)))
    }

    /// Clamp into the scale extent. Infinities land on the nearer limit; NaN keeps the current scale.
    fn clamp_scale(&self, k: f64) -> f64 {
        if k.is_nan() {
            return self.transform.k;
        }
        let (min, max) = self.config.scale_extent;
        k.max(min).min(max)
    }

    fn viewport_extent<S: Surface>(&mut self, surface: &S) -> Option<Size> {
        if self.viewport.is_none() {
            self.viewport = surface.extent(self.root);
        }
        self.viewport
    }

    fn viewport_center<S: Surface>(&mut self, surface: &S) -> Point {
        self.viewport_extent(surface)
            .map_or(Point::new(0.0, 0.0), |v| Point::new(v.width / 2.0, v.height / 2.0))
    }

    /// Push the transform back inside the pan bounds. When the visible span on
    /// an axis exceeds the bounds span, the bounds are centred on that axis.
    fn constrain<S: Surface>(&mut self, surface: &S, t: Transform) -> Transform {
        let Some(bounds) = self.config.translate_extent else {
            return t;
        };
        let Some(view) = self.viewport_extent(surface) else {
            return t;
        };
        let top_left = t.invert(Point::new(0.0, 0.0));
        let bottom_right = t.invert(Point::new(view.width, view.height));
        let dx0 = top_left.x - bounds.x0;
        let dx1 = bottom_right.x - bounds.x1;
        let dy0 = top_left.y - bounds.y0;
        let dy1 = bottom_right.y - bounds.y1;
        let tx = if dx1 > dx0 { (dx0 + dx1) / 2.0 } else { dx0.min(0.0) + dx1.max(0.0) };
        let ty = if dy1 > dy0 { (dy0 + dy1) / 2.0 } else { dy0.min(0.0) + dy1.max(0.0) };
        t.translate_by(tx, ty)
    }

    fn commit<S: Surface>(&mut self, surface: &mut S, candidate: Transform, source: ZoomSource) -> bool {
        if !self.attached {
            return false;
        }
        if candidate.k.is_nan() {
            warn!(?candidate, "rejecting transform with NaN scale");
            return false;
        }
        let clamped = Transform { k: self.clamp_scale(candidate.k), ..candidate };
        let next = self.constrain(surface, clamped);
        if !next.is_valid() {
            warn!(?candidate, "rejecting degenerate transform");
            return false;
        }
        if next.approx_eq(&self.transform, TRANSFORM_TOLERANCE) {
            return false;
        }
        self.transform = next;
        self.write_out(surface);
        debug!(k = next.k, x = next.x, y = next.y, ?source, "transform changed");
        self.events.emit(&ZoomEvent::TransformChanged { transform: next, source });
        true
    }

    fn write_out<S: Surface>(&self, surface: &mut S) {
        let value = self.transform.to_attribute();
        surface.set_attribute(self.config.layer, ATTR_TRANSFORM, &value);
        surface.set_attribute(self.root, ATTR_ZOOM_MIRROR, &value);
    }
}
