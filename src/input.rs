//! Input model: pointer, wheel and pinch-gesture events as delivered by the host.
//!
//! The host translates native events into these types. Positions are in the
//! screen space of the element the controller is attached to, before any outer
//! viewport scaling is removed; controllers divide by
//! [`crate::surface::Surface::screen_scale`] themselves.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::consts::{WHEEL_CTRL_MULTIPLIER, WHEEL_LINE_MULTIPLIER, WHEEL_PAGE_MULTIPLIER};
use crate::geometry::Point;
use crate::surface::ElementId;

/// Identifier the host assigns to an active pointer (mouse, pen, or touch).
pub type PointerId = i32;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button, pen contact, or touch.
    #[default]
    Primary,
    /// Middle mouse button.
    Middle,
    /// Right mouse button.
    Secondary,
}

/// A pointer down/move/up/cancel event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    /// The element the event was dispatched to (the hit target).
    pub target: ElementId,
    /// Position in the attached root's screen space.
    pub position: Point,
    #[serde(default)]
    pub button: Button,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    #[must_use]
    pub fn new(pointer_id: PointerId, target: ElementId, position: Point) -> Self {
        Self { pointer_id, target, position, button: Button::Primary, modifiers: Modifiers::default() }
    }
}

/// Unit of a wheel delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

/// Wheel / trackpad scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub target: ElementId,
    pub position: Point,
    /// Vertical scroll amount (positive = down, zooms out).
    pub delta_y: f64,
    #[serde(default)]
    pub delta_mode: DeltaMode,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl WheelEvent {
    /// Vertical delta normalized to pixels, with the ctrl pinch amplification applied.
    #[must_use]
    pub fn normalized_delta(&self) -> f64 {
        let unit = match self.delta_mode {
            DeltaMode::Pixel => 1.0,
            DeltaMode::Line => WHEEL_LINE_MULTIPLIER,
            DeltaMode::Page => WHEEL_PAGE_MULTIPLIER,
        };
        let ctrl = if self.modifiers.ctrl { WHEEL_CTRL_MULTIPLIER } else { 1.0 };
        self.delta_y * unit * ctrl
    }
}

/// Platform pinch gesture (e.g. Safari `gesturestart`/`gesturechange`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    /// Gesture center in the attached root's screen space.
    pub position: Point,
    /// Cumulative scale relative to gesture start (1.0 = unchanged).
    pub scale: f64,
}

/// What the host should do with the native event after a handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// Not handled; let the event continue normally.
    Ignored,
    /// Handled; the host should call `preventDefault` / stop propagation.
    Consumed,
}

impl Response {
    #[must_use]
    pub fn is_consumed(self) -> bool {
        self == Self::Consumed
    }
}
