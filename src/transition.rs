//! Transition bridge: batched, timed attribute interpolation.
//!
//! DESIGN
//! ======
//! Targets for one element are collected in a [`TransitionBatch`]; nothing
//! touches the surface until [`TransitionBridge::commit`], which reads every
//! current value as the start, drops any running track for the same
//! attribute, and starts one animation for the whole batch. Time only moves
//! through [`TransitionBridge::tick`]: the host calls it from its frame loop
//! with a monotonic clock. When an animation completes, target values are
//! written verbatim as the persisted state and the element is removed if
//! the batch asked for it.
//!
//! Attributes the surface cannot animate are written at commit time; a
//! requested removal then runs from a plain timer at `delay + duration`.

#[cfg(test)]
#[path = "transition_test.rs"]
mod transition_test;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::InteractionConfig;
use crate::events::Emitter;
use crate::surface::{ElementId, Surface};
use crate::transform::Transform;

pub type TransitionId = Uuid;

/// Easing curves over `t ∈ [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    #[default]
    CubicInOut,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.max(0.0).min(1.0);
        match self {
            Self::Linear => t,
            Self::QuadIn => t * t,
            Self::QuadOut => t * (2.0 - t),
            Self::CubicInOut => {
                let t2 = t * 2.0;
                if t2 <= 1.0 {
                    t2 * t2 * t2 / 2.0
                } else {
                    let u = t2 - 2.0;
                    (u * u * u + 2.0) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TransitionEvent {
    Started { id: TransitionId, element: ElementId, attributes: Vec<String> },
    /// `interrupted` is set when a later commit took over every track.
    Ended { id: TransitionId, element: ElementId, interrupted: bool },
}

// =============================================================================
// BATCH
// =============================================================================

/// Attribute targets for one element, committed together.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionBatch {
    element: ElementId,
    targets: Vec<(String, String)>,
    duration_ms: Option<f64>,
    delay_ms: Option<f64>,
    easing: Easing,
    remove: bool,
}

impl TransitionBatch {
    #[must_use]
    pub fn new(element: ElementId) -> Self {
        Self { element, targets: Vec::new(), duration_ms: None, delay_ms: None, easing: Easing::default(), remove: false }
    }

    /// Set a target. A later target for the same attribute replaces the earlier one.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.targets.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.targets.push((name, value)),
        }
        self
    }

    #[must_use]
    pub fn duration(mut self, ms: f64) -> Self {
        self.duration_ms = Some(ms.max(0.0));
        self
    }

    #[must_use]
    pub fn delay(mut self, ms: f64) -> Self {
        self.delay_ms = Some(ms.max(0.0));
        self
    }

    #[must_use]
    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Detach the element once the transition completes.
    #[must_use]
    pub fn remove_on_end(mut self) -> Self {
        self.remove = true;
        self
    }

    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }

    #[must_use]
    pub fn targets(&self) -> &[(String, String)] {
        &self.targets
    }

    /// Shorthand for [`TransitionBridge::commit`].
    pub fn commit<S: Surface>(self, bridge: &mut TransitionBridge, surface: &mut S, now_ms: f64) -> Option<TransitionId> {
        bridge.commit(surface, self, now_ms)
    }
}

// =============================================================================
// VALUES
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Endpoint {
    Number(f64),
    Transform(Transform),
    Discrete,
}

impl Endpoint {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<f64>()
            && n.is_finite()
        {
            return Self::Number(n);
        }
        if (trimmed.starts_with("translate") || trimmed.starts_with("scale"))
            && let Ok(t) = trimmed.parse::<Transform>()
        {
            return Self::Transform(t);
        }
        Self::Discrete
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Track {
    name: String,
    from: Endpoint,
    to: Endpoint,
    target: String,
}

impl Track {
    /// Interpolated value, or `None` for discrete values, which jump to the
    /// target on completion.
    fn value_at(&self, eased: f64) -> Option<String> {
        match (&self.from, &self.to) {
            (Endpoint::Number(a), Endpoint::Number(b)) => Some(lerp(*a, *b, eased).to_string()),
            (Endpoint::Transform(a), Endpoint::Transform(b)) => Some(
                Transform::new(lerp(a.k, b.k, eased), lerp(a.x, b.x, eased), lerp(a.y, b.y, eased)).to_attribute(),
            ),
            _ => None,
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[derive(Debug, Clone, PartialEq)]
struct Animation {
    id: TransitionId,
    element: ElementId,
    tracks: Vec<Track>,
    start_ms: f64,
    duration_ms: f64,
    easing: Easing,
    remove: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RemovalTimer {
    element: ElementId,
    due_ms: f64,
}

// =============================================================================
// BRIDGE
// =============================================================================

/// Running animations and removal timers.
#[derive(Debug)]
pub struct TransitionBridge {
    default_duration_ms: f64,
    default_delay_ms: f64,
    running: Vec<Animation>,
    timers: Vec<RemovalTimer>,
    events: Emitter<TransitionEvent>,
}

impl Default for TransitionBridge {
    fn default() -> Self {
        Self::new(&InteractionConfig::default())
    }
}

impl TransitionBridge {
    #[must_use]
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            default_duration_ms: config.transition_duration_ms,
            default_delay_ms: config.transition_delay_ms,
            running: Vec::new(),
            timers: Vec::new(),
            events: Emitter::new(),
        }
    }

    #[must_use]
    pub fn events(&self) -> &Emitter<TransitionEvent> {
        &self.events
    }

    /// Number of animations still running (including delayed ones).
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.running.len()
    }

    #[must_use]
    pub fn pending_removals(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.running.is_empty() && self.timers.is_empty()
    }

    /// Whether `name` on `element` is currently being animated.
    #[must_use]
    pub fn is_animating(&self, element: ElementId, name: &str) -> bool {
        self.running
            .iter()
            .any(|a| a.element == element && a.tracks.iter().any(|t| t.name == name))
    }

    /// Start the batch. Returns the animation id, or `None` when every target
    /// was applied immediately (or there was nothing to do).
    pub fn commit<S: Surface>(&mut self, surface: &mut S, batch: TransitionBatch, now_ms: f64) -> Option<TransitionId> {
        let element = batch.element;
        if !surface.contains(element) {
            debug!(%element, "transition on detached element dropped");
            return None;
        }
        let duration_ms = batch.duration_ms.unwrap_or(self.default_duration_ms);
        let delay_ms = batch.delay_ms.unwrap_or(self.default_delay_ms);

        let mut tracks = Vec::new();
        for (name, target) in batch.targets {
            if !surface.can_animate(element, &name) {
                debug!(%element, attribute = %name, "attribute not animatable; setting immediately");
                surface.set_attribute(element, &name, &target);
                continue;
            }
            let to = Endpoint::parse(&target);
            let from = match (&to, surface.attribute(element, &name)) {
                (Endpoint::Number(_), _) => Endpoint::Number(surface.read_attribute_number(element, &name)),
                (Endpoint::Transform(_), None) => Endpoint::Transform(Transform::IDENTITY),
                (_, Some(current)) => Endpoint::parse(&current),
                (_, None) => Endpoint::Discrete,
            };
            tracks.push(Track { name, from, to, target });
        }

        if tracks.is_empty() {
            if batch.remove {
                self.timers.push(RemovalTimer { element, due_ms: now_ms + delay_ms + duration_ms });
            }
            return None;
        }

        let names: Vec<String> = tracks.iter().map(|t| t.name.clone()).collect();
        self.interrupt(element, &names);

        let id = Uuid::new_v4();
        debug!(%id, %element, attributes = ?names, duration_ms, delay_ms, "transition committed");
        self.running.push(Animation {
            id,
            element,
            tracks,
            start_ms: now_ms + delay_ms,
            duration_ms,
            easing: batch.easing,
            remove: batch.remove,
        });
        self.events.emit(&TransitionEvent::Started { id, element, attributes: names });
        Some(id)
    }

    /// Stop every animation on `element` without writing final values.
    pub fn cancel(&mut self, element: ElementId) -> usize {
        let (cancelled, kept): (Vec<Animation>, Vec<Animation>) =
            std::mem::take(&mut self.running).into_iter().partition(|a| a.element == element);
        self.running = kept;
        for anim in &cancelled {
            self.events.emit(&TransitionEvent::Ended { id: anim.id, element, interrupted: true });
        }
        cancelled.len()
    }

    /// Advance to `now_ms`, writing interpolated values and finishing
    /// completed animations. Returns how many animations are still running.
    pub fn tick<S: Surface>(&mut self, surface: &mut S, now_ms: f64) -> usize {
        let mut finished = Vec::new();
        for anim in &self.running {
            if !surface.contains(anim.element) {
                debug!(id = %anim.id, element = %anim.element, "animated element removed; dropping transition");
                finished.push((anim.id, anim.element, true));
                continue;
            }
            if now_ms < anim.start_ms {
                continue;
            }
            let progress = if anim.duration_ms <= 0.0 {
                1.0
            } else {
                ((now_ms - anim.start_ms) / anim.duration_ms).min(1.0)
            };
            if progress >= 1.0 {
                for track in &anim.tracks {
                    surface.set_attribute(anim.element, &track.name, &track.target);
                }
                if anim.remove {
                    surface.remove_element(anim.element);
                }
                finished.push((anim.id, anim.element, false));
            } else {
                let eased = anim.easing.apply(progress);
                for track in &anim.tracks {
                    if let Some(value) = track.value_at(eased) {
                        surface.set_attribute(anim.element, &track.name, &value);
                    }
                }
            }
        }

        self.running.retain(|a| !finished.iter().any(|(id, _, _)| *id == a.id));

        let (due, pending): (Vec<RemovalTimer>, Vec<RemovalTimer>) =
            std::mem::take(&mut self.timers).into_iter().partition(|t| t.due_ms <= now_ms);
        self.timers = pending;
        for timer in due {
            surface.remove_element(timer.element);
        }

        for (id, element, dropped) in finished {
            self.events.emit(&TransitionEvent::Ended { id, element, interrupted: dropped });
        }
        self.running.len()
    }

    /// Drop tracks for `names` on `element`; animations left with no tracks
    /// end as interrupted.
    fn interrupt(&mut self, element: ElementId, names: &[String]) {
        let mut emptied = Vec::new();
        for anim in self.running.iter_mut().filter(|a| a.element == element) {
            anim.tracks.retain(|t| !names.contains(&t.name));
            if anim.tracks.is_empty() {
                emptied.push(anim.id);
            }
        }
        if emptied.is_empty() {
            return;
        }
        self.running.retain(|a| !emptied.contains(&a.id));
        for id in emptied {
            debug!(%id, %element, "transition interrupted");
            self.events.emit(&TransitionEvent::Ended { id, element, interrupted: true });
        }
    }
}
