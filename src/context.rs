//! Interaction context: the per-scene session object.
//!
//! The scene layer owns one [`InteractionContext`] and passes it (or the
//! handles it hands out) to whatever needs shared state. It holds the
//! configuration, the simulation registry, the coordination bus and the
//! transition bridge, and builds controllers from the shared config so every
//! controller in a scene agrees on limits and defaults. The datum table stays
//! with the scene layer because it owns the data binding.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use tracing::info;

use crate::brush::{BrushConfig, BrushController};
use crate::config::InteractionConfig;
use crate::coordination::CoordinationBus;
use crate::drag::DragController;
use crate::geometry::Rect;
use crate::simulation::SimulationRegistry;
use crate::surface::{ElementId, Surface};
use crate::transition::{TransitionBatch, TransitionBridge, TransitionId};
use crate::zoom::{ZoomConfig, ZoomController};

#[derive(Debug)]
pub struct InteractionContext {
    config: InteractionConfig,
    simulations: SimulationRegistry,
    bus: CoordinationBus,
    transitions: TransitionBridge,
}

impl Default for InteractionContext {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl InteractionContext {
    #[must_use]
    pub fn new(config: InteractionConfig) -> Self {
        info!(
            scale_min = config.scale_min,
            scale_max = config.scale_max,
            brush_min_size = config.brush_min_size,
            "interaction context created"
        );
        Self {
            simulations: SimulationRegistry::new(),
            bus: CoordinationBus::new(config.tooltip_offset),
            transitions: TransitionBridge::new(&config),
            config,
        }
    }

    /// Context configured from `INTERACT_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(InteractionConfig::from_env())
    }

    #[must_use]
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    #[must_use]
    pub fn simulations(&self) -> &SimulationRegistry {
        &self.simulations
    }

    /// Shared bus handle. Clones refer to the same groups.
    #[must_use]
    pub fn bus(&self) -> &CoordinationBus {
        &self.bus
    }

    #[must_use]
    pub fn transitions(&self) -> &TransitionBridge {
        &self.transitions
    }

    pub fn transitions_mut(&mut self) -> &mut TransitionBridge {
        &mut self.transitions
    }

    /// Attach zoom behaviour to `root`, transforming `layer`.
    pub fn zoom<S: Surface>(&self, surface: &mut S, root: ElementId, layer: ElementId) -> ZoomController {
        ZoomController::attach(surface, root, ZoomConfig::from_config(layer, &self.config))
    }

    /// Drag controller sharing this context's simulation registry.
    #[must_use]
    pub fn drag(&self) -> DragController {
        DragController::new(self.simulations.clone())
    }

    /// Attach a 2D brush over `extent` under `parent`.
    pub fn brush<S: Surface>(&self, surface: &mut S, parent: ElementId, extent: Rect) -> Option<BrushController> {
        BrushController::attach(surface, parent, BrushConfig::from_config(extent, &self.config))
    }

    /// Start a transition batch for `element`.
    #[must_use]
    pub fn transition(&self, element: ElementId) -> TransitionBatch {
        TransitionBatch::new(element)
    }

    /// Commit `batch` on this context's bridge.
    pub fn commit<S: Surface>(&mut self, surface: &mut S, batch: TransitionBatch, now_ms: f64) -> Option<TransitionId> {
        self.transitions.commit(surface, batch, now_ms)
    }

    /// Advance running transitions. Returns how many are still running.
    pub fn tick<S: Surface>(&mut self, surface: &mut S, now_ms: f64) -> usize {
        self.transitions.tick(surface, now_ms)
    }
}
