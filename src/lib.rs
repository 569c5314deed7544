//! Interaction core for data-bound vector scenes.
//!
//! This crate turns raw pointer, wheel and gesture input into scene mutations:
//! pan/zoom of a transformed layer, dragging of bound elements (optionally
//! pinning them inside a physics simulation), region brushing, coordinated
//! highlight state across groups of elements, and timed attribute
//! transitions. It never renders. Everything it does goes through the
//! [`surface::Surface`] attribute layer, so the host decides what an element
//! is and [`surface::MemorySurface`] stands in for it in tests.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`context`] | Per-scene session object that builds controllers from shared config |
//! | [`zoom`] | Pan/zoom controller with scale and translate limits |
//! | [`drag`] | Free and physics-pinned drag sessions |
//! | [`simulation`] | Simulation id → reheat callback registry |
//! | [`brush`] | Rectangular and axis-constrained selection |
//! | [`coordination`] | Grouped highlight state and tooltips |
//! | [`transition`] | Batched, timed attribute interpolation |
//! | [`transform`] | Scale + translate value type and its attribute format |
//! | [`session`] | Per-pointer session table with capture-loss detection |
//! | [`surface`] | Attribute-layer trait and the in-memory implementation |
//! | [`datum`] | Element → datum side table |
//! | [`events`] | Listener lists and subscriptions |
//! | [`input`] | Input event types |
//! | [`geometry`] | Points, sizes, rectangles |
//! | [`config`] | Tunables with defaults, JSON and environment loading |
//! | [`error`] | Parse and configuration errors |
//! | [`consts`] | Shared numeric constants and class names |

pub mod brush;
pub mod config;
pub mod consts;
pub mod context;
pub mod coordination;
pub mod datum;
pub mod drag;
pub mod error;
pub mod events;
pub mod geometry;
pub mod input;
pub mod session;
pub mod simulation;
pub mod surface;
pub mod transform;
pub mod transition;
pub mod zoom;

pub use context::InteractionContext;
pub use surface::{ElementId, MemorySurface, Surface};
pub use transform::Transform;
