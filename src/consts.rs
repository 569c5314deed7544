//! Shared numeric constants and class names.
//!
//! Numeric values here are the defaults of [`crate::config::InteractionConfig`];
//! controllers read the config, not these constants directly.

// ── Zoom ────────────────────────────────────────────────────────

/// Default lower bound for the zoom scale factor.
pub const DEFAULT_SCALE_MIN: f64 = 0.1;

/// Default upper bound for the zoom scale factor.
pub const DEFAULT_SCALE_MAX: f64 = 10.0;

/// Scale changes smaller than this are ignored, so wheel input pinned at a
/// limit does not emit a stream of identical transforms.
pub const ZOOM_EPSILON: f64 = 0.001;

/// Exponent per wheel pixel: `factor = 2^(-delta_y * sensitivity)`.
pub const WHEEL_SENSITIVITY: f64 = 0.002;

/// Wheel delta multiplier for line-based scrolling (one line ≈ 25 px).
pub const WHEEL_LINE_MULTIPLIER: f64 = 25.0;

/// Wheel delta multiplier for page-based scrolling.
pub const WHEEL_PAGE_MULTIPLIER: f64 = 500.0;

/// Trackpad pinch arrives as ctrl+wheel with small deltas; amplify it.
pub const WHEEL_CTRL_MULTIPLIER: f64 = 10.0;

/// Tolerance used when deciding whether a new transform equals the current one.
pub const TRANSFORM_TOLERANCE: f64 = 1e-9;

// ── Brush ───────────────────────────────────────────────────────

/// Gestures whose relevant dimensions are all below this size clear the brush.
pub const BRUSH_MIN_SIZE: f64 = 5.0;

// ── Transitions ─────────────────────────────────────────────────

/// Default transition duration in milliseconds.
pub const TRANSITION_DURATION_MS: f64 = 250.0;

/// Default transition delay in milliseconds.
pub const TRANSITION_DELAY_MS: f64 = 0.0;

// ── Tooltips ────────────────────────────────────────────────────

/// Offset in content units between an anchor and its tooltip.
pub const TOOLTIP_OFFSET: f64 = 8.0;

// ── Attribute and class names ───────────────────────────────────

/// Attribute carrying a positional transform.
pub const ATTR_TRANSFORM: &str = "transform";

/// Attribute on the zoom root mirroring the current transform for readback.
pub const ATTR_ZOOM_MIRROR: &str = "data-zoom";

/// Marks a node as background: pointer-down on it may start a pan or brush.
pub const CLASS_BACKGROUND: &str = "interact-background";

/// Marks a group node whose empty area may start a pan.
pub const CLASS_PAN_GROUP: &str = "interact-pan-group";

/// Invisible rect that receives brush gestures.
pub const CLASS_BRUSH_OVERLAY: &str = "brush-overlay";

/// Visible rect showing the current brush selection.
pub const CLASS_BRUSH_SELECTION: &str = "brush-selection";

/// Node holding tooltip text.
pub const CLASS_TOOLTIP: &str = "interact-tooltip";

/// Applied while an element is being dragged.
pub const CLASS_DRAGGING: &str = "is-dragging";

// ── Coordination states ─────────────────────────────────────────

pub const CLASS_PRIMARY: &str = "is-primary";
pub const CLASS_RELATED: &str = "is-related";
pub const CLASS_SELECTED: &str = "is-selected";
pub const CLASS_DIMMED: &str = "is-dimmed";

/// Group used when an entry is registered without one.
pub const DEFAULT_GROUP: &str = "default";
