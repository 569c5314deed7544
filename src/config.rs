//! Interaction tuning: limits, thresholds, and transition defaults.
//!
//! Values come from [`InteractionConfig::default`], a JSON document, or
//! `INTERACT_*` environment variables. Every field is optional in JSON and in
//! the environment; missing or unparseable entries fall back to the defaults
//! in [`crate::consts`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    BRUSH_MIN_SIZE, DEFAULT_SCALE_MAX, DEFAULT_SCALE_MIN, TOOLTIP_OFFSET, TRANSITION_DELAY_MS,
    TRANSITION_DURATION_MS, WHEEL_SENSITIVITY, ZOOM_EPSILON,
};
use crate::error::ConfigError;

/// Shared configuration handed to every controller built by
/// [`crate::context::InteractionContext`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Lower zoom scale limit.
    pub scale_min: f64,
    /// Upper zoom scale limit.
    pub scale_max: f64,
    /// Wheel exponent per normalized pixel.
    pub wheel_sensitivity: f64,
    /// Scale changes below this are ignored.
    pub zoom_epsilon: f64,
    /// Brush gestures smaller than this in every relevant dimension clear the selection.
    pub brush_min_size: f64,
    /// Default transition duration.
    pub transition_duration_ms: f64,
    /// Default transition delay.
    pub transition_delay_ms: f64,
    /// Gap between a tooltip and its anchor.
    pub tooltip_offset: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            scale_min: DEFAULT_SCALE_MIN,
            scale_max: DEFAULT_SCALE_MAX,
            wheel_sensitivity: WHEEL_SENSITIVITY,
            zoom_epsilon: ZOOM_EPSILON,
            brush_min_size: BRUSH_MIN_SIZE,
            transition_duration_ms: TRANSITION_DURATION_MS,
            transition_delay_ms: TRANSITION_DELAY_MS,
            tooltip_offset: TOOLTIP_OFFSET,
        }
    }
}

impl InteractionConfig {
    /// Parse a JSON document and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Decode`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value violates a constraint.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `INTERACT_SCALE_MIN` / `INTERACT_SCALE_MAX`: zoom limits (0.1 / 10)
    /// - `INTERACT_WHEEL_SENSITIVITY`: default 0.002
    /// - `INTERACT_ZOOM_EPSILON`: default 0.001
    /// - `INTERACT_BRUSH_MIN_SIZE`: default 5
    /// - `INTERACT_TRANSITION_DURATION_MS`: default 250
    /// - `INTERACT_TRANSITION_DELAY_MS`: default 0
    /// - `INTERACT_TOOLTIP_OFFSET`: default 8
    ///
    /// An environment that yields an invalid combination falls back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            scale_min: env_parse("INTERACT_SCALE_MIN", defaults.scale_min),
            scale_max: env_parse("INTERACT_SCALE_MAX", defaults.scale_max),
            wheel_sensitivity: env_parse("INTERACT_WHEEL_SENSITIVITY", defaults.wheel_sensitivity),
            zoom_epsilon: env_parse("INTERACT_ZOOM_EPSILON", defaults.zoom_epsilon),
            brush_min_size: env_parse("INTERACT_BRUSH_MIN_SIZE", defaults.brush_min_size),
            transition_duration_ms: env_parse("INTERACT_TRANSITION_DURATION_MS", defaults.transition_duration_ms),
            transition_delay_ms: env_parse("INTERACT_TRANSITION_DELAY_MS", defaults.transition_delay_ms),
            tooltip_offset: env_parse("INTERACT_TOOLTIP_OFFSET", defaults.tooltip_offset),
        };
        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!(error = %e, "invalid INTERACT_* environment; using defaults");
                defaults
            }
        }
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale_min > 0.0 && self.scale_min.is_finite()) {
            return Err(invalid("scale_min", format!("must be positive, got {}", self.scale_min)));
        }
        if !(self.scale_max >= self.scale_min && self.scale_max.is_finite()) {
            return Err(invalid(
                "scale_max",
                format!("must be finite and >= scale_min ({}), got {}", self.scale_min, self.scale_max),
            ));
        }
        let non_negative = [
            ("wheel_sensitivity", self.wheel_sensitivity),
            ("zoom_epsilon", self.zoom_epsilon),
            ("brush_min_size", self.brush_min_size),
            ("transition_duration_ms", self.transition_duration_ms),
            ("transition_delay_ms", self.transition_delay_ms),
            ("tooltip_offset", self.tooltip_offset),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(invalid(field, format!("must be a non-negative number, got {value}")));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key).map(|v| v.trim().parse::<T>()) {
        Ok(Ok(value)) => value,
        _ => default,
    }
}
