//! Error types for the few fallible entry points.
//!
//! Controllers never return these: input handlers log and degrade. Only the
//! explicit parse/load functions surface a `Result`.

/// Error returned when a `transform` attribute cannot be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformParseError {
    /// A function name other than `translate` or `scale` was found.
    #[error("unsupported transform function: {0}")]
    UnsupportedFunction(String),
    /// The argument list of a function was missing or malformed.
    #[error("malformed arguments for {function}: {args:?}")]
    MalformedArguments { function: String, args: String },
    /// The resulting scale factor was zero, negative, or not finite.
    #[error("invalid scale factor: {0}")]
    InvalidScale(f64),
}

/// Error returned by [`crate::config::InteractionConfig::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON document could not be decoded.
    #[error("failed to decode interaction config: {0}")]
    Decode(#[from] serde_json::Error),
    /// A value decoded but violates a constraint.
    #[error("invalid interaction config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}
