//! Error types for model validation.

use thiserror::Error;

/// Result type for configuration and model validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors rejected synchronously before an analysis run starts.
///
/// Signal-level problems (missing channels, out-of-range values) are never
/// errors; they degrade inside the run. Only configuration and input-shape
/// problems are surfaced here.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid duration bounds: min {min}s, max {max}s")]
    InvalidDurationBounds { min: f64, max: f64 },

    #[error("Ideal duration {ideal}s outside [{min}s, {max}s]")]
    IdealDurationOutOfBounds { ideal: f64, min: f64, max: f64 },

    #[error("Negative minimum gap: {0}s")]
    NegativeMinGap(f64),

    #[error("Minimum score {0} outside [0, 1]")]
    MinScoreOutOfRange(f64),

    #[error("max_highlights must be at least 1")]
    ZeroMaxHighlights,

    #[error("Invalid channel weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid video: {0}")]
    InvalidVideo(String),

    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),
}

impl ConfigError {
    /// Create an invalid-weights error.
    pub fn invalid_weights(message: impl Into<String>) -> Self {
        Self::InvalidWeights(message.into())
    }

    /// Create an invalid-video error.
    pub fn invalid_video(message: impl Into<String>) -> Self {
        Self::InvalidVideo(message.into())
    }

    /// Create an invalid-timestamp error.
    pub fn invalid_timestamp(ts: impl Into<String>) -> Self {
        Self::InvalidTimestamp(ts.into())
    }
}
