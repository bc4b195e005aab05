//! Video metadata for an analysis run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Immutable metadata about the video under analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoInfo {
    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Source frame rate (frames per second).
    pub frame_rate: f64,

    /// Opaque reference to the source (URL, path, or storage key).
    pub source: String,
}

impl VideoInfo {
    /// Create video metadata.
    pub fn new(duration_seconds: f64, frame_rate: f64, source: impl Into<String>) -> Self {
        Self {
            duration_seconds,
            frame_rate,
            source: source.into(),
        }
    }

    /// Validate the metadata before a run starts.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.duration_seconds.is_finite() || self.duration_seconds <= 0.0 {
            return Err(ConfigError::invalid_video(format!(
                "non-positive duration: {}",
                self.duration_seconds
            )));
        }
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(ConfigError::invalid_video(format!(
                "non-positive frame rate: {}",
                self.frame_rate
            )));
        }
        Ok(())
    }
}
