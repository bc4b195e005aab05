//! Scene interval model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A contiguous shot segment delimited by detected visual-boundary changes.
///
/// Scenes produced by the detector are ordered, contiguous, and cover
/// `[0, duration)` with no gaps or overlaps.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Scene {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds (exclusive).
    pub end: f64,
    /// Normalized boundary-change intensity at the scene's opening cut (0-1).
    pub change_intensity: f64,
    /// How well the scene duration fits the ideal clip length (0-1).
    pub duration_score: f64,
}

impl Scene {
    /// Duration of the scene in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Combined scene score: duration fit blended with boundary intensity.
    ///
    /// Duration fit dominates; a hard cut into a poorly sized scene is still
    /// a poor clip anchor.
    pub fn score(&self) -> f64 {
        0.6 * self.duration_score + 0.4 * self.change_intensity
    }

    /// Seconds of overlap with the window `[start, end]`.
    pub fn overlap(&self, start: f64, end: f64) -> f64 {
        (self.end.min(end) - self.start.max(start)).max(0.0)
    }
}
