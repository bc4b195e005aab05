//! Highlight candidate model.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::signal::Channel;

/// A scored candidate time-window.
///
/// Candidates are ephemeral: they are recomputed on every run from the
/// immutable inputs and configuration, never persisted as engine state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HighlightCandidate {
    /// Window start in seconds.
    pub start: f64,

    /// Window end in seconds.
    pub end: f64,

    /// Score each channel contributed, before weighting (0-1 each).
    /// BTreeMap keeps iteration and serialization order deterministic.
    pub per_channel_scores: BTreeMap<Channel, f64>,

    /// Fused composite score (0-1).
    pub composite_score: f64,

    /// Top dominant contributing signals, for auditability only.
    pub rationale: Vec<String>,
}

impl HighlightCandidate {
    /// Create an unscored candidate window.
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            per_channel_scores: BTreeMap::new(),
            composite_score: 0.0,
            rationale: Vec::new(),
        }
    }

    /// Window duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether this window overlaps another.
    pub fn overlaps(&self, other: &HighlightCandidate) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Gap in seconds to another window. Negative when the windows overlap.
    pub fn gap_to(&self, other: &HighlightCandidate) -> f64 {
        if self.overlaps(other) {
            // Negative overlap amount, so gap comparisons stay monotonic.
            -(self.end.min(other.end) - self.start.max(other.start))
        } else if self.end <= other.start {
            other.start - self.end
        } else {
            self.start - other.end
        }
    }

    /// Whether the window contains a point in time.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_and_contains() {
        let c = HighlightCandidate::new(10.0, 25.0);
        assert!((c.duration() - 15.0).abs() < 1e-9);
        assert!(c.contains(10.0));
        assert!(c.contains(25.0));
        assert!(!c.contains(25.1));
    }

    #[test]
    fn test_overlap() {
        let a = HighlightCandidate::new(0.0, 20.0);
        let b = HighlightCandidate::new(15.0, 30.0);
        let c = HighlightCandidate::new(25.0, 40.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_gap() {
        let a = HighlightCandidate::new(0.0, 20.0);
        let b = HighlightCandidate::new(23.0, 40.0);
        assert!((a.gap_to(&b) - 3.0).abs() < 1e-9);
        assert!((b.gap_to(&a) - 3.0).abs() < 1e-9);

        let overlapping = HighlightCandidate::new(15.0, 30.0);
        assert!(a.gap_to(&overlapping) < 0.0);
    }

    #[test]
    fn test_adjacent_windows_do_not_overlap() {
        let a = HighlightCandidate::new(0.0, 20.0);
        let b = HighlightCandidate::new(20.0, 40.0);
        assert!(!a.overlaps(&b));
        assert_eq!(a.gap_to(&b), 0.0);
    }
}
