//! Visual salience aggregation.
//!
//! The vision collaborator supplies sparse per-frame descriptors; this
//! module only clamps and smooths them into time-aligned `VisualSignal`s at
//! the supplied cadence. No inference happens here. With no descriptors the
//! output is empty and fusion renormalizes the remaining channel weights.

use serde::{Deserialize, Serialize};
use tracing::debug;

use clipscout_models::{clamp_unit, FrameDescriptor, VisualSignal};

/// Tunables for visual descriptor aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualAggregatorConfig {
    /// Centered moving-average window, in seconds.
    pub smoothing_window: f64,

    /// Additive salience bonus when a face is present in the source
    /// descriptor (applied before smoothing, capped at 1).
    pub face_bonus: f64,
}

impl Default for VisualAggregatorConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 2.0,
            face_bonus: 0.1,
        }
    }
}

impl VisualAggregatorConfig {
    /// Builder: set the smoothing window.
    pub fn with_smoothing_window(mut self, seconds: f64) -> Self {
        self.smoothing_window = seconds;
        self
    }

    /// Builder: set the face-presence bonus.
    pub fn with_face_bonus(mut self, bonus: f64) -> Self {
        self.face_bonus = bonus;
        self
    }
}

/// Aggregates external frame descriptors into smoothed visual signals.
pub struct VisualSalienceScanner {
    config: VisualAggregatorConfig,
}

impl Default for VisualSalienceScanner {
    fn default() -> Self {
        Self::new(VisualAggregatorConfig::default())
    }
}

impl VisualSalienceScanner {
    /// Create a scanner with the given tunables.
    pub fn new(config: VisualAggregatorConfig) -> Self {
        Self { config }
    }

    /// Aggregate descriptors into signals at the supplied cadence.
    pub fn aggregate(&self, descriptors: &[FrameDescriptor]) -> Vec<VisualSignal> {
        if descriptors.is_empty() {
            return Vec::new();
        }

        let mut ordered: Vec<FrameDescriptor> = descriptors
            .iter()
            .filter(|d| d.time.is_finite())
            .copied()
            .collect();
        ordered.sort_by(|a, b| a.time.total_cmp(&b.time));

        // Clamp first so malformed values cannot leak through smoothing.
        let clamped: Vec<(f64, f64, f64, f64)> = ordered
            .iter()
            .map(|d| {
                let mut salience = clamp_unit(d.salience, "visual.salience");
                if d.face_present {
                    salience = (salience + self.config.face_bonus).min(1.0);
                }
                (
                    d.time,
                    salience,
                    clamp_unit(d.emotion, "visual.emotion"),
                    clamp_unit(d.action, "visual.action"),
                )
            })
            .collect();

        let half = self.config.smoothing_window / 2.0;
        let signals: Vec<VisualSignal> = clamped
            .iter()
            .map(|&(time, _, _, _)| {
                let mut salience = 0.0;
                let mut emotion = 0.0;
                let mut action = 0.0;
                let mut count = 0usize;
                for &(t, s, e, a) in &clamped {
                    if (t - time).abs() <= half {
                        salience += s;
                        emotion += e;
                        action += a;
                        count += 1;
                    }
                }
                let n = count.max(1) as f64;
                VisualSignal {
                    time,
                    salience: salience / n,
                    emotion_score: emotion / n,
                    action_score: action / n,
                }
            })
            .collect();

        debug!(
            descriptors = descriptors.len(),
            signals = signals.len(),
            "Visual aggregation complete"
        );
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(time: f64, salience: f64) -> FrameDescriptor {
        FrameDescriptor {
            time,
            salience,
            face_present: false,
            emotion: 0.3,
            action: 0.2,
        }
    }

    #[test]
    fn test_empty_descriptors() {
        let scanner = VisualSalienceScanner::default();
        assert!(scanner.aggregate(&[]).is_empty());
    }

    #[test]
    fn test_cadence_preserved() {
        let scanner = VisualSalienceScanner::default();
        let descriptors: Vec<_> = (0..10).map(|i| descriptor(i as f64 * 1.5, 0.5)).collect();
        let signals = scanner.aggregate(&descriptors);
        assert_eq!(signals.len(), 10);
        for (d, s) in descriptors.iter().zip(&signals) {
            assert!((d.time - s.time).abs() < 1e-9);
        }
    }

    #[test]
    fn test_smoothing_dampens_outlier() {
        let scanner = VisualSalienceScanner::default();
        let mut descriptors: Vec<_> = (0..10).map(|i| descriptor(i as f64, 0.2)).collect();
        descriptors[5].salience = 1.0;
        let signals = scanner.aggregate(&descriptors);
        // The outlier is averaged with its neighbors.
        assert!(signals[5].salience < 1.0);
        assert!(signals[5].salience > 0.2);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let scanner =
            VisualSalienceScanner::new(VisualAggregatorConfig::default().with_smoothing_window(0.0));
        let signals = scanner.aggregate(&[FrameDescriptor {
            time: 1.0,
            salience: 1.7,
            face_present: false,
            emotion: -0.4,
            action: 0.5,
        }]);
        assert_eq!(signals.len(), 1);
        assert!((signals[0].salience - 1.0).abs() < 1e-9);
        assert_eq!(signals[0].emotion_score, 0.0);
    }

    #[test]
    fn test_face_bonus_applied() {
        let scanner =
            VisualSalienceScanner::new(VisualAggregatorConfig::default().with_smoothing_window(0.0));
        let base = FrameDescriptor {
            time: 1.0,
            salience: 0.5,
            face_present: false,
            emotion: 0.0,
            action: 0.0,
        };
        let with_face = FrameDescriptor {
            face_present: true,
            ..base
        };
        let plain = scanner.aggregate(&[base]);
        let boosted = scanner.aggregate(&[with_face]);
        assert!(boosted[0].salience > plain[0].salience);
    }

    #[test]
    fn test_unsorted_input_sorted_by_time() {
        let scanner = VisualSalienceScanner::default();
        let signals = scanner.aggregate(&[descriptor(5.0, 0.4), descriptor(1.0, 0.6)]);
        assert!(signals[0].time < signals[1].time);
    }
}
