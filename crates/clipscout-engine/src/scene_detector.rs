//! Scene boundary detection from a shot-change delta series.
//!
//! Thresholds the externally supplied frame-difference signal into boundary
//! cuts, builds an ordered set of scenes covering the full timeline, merges
//! scenes shorter than a configured minimum into a neighbor, and scores each
//! scene from a duration-fit bell plus normalized boundary intensity.

use serde::{Deserialize, Serialize};
use tracing::debug;

use clipscout_models::{Scene, SceneDelta};

/// Tunables for scene boundary detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDetectorConfig {
    /// Delta magnitude above which a boundary is marked.
    /// Higher = fewer detected cuts, lower = more sensitive.
    pub boundary_threshold: f64,

    /// Scenes shorter than this are merged into a neighbor, in seconds.
    pub min_scene_duration: f64,

    /// Ideal clip length the duration-fit bell peaks at, in seconds.
    pub ideal_duration: f64,

    /// Width (standard deviation) of the duration-fit bell, in seconds.
    pub bell_width: f64,
}

impl Default for SceneDetectorConfig {
    fn default() -> Self {
        Self {
            boundary_threshold: 0.5,
            min_scene_duration: 3.0,
            ideal_duration: 30.0,
            bell_width: 15.0,
        }
    }
}

impl SceneDetectorConfig {
    /// Builder: set the boundary threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.boundary_threshold = threshold;
        self
    }

    /// Builder: set the minimum scene duration.
    pub fn with_min_scene_duration(mut self, seconds: f64) -> Self {
        self.min_scene_duration = seconds;
        self
    }

    /// Builder: set the ideal duration and bell width.
    pub fn with_duration_bell(mut self, ideal: f64, width: f64) -> Self {
        self.ideal_duration = ideal;
        self.bell_width = width;
        self
    }
}

/// Detects scored scene intervals from a shot-change delta series.
pub struct SceneBoundaryDetector {
    config: SceneDetectorConfig,
}

impl Default for SceneBoundaryDetector {
    fn default() -> Self {
        Self::new(SceneDetectorConfig::default())
    }
}

impl SceneBoundaryDetector {
    /// Create a detector with the given tunables.
    pub fn new(config: SceneDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect scenes covering `[0, duration)`.
    ///
    /// A video with no qualifying boundaries yields one scene scored purely
    /// on duration fit. A duration shorter than any usable clip is still
    /// valid here; downstream candidate generation decides usability.
    pub fn detect(&self, deltas: &[SceneDelta], duration: f64) -> Vec<Scene> {
        if !duration.is_finite() || duration <= 0.0 {
            return Vec::new();
        }

        // Boundary cuts: thresholded deltas strictly inside the timeline,
        // in time order.
        let mut cuts: Vec<(f64, f64)> = deltas
            .iter()
            .filter(|d| {
                d.magnitude > self.config.boundary_threshold
                    && d.time > 0.0
                    && d.time < duration
            })
            .map(|d| (d.time, d.magnitude))
            .collect();
        cuts.sort_by(|a, b| a.0.total_cmp(&b.0));
        cuts.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-6);

        if cuts.is_empty() {
            let fit = self.duration_fit(duration);
            // No opening cut exists, so the blended score reduces to the
            // duration fit alone.
            return vec![Scene {
                start: 0.0,
                end: duration,
                change_intensity: fit,
                duration_score: fit,
            }];
        }

        let max_magnitude = cuts
            .iter()
            .map(|(_, m)| *m)
            .fold(f64::MIN, f64::max)
            .max(f64::EPSILON);

        // Build contiguous intervals; the first scene has no opening cut and
        // carries a neutral intensity.
        let mut intervals: Vec<(f64, f64, f64)> = Vec::with_capacity(cuts.len() + 1);
        let mut prev = 0.0;
        let mut prev_intensity = 0.5;
        for (time, magnitude) in &cuts {
            intervals.push((prev, *time, prev_intensity));
            prev = *time;
            prev_intensity = (magnitude / max_magnitude).clamp(0.0, 1.0);
        }
        intervals.push((prev, duration, prev_intensity));

        self.merge_short(&mut intervals);

        let scenes: Vec<Scene> = intervals
            .iter()
            .map(|&(start, end, intensity)| Scene {
                start,
                end,
                change_intensity: intensity,
                duration_score: self.duration_fit(end - start),
            })
            .collect();

        debug!(
            scene_count = scenes.len(),
            cut_count = cuts.len(),
            duration = duration,
            "Scene detection complete"
        );
        scenes
    }

    /// Merge intervals shorter than the minimum into a neighbor.
    ///
    /// The short interval joins whichever neighbor it shares the weaker
    /// boundary with, so hard cuts survive merging.
    fn merge_short(&self, intervals: &mut Vec<(f64, f64, f64)>) {
        loop {
            if intervals.len() <= 1 {
                return;
            }
            let short_idx = intervals
                .iter()
                .position(|&(start, end, _)| end - start < self.config.min_scene_duration);
            let Some(idx) = short_idx else { return };

            let own_boundary = intervals[idx].2;
            let next_boundary = intervals.get(idx + 1).map(|i| i.2);

            // Merge backward when the opening cut is weaker than the closing
            // one (or when there is no following interval).
            let merge_backward = match next_boundary {
                Some(next) => idx > 0 && own_boundary <= next,
                None => idx > 0,
            };

            if merge_backward {
                let (_, end, _) = intervals.remove(idx);
                intervals[idx - 1].1 = end;
            } else {
                let (start, _, intensity) = intervals.remove(idx);
                intervals[idx].0 = start;
                // Keep the stronger of the two opening cuts.
                intervals[idx].2 = intervals[idx].2.max(intensity);
            }
        }
    }

    /// Bell-shaped duration fit peaking at the ideal clip length.
    fn duration_fit(&self, duration: f64) -> f64 {
        let width = self.config.bell_width.max(f64::EPSILON);
        let offset = (duration - self.config.ideal_duration) / width;
        (-0.5 * offset * offset).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(time: f64, magnitude: f64) -> SceneDelta {
        SceneDelta { time, magnitude }
    }

    fn assert_covers(scenes: &[Scene], duration: f64) {
        assert!((scenes[0].start - 0.0).abs() < 1e-9);
        assert!((scenes.last().unwrap().end - duration).abs() < 1e-9);
        for pair in scenes.windows(2) {
            assert!(
                (pair[0].end - pair[1].start).abs() < 1e-9,
                "gap or overlap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_no_boundaries_single_scene() {
        let detector = SceneBoundaryDetector::default();
        let scenes = detector.detect(&[], 30.0);
        assert_eq!(scenes.len(), 1);
        assert_covers(&scenes, 30.0);
        // 30s at the bell peak: pure duration fit of 1.0 either way.
        assert!((scenes[0].score() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_scene_score_is_duration_fit_only() {
        let config = SceneDetectorConfig::default().with_duration_bell(30.0, 15.0);
        let detector = SceneBoundaryDetector::new(config);
        let scenes = detector.detect(&[], 60.0);
        assert_eq!(scenes.len(), 1);
        let expected_fit = (-0.5f64 * (30.0f64 / 15.0).powi(2)).exp();
        assert!((scenes[0].score() - expected_fit).abs() < 1e-9);
    }

    #[test]
    fn test_boundaries_split_timeline() {
        let detector = SceneBoundaryDetector::default();
        let scenes = detector.detect(&[delta(20.0, 0.9), delta(40.0, 0.8)], 60.0);
        assert_eq!(scenes.len(), 3);
        assert_covers(&scenes, 60.0);
        assert!((scenes[1].start - 20.0).abs() < 1e-9);
        assert!((scenes[1].change_intensity - 1.0).abs() < 1e-9); // 0.9 / 0.9
        assert!((scenes[2].change_intensity - 0.8 / 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_sub_threshold_deltas_ignored() {
        let detector = SceneBoundaryDetector::default();
        let scenes = detector.detect(&[delta(10.0, 0.2), delta(20.0, 0.49)], 60.0);
        assert_eq!(scenes.len(), 1);
    }

    #[test]
    fn test_short_scene_merged() {
        let config = SceneDetectorConfig::default().with_min_scene_duration(5.0);
        let detector = SceneBoundaryDetector::new(config);
        // Cuts at 20s and 22s leave a 2s scene in the middle.
        let scenes = detector.detect(&[delta(20.0, 0.6), delta(22.0, 0.9)], 60.0);
        assert_eq!(scenes.len(), 2);
        assert_covers(&scenes, 60.0);
        for scene in &scenes {
            assert!(scene.duration() >= 5.0);
        }
        // The weaker 20s cut is absorbed; the 22s cut survives.
        assert!((scenes[1].start - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_duration_fit_peaks_at_ideal() {
        let detector = SceneBoundaryDetector::default();
        let at_ideal = detector.duration_fit(30.0);
        let off_ideal = detector.duration_fit(90.0);
        assert!((at_ideal - 1.0).abs() < 1e-9);
        assert!(off_ideal < at_ideal);
        assert!(off_ideal > 0.0);
    }

    #[test]
    fn test_out_of_range_deltas_ignored() {
        let detector = SceneBoundaryDetector::default();
        let scenes = detector.detect(&[delta(-5.0, 0.9), delta(120.0, 0.9)], 60.0);
        assert_eq!(scenes.len(), 1);
        assert_covers(&scenes, 60.0);
    }

    #[test]
    fn test_zero_duration_yields_no_scenes() {
        let detector = SceneBoundaryDetector::default();
        assert!(detector.detect(&[], 0.0).is_empty());
    }

    #[test]
    fn test_determinism() {
        let detector = SceneBoundaryDetector::default();
        let deltas = vec![delta(12.0, 0.7), delta(33.0, 0.55), delta(48.5, 0.95)];
        let a = detector.detect(&deltas, 70.0);
        let b = detector.detect(&deltas, 70.0);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
