//! Greedy non-overlapping highlight selection.
//!
//! Candidates are taken highest-composite-first; a candidate is kept only if
//! it clears the score floor, fits the duration bounds, and sits at least
//! `min_gap` seconds away from every already-kept highlight. Ties break
//! toward the earlier (then shorter) window so runs are reproducible.
//!
//! Greedy is not globally optimal (weighted interval scheduling would be),
//! but it always keeps the single strongest moment, which matters more here
//! than maximizing the sum of kept scores.

use tracing::debug;

use clipscout_models::{EngineConfig, HighlightCandidate};

/// Selects the final non-overlapping highlight set.
pub struct HighlightSelector {
    config: EngineConfig,
}

impl HighlightSelector {
    /// Create a selector for the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Pick up to `max_highlights` non-conflicting candidates.
    ///
    /// The result is ordered chronologically. An empty result is valid when
    /// nothing clears the score floor or duration bounds.
    pub fn select(&self, candidates: &[HighlightCandidate]) -> Vec<HighlightCandidate> {
        let mut ordered: Vec<HighlightCandidate> = candidates.to_vec();
        ordered.sort_by(|a, b| {
            b.composite_score
                .total_cmp(&a.composite_score)
                .then(a.start.total_cmp(&b.start))
                .then(a.end.total_cmp(&b.end))
        });
        self.select_prioritized(&ordered)
    }

    /// Pick highlights honoring the caller's priority order.
    ///
    /// Same filters and conflict rules as [`select`](Self::select), but
    /// candidates are considered in the given order instead of score order.
    /// Used when an external advisor has re-ranked the top candidates.
    pub fn select_prioritized(&self, ordered: &[HighlightCandidate]) -> Vec<HighlightCandidate> {
        let eligible = ordered.iter().filter(|c| {
            c.composite_score >= self.config.min_score
                && c.duration() >= self.config.min_duration
                && c.duration() <= self.config.max_duration
        });

        let mut selected: Vec<HighlightCandidate> = Vec::new();
        for candidate in eligible {
            if selected.len() >= self.config.max_highlights {
                break;
            }
            let conflicts = selected
                .iter()
                .any(|kept| candidate.gap_to(kept) < self.config.min_gap);
            if !conflicts {
                selected.push(candidate.clone());
            }
        }

        selected.sort_by(|a, b| a.start.total_cmp(&b.start));

        debug!(
            candidates = ordered.len(),
            selected = selected.len(),
            min_score = self.config.min_score,
            "Selection complete"
        );
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(start: f64, end: f64, score: f64) -> HighlightCandidate {
        let mut c = HighlightCandidate::new(start, end);
        c.composite_score = score;
        c
    }

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_empty_input() {
        let selector = HighlightSelector::new(config());
        assert!(selector.select(&[]).is_empty());
    }

    #[test]
    fn test_below_score_floor_dropped() {
        let selector = HighlightSelector::new(config());
        let selected = selector.select(&[candidate(0.0, 30.0, 0.1)]);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_duration_bounds_enforced() {
        let selector = HighlightSelector::new(config());
        let selected = selector.select(&[
            candidate(0.0, 5.0, 0.9),   // too short
            candidate(10.0, 80.0, 0.9), // too long
            candidate(100.0, 130.0, 0.5),
        ]);
        assert_eq!(selected.len(), 1);
        assert!((selected[0].start - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlapping_lower_scorer_suppressed() {
        let selector = HighlightSelector::new(config());
        let selected = selector.select(&[
            candidate(0.0, 30.0, 0.9),
            candidate(10.0, 40.0, 0.8),
            candidate(50.0, 80.0, 0.7),
        ]);
        assert_eq!(selected.len(), 2);
        assert!((selected[0].start - 0.0).abs() < 1e-9);
        assert!((selected[1].start - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_gap_suppresses_near_neighbor() {
        let selector = HighlightSelector::new(config());
        // Non-overlapping but only 2s apart; default min_gap is 5s.
        let selected = selector.select(&[
            candidate(0.0, 30.0, 0.9),
            candidate(32.0, 62.0, 0.8),
            candidate(40.0, 70.0, 0.7),
        ]);
        assert_eq!(selected.len(), 2);
        assert!((selected[1].start - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_highlights_cap() {
        let cfg = config().with_max_highlights(2);
        let selector = HighlightSelector::new(cfg);
        let selected = selector.select(&[
            candidate(0.0, 30.0, 0.9),
            candidate(40.0, 70.0, 0.8),
            candidate(80.0, 110.0, 0.7),
        ]);
        assert_eq!(selected.len(), 2);
        assert!((selected[1].start - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_tie_breaks_toward_earlier_start() {
        let selector = HighlightSelector::new(config());
        let selected = selector.select(&[
            candidate(60.0, 90.0, 0.8),
            candidate(0.0, 30.0, 0.8),
        ]);
        // Both survive (gap 30s); earlier one wins the priority tie and is
        // first chronologically.
        assert_eq!(selected.len(), 2);
        assert!((selected[0].start - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_chronological() {
        let selector = HighlightSelector::new(config());
        let selected = selector.select(&[
            candidate(100.0, 130.0, 0.95),
            candidate(0.0, 30.0, 0.6),
            candidate(50.0, 80.0, 0.7),
        ]);
        assert_eq!(selected.len(), 3);
        for pair in selected.windows(2) {
            assert!(pair[0].start < pair[1].start);
        }
    }

    #[test]
    fn test_prioritized_order_overrides_score() {
        let selector = HighlightSelector::new(config().with_max_highlights(1));
        let weaker = candidate(0.0, 30.0, 0.6);
        let stronger = candidate(50.0, 80.0, 0.9);
        // Caller priority puts the weaker window first; it wins the slot.
        let selected = selector.select_prioritized(&[weaker, stronger]);
        assert_eq!(selected.len(), 1);
        assert!((selected[0].composite_score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_greedy_keeps_strongest_even_when_suboptimal() {
        let selector = HighlightSelector::new(config().with_max_highlights(2));
        // A middle window conflicts with both sides; an optimal pairing
        // would keep the two sides, greedy keeps the strongest middle.
        let selected = selector.select(&[
            candidate(0.0, 30.0, 0.7),
            candidate(28.0, 58.0, 0.9),
            candidate(56.0, 86.0, 0.7),
        ]);
        assert_eq!(selected.len(), 1);
        assert!((selected[0].start - 28.0).abs() < 1e-9);
    }
}
