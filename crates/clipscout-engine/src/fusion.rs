//! Signal fusion: candidate generation and composite scoring.
//!
//! Candidates are anchored on detected scenes (one per scene, plus 2-3
//! adjacent-scene merges toward the target duration); when scene evidence is
//! too sparse the engine falls back to fixed-stride sliding windows.
//!
//! Scoring fuses whichever channels produced evidence for this video:
//! `composite = Σ weight_c × channel_score(c, window)`, with the base
//! weights renormalized to sum to 1 across only the non-empty channels — a
//! video with no transcript is never penalized for lacking one.
//!
//! # Aggregation
//!
//! The documented in-window aggregation, applied uniformly to the audio,
//! transcript, and visual channels, is a peak-weighted average:
//! `0.7·max + 0.3·mean` of the in-window event values. The scene channel
//! uses the overlap-weighted mean of its scene scores. Audio silence
//! evidence is folded in as a penalty rather than a value. A duration-fit
//! bell is folded into the scene channel (via each scene's duration score)
//! and applied once more as a global multiplicative soft bound.

use std::collections::BTreeMap;

use tracing::debug;

use clipscout_models::{
    AudioEvent, AudioEventKind, Channel, ChannelEvidence, EngineConfig, HighlightCandidate, Scene,
    TranscriptSignal, VisualSignal,
};

/// A single scored contribution, kept for rationale assembly.
#[derive(Debug, Clone)]
struct Contribution {
    channel: Channel,
    /// Raw (unweighted) value of the contributing event.
    value: f64,
    /// Event time used for deterministic ordering.
    time: f64,
    description: String,
}

/// Fuses per-channel evidence into scored highlight candidates.
pub struct SignalFusionEngine {
    config: EngineConfig,
}

impl SignalFusionEngine {
    /// Create a fusion engine for the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Generate and score candidates from the joined channel evidence.
    ///
    /// Returns candidates sorted by composite score (descending), ties
    /// broken by earlier start then earlier end. An empty result is valid:
    /// a video shorter than the minimum duration yields no candidates.
    pub fn run(&self, evidence: &[ChannelEvidence], duration: f64) -> Vec<HighlightCandidate> {
        let candidates = self.generate_candidates(evidence, duration);
        self.score(candidates, evidence)
    }

    /// Generate unscored candidate windows from the scene evidence.
    pub fn generate_candidates(
        &self,
        evidence: &[ChannelEvidence],
        duration: f64,
    ) -> Vec<HighlightCandidate> {
        let scenes: &[Scene] = evidence
            .iter()
            .find_map(|e| match e {
                ChannelEvidence::Scene(scenes) => Some(scenes.as_slice()),
                _ => None,
            })
            .unwrap_or(&[]);
        self.generate_windows(scenes, duration)
            .into_iter()
            .map(|(start, end)| HighlightCandidate::new(start, end))
            .collect()
    }

    /// Score candidate windows against every non-empty channel.
    pub fn score(
        &self,
        candidates: Vec<HighlightCandidate>,
        evidence: &[ChannelEvidence],
    ) -> Vec<HighlightCandidate> {
        let weights = self.effective_weights(evidence);
        let mut candidates: Vec<HighlightCandidate> = candidates
            .into_iter()
            .map(|c| self.score_window(c.start, c.end, evidence, &weights))
            .collect();

        candidates.sort_by(|a, b| {
            b.composite_score
                .total_cmp(&a.composite_score)
                .then(a.start.total_cmp(&b.start))
                .then(a.end.total_cmp(&b.end))
        });

        debug!(
            candidates = candidates.len(),
            channels = weights.len(),
            "Fusion scoring complete"
        );
        candidates
    }

    /// Base weights renormalized to sum to 1 over non-empty channels.
    pub fn effective_weights(&self, evidence: &[ChannelEvidence]) -> BTreeMap<Channel, f64> {
        let mut weights = BTreeMap::new();
        for e in evidence {
            if !e.is_empty() {
                let base = self.config.weights.get(e.channel());
                if base > 0.0 {
                    weights.insert(e.channel(), base);
                }
            }
        }
        let total: f64 = weights.values().sum();
        if total > 0.0 {
            for w in weights.values_mut() {
                *w /= total;
            }
        }
        weights
    }

    /// Candidate windows: scene-anchored plus adjacent merges, or a
    /// sliding-window fallback when scene evidence is too sparse.
    fn generate_windows(&self, scenes: &[Scene], duration: f64) -> Vec<(f64, f64)> {
        let min = self.config.min_duration;
        let max = self.config.max_duration;
        if duration < min {
            // Shorter than any usable clip: valid input, zero candidates.
            return Vec::new();
        }

        let mut windows: Vec<(f64, f64)> = Vec::new();
        let in_bounds = |start: f64, end: f64| {
            let d = end - start;
            d >= min && d <= max
        };

        for (i, scene) in scenes.iter().enumerate() {
            if in_bounds(scene.start, scene.end) {
                windows.push((scene.start, scene.end));
            }
            // Merge 2-3 adjacent scenes toward the target duration range.
            for span in 2..=3usize {
                if let Some(last) = scenes.get(i + span - 1) {
                    if in_bounds(scene.start, last.end) {
                        windows.push((scene.start, last.end));
                    }
                }
            }
        }

        // Sparse or unreliable scene evidence: fixed-stride sliding windows.
        if windows.len() < 2 {
            let window_len = self.config.ideal_duration.min(duration).max(min);
            let mut start = 0.0;
            while start + window_len <= duration + 1e-9 {
                windows.push((start, start + window_len));
                start += self.config.fallback_stride;
            }
            if windows.is_empty() && in_bounds(0.0, duration) {
                windows.push((0.0, duration));
            }
        }

        windows.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        windows.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9);
        windows
    }

    /// Score one window against every non-empty channel.
    fn score_window(
        &self,
        start: f64,
        end: f64,
        evidence: &[ChannelEvidence],
        weights: &BTreeMap<Channel, f64>,
    ) -> HighlightCandidate {
        let mut candidate = HighlightCandidate::new(start, end);
        let mut contributions: Vec<Contribution> = Vec::new();
        let mut composite = 0.0;

        for e in evidence {
            if e.is_empty() {
                continue;
            }
            let Some(&weight) = weights.get(&e.channel()) else {
                continue;
            };
            let (score, mut channel_contribs) = match e {
                ChannelEvidence::Scene(scenes) => self.scene_score(scenes, start, end),
                ChannelEvidence::Audio(events) => self.audio_score(events, start, end),
                ChannelEvidence::Transcript(signals) => {
                    self.transcript_score(signals, start, end)
                }
                ChannelEvidence::Visual(signals) => self.visual_score(signals, start, end),
            };
            candidate
                .per_channel_scores
                .insert(e.channel(), score.clamp(0.0, 1.0));
            composite += weight * score.clamp(0.0, 1.0);
            // Weight the contribution values so rationale ordering matches
            // actual influence on the composite.
            for c in &mut channel_contribs {
                c.value *= weight;
            }
            contributions.extend(channel_contribs);
        }

        composite *= self.duration_multiplier(end - start);
        candidate.composite_score = composite.clamp(0.0, 1.0);
        candidate.rationale = self.rationale(contributions);
        candidate
    }

    /// Global duration-fit soft bound: never zeroes a window, only damps it.
    fn duration_multiplier(&self, duration: f64) -> f64 {
        let width = ((self.config.max_duration - self.config.min_duration) / 3.0).max(1e-9);
        let offset = (duration - self.config.ideal_duration) / width;
        let fit = (-0.5 * offset * offset).exp();
        0.5 + 0.5 * fit
    }

    /// Peak-weighted average of in-window event values.
    fn aggregate(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let max = values.iter().fold(f64::MIN, |a, &b| a.max(b));
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        0.7 * max + 0.3 * mean
    }

    fn scene_score(&self, scenes: &[Scene], start: f64, end: f64) -> (f64, Vec<Contribution>) {
        let mut weighted = 0.0;
        let mut total_overlap = 0.0;
        let mut best: Option<&Scene> = None;
        for scene in scenes {
            let overlap = scene.overlap(start, end);
            if overlap <= 0.0 {
                continue;
            }
            weighted += scene.score() * overlap;
            total_overlap += overlap;
            if best.map_or(true, |b| scene.score() > b.score()) {
                best = Some(scene);
            }
        }
        if total_overlap <= 0.0 {
            return (0.0, Vec::new());
        }
        let score = weighted / total_overlap;
        let contribs = best
            .map(|scene| {
                vec![Contribution {
                    channel: Channel::Scene,
                    value: scene.score(),
                    time: scene.start,
                    description: format!(
                        "scene: boundary-anchored segment at {:.1}s-{:.1}s (score {:.2})",
                        scene.start,
                        scene.end,
                        scene.score()
                    ),
                }]
            })
            .unwrap_or_default();
        (score, contribs)
    }

    fn audio_score(&self, events: &[AudioEvent], start: f64, end: f64) -> (f64, Vec<Contribution>) {
        let in_window: Vec<&AudioEvent> = events
            .iter()
            .filter(|e| e.time >= start && e.time <= end)
            .collect();

        let positive: Vec<&AudioEvent> = in_window
            .iter()
            .copied()
            .filter(|e| e.kind != AudioEventKind::Silence)
            .collect();
        let values: Vec<f64> = positive.iter().map(|e| e.magnitude).collect();
        let mut score = Self::aggregate(&values);

        // Silence inside the window argues against it as a highlight.
        let silence_penalty = in_window
            .iter()
            .filter(|e| e.kind == AudioEventKind::Silence)
            .map(|e| e.magnitude)
            .fold(0.0f64, f64::max)
            * 0.2;
        score = (score - silence_penalty).max(0.0);

        let contribs = positive
            .iter()
            .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude).then(b.time.total_cmp(&a.time)))
            .map(|e| {
                let kind = match e.kind {
                    AudioEventKind::Spike => "energy spike",
                    AudioEventKind::Peak => "energy peak",
                    AudioEventKind::Silence => "silence",
                };
                vec![Contribution {
                    channel: Channel::Audio,
                    value: e.magnitude,
                    time: e.time,
                    description: format!("audio: {} at {:.1}s ({:.2})", kind, e.time, e.magnitude),
                }]
            })
            .unwrap_or_default();
        (score, contribs)
    }

    fn transcript_score(
        &self,
        signals: &[TranscriptSignal],
        start: f64,
        end: f64,
    ) -> (f64, Vec<Contribution>) {
        let in_window: Vec<&TranscriptSignal> = signals
            .iter()
            .filter(|s| s.midpoint() >= start && s.midpoint() <= end)
            .collect();
        let values: Vec<f64> = in_window.iter().map(|s| s.strength).collect();
        let score = Self::aggregate(&values);

        let contribs = in_window
            .iter()
            .max_by(|a, b| a.strength.total_cmp(&b.strength).then(b.start.total_cmp(&a.start)))
            .map(|s| {
                let kind = match s.kind {
                    clipscout_models::TranscriptSignalKind::Hook => "hook",
                    clipscout_models::TranscriptSignalKind::Question => "question",
                    clipscout_models::TranscriptSignalKind::Punchline => "punchline",
                    clipscout_models::TranscriptSignalKind::Emphasis => "emphasis",
                };
                vec![Contribution {
                    channel: Channel::Transcript,
                    value: s.strength,
                    time: s.start,
                    description: format!(
                        "transcript: {} \"{}\" at {:.1}s-{:.1}s ({:.2})",
                        kind, s.source_text, s.start, s.end, s.strength
                    ),
                }]
            })
            .unwrap_or_default();
        (score, contribs)
    }

    fn visual_score(
        &self,
        signals: &[VisualSignal],
        start: f64,
        end: f64,
    ) -> (f64, Vec<Contribution>) {
        let value_of =
            |s: &VisualSignal| 0.5 * s.salience + 0.25 * s.emotion_score + 0.25 * s.action_score;
        let in_window: Vec<&VisualSignal> = signals
            .iter()
            .filter(|s| s.time >= start && s.time <= end)
            .collect();
        let values: Vec<f64> = in_window.iter().map(|s| value_of(s)).collect();
        let score = Self::aggregate(&values);

        let contribs = in_window
            .iter()
            .max_by(|a, b| {
                value_of(a)
                    .total_cmp(&value_of(b))
                    .then(b.time.total_cmp(&a.time))
            })
            .map(|s| {
                vec![Contribution {
                    channel: Channel::Visual,
                    value: value_of(s),
                    time: s.time,
                    description: format!(
                        "visual: salient moment at {:.1}s (salience {:.2}, action {:.2})",
                        s.time, s.salience, s.action_score
                    ),
                }]
            })
            .unwrap_or_default();
        (score, contribs)
    }

    /// Top 1-3 dominant contributions, ordered by weighted influence.
    fn rationale(&self, mut contributions: Vec<Contribution>) -> Vec<String> {
        contributions.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then(a.channel.cmp(&b.channel))
                .then(a.time.total_cmp(&b.time))
        });
        contributions
            .into_iter()
            .take(3)
            .map(|c| c.description)
            .collect()
    }
}
