//! Transcript signal scanning.
//!
//! Lexicon/pattern matching over the timestamped transcript:
//! - **Hooks**: attention-grabbing opener phrases, boosted when they land in
//!   the video's first seconds.
//! - **Questions**: interrogative markers.
//! - **Punchlines**: short, high-emphasis segments immediately following a
//!   pause exceeding a threshold.
//! - **Emphasis**: superlative/intensifier lexicon, or unusually long word
//!   delivery as a loudness proxy.
//!
//! Lexicons and thresholds are product-tunable configuration, not constants.
//! A missing or empty transcript yields an empty list, never an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use clipscout_models::{TranscriptSegment, TranscriptSignal, TranscriptSignalKind};

/// Tunable lexicons and thresholds for transcript scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Opener phrases that mark a hook (matched case-insensitively).
    pub hook_phrases: Vec<String>,

    /// Base strength of a hook match.
    pub hook_weight: f64,

    /// Hooks starting within this many seconds of the video start get the
    /// opener boost.
    pub opener_window: f64,

    /// Additive strength boost for early hooks.
    pub opener_boost: f64,

    /// Words that open an interrogative clause.
    pub question_words: Vec<String>,

    /// Intensifier/superlative lexicon for emphasis detection.
    pub intensifiers: Vec<String>,

    /// A pause longer than this gates punchline detection, in seconds.
    pub pause_threshold: f64,

    /// Maximum word count for a punchline segment.
    pub punchline_max_words: usize,

    /// Average seconds-per-word above which delivery counts as stretched
    /// (loudness proxy for emphasis).
    pub stretched_word_duration: f64,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            hook_phrases: [
                "you won't believe",
                "wait for it",
                "here's the thing",
                "let me tell you",
                "the craziest part",
                "nobody talks about",
                "listen to this",
                "true story",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            hook_weight: 0.7,
            opener_window: 5.0,
            opener_boost: 0.25,
            question_words: [
                "what", "why", "how", "who", "when", "where", "did", "do", "does", "is", "are",
                "can", "could", "would", "will", "have",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            intensifiers: [
                "absolutely",
                "insane",
                "unbelievable",
                "incredible",
                "literally",
                "never",
                "best",
                "worst",
                "craziest",
                "massive",
                "huge",
                "perfect",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            pause_threshold: 1.0,
            punchline_max_words: 8,
            stretched_word_duration: 0.8,
        }
    }
}

impl LexiconConfig {
    /// Builder: replace the hook phrase lexicon.
    pub fn with_hook_phrases(mut self, phrases: Vec<String>) -> Self {
        self.hook_phrases = phrases;
        self
    }

    /// Builder: replace the intensifier lexicon.
    pub fn with_intensifiers(mut self, words: Vec<String>) -> Self {
        self.intensifiers = words;
        self
    }

    /// Builder: set the punchline pause threshold.
    pub fn with_pause_threshold(mut self, seconds: f64) -> Self {
        self.pause_threshold = seconds;
        self
    }
}

/// Scans timestamped transcript segments into tagged signals.
pub struct TranscriptSignalScanner {
    config: LexiconConfig,
}

impl Default for TranscriptSignalScanner {
    fn default() -> Self {
        Self::new(LexiconConfig::default())
    }
}

impl TranscriptSignalScanner {
    /// Create a scanner with the given lexicons.
    pub fn new(config: LexiconConfig) -> Self {
        Self { config }
    }

    /// Scan the transcript. An empty transcript yields an empty list.
    pub fn scan(&self, segments: &[TranscriptSegment]) -> Vec<TranscriptSignal> {
        let mut signals = Vec::new();

        for (i, segment) in segments.iter().enumerate() {
            let text = segment.text.trim();
            if text.is_empty() {
                continue;
            }
            let lowered = text.to_lowercase();
            // Pause before this segment; the opening segment's pause is the
            // lead-in from the video start.
            let pause = if i == 0 {
                segment.start
            } else {
                (segment.start - segments[i - 1].end).max(0.0)
            };
            let pause_boost = if pause > self.config.pause_threshold {
                0.15
            } else {
                0.0
            };

            if let Some(strength) = self.match_hook(&lowered, segment.start) {
                signals.push(self.signal(segment, TranscriptSignalKind::Hook, strength));
            }
            if let Some(strength) = self.match_question(&lowered) {
                signals.push(self.signal(
                    segment,
                    TranscriptSignalKind::Question,
                    (strength + pause_boost).min(1.0),
                ));
            }
            if i > 0 {
                if let Some(strength) = self.match_punchline(segment, pause) {
                    signals.push(self.signal(segment, TranscriptSignalKind::Punchline, strength));
                }
            }
            if let Some(strength) = self.match_emphasis(&lowered, segment) {
                signals.push(self.signal(
                    segment,
                    TranscriptSignalKind::Emphasis,
                    (strength + pause_boost).min(1.0),
                ));
            }
        }

        debug!(
            segments = segments.len(),
            signals = signals.len(),
            "Transcript scan complete"
        );
        signals
    }

    fn signal(
        &self,
        segment: &TranscriptSegment,
        kind: TranscriptSignalKind,
        strength: f64,
    ) -> TranscriptSignal {
        TranscriptSignal {
            start: segment.start,
            end: segment.end,
            kind,
            strength: strength.clamp(0.0, 1.0),
            source_text: segment.text.clone(),
        }
    }

    fn match_hook(&self, lowered: &str, start: f64) -> Option<f64> {
        let hit = self
            .config
            .hook_phrases
            .iter()
            .any(|phrase| lowered.contains(phrase.as_str()));
        if !hit {
            return None;
        }
        let mut strength = self.config.hook_weight;
        if start <= self.config.opener_window {
            strength += self.config.opener_boost;
        }
        Some(strength.min(1.0))
    }

    fn match_question(&self, lowered: &str) -> Option<f64> {
        if lowered.ends_with('?') {
            return Some(0.8);
        }
        let first_word = lowered.split_whitespace().next()?;
        let first_word = first_word.trim_matches(|c: char| !c.is_alphanumeric());
        if self
            .config
            .question_words
            .iter()
            .any(|w| w == first_word)
        {
            return Some(0.55);
        }
        None
    }

    fn match_punchline(&self, segment: &TranscriptSegment, pause: f64) -> Option<f64> {
        if pause < self.config.pause_threshold
            || segment.word_count() > self.config.punchline_max_words
            || segment.word_count() == 0
        {
            return None;
        }
        // Longer beats land harder, up to a cap.
        let pause_bonus = ((pause - self.config.pause_threshold) * 0.15).min(0.3);
        Some(0.6 + pause_bonus)
    }

    fn match_emphasis(&self, lowered: &str, segment: &TranscriptSegment) -> Option<f64> {
        let lexicon_hit = lowered.split_whitespace().any(|word| {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            self.config.intensifiers.iter().any(|w| w == word)
        });
        if lexicon_hit {
            return Some(0.6);
        }

        // Stretched delivery: unusually long per-word duration stands in for
        // loudness when no audio-aligned emphasis data exists.
        let words = segment.word_count();
        if words > 0 {
            let per_word = segment.duration() / words as f64;
            if per_word > self.config.stretched_word_duration {
                let ratio = per_word / self.config.stretched_word_duration;
                return Some((0.4 + 0.2 * (ratio - 1.0)).min(0.8));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment::new(start, end, text)
    }

    fn kinds(signals: &[TranscriptSignal]) -> Vec<TranscriptSignalKind> {
        signals.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_empty_transcript() {
        let scanner = TranscriptSignalScanner::default();
        assert!(scanner.scan(&[]).is_empty());
    }

    #[test]
    fn test_blank_segments_skipped() {
        let scanner = TranscriptSignalScanner::default();
        let signals = scanner.scan(&[seg(0.0, 1.0, "   ")]);
        assert!(signals.is_empty());
    }

    #[test]
    fn test_hook_detection_with_opener_boost() {
        let scanner = TranscriptSignalScanner::default();
        let early = scanner.scan(&[seg(1.0, 3.0, "You won't believe what happened")]);
        let late = scanner.scan(&[seg(120.0, 122.0, "you won't believe what happened")]);

        assert!(kinds(&early).contains(&TranscriptSignalKind::Hook));
        let early_hook = early
            .iter()
            .find(|s| s.kind == TranscriptSignalKind::Hook)
            .unwrap();
        let late_hook = late
            .iter()
            .find(|s| s.kind == TranscriptSignalKind::Hook)
            .unwrap();
        assert!(early_hook.strength > late_hook.strength);
    }

    #[test]
    fn test_question_detection() {
        let scanner = TranscriptSignalScanner::default();
        let signals = scanner.scan(&[seg(12.0, 13.5, "what happened next?")]);
        let question = signals
            .iter()
            .find(|s| s.kind == TranscriptSignalKind::Question)
            .unwrap();
        assert!((question.start - 12.0).abs() < 1e-9);
        assert!(question.strength >= 0.8);
    }

    #[test]
    fn test_interrogative_without_mark_is_weaker() {
        let scanner = TranscriptSignalScanner::default();
        let with_mark = scanner.scan(&[seg(10.0, 12.0, "why did that work?")]);
        let without = scanner.scan(&[seg(10.0, 12.0, "why that worked for them")]);
        let strong = with_mark
            .iter()
            .find(|s| s.kind == TranscriptSignalKind::Question)
            .unwrap();
        let weak = without
            .iter()
            .find(|s| s.kind == TranscriptSignalKind::Question)
            .unwrap();
        assert!(strong.strength > weak.strength);
    }

    #[test]
    fn test_punchline_after_pause() {
        let scanner = TranscriptSignalScanner::default();
        let signals = scanner.scan(&[
            seg(0.0, 4.0, "so we waited and waited for the answer"),
            seg(6.5, 7.5, "it was the cat"),
        ]);
        let punchline = signals
            .iter()
            .find(|s| s.kind == TranscriptSignalKind::Punchline)
            .unwrap();
        assert!((punchline.start - 6.5).abs() < 1e-9);
        assert!(punchline.strength > 0.6);
    }

    #[test]
    fn test_no_punchline_without_pause() {
        let scanner = TranscriptSignalScanner::default();
        let signals = scanner.scan(&[
            seg(0.0, 4.0, "so we waited and waited for the answer"),
            seg(4.2, 5.2, "it was the cat"),
        ]);
        assert!(!kinds(&signals).contains(&TranscriptSignalKind::Punchline));
    }

    #[test]
    fn test_long_segment_is_not_a_punchline() {
        let scanner = TranscriptSignalScanner::default();
        let signals = scanner.scan(&[
            seg(0.0, 4.0, "and then"),
            seg(
                6.5,
                16.5,
                "a very long rambling explanation that keeps going on and on well past the cap",
            ),
        ]);
        assert!(!kinds(&signals).contains(&TranscriptSignalKind::Punchline));
    }

    #[test]
    fn test_emphasis_lexicon() {
        let scanner = TranscriptSignalScanner::default();
        let signals = scanner.scan(&[seg(30.0, 32.0, "that was absolutely insane")]);
        assert!(kinds(&signals).contains(&TranscriptSignalKind::Emphasis));
    }

    #[test]
    fn test_emphasis_stretched_delivery() {
        let scanner = TranscriptSignalScanner::default();
        // Two words over four seconds: 2s per word.
        let signals = scanner.scan(&[seg(30.0, 34.0, "noooo waaay")]);
        assert!(kinds(&signals).contains(&TranscriptSignalKind::Emphasis));
    }

    #[test]
    fn test_custom_lexicon() {
        let config = LexiconConfig::default()
            .with_hook_phrases(vec!["top secret".to_string()]);
        let scanner = TranscriptSignalScanner::new(config);
        let signals = scanner.scan(&[seg(0.0, 2.0, "this is TOP SECRET footage")]);
        assert!(kinds(&signals).contains(&TranscriptSignalKind::Hook));

        let default_scanner = TranscriptSignalScanner::default();
        let none = default_scanner.scan(&[seg(0.0, 2.0, "this is TOP SECRET footage")]);
        assert!(!kinds(&none).contains(&TranscriptSignalKind::Hook));
    }
}
