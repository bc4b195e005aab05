//! Per-channel signal events and the tagged channel evidence container.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::scene::Scene;

/// Kind of a sparse audio event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AudioEventKind {
    /// Instantaneous energy exceeding the rolling mean plus k·stddev.
    Spike,
    /// Local maximum of the smoothed energy curve.
    Peak,
    /// Sustained low-energy run. Used as negative/boundary-hint evidence.
    Silence,
}

/// A sparse point event extracted from the audio energy series.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AudioEvent {
    /// Event time in seconds.
    pub time: f64,
    /// Event kind.
    pub kind: AudioEventKind,
    /// Normalized magnitude (0-1).
    pub magnitude: f64,
}

/// Kind of a transcript-derived signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSignalKind {
    /// Attention-grabbing opener phrase.
    Hook,
    /// Interrogative segment.
    Question,
    /// Short high-emphasis segment immediately after a pause.
    Punchline,
    /// Superlative/intensifier usage or stretched word delivery.
    Emphasis,
}

/// A tagged signal extracted from the transcript.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSignal {
    /// Start of the matched span in seconds.
    pub start: f64,
    /// End of the matched span in seconds.
    pub end: f64,
    /// Signal kind.
    pub kind: TranscriptSignalKind,
    /// Match strength (0-1): lexicon weight combined with local context.
    pub strength: f64,
    /// The text that produced the match, for rationale strings.
    pub source_text: String,
}

impl TranscriptSignal {
    /// Midpoint of the matched span, used for window containment.
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// A time-aligned visual salience sample aggregated from external descriptors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct VisualSignal {
    /// Sample time in seconds.
    pub time: f64,
    /// Smoothed visual salience (0-1).
    pub salience: f64,
    /// Smoothed emotion intensity (0-1).
    pub emotion_score: f64,
    /// Smoothed motion/action magnitude (0-1).
    pub action_score: f64,
}

/// One independent evidence channel feeding signal fusion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Scene,
    Audio,
    Transcript,
    Visual,
}

impl Channel {
    /// All channels in canonical order.
    pub const ALL: [Channel; 4] = [
        Channel::Scene,
        Channel::Audio,
        Channel::Transcript,
        Channel::Visual,
    ];

    /// Stable lowercase name for logs and rationale strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Scene => "scene",
            Channel::Audio => "audio",
            Channel::Transcript => "transcript",
            Channel::Visual => "visual",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one extractor, tagged by channel.
///
/// Fusion pattern-matches on this rather than working over an untyped merged
/// structure, so there is never ambiguity about which fields apply to which
/// channel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChannelEvidence {
    Scene(Vec<Scene>),
    Audio(Vec<AudioEvent>),
    Transcript(Vec<TranscriptSignal>),
    Visual(Vec<VisualSignal>),
}

impl ChannelEvidence {
    /// The channel this evidence belongs to.
    pub fn channel(&self) -> Channel {
        match self {
            ChannelEvidence::Scene(_) => Channel::Scene,
            ChannelEvidence::Audio(_) => Channel::Audio,
            ChannelEvidence::Transcript(_) => Channel::Transcript,
            ChannelEvidence::Visual(_) => Channel::Visual,
        }
    }

    /// Whether the channel produced any events.
    pub fn is_empty(&self) -> bool {
        match self {
            ChannelEvidence::Scene(scenes) => scenes.is_empty(),
            ChannelEvidence::Audio(events) => events.is_empty(),
            ChannelEvidence::Transcript(signals) => signals.is_empty(),
            ChannelEvidence::Visual(signals) => signals.is_empty(),
        }
    }

    /// Number of events in the channel.
    pub fn len(&self) -> usize {
        match self {
            ChannelEvidence::Scene(scenes) => scenes.len(),
            ChannelEvidence::Audio(events) => events.len(),
            ChannelEvidence::Transcript(signals) => signals.len(),
            ChannelEvidence::Visual(signals) => signals.len(),
        }
    }

    /// An empty evidence value for the given channel.
    pub fn empty(channel: Channel) -> Self {
        match channel {
            Channel::Scene => ChannelEvidence::Scene(Vec::new()),
            Channel::Audio => ChannelEvidence::Audio(Vec::new()),
            Channel::Transcript => ChannelEvidence::Transcript(Vec::new()),
            Channel::Visual => ChannelEvidence::Visual(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        assert_eq!(Channel::Scene.as_str(), "scene");
        assert_eq!(Channel::Transcript.to_string(), "transcript");
    }

    #[test]
    fn test_empty_evidence() {
        for channel in Channel::ALL {
            let evidence = ChannelEvidence::empty(channel);
            assert_eq!(evidence.channel(), channel);
            assert!(evidence.is_empty());
            assert_eq!(evidence.len(), 0);
        }
    }

    #[test]
    fn test_transcript_midpoint() {
        let signal = TranscriptSignal {
            start: 12.0,
            end: 13.5,
            kind: TranscriptSignalKind::Question,
            strength: 0.9,
            source_text: "what happened next?".to_string(),
        };
        assert!((signal.midpoint() - 12.75).abs() < 1e-9);
    }

    #[test]
    fn test_evidence_serde_tagging() {
        let evidence = ChannelEvidence::Audio(vec![AudioEvent {
            time: 1.0,
            kind: AudioEventKind::Spike,
            magnitude: 0.8,
        }]);
        let json = serde_json::to_string(&evidence).unwrap();
        assert!(json.contains("\"audio\""));
        let back: ChannelEvidence = serde_json::from_str(&json).unwrap();
        assert_eq!(back.channel(), Channel::Audio);
        assert_eq!(back.len(), 1);
    }
}
