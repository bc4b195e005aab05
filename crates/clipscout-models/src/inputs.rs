//! Raw signal series consumed from external collaborators.
//!
//! The engine never produces these itself: scene-change deltas and audio
//! energy come from the media-decoding component, transcript segments from
//! the transcription component, and frame descriptors from the vision
//! component. An empty series means "no evidence from this channel" and is
//! always valid input.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::video::VideoInfo;

/// One sample of the shot-change delta series (frame-difference magnitude).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct SceneDelta {
    /// Sample time in seconds.
    pub time: f64,
    /// Pixel/histogram delta magnitude. Larger means a harder visual change.
    pub magnitude: f64,
}

/// One sample of the audio loudness/energy series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct EnergySample {
    /// Sample time in seconds.
    pub time: f64,
    /// Energy value. Any non-negative scale; the analyzer normalizes internally.
    pub energy: f64,
}

/// One timestamped transcript segment (word or caption chunk).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    /// Segment start in seconds.
    pub start: f64,
    /// Segment end in seconds.
    pub end: f64,
    /// Spoken text for the segment.
    pub text: String,
}

impl TranscriptSegment {
    /// Create a transcript segment.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Duration of the segment in seconds.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// One sparse per-frame visual descriptor from the external vision component.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct FrameDescriptor {
    /// Descriptor time in seconds.
    pub time: f64,
    /// Visual salience estimate (0-1).
    pub salience: f64,
    /// Whether a face was detected near this time.
    pub face_present: bool,
    /// Emotion intensity estimate (0-1).
    pub emotion: f64,
    /// Motion/action magnitude (0-1).
    pub action: f64,
}

/// Complete, immutable input bundle for one analysis run.
///
/// The four extractors read this concurrently; nothing mutates it after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisInput {
    /// Video metadata.
    pub video: VideoInfo,

    /// Shot-change delta series. Empty when no boundary data is available.
    #[serde(default)]
    pub scene_deltas: Vec<SceneDelta>,

    /// Audio energy series. Empty when no audio track exists.
    #[serde(default)]
    pub energy_samples: Vec<EnergySample>,

    /// Ordered transcript segments. Empty when no transcript exists.
    #[serde(default)]
    pub transcript: Vec<TranscriptSegment>,

    /// Sparse visual descriptors. Empty when the vision provider was skipped.
    #[serde(default)]
    pub frame_descriptors: Vec<FrameDescriptor>,
}

impl AnalysisInput {
    /// Create an input bundle with no signal series attached.
    pub fn new(video: VideoInfo) -> Self {
        Self {
            video,
            scene_deltas: Vec::new(),
            energy_samples: Vec::new(),
            transcript: Vec::new(),
            frame_descriptors: Vec::new(),
        }
    }

    /// Attach the scene-change delta series.
    pub fn with_scene_deltas(mut self, deltas: Vec<SceneDelta>) -> Self {
        self.scene_deltas = deltas;
        self
    }

    /// Attach the audio energy series.
    pub fn with_energy_samples(mut self, samples: Vec<EnergySample>) -> Self {
        self.energy_samples = samples;
        self
    }

    /// Attach the transcript.
    pub fn with_transcript(mut self, segments: Vec<TranscriptSegment>) -> Self {
        self.transcript = segments;
        self
    }

    /// Attach the visual descriptors.
    pub fn with_frame_descriptors(mut self, descriptors: Vec<FrameDescriptor>) -> Self {
        self.frame_descriptors = descriptors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_word_count() {
        let seg = TranscriptSegment::new(1.0, 2.5, "you will not believe this");
        assert_eq!(seg.word_count(), 5);
        assert!((seg.duration() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_segment_negative_duration_clamped() {
        let seg = TranscriptSegment::new(3.0, 2.0, "oops");
        assert_eq!(seg.duration(), 0.0);
    }

    #[test]
    fn test_input_builder() {
        let input = AnalysisInput::new(VideoInfo::new(60.0, 30.0, "vod/x"))
            .with_scene_deltas(vec![SceneDelta { time: 20.0, magnitude: 0.9 }])
            .with_transcript(vec![TranscriptSegment::new(0.0, 1.0, "hello")]);
        assert_eq!(input.scene_deltas.len(), 1);
        assert_eq!(input.transcript.len(), 1);
        assert!(input.energy_samples.is_empty());
    }
}
