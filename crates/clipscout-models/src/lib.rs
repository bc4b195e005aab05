//! Shared data models for the ClipScout highlight engine.
//!
//! This crate provides Serde-serializable types for:
//! - Run inputs (video metadata and raw signal series)
//! - Per-channel signal events (scene, audio, transcript, visual)
//! - Highlight candidates and the final selection
//! - Engine configuration with synchronous validation
//! - The external export format consumed by clip generation

pub mod candidate;
pub mod config;
pub mod error;
pub mod inputs;
pub mod scene;
pub mod selection;
pub mod signal;
pub mod timestamp;
pub mod utils;
pub mod video;

// Re-export common types
pub use candidate::HighlightCandidate;
pub use config::{ChannelWeights, EngineConfig};
pub use error::{ConfigError, ConfigResult};
pub use inputs::{AnalysisInput, EnergySample, FrameDescriptor, SceneDelta, TranscriptSegment};
pub use scene::Scene;
pub use selection::{HighlightSelection, SelectedHighlight, SelectionExport};
pub use signal::{AudioEvent, AudioEventKind, Channel, ChannelEvidence, TranscriptSignal, TranscriptSignalKind, VisualSignal};
pub use timestamp::{format_timestamp, parse_timestamp};
pub use utils::clamp_unit;
pub use video::VideoInfo;
