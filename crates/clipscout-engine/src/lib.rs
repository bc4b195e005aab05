//! Highlight detection engine.
//!
//! Given a long-form video's derived signals, score candidate time-windows,
//! fuse the evidence channels into one composite ranking, and select a final
//! non-overlapping set of highlights for short-clip repurposing.
//!
//! # Architecture
//!
//! ```text
//! AnalysisInput (immutable, shared read-only)
//!     │
//!     ├────────────┬──────────────┬──────────────┐
//!     ▼            ▼              ▼              ▼
//! [SceneBoundary] [AudioEnergy] [Transcript]  [VisualSalience]
//!  Detector        Analyzer      SignalScanner  Scanner
//!     │            │              │              │
//!     └────────────┴──────┬───────┴──────────────┘
//!                         ▼  (barrier: per-channel timeout, degrade to empty)
//!                 [SignalFusionEngine]
//!                  - candidate generation
//!                  - weighted multi-channel scoring
//!                         │
//!                         ▼
//!                 [HighlightSelector]
//!                  - greedy, gap-suppressed selection
//!                         │
//!                         ▼
//!                 HighlightSelection + RunDiagnostics
//! ```
//!
//! Each run is a pure function of its inputs and configuration: identical
//! inputs produce a byte-identical selection. Channel failures never abort a
//! run; they degrade to empty evidence and the remaining channel weights are
//! renormalized.

pub mod audio_energy;
pub mod error;
pub mod fusion;
pub mod pipeline;
pub mod scene_detector;
pub mod selector;
pub mod transcript;
pub mod visual;

pub use audio_energy::{AudioAnalyzerConfig, AudioEnergyAnalyzer};
pub use error::{EngineError, EngineResult};
pub use fusion::SignalFusionEngine;
pub use pipeline::{
    AnalysisReport, AdvisorStatus, ChannelOutcome, HighlightPipeline, RunDiagnostics, RunStage,
};
pub use scene_detector::{SceneBoundaryDetector, SceneDetectorConfig};
pub use selector::HighlightSelector;
pub use transcript::{LexiconConfig, TranscriptSignalScanner};
pub use visual::{VisualAggregatorConfig, VisualSalienceScanner};
