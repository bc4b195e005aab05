//! Analysis run orchestration.
//!
//! One run walks a fixed stage machine:
//! `Init → SignalsCollected → CandidatesGenerated → Scored → Selected`.
//!
//! The four channel extractors run as concurrent tasks over a shared
//! immutable input; a per-channel timeout degrades a slow channel to empty
//! evidence instead of failing the run. The only hard error paths are
//! invalid configuration, invalid video metadata, and explicit cancellation,
//! which is honored up to the fusion barrier — once scoring starts, the run
//! completes.
//!
//! The external ranking advisor, when enabled, may permute the top scored
//! candidates and annotate them before selection. Advisor failures never
//! fail the run; the engine proceeds with its own ranking.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use clipscout_advisor::{CandidateSummary, RankingAdvisor, RerankRequest};
use clipscout_models::{
    AnalysisInput, Channel, ChannelEvidence, EngineConfig, HighlightCandidate, HighlightSelection,
    SelectionExport,
};

use crate::audio_energy::{AudioAnalyzerConfig, AudioEnergyAnalyzer};
use crate::error::{EngineError, EngineResult};
use crate::fusion::SignalFusionEngine;
use crate::scene_detector::{SceneBoundaryDetector, SceneDetectorConfig};
use crate::selector::HighlightSelector;
use crate::transcript::{LexiconConfig, TranscriptSignalScanner};
use crate::visual::{VisualAggregatorConfig, VisualSalienceScanner};

/// Progress of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Init,
    SignalsCollected,
    CandidatesGenerated,
    Scored,
    Selected,
}

/// How one channel fared during signal collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelOutcome {
    /// The channel produced evidence.
    Contributed { items: usize },
    /// The channel ran but found nothing (e.g. no transcript exists).
    Empty,
    /// The channel timed out or panicked and was degraded to empty evidence.
    Degraded,
}

/// Outcome of the external advisor consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisorStatus {
    /// Advisor disabled by configuration.
    Disabled,
    /// Advisor enabled but there were no scored candidates to consult on.
    Skipped,
    /// Advisor re-ranking was applied to the top candidates.
    Applied,
    /// Advisor failed, timed out, or answered invalidly; engine order kept.
    Unavailable,
}

/// Per-run metadata for observability.
///
/// Diagnostics carry run identity and wall-clock times, so they are not part
/// of the deterministic output; the selection itself is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDiagnostics {
    /// Unique id for this run.
    pub run_id: Uuid,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed, if it did.
    pub completed_at: Option<DateTime<Utc>>,

    /// Last stage the run reached.
    pub stage: RunStage,

    /// Per-channel collection outcome.
    pub channels: BTreeMap<Channel, ChannelOutcome>,

    /// Fusion weights after renormalization over non-empty channels.
    /// Sums to 1 whenever at least one channel contributed.
    pub effective_weights: BTreeMap<Channel, f64>,

    /// Number of candidate windows generated.
    pub candidate_count: usize,

    /// Outcome of the advisor consultation.
    pub advisor: AdvisorStatus,
}

impl RunDiagnostics {
    fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            completed_at: None,
            stage: RunStage::Init,
            channels: BTreeMap::new(),
            effective_weights: BTreeMap::new(),
            candidate_count: 0,
            advisor: AdvisorStatus::Disabled,
        }
    }
}

/// Result of one analysis run: the selection plus run diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// The final highlight selection, chronological.
    pub selection: HighlightSelection,

    /// Run metadata.
    pub diagnostics: RunDiagnostics,
}

impl AnalysisReport {
    /// The export document consumed by clip generation.
    pub fn export(&self) -> SelectionExport {
        self.selection.to_export()
    }
}

/// End-to-end highlight detection: extract, fuse, select.
pub struct HighlightPipeline {
    config: EngineConfig,
    scene_config: SceneDetectorConfig,
    audio_config: AudioAnalyzerConfig,
    lexicon: LexiconConfig,
    visual_config: VisualAggregatorConfig,
    advisor: Option<Arc<dyn RankingAdvisor>>,
}

impl HighlightPipeline {
    /// Create a pipeline with default extractor tunables.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            scene_config: SceneDetectorConfig::default(),
            audio_config: AudioAnalyzerConfig::default(),
            lexicon: LexiconConfig::default(),
            visual_config: VisualAggregatorConfig::default(),
            advisor: None,
        }
    }

    /// Builder: attach an external ranking advisor.
    pub fn with_advisor(mut self, advisor: Arc<dyn RankingAdvisor>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    /// Builder: override the scene detector tunables.
    pub fn with_scene_config(mut self, config: SceneDetectorConfig) -> Self {
        self.scene_config = config;
        self
    }

    /// Builder: override the audio analyzer tunables.
    pub fn with_audio_config(mut self, config: AudioAnalyzerConfig) -> Self {
        self.audio_config = config;
        self
    }

    /// Builder: override the transcript lexicon.
    pub fn with_lexicon(mut self, lexicon: LexiconConfig) -> Self {
        self.lexicon = lexicon;
        self
    }

    /// Builder: override the visual aggregator tunables.
    pub fn with_visual_config(mut self, config: VisualAggregatorConfig) -> Self {
        self.visual_config = config;
        self
    }

    /// Run a full analysis to completion.
    pub async fn analyze(&self, input: AnalysisInput) -> EngineResult<AnalysisReport> {
        // The sender stays alive for the whole run, so the receiver never
        // fires and the run is uncancellable.
        let (_keep_alive, cancel) = oneshot::channel::<()>();
        self.analyze_cancellable(input, cancel).await
    }

    /// Run a full analysis, honoring cancellation up to the fusion barrier.
    ///
    /// Sending on (or dropping) the paired sender cancels the run while
    /// signal collection is still in flight. Once fusion starts, the run is
    /// committed and completes normally.
    pub async fn analyze_cancellable(
        &self,
        input: AnalysisInput,
        mut cancel: oneshot::Receiver<()>,
    ) -> EngineResult<AnalysisReport> {
        self.config.validate()?;
        input.video.validate()?;

        let mut diagnostics = RunDiagnostics::start();
        let input = Arc::new(input);
        let duration = input.video.duration_seconds;
        info!(
            run_id = %diagnostics.run_id,
            source = %input.video.source,
            duration = duration,
            "Starting highlight analysis"
        );

        let (evidence, channels) = tokio::select! {
            biased;
            _ = &mut cancel => {
                info!(run_id = %diagnostics.run_id, "Run cancelled during signal collection");
                return Err(EngineError::Cancelled);
            }
            collected = self.collect_signals(&input) => collected,
        };
        diagnostics.channels = channels;
        diagnostics.stage = RunStage::SignalsCollected;

        // Last cancellation point before the run commits.
        if !matches!(cancel.try_recv(), Err(TryRecvError::Empty)) {
            info!(run_id = %diagnostics.run_id, "Run cancelled at the fusion barrier");
            return Err(EngineError::Cancelled);
        }

        let fusion = SignalFusionEngine::new(self.config.clone());
        diagnostics.effective_weights = fusion.effective_weights(&evidence);
        let candidates = fusion.generate_candidates(&evidence, duration);
        diagnostics.candidate_count = candidates.len();
        diagnostics.stage = RunStage::CandidatesGenerated;

        let mut scored = fusion.score(candidates, &evidence);
        diagnostics.stage = RunStage::Scored;

        if self.config.use_external_advisor {
            diagnostics.advisor = self.consult_advisor(&mut scored, &input).await;
        }

        let selector = HighlightSelector::new(self.config.clone());
        let mut selection = HighlightSelection {
            highlights: selector.select_prioritized(&scored),
        };
        if diagnostics.advisor == AdvisorStatus::Unavailable {
            for highlight in &mut selection.highlights {
                highlight
                    .rationale
                    .push("advisor unavailable; engine ranking used".to_string());
            }
        }
        diagnostics.stage = RunStage::Selected;
        diagnostics.completed_at = Some(Utc::now());

        info!(
            run_id = %diagnostics.run_id,
            candidates = diagnostics.candidate_count,
            highlights = selection.len(),
            "Analysis complete"
        );
        Ok(AnalysisReport {
            selection,
            diagnostics,
        })
    }

    /// Run the four channel extractors concurrently with a shared deadline.
    async fn collect_signals(
        &self,
        input: &Arc<AnalysisInput>,
    ) -> (Vec<ChannelEvidence>, BTreeMap<Channel, ChannelOutcome>) {
        // The extractors are pure CPU work, so they go to the blocking pool;
        // an async task with no await points could not be preempted by the
        // channel timeout below.
        let scene = {
            let config = self.scene_config.clone();
            let input = Arc::clone(input);
            tokio::task::spawn_blocking(move || {
                let scenes = SceneBoundaryDetector::new(config)
                    .detect(&input.scene_deltas, input.video.duration_seconds);
                ChannelEvidence::Scene(scenes)
            })
        };
        let audio = {
            let config = self.audio_config.clone();
            let input = Arc::clone(input);
            tokio::task::spawn_blocking(move || {
                ChannelEvidence::Audio(
                    AudioEnergyAnalyzer::new(config).analyze(&input.energy_samples),
                )
            })
        };
        let transcript = {
            let lexicon = self.lexicon.clone();
            let input = Arc::clone(input);
            tokio::task::spawn_blocking(move || {
                ChannelEvidence::Transcript(
                    TranscriptSignalScanner::new(lexicon).scan(&input.transcript),
                )
            })
        };
        let visual = {
            let config = self.visual_config.clone();
            let input = Arc::clone(input);
            tokio::task::spawn_blocking(move || {
                ChannelEvidence::Visual(
                    VisualSalienceScanner::new(config).aggregate(&input.frame_descriptors),
                )
            })
        };

        let handles: Vec<(Channel, JoinHandle<ChannelEvidence>)> = vec![
            (Channel::Scene, scene),
            (Channel::Audio, audio),
            (Channel::Transcript, transcript),
            (Channel::Visual, visual),
        ];
        let budget = self.config.channel_timeout;

        let results = join_all(handles.into_iter().map(|(channel, handle)| async move {
            match timeout(budget, handle).await {
                Ok(Ok(evidence)) => (channel, Some(evidence)),
                Ok(Err(join_error)) => {
                    warn!(channel = %channel, error = %join_error, "Channel extraction failed");
                    (channel, None)
                }
                Err(_) => {
                    warn!(channel = %channel, budget = ?budget, "Channel extraction timed out");
                    (channel, None)
                }
            }
        }))
        .await;

        let mut evidence = Vec::with_capacity(results.len());
        let mut outcomes = BTreeMap::new();
        for (channel, collected) in results {
            match collected {
                Some(e) => {
                    let outcome = if e.is_empty() {
                        ChannelOutcome::Empty
                    } else {
                        ChannelOutcome::Contributed { items: e.len() }
                    };
                    outcomes.insert(channel, outcome);
                    evidence.push(e);
                }
                None => {
                    outcomes.insert(channel, ChannelOutcome::Degraded);
                    evidence.push(ChannelEvidence::empty(channel));
                }
            }
        }
        debug!(outcomes = ?outcomes, "Signal collection complete");
        (evidence, outcomes)
    }

    /// Let the advisor permute and annotate the top scored candidates.
    async fn consult_advisor(
        &self,
        scored: &mut [HighlightCandidate],
        input: &AnalysisInput,
    ) -> AdvisorStatus {
        let Some(advisor) = &self.advisor else {
            warn!("External advisor enabled but none attached");
            return AdvisorStatus::Unavailable;
        };
        let top_n = self.config.advisor_top_n.min(scored.len());
        if top_n == 0 {
            debug!("No scored candidates; skipping advisor consultation");
            return AdvisorStatus::Skipped;
        }

        let request = RerankRequest {
            video_source: input.video.source.clone(),
            duration_seconds: input.video.duration_seconds,
            candidates: scored[..top_n]
                .iter()
                .map(|c| CandidateSummary {
                    start: c.start,
                    end: c.end,
                    composite_score: c.composite_score,
                    rationale: c.rationale.clone(),
                    transcript_excerpt: transcript_excerpt(input, c.start, c.end),
                })
                .collect(),
        };

        match timeout(self.config.advisor_timeout, advisor.rerank(request)).await {
            Ok(Ok(response)) if response.is_valid_permutation(top_n) => {
                let reordered: Vec<HighlightCandidate> = response
                    .ranking
                    .iter()
                    .map(|entry| {
                        let mut candidate = scored[entry.index].clone();
                        if let Some(note) = &entry.note {
                            candidate.rationale.push(format!("advisor: {note}"));
                        }
                        candidate
                    })
                    .collect();
                for (slot, candidate) in scored[..top_n].iter_mut().zip(reordered) {
                    *slot = candidate;
                }
                debug!(top_n = top_n, "Advisor re-ranking applied");
                AdvisorStatus::Applied
            }
            Ok(Ok(_)) => {
                warn!("Advisor returned an invalid permutation; keeping engine order");
                AdvisorStatus::Unavailable
            }
            Ok(Err(error)) => {
                warn!(error = %error, "Advisor request failed; keeping engine order");
                AdvisorStatus::Unavailable
            }
            Err(_) => {
                warn!(budget = ?self.config.advisor_timeout, "Advisor timed out; keeping engine order");
                AdvisorStatus::Unavailable
            }
        }
    }
}

/// Transcript text overlapping a window, capped for the advisor payload.
fn transcript_excerpt(input: &AnalysisInput, start: f64, end: f64) -> Option<String> {
    const MAX_CHARS: usize = 240;

    let mut text = String::new();
    for segment in &input.transcript {
        if segment.end > start && segment.start < end {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(segment.text.trim());
            if text.chars().count() >= MAX_CHARS {
                break;
            }
        }
    }
    if text.is_empty() {
        None
    } else {
        Some(text.chars().take(MAX_CHARS).collect())
    }
}
