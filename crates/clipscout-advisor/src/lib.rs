//! External ranking advisor client.
//!
//! The advisor is an optional collaborator (typically an LLM-backed service)
//! that may re-order the engine's top candidates and attach qualitative
//! notes. It is modeled as a pluggable strategy trait so the core engine
//! stays fully deterministic and runnable offline: with the advisor disabled
//! or unavailable, the engine proceeds with its own ranking unchanged.
//!
//! The advisor can only permute the candidates it is given and annotate
//! them. It cannot add or remove candidates or alter scores, so every
//! selection invariant holds regardless of what it returns.

mod error;
mod http;

pub use error::{AdvisorError, AdvisorResult};
pub use http::HttpRankingAdvisor;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Summary of one candidate sent to the advisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSummary {
    /// Window start in seconds.
    pub start: f64,
    /// Window end in seconds.
    pub end: f64,
    /// Engine composite score (0-1).
    pub composite_score: f64,
    /// Engine rationale strings.
    pub rationale: Vec<String>,
    /// Transcript excerpt for the window, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_excerpt: Option<String>,
}

/// A re-ranking request: the top-N candidates plus video context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankRequest {
    /// Opaque source reference for the video.
    pub video_source: String,
    /// Video duration in seconds.
    pub duration_seconds: f64,
    /// Candidates in the engine's score order.
    pub candidates: Vec<CandidateSummary>,
}

/// One annotated entry of the advisor's response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Index into the request's candidate list.
    pub index: usize,
    /// Optional qualitative note to merge into the candidate's rationale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The advisor's annotated ordering.
///
/// `ranking` must be a permutation of `0..candidates.len()`; the engine
/// discards responses that are not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankResponse {
    /// Candidate indices in the advisor's preferred order, with notes.
    pub ranking: Vec<RankedEntry>,
}

impl RerankResponse {
    /// Check that the ranking is a permutation of `0..len`.
    pub fn is_valid_permutation(&self, len: usize) -> bool {
        if self.ranking.len() != len {
            return false;
        }
        let mut seen = vec![false; len];
        for entry in &self.ranking {
            if entry.index >= len || seen[entry.index] {
                return false;
            }
            seen[entry.index] = true;
        }
        true
    }
}

/// Strategy interface for external candidate re-ranking.
#[async_trait]
pub trait RankingAdvisor: Send + Sync {
    /// Re-rank the given candidates. Implementations should respect the
    /// caller's deadline; the engine also enforces its own timeout.
    async fn rerank(&self, request: RerankRequest) -> AdvisorResult<RerankResponse>;
}

/// Advisor that returns the input order untouched.
///
/// Used when no external service is configured; keeps the advisor code path
/// exercised without changing any ranking.
#[derive(Debug, Clone, Default)]
pub struct NoopAdvisor;

#[async_trait]
impl RankingAdvisor for NoopAdvisor {
    async fn rerank(&self, request: RerankRequest) -> AdvisorResult<RerankResponse> {
        Ok(RerankResponse {
            ranking: (0..request.candidates.len())
                .map(|index| RankedEntry { index, note: None })
                .collect(),
        })
    }
}
