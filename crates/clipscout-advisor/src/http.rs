//! HTTP implementation of the ranking advisor.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{AdvisorError, AdvisorResult};
use crate::{RankingAdvisor, RerankRequest, RerankResponse};

/// Environment variable holding the advisor API key.
const API_KEY_ENV: &str = "CLIPSCOUT_ADVISOR_API_KEY";

/// Ranking advisor backed by an HTTP JSON endpoint.
///
/// Posts the candidate summaries to `{base_url}/rerank` and expects a
/// `RerankResponse` body. The request timeout is enforced here in addition
/// to the engine's own advisor budget.
pub struct HttpRankingAdvisor {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpRankingAdvisor {
    /// Create an advisor for the given endpoint, reading the API key from
    /// `CLIPSCOUT_ADVISOR_API_KEY` when set.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> AdvisorResult<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(AdvisorError::NotConfigured);
        }
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(AdvisorError::Http)?;
        Ok(Self {
            base_url,
            api_key: std::env::var(API_KEY_ENV).ok(),
            client,
        })
    }

    /// Override the API key (primarily for tests).
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/rerank", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RankingAdvisor for HttpRankingAdvisor {
    async fn rerank(&self, request: RerankRequest) -> AdvisorResult<RerankResponse> {
        let candidate_count = request.candidates.len();
        debug!(
            endpoint = %self.endpoint(),
            candidates = candidate_count,
            "Sending rerank request to advisor"
        );

        let mut http_request = self.client.post(self.endpoint()).json(&request);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request.send().await.map_err(|e| {
            if e.is_timeout() {
                AdvisorError::Timeout
            } else {
                AdvisorError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Advisor returned non-success status");
            return Err(AdvisorError::invalid_response(format!(
                "status {}",
                status
            )));
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::invalid_response(e.to_string()))?;

        if !parsed.is_valid_permutation(candidate_count) {
            return Err(AdvisorError::invalid_response(
                "ranking is not a permutation of the request candidates".to_string(),
            ));
        }

        Ok(parsed)
    }
}
