//! Error types for advisor operations.

use thiserror::Error;

/// Result type for advisor operations.
pub type AdvisorResult<T> = Result<T, AdvisorError>;

/// Errors from the external ranking advisor.
///
/// None of these abort an analysis run; the engine logs them and proceeds
/// with its own ranking.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("Advisor endpoint not configured")]
    NotConfigured,

    #[error("Advisor request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Advisor returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("Advisor exceeded its time budget")]
    Timeout,
}

impl AdvisorError {
    /// Create an invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}
