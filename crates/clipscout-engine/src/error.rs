//! Error types for engine runs.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can end an analysis run.
///
/// Channel-level problems never appear here: a missing, malformed, slow, or
/// panicking channel degrades to empty evidence at the channel boundary and
/// the run completes. Zero viable candidates is an explicit empty selection,
/// not an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] clipscout_models::ConfigError),

    #[error("Run cancelled before the fusion barrier")]
    Cancelled,
}
