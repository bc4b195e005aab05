//! Engine configuration.
//!
//! All product-tunable knobs live here; the algorithms hard-code nothing.
//! Configuration is validated synchronously before a run starts — it is the
//! only error path that rejects a run outright.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::signal::Channel;

/// Base per-channel fusion weights.
///
/// These are relative, not required to sum to 1: at run time they are
/// renormalized across only the channels that produced evidence, so a video
/// with no transcript is never penalized for lacking one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChannelWeights {
    pub scene: f64,
    pub audio: f64,
    pub transcript: f64,
    pub visual: f64,
}

impl Default for ChannelWeights {
    fn default() -> Self {
        Self {
            scene: 0.30,
            audio: 0.25,
            transcript: 0.30,
            visual: 0.15,
        }
    }
}

impl ChannelWeights {
    /// Weight for a single channel.
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Scene => self.scene,
            Channel::Audio => self.audio,
            Channel::Transcript => self.transcript,
            Channel::Visual => self.visual,
        }
    }

    /// Sum of all base weights.
    pub fn total(&self) -> f64 {
        self.scene + self.audio + self.transcript + self.visual
    }

    /// Validate: no negative weights, at least one positive.
    pub fn validate(&self) -> ConfigResult<()> {
        for channel in Channel::ALL {
            let w = self.get(channel);
            if !w.is_finite() || w < 0.0 {
                return Err(ConfigError::invalid_weights(format!(
                    "{} weight is {}",
                    channel, w
                )));
            }
        }
        if self.total() <= 0.0 {
            return Err(ConfigError::invalid_weights(
                "all channel weights are zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    // ============================================
    // Selection constraints
    // ============================================
    /// Maximum number of highlights to select.
    pub max_highlights: usize,

    /// Minimum highlight duration in seconds.
    pub min_duration: f64,

    /// Maximum highlight duration in seconds.
    pub max_duration: f64,

    /// Ideal clip length in seconds; the duration-fit bell peaks here.
    pub ideal_duration: f64,

    /// Minimum gap between selected highlights in seconds.
    pub min_gap: f64,

    /// Candidates scoring below this are excluded outright (0-1).
    /// The engine may return fewer than `max_highlights`, including zero.
    pub min_score: f64,

    // ============================================
    // Fusion
    // ============================================
    /// Base per-channel weights, renormalized over non-empty channels.
    pub weights: ChannelWeights,

    /// Stride for the sliding-window candidate fallback, in seconds.
    pub fallback_stride: f64,

    // ============================================
    // Pipeline budgets
    // ============================================
    /// Per-channel extraction timeout. A slow channel degrades to empty
    /// evidence instead of blocking the run.
    pub channel_timeout: Duration,

    // ============================================
    // External ranking advisor
    // ============================================
    /// Whether to consult the external ranking advisor.
    pub use_external_advisor: bool,

    /// How many top candidates to send to the advisor.
    pub advisor_top_n: usize,

    /// Advisor time budget; on expiry the engine proceeds with its own ranking.
    pub advisor_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_highlights: 5,
            min_duration: 10.0,
            max_duration: 60.0,
            ideal_duration: 30.0,
            min_gap: 5.0,
            min_score: 0.2,
            weights: ChannelWeights::default(),
            fallback_stride: 5.0,
            channel_timeout: Duration::from_secs(30),
            use_external_advisor: false,
            advisor_top_n: 10,
            advisor_timeout: Duration::from_secs(20),
        }
    }
}

impl EngineConfig {
    /// Configuration tuned for short-form social clips (tight windows).
    pub fn shorts() -> Self {
        Self {
            min_duration: 8.0,
            max_duration: 45.0,
            ideal_duration: 22.0,
            ..Default::default()
        }
    }

    /// Configuration tuned for podcast/interview sources (longer windows).
    pub fn podcast() -> Self {
        Self {
            min_duration: 20.0,
            max_duration: 90.0,
            ideal_duration: 45.0,
            min_gap: 15.0,
            ..Default::default()
        }
    }

    /// Builder: set the maximum number of highlights.
    pub fn with_max_highlights(mut self, max: usize) -> Self {
        self.max_highlights = max;
        self
    }

    /// Builder: set duration bounds and the ideal target length.
    pub fn with_durations(mut self, min: f64, ideal: f64, max: f64) -> Self {
        self.min_duration = min;
        self.ideal_duration = ideal;
        self.max_duration = max;
        self
    }

    /// Builder: set the minimum inter-highlight gap.
    pub fn with_min_gap(mut self, gap: f64) -> Self {
        self.min_gap = gap;
        self
    }

    /// Builder: set the score floor.
    pub fn with_min_score(mut self, score: f64) -> Self {
        self.min_score = score;
        self
    }

    /// Builder: set the base channel weights.
    pub fn with_weights(mut self, weights: ChannelWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Builder: enable the external ranking advisor.
    pub fn with_external_advisor(mut self, enabled: bool) -> Self {
        self.use_external_advisor = enabled;
        self
    }

    /// Builder: set the per-channel extraction timeout.
    pub fn with_channel_timeout(mut self, timeout: Duration) -> Self {
        self.channel_timeout = timeout;
        self
    }

    /// Validate the configuration. Called before every run.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_highlights == 0 {
            return Err(ConfigError::ZeroMaxHighlights);
        }
        if !self.min_duration.is_finite()
            || !self.max_duration.is_finite()
            || self.min_duration <= 0.0
            || self.max_duration < self.min_duration
        {
            return Err(ConfigError::InvalidDurationBounds {
                min: self.min_duration,
                max: self.max_duration,
            });
        }
        if self.ideal_duration < self.min_duration || self.ideal_duration > self.max_duration {
            return Err(ConfigError::IdealDurationOutOfBounds {
                ideal: self.ideal_duration,
                min: self.min_duration,
                max: self.max_duration,
            });
        }
        if !self.min_gap.is_finite() || self.min_gap < 0.0 {
            return Err(ConfigError::NegativeMinGap(self.min_gap));
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(ConfigError::MinScoreOutOfRange(self.min_score));
        }
        if !self.fallback_stride.is_finite() || self.fallback_stride <= 0.0 {
            return Err(ConfigError::invalid_weights(format!(
                "fallback stride must be positive, got {}",
                self.fallback_stride
            )));
        }
        self.weights.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(EngineConfig::shorts().validate().is_ok());
        assert!(EngineConfig::podcast().validate().is_ok());
    }

    #[test]
    fn test_inverted_durations_rejected() {
        let config = EngineConfig::default().with_durations(30.0, 35.0, 20.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDurationBounds { .. })
        ));
    }

    #[test]
    fn test_ideal_outside_bounds_rejected() {
        let config = EngineConfig::default().with_durations(10.0, 90.0, 60.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::IdealDurationOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_zero_weights_rejected() {
        let config = EngineConfig::default().with_weights(ChannelWeights {
            scene: 0.0,
            audio: 0.0,
            transcript: 0.0,
            visual: 0.0,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let config = EngineConfig::default().with_weights(ChannelWeights {
            scene: -0.1,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_min_score_bounds() {
        assert!(EngineConfig::default().with_min_score(1.5).validate().is_err());
        assert!(EngineConfig::default().with_min_score(0.0).validate().is_ok());
    }

    #[test]
    fn test_zero_max_highlights_rejected() {
        assert!(matches!(
            EngineConfig::default().with_max_highlights(0).validate(),
            Err(ConfigError::ZeroMaxHighlights)
        ));
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::default()
            .with_durations(5.0, 15.0, 30.0)
            .with_min_gap(2.0)
            .with_max_highlights(3);
        assert_eq!(config.max_highlights, 3);
        assert!((config.ideal_duration - 15.0).abs() < 1e-9);
        assert!(config.validate().is_ok());
    }
}
