//! Audio energy analysis.
//!
//! Turns a per-sample loudness/energy series into sparse events:
//! - **Spikes**: instantaneous energy exceeding a rolling mean plus
//!   `k·stddev` over a trailing window.
//! - **Peaks**: local maxima of a moving-average smoothed curve within a
//!   configurable radius.
//! - **Silence**: runs below an energy floor longer than a threshold, used
//!   as negative/boundary-hint evidence downstream.
//!
//! The analysis is deterministic for identical input series and parameters.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use clipscout_models::{AudioEvent, AudioEventKind, EnergySample};

/// Tunables for audio energy analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioAnalyzerConfig {
    /// Trailing window for the rolling mean/stddev, in seconds.
    pub rolling_window: f64,

    /// Spike threshold in standard deviations above the rolling mean.
    pub spike_sigma: f64,

    /// Minimum spacing between reported spikes, in seconds.
    pub spike_spacing: f64,

    /// Moving-average smoothing window for peak detection, in seconds.
    pub smoothing_window: f64,

    /// Radius a local maximum must dominate, in seconds.
    pub peak_radius: f64,

    /// Silence floor as a fraction of the series mean energy.
    pub silence_floor_ratio: f64,

    /// Minimum silence run length to report, in seconds.
    pub min_silence_duration: f64,

    /// Run length at which silence magnitude saturates at 1.0, in seconds.
    pub silence_full_scale: f64,
}

impl Default for AudioAnalyzerConfig {
    fn default() -> Self {
        Self {
            rolling_window: 5.0,
            spike_sigma: 2.0,
            spike_spacing: 0.5,
            smoothing_window: 1.0,
            peak_radius: 2.0,
            silence_floor_ratio: 0.1,
            min_silence_duration: 0.75,
            silence_full_scale: 3.0,
        }
    }
}

impl AudioAnalyzerConfig {
    /// Builder: set the spike threshold in standard deviations.
    pub fn with_spike_sigma(mut self, sigma: f64) -> Self {
        self.spike_sigma = sigma;
        self
    }

    /// Builder: set the rolling window length.
    pub fn with_rolling_window(mut self, seconds: f64) -> Self {
        self.rolling_window = seconds;
        self
    }

    /// Builder: set the peak dominance radius.
    pub fn with_peak_radius(mut self, seconds: f64) -> Self {
        self.peak_radius = seconds;
        self
    }

    /// Builder: set the silence floor and minimum run length.
    pub fn with_silence(mut self, floor_ratio: f64, min_duration: f64) -> Self {
        self.silence_floor_ratio = floor_ratio;
        self.min_silence_duration = min_duration;
        self
    }
}

/// Extracts sparse spike/peak/silence events from an energy series.
pub struct AudioEnergyAnalyzer {
    config: AudioAnalyzerConfig,
}

impl Default for AudioEnergyAnalyzer {
    fn default() -> Self {
        Self::new(AudioAnalyzerConfig::default())
    }
}

impl AudioEnergyAnalyzer {
    /// Create an analyzer with the given tunables.
    pub fn new(config: AudioAnalyzerConfig) -> Self {
        Self { config }
    }

    /// Analyze the energy series into sparse events, ordered by time.
    pub fn analyze(&self, samples: &[EnergySample]) -> Vec<AudioEvent> {
        if samples.len() < 2 {
            return Vec::new();
        }

        let mut series: Vec<EnergySample> = samples
            .iter()
            .filter(|s| s.time.is_finite() && s.energy.is_finite())
            .copied()
            .collect();
        series.sort_by(|a, b| a.time.total_cmp(&b.time));
        if series.len() < 2 {
            return Vec::new();
        }

        let mut events = Vec::new();
        events.extend(self.detect_spikes(&series));
        events.extend(self.detect_peaks(&series));
        events.extend(self.detect_silence(&series));
        events.sort_by(|a, b| a.time.total_cmp(&b.time));

        debug!(
            samples = series.len(),
            events = events.len(),
            "Audio energy analysis complete"
        );
        events
    }

    /// Spikes: energy above rolling mean + `spike_sigma`·stddev.
    ///
    /// The trailing window `[start, i)` is maintained incrementally as a
    /// running sum and sum of squares, so the whole pass is linear in the
    /// series length.
    fn detect_spikes(&self, series: &[EnergySample]) -> Vec<AudioEvent> {
        let mut spikes = Vec::new();
        let mut last_spike_time = f64::NEG_INFINITY;

        let mut start = 0usize;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;

        for (i, sample) in series.iter().enumerate() {
            if i > 0 {
                let entering = series[i - 1].energy;
                sum += entering;
                sum_sq += entering * entering;
            }
            let window_start = sample.time - self.config.rolling_window;
            while start < i && series[start].time < window_start {
                let leaving = series[start].energy;
                sum -= leaving;
                sum_sq -= leaving * leaving;
                start += 1;
            }
            let len = i - start;
            if len < 3 {
                continue;
            }

            let n = len as f64;
            let mean = sum / n;
            // Guard against cancellation pushing the variance negative.
            let variance = (sum_sq / n - mean * mean).max(0.0);
            let stddev = variance.sqrt();
            if stddev < 1e-9 {
                continue;
            }

            let z = (sample.energy - mean) / stddev;
            if z > self.config.spike_sigma
                && sample.time - last_spike_time >= self.config.spike_spacing
            {
                spikes.push(AudioEvent {
                    time: sample.time,
                    kind: AudioEventKind::Spike,
                    // Saturates at twice the trigger threshold.
                    magnitude: (z / (2.0 * self.config.spike_sigma)).min(1.0),
                });
                last_spike_time = sample.time;
            }
        }
        spikes
    }

    /// Peaks: local maxima of the smoothed curve that rise above its mean.
    fn detect_peaks(&self, series: &[EnergySample]) -> Vec<AudioEvent> {
        let smoothed = self.smooth(series);
        let mean_smoothed = smoothed.iter().sum::<f64>() / smoothed.len() as f64;
        let max_smoothed = smoothed.iter().fold(f64::MIN, |a, &b| a.max(b));
        if max_smoothed <= 1e-12 || max_smoothed - mean_smoothed < 1e-9 {
            // Flat series has no meaningful peaks.
            return Vec::new();
        }

        // Sliding-window maximum over the dominance radius. The deque holds
        // indices with non-increasing smoothed values; strict pops keep the
        // earliest index at the front on ties, so a sample dominates exactly
        // when it is the front of its own window.
        let mut peaks = Vec::new();
        let mut window: VecDeque<usize> = VecDeque::new();
        let mut next = 0usize;
        for i in 0..series.len() {
            let t = series[i].time;
            while next < series.len() && series[next].time <= t + self.config.peak_radius {
                while let Some(&back) = window.back() {
                    if smoothed[back] < smoothed[next] {
                        window.pop_back();
                    } else {
                        break;
                    }
                }
                window.push_back(next);
                next += 1;
            }
            while let Some(&front) = window.front() {
                if series[front].time < t - self.config.peak_radius {
                    window.pop_front();
                } else {
                    break;
                }
            }
            if smoothed[i] > mean_smoothed && window.front() == Some(&i) {
                peaks.push(AudioEvent {
                    time: t,
                    kind: AudioEventKind::Peak,
                    magnitude: (smoothed[i] / max_smoothed).clamp(0.0, 1.0),
                });
            }
        }
        peaks
    }

    /// Silence: sub-floor runs longer than the minimum, one event at the
    /// run midpoint with magnitude proportional to run length.
    fn detect_silence(&self, series: &[EnergySample]) -> Vec<AudioEvent> {
        let mean_energy = series.iter().map(|s| s.energy).sum::<f64>() / series.len() as f64;
        let floor = mean_energy * self.config.silence_floor_ratio;

        let mut events = Vec::new();
        let mut run_start: Option<f64> = None;
        let mut run_end = 0.0;

        for sample in series {
            if sample.energy < floor {
                if run_start.is_none() {
                    run_start = Some(sample.time);
                }
                run_end = sample.time;
            } else if let Some(start) = run_start.take() {
                self.push_silence(&mut events, start, run_end);
            }
        }
        if let Some(start) = run_start {
            self.push_silence(&mut events, start, run_end);
        }
        events
    }

    fn push_silence(&self, events: &mut Vec<AudioEvent>, start: f64, end: f64) {
        let run = end - start;
        if run >= self.config.min_silence_duration {
            events.push(AudioEvent {
                time: (start + end) / 2.0,
                kind: AudioEventKind::Silence,
                magnitude: (run / self.config.silence_full_scale).min(1.0),
            });
        }
    }

    /// Centered moving average over the smoothing window, one pass with a
    /// running sum over `[lo, hi)`.
    fn smooth(&self, series: &[EnergySample]) -> Vec<f64> {
        let half = self.config.smoothing_window / 2.0;
        let mut out = Vec::with_capacity(series.len());
        let mut lo = 0usize;
        let mut hi = 0usize;
        let mut sum = 0.0;
        for center in series {
            while hi < series.len() && series[hi].time <= center.time + half {
                sum += series[hi].energy;
                hi += 1;
            }
            while series[lo].time < center.time - half {
                sum -= series[lo].energy;
                lo += 1;
            }
            let count = hi - lo;
            out.push(sum / count.max(1) as f64);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10 Hz series of the given energies starting at t=0.
    fn series(energies: &[f64]) -> Vec<EnergySample> {
        energies
            .iter()
            .enumerate()
            .map(|(i, &energy)| EnergySample {
                time: i as f64 * 0.1,
                energy,
            })
            .collect()
    }

    #[test]
    fn test_empty_and_tiny_series() {
        let analyzer = AudioEnergyAnalyzer::default();
        assert!(analyzer.analyze(&[]).is_empty());
        assert!(analyzer
            .analyze(&[EnergySample { time: 0.0, energy: 1.0 }])
            .is_empty());
    }

    #[test]
    fn test_uniform_series_has_no_events() {
        let analyzer = AudioEnergyAnalyzer::default();
        let samples = series(&[0.5; 100]);
        let events = analyzer.analyze(&samples);
        assert!(events.is_empty(), "uniform audio produced {:?}", events);
    }

    #[test]
    fn test_impulse_produces_spike() {
        let analyzer = AudioEnergyAnalyzer::default();
        let mut energies = vec![0.5; 100];
        // Mild jitter so the rolling stddev is non-zero.
        for (i, e) in energies.iter_mut().enumerate() {
            *e += if i % 2 == 0 { 0.01 } else { -0.01 };
        }
        energies[60] = 3.0;
        let events = analyzer.analyze(&series(&energies));

        let spikes: Vec<_> = events
            .iter()
            .filter(|e| e.kind == AudioEventKind::Spike)
            .collect();
        assert_eq!(spikes.len(), 1);
        assert!((spikes[0].time - 6.0).abs() < 1e-9);
        assert!(spikes[0].magnitude > 0.5);
    }

    #[test]
    fn test_smooth_bump_produces_peak() {
        let analyzer = AudioEnergyAnalyzer::default();
        let energies: Vec<f64> = (0..200)
            .map(|i| {
                let t = i as f64 * 0.1;
                // Bump centered at t=10.
                0.3 + 0.7 * (-0.5 * ((t - 10.0) / 1.5).powi(2)).exp()
            })
            .collect();
        let events = analyzer.analyze(&series(&energies));

        let peaks: Vec<_> = events
            .iter()
            .filter(|e| e.kind == AudioEventKind::Peak)
            .collect();
        assert_eq!(peaks.len(), 1);
        assert!((peaks[0].time - 10.0).abs() < 0.2);
        assert!((peaks[0].magnitude - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_silence_run_detected() {
        let analyzer = AudioEnergyAnalyzer::default();
        let mut energies = vec![1.0; 200];
        // 2 seconds of near-zero energy at t=5..7.
        for e in energies.iter_mut().take(70).skip(50) {
            *e = 0.001;
        }
        let events = analyzer.analyze(&series(&energies));

        let silences: Vec<_> = events
            .iter()
            .filter(|e| e.kind == AudioEventKind::Silence)
            .collect();
        assert_eq!(silences.len(), 1);
        assert!((silences[0].time - 5.95).abs() < 0.1);
        assert!(silences[0].magnitude > 0.5);
    }

    #[test]
    fn test_short_silence_ignored() {
        let analyzer = AudioEnergyAnalyzer::default();
        let mut energies = vec![1.0; 100];
        // 0.3s dip, below min_silence_duration.
        for e in energies.iter_mut().take(53).skip(50) {
            *e = 0.001;
        }
        let events = analyzer.analyze(&series(&energies));
        assert!(events
            .iter()
            .all(|e| e.kind != AudioEventKind::Silence));
    }

    #[test]
    fn test_rolling_window_forgets_old_burst() {
        let analyzer = AudioEnergyAnalyzer::default();
        let mut energies = vec![0.5; 600];
        for (i, e) in energies.iter_mut().enumerate() {
            *e += if i % 2 == 0 { 0.01 } else { -0.01 };
        }
        // Two bursts separated by well more than the 5s rolling window:
        // the first must leave the window so the second triggers cleanly.
        energies[200] = 3.0;
        energies[400] = 3.0;
        let events = analyzer.analyze(&series(&energies));

        let spikes: Vec<_> = events
            .iter()
            .filter(|e| e.kind == AudioEventKind::Spike)
            .collect();
        assert_eq!(spikes.len(), 2);
        assert!((spikes[0].time - 20.0).abs() < 1e-9);
        assert!((spikes[1].time - 40.0).abs() < 1e-9);
    }

    /// Hour-scale per-frame series; keeps the analyzer honest about
    /// single-pass behavior (this test crawls if any detector goes
    /// quadratic again).
    #[test]
    fn test_hour_long_series_detects_all_bursts() {
        let analyzer = AudioEnergyAnalyzer::default();
        let mut energies = vec![0.5; 50_000];
        for (i, e) in energies.iter_mut().enumerate() {
            *e += if i % 2 == 0 { 0.01 } else { -0.01 };
        }
        let burst_indices: Vec<usize> = (1..=9).map(|k| k * 5_000).collect();
        for &i in &burst_indices {
            energies[i] = 3.0;
        }
        let events = analyzer.analyze(&series(&energies));

        let spikes: Vec<_> = events
            .iter()
            .filter(|e| e.kind == AudioEventKind::Spike)
            .collect();
        assert_eq!(spikes.len(), burst_indices.len());
        for (spike, &i) in spikes.iter().zip(&burst_indices) {
            assert!((spike.time - i as f64 * 0.1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_determinism() {
        let analyzer = AudioEnergyAnalyzer::default();
        let energies: Vec<f64> = (0..300)
            .map(|i| 0.4 + 0.3 * ((i as f64) * 0.37).sin().abs())
            .collect();
        let samples = series(&energies);
        let a = analyzer.analyze(&samples);
        let b = analyzer.analyze(&samples);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_events_ordered_by_time() {
        let analyzer = AudioEnergyAnalyzer::default();
        let mut energies = vec![0.5; 300];
        for (i, e) in energies.iter_mut().enumerate() {
            *e += if i % 2 == 0 { 0.01 } else { -0.01 };
        }
        energies[100] = 3.0;
        for e in energies.iter_mut().take(220).skip(200) {
            *e = 0.0;
        }
        let events = analyzer.analyze(&series(&energies));
        for pair in events.windows(2) {
            assert!(pair[0].time <= pair[1].time);
        }
    }
}
