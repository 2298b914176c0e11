//! Synthetic signal generator.
//!
//! Produces a seasonal stream with concept drift, uniform noise, and
//! occasionally injected outliers. The generator owns all of its state and
//! is seeded, so fixture streams in tests are fully reproducible.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One generated observation. The timestamp is metadata for downstream
/// consumers; detection operates on values only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Configuration for the synthetic signal.
#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// Total number of points to generate (None for an unbounded stream).
    pub length: Option<usize>,
    /// Mean level of the signal.
    pub baseline: f64,
    /// Amplitude of the seasonal component.
    pub amplitude: f64,
    /// Frequency of the seasonal component (cycles per step).
    pub frequency: f64,
    /// Half-width of the uniform noise band.
    pub noise_level: f64,
    /// Step at which concept drift begins.
    pub drift_start: usize,
    /// Slope of the drift after `drift_start`.
    pub drift_rate: f64,
    /// Probability of injecting an outlier at any given step.
    pub anomaly_probability: f64,
    /// Magnitude range of injected outliers (applied with random sign).
    pub anomaly_magnitude: (f64, f64),
    /// Timestamp of the first point.
    pub start: DateTime<Utc>,
    /// Spacing between consecutive timestamps.
    pub step: Duration,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            length: Some(300),
            baseline: 50.0,
            amplitude: 10.0,
            frequency: 0.1,
            noise_level: 5.0,
            drift_start: 0,
            drift_rate: 0.04,
            anomaly_probability: 0.05,
            anomaly_magnitude: (20.0, 50.0),
            start: DateTime::UNIX_EPOCH,
            step: Duration::seconds(1),
            seed: 42,
        }
    }
}

impl SignalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of points (None for unbounded).
    pub fn with_length(mut self, length: Option<usize>) -> Self {
        self.length = length;
        self
    }

    /// Set where drift begins and how fast it accumulates.
    pub fn with_drift(mut self, start: usize, rate: f64) -> Self {
        self.drift_start = start;
        self.drift_rate = rate;
        self
    }

    /// Set the outlier injection probability.
    pub fn with_anomaly_probability(mut self, probability: f64) -> Self {
        self.anomaly_probability = probability;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Iterator producing the configured signal.
#[derive(Debug)]
pub struct SignalGenerator {
    config: SignalConfig,
    rng: StdRng,
    t: usize,
}

impl SignalGenerator {
    pub fn new(config: SignalConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng, t: 0 }
    }
}

impl Iterator for SignalGenerator {
    type Item = SignalPoint;

    fn next(&mut self) -> Option<SignalPoint> {
        if let Some(length) = self.config.length {
            if self.t >= length {
                return None;
            }
        }
        let cfg = &self.config;
        let t = self.t as f64;

        let seasonal = cfg.amplitude * (2.0 * std::f64::consts::PI * cfg.frequency * t).sin();
        let noise = self.rng.gen_range(-cfg.noise_level..=cfg.noise_level);
        let drift = if self.t >= cfg.drift_start {
            cfg.drift_rate * (self.t - cfg.drift_start) as f64
        } else {
            0.0
        };
        let anomaly = if self.rng.gen::<f64>() < cfg.anomaly_probability {
            let magnitude = self
                .rng
                .gen_range(cfg.anomaly_magnitude.0..cfg.anomaly_magnitude.1);
            let sign = if self.rng.gen::<bool>() { 1.0 } else { -1.0 };
            magnitude * sign
        } else {
            0.0
        };

        let point = SignalPoint {
            timestamp: cfg.start + cfg.step * self.t as i32,
            value: cfg.baseline + seasonal + noise + drift + anomaly,
        };
        self.t += 1;
        Some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::stats::mean;

    #[test]
    fn respects_configured_length() {
        let points: Vec<_> =
            SignalGenerator::new(SignalConfig::new().with_length(Some(25))).collect();
        assert_eq!(points.len(), 25);
    }

    #[test]
    fn unbounded_stream_keeps_producing() {
        let mut stream = SignalGenerator::new(SignalConfig::new().with_length(None));
        assert_eq!(stream.by_ref().take(1000).count(), 1000);
        assert!(stream.next().is_some());
    }

    #[test]
    fn same_seed_same_stream() {
        let config = SignalConfig::new().with_seed(9);
        let a: Vec<_> = SignalGenerator::new(config.clone()).collect();
        let b: Vec<_> = SignalGenerator::new(config).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a: Vec<_> = SignalGenerator::new(SignalConfig::new().with_seed(1)).collect();
        let b: Vec<_> = SignalGenerator::new(SignalConfig::new().with_seed(2)).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn drift_raises_the_late_mean() {
        let config = SignalConfig {
            length: Some(400),
            anomaly_probability: 0.0,
            drift_start: 200,
            drift_rate: 0.5,
            ..SignalConfig::default()
        };
        let values: Vec<f64> = SignalGenerator::new(config).map(|p| p.value).collect();

        let early = mean(&values[..200]);
        let late = mean(&values[200..]);
        assert!(late > early + 20.0);
    }

    #[test]
    fn timestamps_advance_by_step() {
        let points: Vec<_> =
            SignalGenerator::new(SignalConfig::new().with_length(Some(3))).collect();
        assert_eq!(points[1].timestamp - points[0].timestamp, Duration::seconds(1));
        assert_eq!(points[2].timestamp - points[1].timestamp, Duration::seconds(1));
    }

    #[test]
    fn no_anomalies_keeps_values_in_band() {
        let config = SignalConfig {
            length: Some(300),
            anomaly_probability: 0.0,
            drift_rate: 0.0,
            ..SignalConfig::default()
        };
        for point in SignalGenerator::new(config) {
            assert!(point.value >= 50.0 - 10.0 - 5.0 - 1e-9);
            assert!(point.value <= 50.0 + 10.0 + 5.0 + 1e-9);
        }
    }
}
