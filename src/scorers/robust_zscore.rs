//! Robust z-score outlier scorer.
//!
//! Modified z-score using the median and MAD instead of mean and standard
//! deviation, so the fit itself is not dragged around by the outliers it is
//! meant to find.

use crate::error::{AnomalyError, Result};
use crate::scorers::OutlierScorer;
use crate::utils::stats::{median, median_abs_deviation};

/// 0.75th percentile of the standard normal, scales MAD to a sigma estimate.
const MAD_SCALE: f64 = 0.6745;

/// Median/MAD based scorer with a fixed decision threshold.
///
/// Deterministic without a seed. Flags samples whose modified z-score
/// exceeds the threshold (default 3.5).
#[derive(Debug, Clone)]
pub struct RobustZScore {
    threshold: f64,
}

impl Default for RobustZScore {
    fn default() -> Self {
        Self { threshold: 3.5 }
    }
}

impl RobustZScore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the modified z-score threshold (default 3.5).
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

impl OutlierScorer for RobustZScore {
    fn score(&self, samples: &[f64]) -> Result<Vec<bool>> {
        let n = samples.len();
        if n < self.min_batch() {
            return Err(AnomalyError::InsufficientData {
                needed: self.min_batch(),
                got: n,
            });
        }
        if self.threshold <= 0.0 {
            return Err(AnomalyError::InvalidParameter(
                "threshold must be positive".to_string(),
            ));
        }

        let med = median(samples);
        let scaled_mad = median_abs_deviation(samples) / MAD_SCALE;
        if !scaled_mad.is_finite() || scaled_mad < 1e-10 {
            return Err(AnomalyError::DegenerateBatch(
                "zero spread around the median".to_string(),
            ));
        }

        Ok(samples
            .iter()
            .map(|x| ((x - med) / scaled_mad).abs() > self.threshold)
            .collect())
    }

    fn name(&self) -> &str {
        "RobustZScore"
    }
}
