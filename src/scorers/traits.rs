//! OutlierScorer trait defining the common interface for all scorers.

use crate::error::Result;

/// Common interface for batch outlier scorers.
///
/// A scorer is stateless across calls: each `score` call is an independent
/// fit-and-score over the given batch. Implementations must be deterministic
/// for a fixed configuration (seed) so that runs are reproducible.
///
/// This trait is object-safe and can be used with `Box<dyn OutlierScorer>`.
pub trait OutlierScorer {
    /// Fit on the batch and classify every sample in it.
    ///
    /// Returns one boolean per input position, index-aligned, where `true`
    /// marks an outlier. Fails with [`AnomalyError::InsufficientData`] when
    /// the batch is smaller than [`min_batch`](Self::min_batch), and with
    /// [`AnomalyError::DegenerateBatch`] when the batch cannot be ranked.
    ///
    /// [`AnomalyError::InsufficientData`]: crate::error::AnomalyError::InsufficientData
    /// [`AnomalyError::DegenerateBatch`]: crate::error::AnomalyError::DegenerateBatch
    fn score(&self, samples: &[f64]) -> Result<Vec<bool>>;

    /// Get the scorer name.
    fn name(&self) -> &str;

    /// Smallest batch size this scorer can produce verdicts for.
    fn min_batch(&self) -> usize {
        2
    }
}

/// Type alias for boxed scorer trait objects.
///
/// # Example
///
/// ```
/// use anofox_anomaly::scorers::{BoxedScorer, OutlierScorer, RobustZScore};
///
/// let scorer: BoxedScorer = Box::new(RobustZScore::new());
/// assert_eq!(scorer.name(), "RobustZScore");
/// ```
pub type BoxedScorer = Box<dyn OutlierScorer>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorers::{IsolationForest, RobustZScore};

    #[test]
    fn boxed_scorer_dispatch() {
        let scorers: Vec<BoxedScorer> = vec![
            Box::new(RobustZScore::new()),
            Box::new(IsolationForest::new()),
        ];

        let batch: Vec<f64> = (0..64).map(|i| (i as f64 * 0.3).sin()).collect();
        for scorer in &scorers {
            let verdicts = scorer.score(&batch).unwrap();
            assert_eq!(verdicts.len(), batch.len());
        }
    }

    #[test]
    fn default_min_batch() {
        struct AlwaysInlier;
        impl OutlierScorer for AlwaysInlier {
            fn score(&self, samples: &[f64]) -> Result<Vec<bool>> {
                Ok(vec![false; samples.len()])
            }
            fn name(&self) -> &str {
                "AlwaysInlier"
            }
        }

        assert_eq!(AlwaysInlier.min_batch(), 2);
    }
}
