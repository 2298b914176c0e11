//! Isolation forest outlier scorer.
//!
//! An ensemble of randomly built isolation trees. Outliers are isolated in
//! fewer random splits than inliers, so short average path lengths map to
//! high anomaly scores.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{AnomalyError, Result};
use crate::scorers::OutlierScorer;

/// Default determinism seed, matching the reference configuration.
pub const DEFAULT_SEED: u64 = 42;

/// Euler-Mascheroni constant, used in the average path length formula.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Isolation forest scorer for univariate batches.
///
/// Each [`score`](OutlierScorer::score) call re-seeds its own RNG, fits a
/// fresh ensemble on the batch, and flags the most isolated `contamination`
/// fraction of samples. Two calls with the same configuration and batch
/// produce identical verdicts.
///
/// # Example
///
/// ```
/// use anofox_anomaly::scorers::{IsolationForest, OutlierScorer};
///
/// let mut batch: Vec<f64> = (0..128).map(|i| 50.0 + (i as f64 * 0.2).sin()).collect();
/// batch[64] = 120.0;
///
/// let scorer = IsolationForest::new().with_contamination(0.05);
/// let verdicts = scorer.score(&batch).unwrap();
/// assert!(verdicts[64]);
/// ```
#[derive(Debug, Clone)]
pub struct IsolationForest {
    n_trees: usize,
    sample_size: usize,
    contamination: f64,
    seed: u64,
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self {
            n_trees: 100,
            sample_size: 256,
            contamination: 0.1,
            seed: DEFAULT_SEED,
        }
    }
}

impl IsolationForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of trees in the ensemble (default 100).
    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    /// Set the per-tree subsample size (default 256, capped at the batch size).
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Set the expected outlier fraction (default 0.1).
    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    /// Set the determinism seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Anomaly score per sample: `2^(-E[h(x)] / c(n))`, in (0, 1].
    fn anomaly_scores(&self, samples: &[f64], rng: &mut StdRng) -> Vec<f64> {
        let n = samples.len();
        let subsample = self.sample_size.min(n);
        // Trees degenerate past the depth needed to isolate the subsample.
        let depth_limit = (subsample as f64).log2().ceil().max(1.0) as usize;
        let normalization = avg_path_length(subsample);

        let mut path_sums = vec![0.0; n];
        for _ in 0..self.n_trees {
            let tree_data = sample_without_replacement(samples, subsample, rng);
            let tree = IsolationTree::fit(&tree_data, depth_limit, rng);
            for (sum, &x) in path_sums.iter_mut().zip(samples) {
                *sum += tree.path_length(x);
            }
        }

        path_sums
            .into_iter()
            .map(|sum| {
                let mean_path = sum / self.n_trees as f64;
                2.0_f64.powf(-mean_path / normalization)
            })
            .collect()
    }
}

impl OutlierScorer for IsolationForest {
    fn score(&self, samples: &[f64]) -> Result<Vec<bool>> {
        let n = samples.len();
        if n < self.min_batch() {
            return Err(AnomalyError::InsufficientData {
                needed: self.min_batch(),
                got: n,
            });
        }
        if self.n_trees == 0 {
            return Err(AnomalyError::InvalidParameter(
                "n_trees must be positive".to_string(),
            ));
        }
        if self.sample_size < 2 {
            return Err(AnomalyError::InvalidParameter(
                "sample_size must be at least 2".to_string(),
            ));
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(AnomalyError::InvalidParameter(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }

        let spread = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
            - samples.iter().cloned().fold(f64::INFINITY, f64::min);
        if !spread.is_finite() || spread < f64::EPSILON {
            return Err(AnomalyError::DegenerateBatch(
                "all values identical".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let scores = self.anomaly_scores(samples, &mut rng);

        // Flag the top contamination fraction, most isolated first. Ties are
        // broken by position so the ranking is total.
        let n_outliers = ((self.contamination * n as f64).round() as usize).clamp(1, n);
        let mut ranked: Vec<usize> = (0..n).collect();
        ranked.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut verdicts = vec![false; n];
        for &idx in ranked.iter().take(n_outliers) {
            verdicts[idx] = true;
        }
        Ok(verdicts)
    }

    fn name(&self) -> &str {
        "IsolationForest"
    }
}

/// A single isolation tree over a univariate subsample.
enum IsolationTree {
    Internal {
        split: f64,
        left: Box<IsolationTree>,
        right: Box<IsolationTree>,
    },
    Leaf {
        size: usize,
    },
}

impl IsolationTree {
    fn fit(values: &[f64], depth_limit: usize, rng: &mut StdRng) -> Self {
        Self::fit_node(values, 0, depth_limit, rng)
    }

    fn fit_node(values: &[f64], depth: usize, depth_limit: usize, rng: &mut StdRng) -> Self {
        if depth >= depth_limit || values.len() <= 1 {
            return IsolationTree::Leaf {
                size: values.len(),
            };
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if max - min < f64::EPSILON {
            return IsolationTree::Leaf {
                size: values.len(),
            };
        }

        let split = rng.gen_range(min..max);
        let (left, right): (Vec<f64>, Vec<f64>) =
            values.iter().copied().partition(|&x| x < split);

        IsolationTree::Internal {
            split,
            left: Box::new(Self::fit_node(&left, depth + 1, depth_limit, rng)),
            right: Box::new(Self::fit_node(&right, depth + 1, depth_limit, rng)),
        }
    }

    /// Path length from the root to the leaf holding `x`, with the standard
    /// correction for unresolved leaves.
    fn path_length(&self, x: f64) -> f64 {
        let mut node = self;
        let mut depth = 0.0;
        loop {
            match node {
                IsolationTree::Leaf { size } => return depth + avg_path_length(*size),
                IsolationTree::Internal { split, left, right } => {
                    node = if x < *split { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` nodes, `c(n)`.
fn avg_path_length(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    let harmonic = (n - 1.0).ln() + EULER_GAMMA;
    2.0 * harmonic - 2.0 * (n - 1.0) / n
}

/// Draw `amount` values without replacement, in index order.
fn sample_without_replacement(values: &[f64], amount: usize, rng: &mut StdRng) -> Vec<f64> {
    if amount >= values.len() {
        return values.to_vec();
    }
    rand::seq::index::sample(rng, values.len(), amount)
        .iter()
        .map(|i| values[i])
        .collect()
}
