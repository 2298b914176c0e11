//! Pluggable outlier scorers.
//!
//! Scorers classify a whole batch in one fit-and-score call:
//! - Isolation forest ensemble (seeded, the default choice)
//! - Robust z-score (median/MAD, deterministic without a seed)

mod isolation_forest;
mod robust_zscore;
mod traits;

pub use isolation_forest::{IsolationForest, DEFAULT_SEED};
pub use robust_zscore::RobustZScore;
pub use traits::{BoxedScorer, OutlierScorer};
