//! # anofox-anomaly
//!
//! Streaming anomaly detection over numeric time series.
//!
//! A sliding-window detector buffers the trailing `window_size` samples,
//! re-fits a pluggable outlier scorer on every full window, and emits one
//! verdict per sample in arrival order. Scorers (isolation forest, robust
//! z-score) are stateless per call and seeded for reproducibility. A
//! synthetic signal generator provides seasonal/drifting/noisy streams for
//! demos and fixtures.

pub mod core;
pub mod detection;
pub mod error;
pub mod scorers;
pub mod signal;
pub mod utils;

pub use error::{AnomalyError, Result};

pub mod prelude {
    pub use crate::core::{Sample, Verdict};
    pub use crate::detection::{detect_series, DetectorConfig, SlidingWindowDetector};
    pub use crate::error::{AnomalyError, Result};
    pub use crate::scorers::{BoxedScorer, IsolationForest, OutlierScorer, RobustZScore};
    pub use crate::signal::{SignalConfig, SignalGenerator, SignalPoint};
}
