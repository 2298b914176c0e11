//! Windowed anomaly detection engine.

mod window;

pub use window::{detect_series, DetectorConfig, SlidingWindowDetector};
