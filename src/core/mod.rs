//! Core data structures for streaming anomaly detection.

mod sample;

pub use sample::{Sample, Verdict};
