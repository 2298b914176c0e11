//! Utility functions shared by the scorers.

pub mod stats;

pub use stats::{mean, median, median_abs_deviation, std_dev, variance};
