//! Synthetic signal source for demos and fixtures.

mod generator;

pub use generator::{SignalConfig, SignalGenerator, SignalPoint};
