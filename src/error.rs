//! Error types for the anofox-anomaly library.

use thiserror::Error;

/// Result type alias for anomaly detection operations.
pub type Result<T> = std::result::Result<T, AnomalyError>;

/// Errors that can occur during anomaly detection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnomalyError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Batch is below the scorer's minimum viable size.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Batch cannot be ranked (e.g., zero variance).
    #[error("degenerate batch: {0}")]
    DegenerateBatch(String),
}
