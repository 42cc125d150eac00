/// Unified error type for secret splitting operations.
#[derive(Debug, thiserror::Error)]
pub enum ShamirError {
    /// The (count, threshold) pair is out of range.
    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),

    /// The OS random source failed while drawing polynomial coefficients.
    #[error("random source failure: {0}")]
    RandomSource(String),
}
