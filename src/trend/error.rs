use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitError {
    #[error("Insufficient data for a trend fit: need at least {required} distinct years, got {actual}")]
    InsufficientData { required: usize, actual: usize },
}
