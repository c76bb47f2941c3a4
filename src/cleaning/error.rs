use thiserror::Error;

/// Why a raw record was discarded by [`crate::clean`].
///
/// These never leave the cleaning stage as errors; they are counted in
/// [`crate::CleaningStats`] and the record is dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedRecord {
    #[error("Unparsable date '{0}'")]
    UnparsableTimestamp(String),

    #[error("Precipitation value is missing")]
    MissingValue,

    #[error("Unparsable precipitation value '{0}'")]
    UnparsableValue(String),

    #[error("Negative precipitation value {0}")]
    NegativeValue(f64),
}
