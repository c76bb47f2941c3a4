use serde::{Deserialize, Serialize};

/// A validated precipitation reading reduced to what the aggregation needs.
///
/// Produced by [`crate::clean`], which guarantees `value` lies within
/// [`MIN_PRECIPITATION`]..=[`MAX_PRECIPITATION`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleanMeasurement {
    /// Calendar year of the reading.
    pub year: i32,
    /// Precipitation in millimetres.
    pub value: f64,
}

/// Lower clamp bound for precipitation values (mm).
pub const MIN_PRECIPITATION: f64 = 0.0;
/// Upper clamp bound for precipitation values (mm); larger readings are sensor or unit errors.
pub const MAX_PRECIPITATION: f64 = 1000.0;
