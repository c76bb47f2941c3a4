use serde::{Deserialize, Serialize};

/// Summary statistics of one calendar year, either for a single station or for a
/// whole municipality after combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub year: i32,
    /// Mean precipitation (mm) of the year.
    pub mean: f64,
    /// Sample standard deviation; `0.0` when fewer than two samples were folded in.
    pub std_dev: f64,
    /// Number of clean measurements behind this summary.
    pub sample_count: usize,
}
