use crate::types::year_range::YearRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How far past the last observed year a trend is projected.
///
/// In a TOML configuration: `horizon = { years = 4 }` or `horizon = { through_year = 2028 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionHorizon {
    /// A fixed number of years after the last observation.
    Years(u32),
    /// Every year after the last observation up to and including this one.
    ThroughYear(i32),
}

impl ProjectionHorizon {
    /// The contiguous range of years to project, starting the year after `last_observed`.
    ///
    /// The range is empty when there is nothing left to project, e.g. `Years(0)` or
    /// a `ThroughYear` that is not after `last_observed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use precip_trend::{ProjectionHorizon, YearRange};
    ///
    /// assert_eq!(ProjectionHorizon::Years(4).years_after(2023), YearRange::new(2024, 2027));
    /// assert_eq!(ProjectionHorizon::ThroughYear(2028).years_after(2025), YearRange::new(2026, 2028));
    /// assert!(ProjectionHorizon::ThroughYear(2028).years_after(2028).is_empty());
    /// ```
    pub fn years_after(&self, last_observed: i32) -> YearRange {
        let start = last_observed.saturating_add(1);
        match *self {
            ProjectionHorizon::Years(years) => {
                let span = i32::try_from(years).unwrap_or(i32::MAX);
                YearRange::new(start, last_observed.saturating_add(span))
            }
            ProjectionHorizon::ThroughYear(end) => YearRange::new(start, end),
        }
    }
}

impl fmt::Display for ProjectionHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionHorizon::Years(years) => write!(f, "{} years", years),
            ProjectionHorizon::ThroughYear(year) => write!(f, "through {}", year),
        }
    }
}
