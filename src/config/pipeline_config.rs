//! Parameters of a pipeline run.

use crate::aggregation::source_combiner::CombineWeighting;
use crate::config::error::ConfigError;
use crate::trend::horizon::ProjectionHorizon;
use crate::types::year_range::{YearRange, YearWindow};
use bon::Builder;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MIN_SAMPLES: usize = 30;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_CONCURRENT_MUNICIPALITIES: usize = 4;

/// Longest `Years(n)` horizon accepted.
pub const MAX_HORIZON_YEARS: u32 = 100;
/// Latest year a `ThroughYear` horizon may reach; dates beyond four-digit years never parse.
pub const MAX_PROJECTION_YEAR: i32 = 9999;

/// Quality thresholds, windows and limits for one pipeline run.
///
/// Build one with [`PipelineConfig::builder`], start from a preset
/// ([`PipelineConfig::short_window`], [`PipelineConfig::whole_day_count`]), or
/// deserialize it from the `[pipeline]` table of a settings file.
///
/// # Examples
///
/// ```
/// use precip_trend::{PipelineConfig, ProjectionHorizon, YearRange, YearWindow};
///
/// let config = PipelineConfig::builder()
///     .min_samples(300)
///     .year_window(YearWindow::Trailing(5))
///     .reference_year(2025)
///     .horizon(ProjectionHorizon::Years(9))
///     .build();
/// assert_eq!(config.resolved_window(), Some(YearRange::new(2020, 2025)));
/// assert_eq!(config.min_samples, 300);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum clean measurements a station needs in a year for that year to count.
    #[builder(default = DEFAULT_MIN_SAMPLES)]
    pub min_samples: usize,

    /// Years the analysis is restricted to; `None` keeps every year.
    pub year_window: Option<YearWindow>,

    /// Year a [`YearWindow::Trailing`] window counts back from. Defaults to the current year.
    pub reference_year: Option<i32>,

    /// How far past the last observed year the trend is projected.
    #[builder(default = ProjectionHorizon::Years(4))]
    pub horizon: ProjectionHorizon,

    /// Upper bound on one station fetch; slower stations count as unavailable.
    #[builder(default = DEFAULT_FETCH_TIMEOUT)]
    #[serde(rename = "fetch_timeout_secs", with = "duration_secs")]
    pub fetch_timeout: Duration,

    /// Upper bound on the connectivity probe made before a run.
    #[builder(default = DEFAULT_CONNECT_TIMEOUT)]
    #[serde(rename = "connect_timeout_secs", with = "duration_secs")]
    pub connect_timeout: Duration,

    /// How many municipalities are processed at the same time.
    #[builder(default = DEFAULT_MAX_CONCURRENT_MUNICIPALITIES)]
    pub max_concurrent_municipalities: usize,

    /// How station means are combined per year.
    #[builder(default)]
    pub weighting: CombineWeighting,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PipelineConfig {
    /// Daily records restricted to 2018–2023, at least 30 readings per station-year,
    /// projected 4 years ahead.
    pub fn short_window() -> Self {
        Self::builder()
            .min_samples(30)
            .year_window(YearWindow::Fixed(YearRange::new(2018, 2023)))
            .horizon(ProjectionHorizon::Years(4))
            .build()
    }

    /// The last 5 years, only station-years with at least 300 daily readings,
    /// projected through 2028.
    pub fn whole_day_count() -> Self {
        Self::builder()
            .min_samples(300)
            .year_window(YearWindow::Trailing(5))
            .horizon(ProjectionHorizon::ThroughYear(2028))
            .build()
    }

    /// The concrete year range of this run, if a window is configured.
    pub fn resolved_window(&self) -> Option<YearRange> {
        let reference_year = self
            .reference_year
            .unwrap_or_else(|| chrono::Local::now().year());
        self.year_window
            .map(|window| window.resolve(reference_year))
    }

    /// Checks parameter combinations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(window) = self.resolved_window() {
            if window.is_empty() {
                return Err(ConfigError::InvalidWindow(window));
            }
        }
        let horizon_in_range = match self.horizon {
            ProjectionHorizon::Years(years) => years <= MAX_HORIZON_YEARS,
            ProjectionHorizon::ThroughYear(year) => year <= MAX_PROJECTION_YEAR,
        };
        if !horizon_in_range {
            return Err(ConfigError::HorizonOutOfRange(self.horizon));
        }
        if self.max_concurrent_municipalities == 0 {
            return Err(ConfigError::NotPositive("max_concurrent_municipalities"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::NotPositive("fetch_timeout_secs"));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::NotPositive("connect_timeout_secs"));
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
