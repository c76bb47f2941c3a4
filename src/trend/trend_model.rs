//! Linear trend of annual mean precipitation against the year, and its projection.
//!
//! The model is an ordinary least-squares line fitted on the `(year, mean)` points
//! of a [`MunicipalitySeries`]. [`TrendModel::fit_quality`] is the in-sample
//! coefficient of determination: it describes how well the line follows the
//! years it was fitted on and says nothing about how accurate a projection is.

use crate::trend::error::FitError;
use crate::types::series::MunicipalitySeries;
use serde::Serialize;
use std::fmt;

/// Minimum number of distinct years a fit needs.
pub const MIN_FIT_YEARS: usize = 2;

/// A fitted `mean = intercept + slope * year` line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendModel {
    slope: f64,
    intercept: f64,
    fit_quality: f64,
}

/// One projected year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedYear {
    pub year: i32,
    pub predicted: f64,
}

/// Trend evaluated at future years, ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    pub years: Vec<ProjectedYear>,
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.years
            .iter()
            .find(|p| p.year == year)
            .map(|p| p.predicted)
    }
}

impl TrendModel {
    /// Fits the trend on the series' `(year, mean)` points.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InsufficientData`] when the series has fewer than two
    /// distinct years; a one-point "trend" is refused rather than reported as flat.
    ///
    /// # Examples
    ///
    /// ```
    /// use precip_trend::{AnnualSummary, MunicipalitySeries, TrendModel};
    ///
    /// let series = MunicipalitySeries::from_summaries([2020, 2021, 2022].map(|year| AnnualSummary {
    ///     year,
    ///     mean: 400.0 + 20.0 * (year - 2020) as f64,
    ///     std_dev: 0.0,
    ///     sample_count: 365,
    /// }));
    /// let model = TrendModel::fit(&series).unwrap();
    /// assert_eq!(model.slope(), 20.0);
    /// assert_eq!(model.fit_quality(), 1.0);
    /// assert_eq!(model.predict(2023), 460.0);
    /// ```
    pub fn fit(series: &MunicipalitySeries) -> Result<Self, FitError> {
        let points: Vec<(f64, f64)> = series.points().map(|(x, y)| (x as f64, y)).collect();
        if points.len() < MIN_FIT_YEARS {
            return Err(FitError::InsufficientData {
                required: MIN_FIT_YEARS,
                actual: points.len(),
            });
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        // Centered sums; years are distinct so s_xx > 0.
        let s_xx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        let s_xy: f64 = points
            .iter()
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        let slope = s_xy / s_xx;
        let intercept = mean_y - slope * mean_x;

        let ss_tot: f64 = points.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
        let ss_res: f64 = points
            .iter()
            .map(|(x, y)| (y - mean_y - slope * (x - mean_x)).powi(2))
            .sum();

        // Flat relative to the magnitude of the means, not in absolute terms.
        let sum_sq: f64 = points.iter().map(|(_, y)| y * y).sum();
        let fit_quality = if ss_tot > f64::EPSILON * sum_sq {
            (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
        } else {
            // A flat series is followed exactly by a flat line.
            1.0
        };

        Ok(Self {
            slope,
            intercept,
            fit_quality,
        })
    }

    /// Change in mean precipitation per year (mm/year).
    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// In-sample R² in `[0, 1]`. Descriptive only; not a measure of predictive accuracy.
    pub fn fit_quality(&self) -> f64 {
        self.fit_quality
    }

    pub fn predict(&self, year: i32) -> f64 {
        self.intercept + self.slope * year as f64
    }

    /// Evaluates the trend at each of `years`, in the given order.
    pub fn project(&self, years: impl IntoIterator<Item = i32>) -> Projection {
        Projection {
            years: years
                .into_iter()
                .map(|year| ProjectedYear {
                    year,
                    predicted: self.predict(year),
                })
                .collect(),
        }
    }
}

/// Formats as the plot annotation, e.g. `+20.0 mm/year (R² 1.00)`.
impl fmt::Display for TrendModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.1} mm/year (R² {:.2})", self.slope, self.fit_quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::annual_summary::AnnualSummary;

    fn series(points: &[(i32, f64)]) -> MunicipalitySeries {
        MunicipalitySeries::from_summaries(points.iter().map(|&(year, mean)| AnnualSummary {
            year,
            mean,
            std_dev: 0.0,
            sample_count: 365,
        }))
    }

    #[test]
    fn test_fit_requires_two_years() {
        assert_eq!(
            TrendModel::fit(&series(&[])),
            Err(FitError::InsufficientData {
                required: 2,
                actual: 0
            })
        );
        assert_eq!(
            TrendModel::fit(&series(&[(2020, 400.0)])),
            Err(FitError::InsufficientData {
                required: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_two_points_are_interpolated_exactly() {
        let model = TrendModel::fit(&series(&[(2018, 2.4), (2023, 1.9)])).unwrap();
        assert!((model.slope() - (1.9 - 2.4) / 5.0).abs() < 1e-12);
        assert!((model.predict(2018) - 2.4).abs() < 1e-9);
        assert!((model.predict(2023) - 1.9).abs() < 1e-9);
        assert!((model.fit_quality() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_linear_series() {
        let model =
            TrendModel::fit(&series(&[(2020, 400.0), (2021, 420.0), (2022, 440.0)])).unwrap();
        assert_eq!(model.slope(), 20.0);
        assert_eq!(model.intercept(), 420.0 - 20.0 * 2021.0);
        assert_eq!(model.fit_quality(), 1.0);
    }

    #[test]
    fn test_noisy_series_r_squared() {
        // y = 1, 3, 2, 5 at x = 0..3 (shifted to years): slope 1.1, R² = 0.7118...
        let model = TrendModel::fit(&series(&[
            (2000, 1.0),
            (2001, 3.0),
            (2002, 2.0),
            (2003, 5.0),
        ]))
        .unwrap();
        assert!((model.slope() - 1.1).abs() < 1e-9);
        // ss_tot = 8.75, ss_res = 2.7 -> 1 - 2.7 / 8.75
        assert!((model.fit_quality() - (1.0 - 2.7 / 8.75)).abs() < 1e-9);
        assert!(model.fit_quality() > 0.0 && model.fit_quality() < 1.0);
    }

    #[test]
    fn test_r_squared_does_not_depend_on_scale() {
        let points = [(2000, 1.0), (2001, 3.0), (2002, 2.0), (2003, 5.0)];
        let scaled: Vec<(i32, f64)> = points.iter().map(|&(x, y)| (x, y * 1e-6)).collect();

        let model = TrendModel::fit(&series(&points)).unwrap();
        let tiny = TrendModel::fit(&series(&scaled)).unwrap();
        assert!((tiny.slope() - 1.1e-6).abs() < 1e-15);
        assert!((tiny.fit_quality() - (1.0 - 2.7 / 8.75)).abs() < 1e-9);
        assert!((tiny.fit_quality() - model.fit_quality()).abs() < 1e-9);
    }

    #[test]
    fn test_all_zero_series_is_flat() {
        let model = TrendModel::fit(&series(&[(2019, 0.0), (2020, 0.0)])).unwrap();
        assert_eq!(model.slope(), 0.0);
        assert_eq!(model.fit_quality(), 1.0);
    }

    #[test]
    fn test_flat_series_has_zero_slope_and_full_quality() {
        let model = TrendModel::fit(&series(&[(2019, 0.1), (2020, 0.1), (2021, 0.1)])).unwrap();
        assert!(model.slope().abs() < 1e-12);
        assert_eq!(model.fit_quality(), 1.0);
    }

    #[test]
    fn test_projection_follows_requested_years() {
        let model =
            TrendModel::fit(&series(&[(2020, 400.0), (2021, 420.0), (2022, 440.0)])).unwrap();
        let projection = model.project(2023..=2026);
        assert_eq!(projection.len(), 4);
        assert_eq!(
            projection.years.iter().map(|p| p.year).collect::<Vec<_>>(),
            vec![2023, 2024, 2025, 2026]
        );
        assert_eq!(projection.get(2026), Some(520.0));
        assert!(model.project(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_display_matches_plot_annotation() {
        let model =
            TrendModel::fit(&series(&[(2020, 400.0), (2021, 420.0), (2022, 440.0)])).unwrap();
        assert_eq!(model.to_string(), "+20.0 mm/year (R² 1.00)");
    }
}
