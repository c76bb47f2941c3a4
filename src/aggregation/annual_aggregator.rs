//! Groups clean measurements of one station by calendar year.

use crate::types::annual_summary::AnnualSummary;
use crate::types::measurement::CleanMeasurement;
use crate::types::year_range::YearRange;
use serde::Serialize;
use std::collections::BTreeMap;

/// A year that had measurements but fewer than the required minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SparseYear {
    pub year: i32,
    pub sample_count: usize,
}

/// Result of [`aggregate_with_stats`]: the qualifying summaries plus the years the
/// quality gate rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// Summaries with at least `min_samples` measurements, ascending by year.
    pub summaries: Vec<AnnualSummary>,
    /// Years with too few measurements, ascending by year.
    pub sparse_years: Vec<SparseYear>,
    /// Measurements dropped because their year fell outside the window.
    pub outside_window: usize,
}

/// Computes per-year mean, sample standard deviation and count for one station.
///
/// When `year_window` is given, measurements from other years are ignored before
/// grouping. Years with fewer than `min_samples` measurements are dropped: a sparse
/// year's average is not reliable enough to feed the trend fit.
///
/// The result does not depend on the order of `records`. Values are summed in
/// sorted order so that any permutation yields bit-identical summaries.
///
/// # Examples
///
/// ```
/// use precip_trend::{aggregate, CleanMeasurement};
///
/// let records = vec![
///     CleanMeasurement { year: 2021, value: 2.0 },
///     CleanMeasurement { year: 2021, value: 4.0 },
///     CleanMeasurement { year: 2022, value: 1.0 },
/// ];
/// let summaries = aggregate(records, 2, None);
/// assert_eq!(summaries.len(), 1);
/// assert_eq!(summaries[0].year, 2021);
/// assert_eq!(summaries[0].mean, 3.0);
/// assert_eq!(summaries[0].sample_count, 2);
/// ```
pub fn aggregate(
    records: impl IntoIterator<Item = CleanMeasurement>,
    min_samples: usize,
    year_window: Option<YearRange>,
) -> Vec<AnnualSummary> {
    aggregate_with_stats(records, min_samples, year_window).summaries
}

/// Same as [`aggregate`], but also reports what the window and the quality gate removed.
pub fn aggregate_with_stats(
    records: impl IntoIterator<Item = CleanMeasurement>,
    min_samples: usize,
    year_window: Option<YearRange>,
) -> Aggregation {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    let mut outside_window = 0;

    for record in records {
        if year_window.is_some_and(|window| !window.contains(record.year)) {
            outside_window += 1;
            continue;
        }
        by_year.entry(record.year).or_default().push(record.value);
    }

    let mut aggregation = Aggregation {
        outside_window,
        ..Aggregation::default()
    };

    for (year, mut values) in by_year {
        if values.len() < min_samples {
            aggregation.sparse_years.push(SparseYear {
                year,
                sample_count: values.len(),
            });
            continue;
        }
        values.sort_by(f64::total_cmp);
        aggregation.summaries.push(summarize(year, &values));
    }

    aggregation
}

fn summarize(year: i32, values: &[f64]) -> AnnualSummary {
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let std_dev = if n < 2 {
        0.0
    } else {
        let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (sum_sq / (n - 1) as f64).sqrt()
    };
    AnnualSummary {
        year,
        mean,
        std_dev,
        sample_count: n,
    }
}
