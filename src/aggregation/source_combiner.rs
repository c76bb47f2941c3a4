//! Combination of per-station annual summaries into one municipality series.

use crate::types::annual_summary::AnnualSummary;
use crate::types::series::{CombinedYear, MunicipalitySeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Annual summaries keyed by station id.
pub type PerSourceSummaries = BTreeMap<String, Vec<AnnualSummary>>;

/// How station means are averaged for a year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineWeighting {
    /// Plain mean of the station means: every station counts the same regardless
    /// of how many readings it had.
    #[default]
    Unweighted,
    /// Station means weighted by their sample counts.
    SampleCount,
}

/// Merges per-station annual summaries into a municipality series using the
/// unweighted mean of means.
///
/// A year is present in the output if and only if at least one station has a
/// summary for it. See [`combine_with`] for the fields other than `mean`.
///
/// # Examples
///
/// ```
/// use precip_trend::{combine, AnnualSummary, PerSourceSummaries};
///
/// let summary = |year, mean| AnnualSummary { year, mean, std_dev: 0.0, sample_count: 40 };
/// let mut per_source = PerSourceSummaries::new();
/// per_source.insert("22005".into(), vec![summary(2020, 2.0), summary(2021, 3.0)]);
/// per_source.insert("22021".into(), vec![summary(2020, 4.0)]);
///
/// let series = combine(per_source);
/// assert_eq!(series.get(2020).unwrap().mean, 3.0);
/// assert_eq!(series.get(2021).unwrap().mean, 3.0);
/// ```
pub fn combine(per_source: PerSourceSummaries) -> MunicipalitySeries {
    combine_with(per_source, CombineWeighting::Unweighted)
}

/// Merges per-station annual summaries into a municipality series.
///
/// Per year:
/// * `mean` averages the station means according to `weighting`,
/// * `std_dev` is the plain mean of the station standard deviations,
/// * `sample_count` is the total number of measurements behind the year,
/// * `source_count` is the number of stations contributing.
///
/// An empty map, or one where every station has no summaries, gives an empty series.
pub fn combine_with(
    per_source: PerSourceSummaries,
    weighting: CombineWeighting,
) -> MunicipalitySeries {
    let mut by_year: BTreeMap<i32, Vec<AnnualSummary>> = BTreeMap::new();
    for summaries in per_source.into_values() {
        for summary in summaries {
            by_year.entry(summary.year).or_default().push(summary);
        }
    }

    let years = by_year
        .into_iter()
        .map(|(year, contributions)| combine_year(year, &contributions, weighting))
        .collect();

    MunicipalitySeries::from_sorted(years)
}

fn combine_year(year: i32, contributions: &[AnnualSummary], weighting: CombineWeighting) -> CombinedYear {
    let n = contributions.len() as f64;
    let sample_count: usize = contributions.iter().map(|s| s.sample_count).sum();
    let unweighted_mean = contributions.iter().map(|s| s.mean).sum::<f64>() / n;

    let mean = match weighting {
        CombineWeighting::Unweighted => unweighted_mean,
        CombineWeighting::SampleCount if sample_count == 0 => unweighted_mean,
        CombineWeighting::SampleCount => {
            contributions
                .iter()
                .map(|s| s.mean * s.sample_count as f64)
                .sum::<f64>()
                / sample_count as f64
        }
    };

    CombinedYear {
        summary: AnnualSummary {
            year,
            mean,
            std_dev: contributions.iter().map(|s| s.std_dev).sum::<f64>() / n,
            sample_count,
        },
        source_count: contributions.len(),
    }
}
