//! The per-municipality annual series produced by [`crate::combine`].

use crate::types::annual_summary::AnnualSummary;
use serde::{Deserialize, Serialize};

/// One year of a [`MunicipalitySeries`]: the combined summary plus how many
/// stations contributed to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedYear {
    pub summary: AnnualSummary,
    /// Number of stations that had a qualifying summary for this year.
    pub source_count: usize,
}

/// Year-ordered annual series of one municipality, with unique years.
///
/// Built only through [`crate::combine`] / [`crate::combine_with`] or
/// [`MunicipalitySeries::from_summaries`], both of which keep the ordering and
/// uniqueness invariant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MunicipalitySeries {
    years: Vec<CombinedYear>,
}

impl MunicipalitySeries {
    /// Builds a series from summaries of a single source.
    ///
    /// Summaries are sorted by year; if a year appears more than once only the
    /// first occurrence is kept.
    pub fn from_summaries(summaries: impl IntoIterator<Item = AnnualSummary>) -> Self {
        let mut summaries: Vec<AnnualSummary> = summaries.into_iter().collect();
        summaries.sort_by_key(|s| s.year);
        summaries.dedup_by_key(|s| s.year);
        Self {
            years: summaries
                .into_iter()
                .map(|summary| CombinedYear {
                    summary,
                    source_count: 1,
                })
                .collect(),
        }
    }

    pub(crate) fn from_sorted(years: Vec<CombinedYear>) -> Self {
        debug_assert!(years.windows(2).all(|w| w[0].summary.year < w[1].summary.year));
        Self { years }
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// The combined years, ascending.
    pub fn years(&self) -> &[CombinedYear] {
        &self.years
    }

    /// Iterates the combined summaries, ascending by year.
    pub fn summaries(&self) -> impl Iterator<Item = &AnnualSummary> {
        self.years.iter().map(|y| &y.summary)
    }

    /// Looks up the summary for `year`.
    pub fn get(&self, year: i32) -> Option<&AnnualSummary> {
        self.years
            .binary_search_by_key(&year, |y| y.summary.year)
            .ok()
            .map(|idx| &self.years[idx].summary)
    }

    pub fn first_year(&self) -> Option<i32> {
        self.years.first().map(|y| y.summary.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years.last().map(|y| y.summary.year)
    }

    /// `(year, mean)` pairs, the points the trend is fitted on.
    pub fn points(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.summaries().map(|s| (s.year, s.mean))
    }
}
