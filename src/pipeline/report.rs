//! What a pipeline run produces: one outcome per municipality, with per-station diagnostics.

use crate::aggregation::annual_aggregator::SparseYear;
use crate::cleaning::record_cleaner::CleaningStats;
use crate::pipeline::stage::PipelineStage;
use crate::storage::error::StoreError;
use crate::trend::trend_model::{Projection, TrendModel};
use crate::types::annual_summary::AnnualSummary;
use crate::types::series::MunicipalitySeries;
use polars::prelude::*;
use std::fmt;
use std::time::Duration;

/// Why a station contributed nothing.
#[derive(Debug)]
pub enum SourceIssue {
    /// The fetch did not finish within the configured timeout.
    Timeout(Duration),
    /// The store returned an error.
    Retrieval(StoreError),
}

impl fmt::Display for SourceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(limit) => write!(f, "timed out after {:?}", limit),
            Self::Retrieval(e) => write!(f, "retrieval failed: {}", e),
        }
    }
}

#[derive(Debug)]
pub enum SourceStatus {
    /// Records were fetched, cleaned and aggregated.
    Used {
        cleaning: CleaningStats,
        /// Summaries that passed the quality gate and went into the combination.
        summaries: Vec<AnnualSummary>,
        /// Years rejected by the quality gate.
        sparse_years: Vec<SparseYear>,
        /// Clean measurements outside the year window.
        outside_window: usize,
    },
    /// The store answered with zero records.
    NoData,
    Unavailable(SourceIssue),
}

/// Diagnostics for one station of a municipality.
#[derive(Debug)]
pub struct SourceReport {
    pub station: String,
    pub status: SourceStatus,
}

impl SourceReport {
    /// Whether the station contributed at least one annual summary.
    pub fn contributed(&self) -> bool {
        matches!(&self.status, SourceStatus::Used { summaries, .. } if !summaries.is_empty())
    }

    pub fn cleaning(&self) -> Option<&CleaningStats> {
        match &self.status {
            SourceStatus::Used { cleaning, .. } => Some(cleaning),
            _ => None,
        }
    }

    pub fn sparse_years(&self) -> &[SparseYear] {
        match &self.status {
            SourceStatus::Used { sparse_years, .. } => sparse_years,
            _ => &[],
        }
    }

    pub fn issue(&self) -> Option<&SourceIssue> {
        match &self.status {
            SourceStatus::Unavailable(issue) => Some(issue),
            _ => None,
        }
    }
}

/// Why a municipality produced no trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No station returned data, or nothing survived cleaning and the quality gate.
    EmptyMunicipality,
    /// The combined series has fewer than two years.
    InsufficientDataForFit { years: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMunicipality => write!(f, "no usable data"),
            Self::InsufficientDataForFit { years } => {
                write!(f, "only {} year(s) of data, at least 2 needed", years)
            }
        }
    }
}

/// A municipality that made it through every stage.
#[derive(Debug)]
pub struct MunicipalityReport {
    pub municipality: String,
    pub series: MunicipalitySeries,
    pub trend: TrendModel,
    pub projection: Projection,
    pub sources: Vec<SourceReport>,
}

impl MunicipalityReport {
    /// Observed years followed by projected years as a `DataFrame`.
    ///
    /// Columns: `year` (i32), `mean` (f64, null for projected rows), `std_dev`
    /// (f64, null for projected rows), `sample_count` (u64, null for projected
    /// rows), `predicted` (f64, the trend line at that year) and `kind`
    /// (`"observed"` or `"projected"`).
    ///
    /// # Errors
    ///
    /// Returns a `PolarsError` if the frame cannot be assembled.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let rows = self.series.len() + self.projection.len();
        let mut years = Vec::with_capacity(rows);
        let mut means = Vec::with_capacity(rows);
        let mut std_devs = Vec::with_capacity(rows);
        let mut counts = Vec::with_capacity(rows);
        let mut predicted = Vec::with_capacity(rows);
        let mut kinds = Vec::with_capacity(rows);

        for summary in self.series.summaries() {
            years.push(summary.year);
            means.push(Some(summary.mean));
            std_devs.push(Some(summary.std_dev));
            counts.push(Some(summary.sample_count as u64));
            predicted.push(self.trend.predict(summary.year));
            kinds.push("observed");
        }
        for projected in &self.projection.years {
            years.push(projected.year);
            means.push(None);
            std_devs.push(None);
            counts.push(None);
            predicted.push(projected.predicted);
            kinds.push("projected");
        }

        df!(
            "year" => years,
            "mean" => means,
            "std_dev" => std_devs,
            "sample_count" => counts,
            "predicted" => predicted,
            "kind" => kinds
        )
    }
}

#[derive(Debug)]
pub enum MunicipalityOutcome {
    Done(MunicipalityReport),
    Skipped {
        municipality: String,
        /// The stage the run stopped in.
        stage: PipelineStage,
        reason: SkipReason,
        sources: Vec<SourceReport>,
    },
}

impl MunicipalityOutcome {
    pub fn municipality(&self) -> &str {
        match self {
            Self::Done(report) => &report.municipality,
            Self::Skipped { municipality, .. } => municipality,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Done(_) => PipelineStage::Done,
            Self::Skipped { .. } => PipelineStage::Skipped,
        }
    }

    pub fn sources(&self) -> &[SourceReport] {
        match self {
            Self::Done(report) => &report.sources,
            Self::Skipped { sources, .. } => sources,
        }
    }

    pub fn as_done(&self) -> Option<&MunicipalityReport> {
        match self {
            Self::Done(report) => Some(report),
            Self::Skipped { .. } => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Done(_) => None,
            Self::Skipped { reason, .. } => Some(*reason),
        }
    }
}

/// Outcomes of one run, in registry order.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub outcomes: Vec<MunicipalityOutcome>,
}

impl PipelineReport {
    pub fn get(&self, municipality: &str) -> Option<&MunicipalityOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.municipality() == municipality)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MunicipalityOutcome> {
        self.outcomes.iter()
    }

    pub fn done(&self) -> impl Iterator<Item = &MunicipalityReport> {
        self.outcomes.iter().filter_map(MunicipalityOutcome::as_done)
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.as_done().is_none())
            .count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
