//! The read-only storage interface the pipeline pulls station records from.

pub mod csv_directory;
pub mod error;
pub mod in_memory;

use crate::storage::error::StoreError;
use crate::types::raw_measurement::RawMeasurement;
use crate::types::year_range::YearRange;
use async_trait::async_trait;
use std::sync::Arc;

/// A source of raw station records.
///
/// Implementations only read. The pipeline wraps every call in a timeout, so a
/// slow implementation is treated as unavailable rather than stalling a run.
#[async_trait]
pub trait StationStore: Send + Sync {
    /// Checks that the store can be reached at all.
    ///
    /// Called once before a pipeline run; a failure aborts the whole run.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Returns every raw record of `station`.
    ///
    /// `window_hint` lets an implementation skip records that are obviously outside
    /// the analysed years. Honouring it is optional and may be approximate: every
    /// record returned is validated again downstream.
    async fn fetch(
        &self,
        station: &str,
        window_hint: Option<YearRange>,
    ) -> Result<Vec<RawMeasurement>, StoreError>;
}

#[async_trait]
impl<T: StationStore + ?Sized> StationStore for Arc<T> {
    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }

    async fn fetch(
        &self,
        station: &str,
        window_hint: Option<YearRange>,
    ) -> Result<Vec<RawMeasurement>, StoreError> {
        (**self).fetch(station, window_hint).await
    }
}

/// Applies a window hint the way the stores do: a textual check on the date, no parsing.
pub(crate) fn prefilter(
    records: impl IntoIterator<Item = RawMeasurement>,
    window_hint: Option<YearRange>,
) -> Vec<RawMeasurement> {
    match window_hint {
        None => records.into_iter().collect(),
        Some(window) => records
            .into_iter()
            .filter(|r| window.may_contain_date_text(&r.timestamp))
            .collect(),
    }
}
