use crate::storage::error::StoreError;
use crate::storage::{prefilter, StationStore};
use crate::types::raw_measurement::RawMeasurement;
use crate::types::year_range::YearRange;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// A [`StationStore`] over records already held in memory.
///
/// Useful for hosts that load records themselves and for tests. Stations can be
/// marked unavailable to exercise the pipeline's failure handling.
///
/// # Examples
///
/// ```
/// use precip_trend::{InMemoryStore, RawMeasurement};
///
/// let store = InMemoryStore::new()
///     .with_station("22005", vec![RawMeasurement::new("01/01/2021", "3.2")])
///     .with_unavailable_station("22021");
/// assert_eq!(store.station_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    stations: HashMap<String, Vec<RawMeasurement>>,
    unavailable: HashSet<String>,
    offline: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the records of a station.
    pub fn with_station(
        mut self,
        station: impl Into<String>,
        records: impl IntoIterator<Item = RawMeasurement>,
    ) -> Self {
        self.insert(station, records);
        self
    }

    /// Makes every fetch of `station` fail.
    pub fn with_unavailable_station(mut self, station: impl Into<String>) -> Self {
        self.unavailable.insert(station.into());
        self
    }

    /// Makes the connectivity probe fail.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn insert(
        &mut self,
        station: impl Into<String>,
        records: impl IntoIterator<Item = RawMeasurement>,
    ) {
        self.stations
            .insert(station.into(), records.into_iter().collect());
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }
}

#[async_trait]
impl StationStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable {
                station: "*".to_string(),
                message: "store is offline".to_string(),
            });
        }
        Ok(())
    }

    async fn fetch(
        &self,
        station: &str,
        window_hint: Option<YearRange>,
    ) -> Result<Vec<RawMeasurement>, StoreError> {
        if self.offline || self.unavailable.contains(station) {
            return Err(StoreError::Unavailable {
                station: station.to_string(),
                message: "marked unavailable".to_string(),
            });
        }
        let records = self
            .stations
            .get(station)
            .ok_or_else(|| StoreError::UnknownStation(station.to_string()))?;
        Ok(prefilter(records.iter().cloned(), window_hint))
    }
}
