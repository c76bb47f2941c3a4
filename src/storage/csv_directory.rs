//! A [`StationStore`] reading climatological station exports from a directory of CSV files.
//!
//! Each station is one file named `<station id>.csv`. The exports open with a block
//! of station metadata (20 lines by default), followed by a header row and daily
//! rows whose first two columns are the date (`FECHA`) and precipitation
//! (`PRECIP`). Files are Latin-1 encoded. Columns are addressed by position, as
//! header spellings vary between exports.

use crate::storage::error::StoreError;
use crate::storage::{prefilter, StationStore};
use crate::types::raw_measurement::{RawMeasurement, RawValue};
use crate::types::year_range::YearRange;
use async_trait::async_trait;
use bon::bon;
use log::{debug, info, warn};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::{fs, task};

/// Number of metadata lines preceding the header in the station exports.
pub const DEFAULT_METADATA_LINES: usize = 20;

const DATE_COLUMN: (usize, &str) = (0, "FECHA");
const PRECIPITATION_COLUMN: (usize, &str) = (1, "PRECIP");

#[derive(Debug, Clone)]
pub struct CsvDirectoryStore {
    data_dir: PathBuf,
    metadata_lines: usize,
}

#[bon]
impl CsvDirectoryStore {
    /// Creates a store over `data_dir`.
    ///
    /// # Arguments
    ///
    /// * `.data_dir(PathBuf)`: **Required.** Directory holding one `<station>.csv` per station.
    /// * `.metadata_lines(usize)`: Optional. Lines to skip before the header row. Defaults to `20`.
    ///
    /// # Examples
    ///
    /// ```
    /// use precip_trend::CsvDirectoryStore;
    ///
    /// let store = CsvDirectoryStore::builder()
    ///     .data_dir("data/stations".into())
    ///     .build();
    /// assert_eq!(store.station_path("22005").file_name().unwrap(), "22005.csv");
    /// ```
    #[builder]
    pub fn new(data_dir: PathBuf, metadata_lines: Option<usize>) -> Self {
        Self {
            data_dir,
            metadata_lines: metadata_lines.unwrap_or(DEFAULT_METADATA_LINES),
        }
    }

    pub fn station_path(&self, station: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", station))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Parses the bytes of one export into raw records, on a blocking thread.
    async fn parse_export(
        bytes: Vec<u8>,
        station: &str,
        metadata_lines: usize,
    ) -> Result<Vec<RawMeasurement>, StoreError> {
        let station_owned = station.to_string();

        task::spawn_blocking(move || {
            let text = decode_latin1(&bytes);

            // Every column is read as text; interpretation is the cleaner's job.
            let df = CsvReadOptions::default()
                .with_has_header(true)
                .with_skip_rows(metadata_lines)
                .with_infer_schema_length(Some(0))
                .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
                .finish()
                .map_err(|e| StoreError::CsvRead {
                    station: station_owned.clone(),
                    source: e,
                })?;

            let dates = string_column(&df, DATE_COLUMN, &station_owned)?;
            let values = string_column(&df, PRECIPITATION_COLUMN, &station_owned)?;

            let records: Vec<RawMeasurement> = dates
                .into_iter()
                .zip(values)
                .map(|(date, value)| RawMeasurement {
                    timestamp: date.unwrap_or_default().to_string(),
                    value: value.map(|v| RawValue::Text(v.to_string())),
                })
                .collect();
            Ok::<_, StoreError>(records)
        })
        .await?
    }
}

fn string_column<'a>(
    df: &'a DataFrame,
    (position, name): (usize, &str),
    station: &str,
) -> Result<&'a StringChunked, StoreError> {
    let missing = || StoreError::MissingColumn {
        station: station.to_string(),
        column: name.to_string(),
    };
    df.get_columns()
        .get(position)
        .ok_or_else(missing)?
        .str()
        .map_err(|_| missing())
}

// Latin-1 maps each byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[async_trait]
impl StationStore for CsvDirectoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        match fs::metadata(&self.data_dir).await {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            _ => Err(StoreError::DataDirectory(self.data_dir.clone())),
        }
    }

    async fn fetch(
        &self,
        station: &str,
        window_hint: Option<YearRange>,
    ) -> Result<Vec<RawMeasurement>, StoreError> {
        let path = self.station_path(station);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("No export file for station {} at {:?}", station, path);
                return Err(StoreError::UnknownStation(station.to_string()));
            }
            Err(e) => return Err(StoreError::Io(path, e)),
        };
        debug!("Read {} bytes for station {} from {:?}", bytes.len(), station, path);

        let records = Self::parse_export(bytes, station, self.metadata_lines).await?;
        let total = records.len();
        let records = prefilter(records, window_hint);
        info!(
            "Loaded {} records for station {} ({} after window prefilter)",
            total,
            station,
            records.len()
        );
        Ok(records)
    }
}
