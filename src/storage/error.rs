use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No data collection for station '{0}'")]
    UnknownStation(String),

    #[error("Station '{station}' is unavailable: {message}")]
    Unavailable { station: String, message: String },

    #[error("Data directory '{0}' does not exist or is not a directory")]
    DataDirectory(PathBuf),

    #[error("Failed to read station file '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Parsing error processing CSV data for station '{station}'")]
    CsvRead {
        station: String,
        #[source]
        source: PolarsError,
    },

    #[error("Missing required column '{column}' for station {station}")]
    MissingColumn { station: String, column: String },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
