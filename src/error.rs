use crate::config::error::ConfigError;
use crate::storage::error::StoreError;
use polars::error::PolarsError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrecipTrendError {
    #[error("Could not connect to the station store")]
    StorageConnection(#[source] StoreError),

    #[error("Station store did not answer within {0:?}")]
    StorageConnectionTimeout(Duration),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build report frame")]
    Polars(#[from] PolarsError),
}
