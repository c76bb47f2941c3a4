use crate::trend::horizon::ProjectionHorizon;
use crate::types::year_range::YearRange;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse configuration")]
    Parse(#[from] toml::de::Error),

    #[error("Year window {0} ends before it starts")]
    InvalidWindow(YearRange),

    #[error("'{0}' must be greater than zero")]
    NotPositive(&'static str),

    #[error("Municipality '{0}' is configured more than once")]
    DuplicateMunicipality(String),

    #[error("Station '{station}' is listed more than once for municipality '{municipality}'")]
    DuplicateStation {
        municipality: String,
        station: String,
    },

    #[error("Projection horizon {0} is out of range")]
    HorizonOutOfRange(ProjectionHorizon),
}
