//! Run configuration: pipeline parameters and the municipality/station registry.
//!
//! Both can be built in code or loaded together from one TOML settings file:
//!
//! ```toml
//! [pipeline]
//! min_samples = 300
//! year_window = { trailing = 5 }
//! horizon = { through_year = 2028 }
//!
//! [[municipality]]
//! name = "Arroyo Seco"
//! stations = ["22036_ARROYO_SECO"]
//! ```

pub mod error;
pub mod pipeline_config;
pub mod station_registry;

use crate::config::error::ConfigError;
use crate::config::pipeline_config::PipelineConfig;
use crate::config::station_registry::{Municipality, StationRegistry};
use log::info;
use serde::Deserialize;
use std::path::Path;

/// A pipeline configuration together with the registry it runs over.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub pipeline: PipelineConfig,
    pub registry: StationRegistry,
}

#[derive(Deserialize)]
struct SettingsFile {
    #[serde(default)]
    pipeline: PipelineConfig,
    #[serde(default, rename = "municipality")]
    municipalities: Vec<Municipality>,
}

impl Settings {
    /// Parses settings from TOML text. A file without municipalities gets
    /// [`StationRegistry::queretaro`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = toml::from_str(text)?;
        file.pipeline.validate()?;
        let registry = if file.municipalities.is_empty() {
            StationRegistry::queretaro()
        } else {
            StationRegistry::from_municipalities(file.municipalities)?
        };
        Ok(Self {
            pipeline: file.pipeline,
            registry,
        })
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let settings = Self::from_toml_str(&text)?;
        info!(
            "Loaded settings from {:?}: {} municipalities, min_samples {}",
            path,
            settings.registry.len(),
            settings.pipeline.min_samples
        );
        Ok(settings)
    }
}
