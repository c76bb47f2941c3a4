use crate::config::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A municipality and the stations whose records feed its series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    pub name: String,
    pub stations: Vec<String>,
}

impl Municipality {
    pub fn new<S: Into<String>>(name: impl Into<String>, stations: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            stations: stations.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered mapping of municipality to station ids.
///
/// Order is kept: a pipeline report lists its outcomes in registry order.
///
/// # Examples
///
/// ```
/// use precip_trend::StationRegistry;
///
/// let registry = StationRegistry::new()
///     .with_municipality("Arroyo Seco", ["22036_ARROYO_SECO"])?
///     .with_municipality("Cadereyta", ["22005_CADEREYTA_DE_MONTES"])?;
/// assert_eq!(registry.len(), 2);
/// assert_eq!(registry.get("Cadereyta").unwrap().stations.len(), 1);
/// # Ok::<(), precip_trend::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegistryTable", into = "RegistryTable")]
pub struct StationRegistry {
    municipalities: Vec<Municipality>,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from municipalities, rejecting duplicate names.
    pub fn from_municipalities(
        municipalities: impl IntoIterator<Item = Municipality>,
    ) -> Result<Self, ConfigError> {
        municipalities
            .into_iter()
            .try_fold(Self::new(), |registry, m| registry.with(m))
    }

    pub fn with_municipality<S: Into<String>>(
        self,
        name: impl Into<String>,
        stations: impl IntoIterator<Item = S>,
    ) -> Result<Self, ConfigError> {
        self.with(Municipality::new(name, stations))
    }

    fn with(mut self, municipality: Municipality) -> Result<Self, ConfigError> {
        if self.get(&municipality.name).is_some() {
            return Err(ConfigError::DuplicateMunicipality(municipality.name));
        }
        let mut seen = HashSet::new();
        if let Some(station) = municipality.stations.iter().find(|id| !seen.insert(*id)) {
            return Err(ConfigError::DuplicateStation {
                station: station.clone(),
                municipality: municipality.name,
            });
        }
        self.municipalities.push(municipality);
        Ok(self)
    }

    /// The stations of the Querétaro municipalities, keyed as the station exports are named.
    pub fn queretaro() -> Self {
        let table = [
            (
                "Querétaro",
                vec!["22027_QUERÉTARO", "22041_QUERÉTARO", "22045_QUERÉTARO"],
            ),
            ("San Juan del Río", vec!["22028_SAN_JUAN_DEL_RÍO"]),
            (
                "Cadereyta",
                vec![
                    "22005_CADEREYTA_DE_MONTES",
                    "22021_CADEREYTA_DE_MONTES",
                    "22035_CADEREYTA_DE_MONTES",
                    "22054_CADEREYTA_DE_MONTES",
                    "22056_CADEREYTA_DE_MONTES",
                ],
            ),
            ("Arroyo Seco", vec!["22036_ARROYO_SECO"]),
        ];
        Self {
            municipalities: table
                .into_iter()
                .map(|(name, stations)| Municipality::new(name, stations))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Municipality> {
        self.municipalities.iter().find(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Municipality> {
        self.municipalities.iter()
    }

    pub fn len(&self) -> usize {
        self.municipalities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.municipalities.is_empty()
    }

    /// Every distinct station id, in first-seen order.
    pub fn station_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.iter()
            .flat_map(|m| m.stations.iter().map(String::as_str))
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// On-disk shape: a `[[municipality]]` array of tables.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct RegistryTable {
    #[serde(default, rename = "municipality")]
    pub(crate) municipalities: Vec<Municipality>,
}

impl TryFrom<RegistryTable> for StationRegistry {
    type Error = ConfigError;

    fn try_from(table: RegistryTable) -> Result<Self, Self::Error> {
        Self::from_municipalities(table.municipalities)
    }
}

impl From<StationRegistry> for RegistryTable {
    fn from(registry: StationRegistry) -> Self {
        Self {
            municipalities: registry.municipalities,
        }
    }
}
