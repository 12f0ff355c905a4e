//! Run configuration, validated once before anything touches the network or disk.

use crate::error::EtlError;
use crate::source::accuweather::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::types::dataset::{Entity, ExtractionStrategy};
use crate::utils::{default_data_dir, sibling_metadata_dir};
use bon::bon;
use log::warn;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Cities extracted when none are configured.
pub const DEFAULT_CITIES: [&str; 11] = [
    "Buenos Aires",
    "Brasilia",
    "Santiago",
    "Bogotá",
    "Quito",
    "Georgetown",
    "Asuncion",
    "Lima",
    "Paramaribo",
    "Montevideo",
    "Caracas",
];

pub fn default_cities() -> Vec<String> {
    DEFAULT_CITIES.iter().map(|c| c.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub api_key: String,
    pub cities: Vec<String>,
    pub data_dir: PathBuf,
    pub metadata_dir: PathBuf,
    pub base_url: String,
    pub timeout: Duration,
    pub forecast_strategy: ExtractionStrategy,
    pub skip_silver: bool,
}

#[bon]
impl EtlConfig {
    /// Builds and validates a configuration.
    ///
    /// # Arguments
    ///
    /// * `.api_key(String)`: **Required** at runtime. A missing or blank key is an error.
    /// * `.cities(Vec<String>)`: Optional. Defaults to [`DEFAULT_CITIES`]. Names are
    ///   trimmed, blanks dropped and duplicates removed (first occurrence wins).
    /// * `.data_dir(PathBuf)`: Optional. Defaults to `<local data dir>/forecast_lake/data`.
    /// * `.metadata_dir(PathBuf)`: Optional. Defaults to `metadata` next to the data dir.
    /// * `.base_url(String)`: Optional. Defaults to [`DEFAULT_BASE_URL`].
    /// * `.timeout(Duration)`: Optional. Per-request timeout, defaults to 30 seconds.
    /// * `.forecast_strategy(ExtractionStrategy)`: Optional. Defaults to incremental.
    /// * `.skip_silver(bool)`: Optional. Only run the bronze stages.
    ///
    /// # Errors
    ///
    /// [`EtlError::MissingApiKey`], [`EtlError::NoCities`], or
    /// [`EtlError::DataDirResolution`] when no data dir is given and the platform has none.
    ///
    /// # Examples
    ///
    /// ```
    /// use forecast_lake::EtlConfig;
    ///
    /// let config = EtlConfig::builder()
    ///     .api_key("secret")
    ///     .cities(vec!["Lima".to_string(), "Quito".to_string(), "Lima".to_string()])
    ///     .data_dir("/tmp/lake/data".into())
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.cities, vec!["Lima", "Quito"]);
    /// assert_eq!(config.metadata_dir, std::path::PathBuf::from("/tmp/lake/metadata"));
    /// ```
    #[builder]
    pub fn new(
        #[builder(into)] api_key: Option<String>,
        #[builder(default = default_cities())] cities: Vec<String>,
        data_dir: Option<PathBuf>,
        metadata_dir: Option<PathBuf>,
        #[builder(into, default = DEFAULT_BASE_URL.to_string())] base_url: String,
        #[builder(default = DEFAULT_TIMEOUT)] timeout: Duration,
        #[builder(default = Entity::Forecast.strategy())] forecast_strategy: ExtractionStrategy,
        #[builder(default)] skip_silver: bool,
    ) -> Result<Self, EtlError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(EtlError::MissingApiKey)?;

        let cities = dedupe_cities(cities);
        if cities.is_empty() {
            return Err(EtlError::NoCities);
        }

        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        let metadata_dir = metadata_dir.unwrap_or_else(|| sibling_metadata_dir(&data_dir));

        Ok(Self {
            api_key,
            cities,
            data_dir,
            metadata_dir,
            base_url,
            timeout,
            forecast_strategy,
            skip_silver,
        })
    }
}

fn dedupe_cities(cities: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(cities.len());
    for city in cities {
        let city = city.trim().to_string();
        if city.is_empty() {
            continue;
        }
        if seen.insert(city.clone()) {
            unique.push(city);
        } else {
            warn!("City '{}' listed more than once, ignoring duplicate", city);
        }
    }
    unique
}
