//! Defines the datasets the pipeline writes to, the storage layer each one lives in,
//! and the extraction strategy used for each extracted entity.

use std::fmt;

/// Storage layer of a dataset.
///
/// Bronze holds records as they were extracted (normalized to a flat schema),
/// silver holds the curated, joined output of the transform stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Bronze,
    Silver,
}

impl Layer {
    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            Layer::Bronze => "bronze",
            Layer::Silver => "silver",
        }
    }
}

/// An append-only dataset managed by the [`crate::TableStore`].
///
/// # Examples
///
/// ```
/// use forecast_lake::Dataset;
///
/// assert_eq!(Dataset::BronzeForecasts.to_string(), "bronze/forecasts");
/// assert_eq!(Dataset::SilverForecasts.relative_path(), "silver/forecasts_joined");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// One row per newly admitted (city, date) forecast.
    BronzeForecasts,
    /// One row per city per run, full snapshot of the location metadata.
    BronzeCityDetails,
    /// Forecasts joined to city details with derived Celsius columns.
    SilverForecasts,
}

impl Dataset {
    pub fn layer(&self) -> Layer {
        match self {
            Dataset::BronzeForecasts | Dataset::BronzeCityDetails => Layer::Bronze,
            Dataset::SilverForecasts => Layer::Silver,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Dataset::BronzeForecasts => "forecasts",
            Dataset::BronzeCityDetails => "city_details",
            Dataset::SilverForecasts => "forecasts_joined",
        }
    }

    /// Path of the dataset directory relative to the storage root.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.layer().path_segment(), self.name())
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative_path())
    }
}

/// How fetched records of an entity are admitted into bronze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionStrategy {
    /// Only records dated strictly after the city's watermark are admitted,
    /// and admitting one advances the watermark.
    Incremental,
    /// Every fetched record is admitted. Re-running appends a fresh snapshot.
    FullRefresh,
}

/// The two entities extracted per city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Forecast,
    CityDetail,
}

impl Entity {
    pub fn strategy(&self) -> ExtractionStrategy {
        match self {
            Entity::Forecast => ExtractionStrategy::Incremental,
            Entity::CityDetail => ExtractionStrategy::FullRefresh,
        }
    }

    pub fn dataset(&self) -> Dataset {
        match self {
            Entity::Forecast => Dataset::BronzeForecasts,
            Entity::CityDetail => Dataset::BronzeCityDetails,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Forecast => write!(f, "forecast"),
            Entity::CityDetail => write!(f, "city detail"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_strategies() {
        assert_eq!(Entity::Forecast.strategy(), ExtractionStrategy::Incremental);
        assert_eq!(Entity::CityDetail.strategy(), ExtractionStrategy::FullRefresh);
        assert_eq!(Entity::Forecast.dataset(), Dataset::BronzeForecasts);
        assert_eq!(Entity::CityDetail.dataset(), Dataset::BronzeCityDetails);
    }

    #[test]
    fn test_dataset_paths() {
        assert_eq!(Dataset::BronzeCityDetails.relative_path(), "bronze/city_details");
        assert_eq!(Dataset::SilverForecasts.layer(), Layer::Silver);
    }
}
