//! The remote weather source the pipeline extracts from.

pub mod accuweather;
pub mod error;

use crate::source::error::SourceError;
use crate::types::city_detail::RawCityDetail;
use crate::types::forecast::RawForecast;
use async_trait::async_trait;
use std::sync::Arc;

/// The three lookups the pipeline needs from a weather provider.
///
/// Implementations report transport and decoding failures as [`SourceError`]; deciding
/// whether a failure is fatal is left to the caller.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Resolves a city name to the provider's location key.
    /// Returns `Ok(None)` when the search succeeds but finds nothing.
    async fn resolve_location(&self, city: &str) -> Result<Option<String>, SourceError>;

    /// The current one-day forecast for a location.
    async fn one_day_forecast(&self, location_key: &str) -> Result<RawForecast, SourceError>;

    /// Full metadata for a location.
    async fn location_detail(&self, location_key: &str) -> Result<RawCityDetail, SourceError>;
}

#[async_trait]
impl<T: WeatherSource + ?Sized> WeatherSource for Arc<T> {
    async fn resolve_location(&self, city: &str) -> Result<Option<String>, SourceError> {
        (**self).resolve_location(city).await
    }

    async fn one_day_forecast(&self, location_key: &str) -> Result<RawForecast, SourceError> {
        (**self).one_day_forecast(location_key).await
    }

    async fn location_detail(&self, location_key: &str) -> Result<RawCityDetail, SourceError> {
        (**self).location_detail(location_key).await
    }
}
