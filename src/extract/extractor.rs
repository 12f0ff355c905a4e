use crate::source::WeatherSource;
use crate::types::city::City;
use crate::types::city_detail::RawCityDetail;
use crate::types::forecast::RawForecast;
use log::{info, warn};

/// Pulls forecasts and city details for one city at a time.
///
/// Source failures never escape: they are logged with the city name and reported as
/// "not available" (`None`), so one failing city cannot abort the batch.
pub struct Extractor<'a> {
    source: &'a dyn WeatherSource,
}

impl<'a> Extractor<'a> {
    pub fn new(source: &'a dyn WeatherSource) -> Self {
        Self { source }
    }

    /// Resolves the location key of `name`. The returned city is unresolved if the
    /// search failed or found nothing.
    pub async fn resolve(&self, name: &str) -> City {
        match self.source.resolve_location(name).await {
            Ok(Some(key)) => {
                info!("Location key found for {}: {}", name, key);
                City::resolved(name, &key)
            }
            Ok(None) => {
                warn!("No location found for {}, skipping city", name);
                City::unresolved(name)
            }
            Err(e) => {
                warn!("Location lookup failed for {}: {}", name, e);
                City::unresolved(name)
            }
        }
    }

    /// Current one-day forecast. Staleness is not evaluated here.
    pub async fn fetch_forecast(&self, city: &City) -> Option<RawForecast> {
        let key = city.location_key.as_deref()?;
        match self.source.one_day_forecast(key).await {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                warn!("Forecast fetch failed for {}: {}", city.name, e);
                None
            }
        }
    }

    /// Full location metadata, fetched unconditionally on every run.
    pub async fn fetch_city_detail(&self, city: &City) -> Option<RawCityDetail> {
        let key = city.location_key.as_deref()?;
        match self.source.location_detail(key).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                warn!("City detail fetch failed for {}: {}", city.name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedSource;

    #[tokio::test]
    async fn test_resolve_and_fetch() {
        let source = ScriptedSource::new().with_city("Lima", "2024-06-01T07:00:00-05:00");
        let extractor = Extractor::new(&source);

        let city = extractor.resolve("Lima").await;
        assert_eq!(city.location_key.as_deref(), Some("key-Lima"));
        assert!(extractor.fetch_forecast(&city).await.is_some());
        assert!(extractor.fetch_city_detail(&city).await.is_some());
    }

    #[tokio::test]
    async fn test_unknown_city_is_unresolved() {
        let source = ScriptedSource::new();
        let extractor = Extractor::new(&source);

        let city = extractor.resolve("Atlantis").await;
        assert_eq!(city, City::unresolved("Atlantis"));
        assert!(extractor.fetch_forecast(&city).await.is_none());
        assert!(extractor.fetch_city_detail(&city).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_failures_are_not_available() {
        let source = ScriptedSource::new()
            .with_city("Quito", "2024-06-01T07:00:00-05:00")
            .failing_forecast("Quito")
            .failing_detail("Quito");
        let extractor = Extractor::new(&source);

        let city = extractor.resolve("Quito").await;
        assert!(city.location_key.is_some());
        assert!(extractor.fetch_forecast(&city).await.is_none());
        assert!(extractor.fetch_city_detail(&city).await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_unresolved() {
        let source = ScriptedSource::new()
            .with_city("Caracas", "2024-06-01T07:00:00-04:00")
            .failing_lookup("Caracas");
        let extractor = Extractor::new(&source);

        assert_eq!(extractor.resolve("Caracas").await.location_key, None);
    }
}
