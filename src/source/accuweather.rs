//! [`WeatherSource`] backed by the AccuWeather data service.

use crate::source::error::SourceError;
use crate::source::WeatherSource;
use crate::types::city_detail::RawCityDetail;
use crate::types::forecast::{ForecastResponse, RawForecast};
use async_trait::async_trait;
use bon::bon;
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://dataservice.accuweather.com/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CITY_SEARCH_ENDPOINT: &str = "locations/v1/cities/search";
const ONE_DAY_FORECAST_ENDPOINT: &str = "forecasts/v1/daily/1day";
const LOCATION_ENDPOINT: &str = "locations/v1";

/// One hit of the city search endpoint. Only the key is used.
#[derive(Debug, Deserialize)]
struct LocationMatch {
    #[serde(rename = "Key")]
    key: String,
}

pub struct AccuWeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[bon]
impl AccuWeatherClient {
    /// Creates a client for the given API key.
    ///
    /// # Arguments
    ///
    /// * `.api_key(String)`: **Required.** Key sent as the `apikey` query parameter.
    /// * `.base_url(String)`: Optional. Defaults to [`DEFAULT_BASE_URL`].
    /// * `.timeout(Duration)`: Optional. Per-request timeout, defaults to 30 seconds.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the underlying HTTP client cannot be built.
    #[builder]
    pub fn new(
        #[builder(into)] api_key: String,
        #[builder(into, default = DEFAULT_BASE_URL.to_string())] base_url: String,
        #[builder(default = DEFAULT_TIMEOUT)] timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = if base_url.ends_with('/') {
            base_url
        } else {
            format!("{}/", base_url)
        };
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// GETs `endpoint` with the API key (plus `query`) and decodes the JSON body.
    /// The key is never part of the logged or reported URL.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Requesting {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {}", url, e);
                return Err(if let Some(status) = e.status() {
                    SourceError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    SourceError::NetworkRequest(url, e)
                });
            }
        };

        response
            .json::<T>()
            .await
            .map_err(|source| SourceError::Decode { url, source })
    }
}

#[async_trait]
impl WeatherSource for AccuWeatherClient {
    async fn resolve_location(&self, city: &str) -> Result<Option<String>, SourceError> {
        let matches: Vec<LocationMatch> = self
            .get_json(CITY_SEARCH_ENDPOINT, &[("q", city)])
            .await?;
        Ok(matches.into_iter().next().map(|m| m.key))
    }

    async fn one_day_forecast(&self, location_key: &str) -> Result<RawForecast, SourceError> {
        let endpoint = format!("{}/{}", ONE_DAY_FORECAST_ENDPOINT, location_key);
        let response: ForecastResponse = self.get_json(&endpoint, &[]).await?;
        response
            .daily_forecasts
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::EmptyForecast(location_key.to_string()))
    }

    async fn location_detail(&self, location_key: &str) -> Result<RawCityDetail, SourceError> {
        let endpoint = format!("{}/{}", LOCATION_ENDPOINT, location_key);
        self.get_json(&endpoint, &[]).await
    }
}
