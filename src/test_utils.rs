//! In-memory weather source and payload builders for tests.

use crate::source::error::SourceError;
use crate::source::WeatherSource;
use crate::types::city_detail::{GeoPosition, NamedArea, RawCityDetail, TimeZone};
use crate::types::forecast::{DayPart, ForecastRecord, RawForecast, Reading, TemperatureRange};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Map};
use std::collections::HashMap;
use std::sync::Mutex;

pub fn raw_forecast(date: &str, min_f: f64, max_f: f64) -> RawForecast {
    RawForecast {
        date: date.to_string(),
        temperature: TemperatureRange {
            minimum: Reading {
                value: min_f,
                unit: "F".to_string(),
            },
            maximum: Reading {
                value: max_f,
                unit: "F".to_string(),
            },
        },
        day: DayPart {
            icon: 7,
            icon_phrase: "Cloudy".to_string(),
        },
        night: DayPart {
            icon: 38,
            icon_phrase: "Mostly cloudy".to_string(),
        },
    }
}

/// A bronze forecast row for `date` (`YYYY-MM-DD`) with temperatures in °F.
pub fn forecast_record(city: &str, date: &str, min_f: f64, max_f: f64) -> ForecastRecord {
    let raw = raw_forecast(&format!("{}T07:00:00-05:00", date), min_f, max_f);
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    ForecastRecord::from_raw(city, date, &raw, "t0")
}

pub fn raw_detail(city: &str, country_id: &str, country: &str) -> RawCityDetail {
    RawCityDetail {
        key: Some(format!("key-{}", city)),
        localized_name: Some(city.to_string()),
        english_name: Some(city.to_string()),
        rank: Some(10),
        region: Some(NamedArea {
            id: Some("SAM".to_string()),
            localized_name: Some("South America".to_string()),
            english_name: Some("South America".to_string()),
        }),
        country: Some(NamedArea {
            id: Some(country_id.to_string()),
            localized_name: Some(country.to_string()),
            english_name: Some(country.to_string()),
        }),
        time_zone: Some(TimeZone {
            code: Some("PET".to_string()),
            name: Some("America/Lima".to_string()),
            gmt_offset: Some(-5.0),
            is_daylight_saving: Some(false),
        }),
        geo_position: Some(GeoPosition {
            latitude: Some(-12.04),
            longitude: Some(-77.03),
            elevation: None,
        }),
        is_alias: Some(false),
        supplemental_admin_areas: Some(json!([])),
        data_sets: Some(json!(["AirQualityCurrentConditions"])),
        extra: Map::new(),
        ..Default::default()
    }
}

struct ScriptedCity {
    forecast: RawForecast,
    detail: RawCityDetail,
    fail_lookup: bool,
    fail_forecast: bool,
    fail_detail: bool,
}

/// A [`WeatherSource`] answering from a fixed script.
///
/// Location keys are `key-<city>`. Forecasts can be replaced between runs with
/// [`ScriptedSource::set_forecast`].
#[derive(Default)]
pub struct ScriptedSource {
    cities: Mutex<HashMap<String, ScriptedCity>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(self, city: &str, forecast_date: &str) -> Self {
        self.with_forecast(city, forecast_date, 50.0, 68.0)
    }

    pub fn with_forecast(self, city: &str, forecast_date: &str, min_f: f64, max_f: f64) -> Self {
        self.cities.lock().unwrap().insert(
            city.to_string(),
            ScriptedCity {
                forecast: raw_forecast(forecast_date, min_f, max_f),
                detail: raw_detail(city, "PE", "Peru"),
                fail_lookup: false,
                fail_forecast: false,
                fail_detail: false,
            },
        );
        self
    }

    pub fn with_detail(self, city: &str, detail: RawCityDetail) -> Self {
        self.update(city, |c| c.detail = detail);
        self
    }

    pub fn failing_lookup(self, city: &str) -> Self {
        self.update(city, |c| c.fail_lookup = true);
        self
    }

    pub fn failing_forecast(self, city: &str) -> Self {
        self.update(city, |c| c.fail_forecast = true);
        self
    }

    pub fn failing_detail(self, city: &str) -> Self {
        self.update(city, |c| c.fail_detail = true);
        self
    }

    pub fn set_forecast(&self, city: &str, forecast_date: &str, min_f: f64, max_f: f64) {
        self.update(city, |c| c.forecast = raw_forecast(forecast_date, min_f, max_f));
    }

    fn update(&self, city: &str, f: impl FnOnce(&mut ScriptedCity)) {
        if let Some(scripted) = self.cities.lock().unwrap().get_mut(city) {
            f(scripted);
        }
    }

    fn city_for_key(location_key: &str) -> &str {
        location_key.strip_prefix("key-").unwrap_or(location_key)
    }
}

#[async_trait]
impl WeatherSource for ScriptedSource {
    async fn resolve_location(&self, city: &str) -> Result<Option<String>, SourceError> {
        match self.cities.lock().unwrap().get(city) {
            Some(scripted) if scripted.fail_lookup => {
                Err(SourceError::EmptyForecast(format!("lookup {}", city)))
            }
            Some(_) => Ok(Some(format!("key-{}", city))),
            None => Ok(None),
        }
    }

    async fn one_day_forecast(&self, location_key: &str) -> Result<RawForecast, SourceError> {
        let cities = self.cities.lock().unwrap();
        match cities.get(Self::city_for_key(location_key)) {
            Some(scripted) if !scripted.fail_forecast => Ok(scripted.forecast.clone()),
            _ => Err(SourceError::EmptyForecast(location_key.to_string())),
        }
    }

    async fn location_detail(&self, location_key: &str) -> Result<RawCityDetail, SourceError> {
        let cities = self.cities.lock().unwrap();
        match cities.get(Self::city_for_key(location_key)) {
            Some(scripted) if !scripted.fail_detail => Ok(scripted.detail.clone()),
            _ => Err(SourceError::EmptyForecast(location_key.to_string())),
        }
    }
}
