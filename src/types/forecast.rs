//! Forecast payloads as returned by the one-day forecast endpoint, and the flat
//! record stored in the bronze forecast dataset.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Body of the one-day forecast endpoint. Only the daily entries are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ForecastResponse {
    #[serde(default)]
    pub daily_forecasts: Vec<RawForecast>,
}

/// A single daily forecast entry.
///
/// `date` is kept as the source string (e.g. `"2024-06-01T07:00:00-05:00"`); it is only
/// parsed when the incremental filter evaluates the record, so malformed values can be
/// rejected there without failing the fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RawForecast {
    pub date: String,
    pub temperature: TemperatureRange,
    pub day: DayPart,
    pub night: DayPart,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TemperatureRange {
    pub minimum: Reading,
    pub maximum: Reading,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Reading {
    pub value: f64,
    pub unit: String,
}

/// Day or night half of a forecast: the icon code and its phrase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DayPart {
    pub icon: i32,
    pub icon_phrase: String,
}

impl RawForecast {
    /// Parses the forecast timestamp and returns its calendar date in the source's own
    /// UTC offset.
    ///
    /// Accepts RFC 3339 (`2024-06-01T07:00:00-05:00`) and the colon-less offset form
    /// (`2024-06-01T07:00:00-0500`).
    pub fn forecast_date(&self) -> Result<NaiveDate, chrono::ParseError> {
        DateTime::parse_from_rfc3339(&self.date)
            .or_else(|_| DateTime::<FixedOffset>::parse_from_str(&self.date, "%Y-%m-%dT%H:%M:%S%z"))
            .map(|dt| dt.date_naive())
    }
}

/// A forecast row as stored in the bronze forecast dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub city: String,
    pub date: NaiveDate,
    pub min_temp: f64,
    pub max_temp: f64,
    /// Unit tag of both temperatures as reported by the source (`"F"` for imperial).
    pub unit: String,
    pub day_icon: i32,
    pub day_phrase: String,
    pub night_icon: i32,
    pub night_phrase: String,
    /// Timestamp of the run that admitted the row, RFC 3339.
    pub extracted_at: String,
}

impl ForecastRecord {
    pub fn from_raw(city: &str, date: NaiveDate, raw: &RawForecast, extracted_at: &str) -> Self {
        Self {
            city: city.to_string(),
            date,
            min_temp: raw.temperature.minimum.value,
            max_temp: raw.temperature.maximum.value,
            unit: raw.temperature.minimum.unit.clone(),
            day_icon: raw.day.icon,
            day_phrase: raw.day.icon_phrase.clone(),
            night_icon: raw.night.icon,
            night_phrase: raw.night.icon_phrase.clone(),
            extracted_at: extracted_at.to_string(),
        }
    }
}
