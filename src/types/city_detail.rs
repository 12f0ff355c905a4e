//! Defines the location-detail payload returned by the source and the flat,
//! fixed-schema record it is reduced to before being stored in bronze.
//!
//! The payload is variably shaped: most nested objects can be missing, some fields are
//! lists that are frequently empty, and the source adds fields over time. Known fields
//! are modeled explicitly, everything else lands in [`RawCityDetail::extra`] so the raw
//! snapshot can be written back out unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder stored for text fields the source did not provide.
pub const MISSING_TEXT: &str = "N/A";

// --- Source payload ---

/// Location metadata for a single location key, as returned by the source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RawCityDetail {
    /// The location key this detail belongs to.
    pub key: Option<String>,
    pub localized_name: Option<String>,
    pub english_name: Option<String>,
    pub primary_postal_code: Option<String>,
    /// Relative importance of the location within the source's catalogue.
    pub rank: Option<i64>,
    pub region: Option<NamedArea>,
    pub country: Option<NamedArea>,
    pub administrative_area: Option<AdministrativeArea>,
    pub time_zone: Option<TimeZone>,
    pub geo_position: Option<GeoPosition>,
    pub is_alias: Option<bool>,
    /// List-typed; coerced to JSON text when flattened.
    pub supplemental_admin_areas: Option<Value>,
    /// List-typed; coerced to JSON text when flattened.
    pub data_sets: Option<Value>,
    /// Fields not modeled above. Kept for the raw snapshot, dropped by [`Self::flatten`].
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A region or country reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct NamedArea {
    #[serde(rename = "ID")]
    pub id: Option<String>,
    pub localized_name: Option<String>,
    pub english_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AdministrativeArea {
    #[serde(rename = "ID")]
    pub id: Option<String>,
    pub localized_name: Option<String>,
    pub english_name: Option<String>,
    pub level: Option<i64>,
    pub english_type: Option<String>,
    #[serde(rename = "CountryID")]
    pub country_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TimeZone {
    pub code: Option<String>,
    pub name: Option<String>,
    /// Offset from UTC in hours, may be fractional.
    pub gmt_offset: Option<f64>,
    pub is_daylight_saving: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GeoPosition {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<Elevation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Elevation {
    pub metric: Option<Measure>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Measure {
    pub value: Option<f64>,
    pub unit: Option<String>,
}

/// Entry of the raw city-detail snapshot written to the metadata directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityDetailSnapshot {
    pub city: String,
    pub country: String,
    pub details: RawCityDetail,
}

// --- Flattened record ---

/// A city-detail row as stored in the bronze city-detail dataset.
///
/// Text columns never hold nulls (missing values become [`MISSING_TEXT`]), list fields are
/// JSON text, and numeric/boolean columns are typed and nullable. Every snapshot therefore
/// produces the same column set and dtypes regardless of which fields the source sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDetailRecord {
    pub city: String,
    pub country: String,
    pub location_key: String,
    pub localized_name: String,
    pub english_name: String,
    pub primary_postal_code: String,
    pub rank: Option<i64>,
    pub region_id: String,
    pub region_name: String,
    pub country_id: String,
    pub country_name: String,
    pub admin_area_id: String,
    pub admin_area_name: String,
    pub admin_area_type: String,
    pub timezone_code: String,
    pub timezone_name: String,
    pub gmt_offset: Option<f64>,
    pub is_daylight_saving: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation_m: Option<f64>,
    pub is_alias: Option<bool>,
    pub supplemental_admin_areas: String,
    pub data_sets: String,
    pub extracted_at: String,
}

fn text(value: Option<&String>) -> String {
    value
        .filter(|s| !s.is_empty())
        .cloned()
        .unwrap_or_else(|| MISSING_TEXT.to_string())
}

/// Renders a list-typed (or otherwise shapeless) field as JSON text.
fn coerce_to_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING_TEXT.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl RawCityDetail {
    /// Country English name, used as the top-level `country` column.
    pub fn country_name(&self) -> String {
        text(self.country.as_ref().and_then(|c| c.english_name.as_ref()))
    }

    /// Reduces the payload to the fixed bronze schema.
    pub fn flatten(&self, city: &str, extracted_at: &str) -> CityDetailRecord {
        let region = self.region.clone().unwrap_or_default();
        let country = self.country.clone().unwrap_or_default();
        let admin = self.administrative_area.clone().unwrap_or_default();
        let tz = self.time_zone.clone().unwrap_or_default();
        let geo = self.geo_position.clone().unwrap_or_default();

        CityDetailRecord {
            city: city.to_string(),
            country: self.country_name(),
            location_key: text(self.key.as_ref()),
            localized_name: text(self.localized_name.as_ref()),
            english_name: text(self.english_name.as_ref()),
            primary_postal_code: text(self.primary_postal_code.as_ref()),
            rank: self.rank,
            region_id: text(region.id.as_ref()),
            region_name: text(region.english_name.as_ref()),
            country_id: text(country.id.as_ref()),
            country_name: text(country.english_name.as_ref()),
            admin_area_id: text(admin.id.as_ref()),
            admin_area_name: text(admin.english_name.as_ref()),
            admin_area_type: text(admin.english_type.as_ref()),
            timezone_code: text(tz.code.as_ref()),
            timezone_name: text(tz.name.as_ref()),
            gmt_offset: tz.gmt_offset,
            is_daylight_saving: tz.is_daylight_saving,
            latitude: geo.latitude,
            longitude: geo.longitude,
            elevation_m: geo
                .elevation
                .and_then(|e| e.metric)
                .and_then(|m| m.value),
            is_alias: self.is_alias,
            supplemental_admin_areas: coerce_to_text(self.supplemental_admin_areas.as_ref()),
            data_sets: coerce_to_text(self.data_sets.as_ref()),
            extracted_at: extracted_at.to_string(),
        }
    }
}
