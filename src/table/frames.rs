//! Conversion of bronze records into Polars frames with a fixed column set.
//!
//! Every column is built from a typed vector, so a batch where an optional field is
//! absent for every row still gets the same dtype as one where it is present.

use crate::types::city_detail::CityDetailRecord;
use crate::types::forecast::ForecastRecord;
use chrono::NaiveDate;
use polars::prelude::*;

// Shared
pub const COL_CITY: &str = "city";
pub const COL_EXTRACTED_AT: &str = "extracted_at";

// Forecasts
pub const COL_DATE: &str = "date";
pub const COL_MIN_TEMP: &str = "min_temp";
pub const COL_MAX_TEMP: &str = "max_temp";
pub const COL_UNIT: &str = "unit";
pub const COL_DAY_ICON: &str = "day_icon";
pub const COL_DAY_PHRASE: &str = "day_phrase";
pub const COL_NIGHT_ICON: &str = "night_icon";
pub const COL_NIGHT_PHRASE: &str = "night_phrase";

// City details
pub const COL_COUNTRY: &str = "country";
pub const COL_COUNTRY_ID: &str = "country_id";
pub const COL_COUNTRY_NAME: &str = "country_name";
pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";
pub const COL_GMT_OFFSET: &str = "gmt_offset";

fn text_column<'a>(name: &str, values: impl Iterator<Item = &'a str>) -> Column {
    Column::new(name.into(), values.collect::<Vec<&str>>())
}

pub fn forecast_frame(records: &[ForecastRecord]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        text_column(COL_CITY, records.iter().map(|r| r.city.as_str())),
        Column::new(
            COL_DATE.into(),
            records.iter().map(|r| r.date).collect::<Vec<NaiveDate>>(),
        ),
        Column::new(
            COL_MIN_TEMP.into(),
            records.iter().map(|r| r.min_temp).collect::<Vec<f64>>(),
        ),
        Column::new(
            COL_MAX_TEMP.into(),
            records.iter().map(|r| r.max_temp).collect::<Vec<f64>>(),
        ),
        text_column(COL_UNIT, records.iter().map(|r| r.unit.as_str())),
        Column::new(
            COL_DAY_ICON.into(),
            records.iter().map(|r| r.day_icon).collect::<Vec<i32>>(),
        ),
        text_column(COL_DAY_PHRASE, records.iter().map(|r| r.day_phrase.as_str())),
        Column::new(
            COL_NIGHT_ICON.into(),
            records.iter().map(|r| r.night_icon).collect::<Vec<i32>>(),
        ),
        text_column(COL_NIGHT_PHRASE, records.iter().map(|r| r.night_phrase.as_str())),
        text_column(COL_EXTRACTED_AT, records.iter().map(|r| r.extracted_at.as_str())),
    ])
}

pub fn city_detail_frame(records: &[CityDetailRecord]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        text_column(COL_CITY, records.iter().map(|r| r.city.as_str())),
        text_column(COL_COUNTRY, records.iter().map(|r| r.country.as_str())),
        text_column("location_key", records.iter().map(|r| r.location_key.as_str())),
        text_column("localized_name", records.iter().map(|r| r.localized_name.as_str())),
        text_column("english_name", records.iter().map(|r| r.english_name.as_str())),
        text_column(
            "primary_postal_code",
            records.iter().map(|r| r.primary_postal_code.as_str()),
        ),
        Column::new(
            "rank".into(),
            records.iter().map(|r| r.rank).collect::<Vec<Option<i64>>>(),
        ),
        text_column("region_id", records.iter().map(|r| r.region_id.as_str())),
        text_column("region_name", records.iter().map(|r| r.region_name.as_str())),
        text_column(COL_COUNTRY_ID, records.iter().map(|r| r.country_id.as_str())),
        text_column(COL_COUNTRY_NAME, records.iter().map(|r| r.country_name.as_str())),
        text_column("admin_area_id", records.iter().map(|r| r.admin_area_id.as_str())),
        text_column("admin_area_name", records.iter().map(|r| r.admin_area_name.as_str())),
        text_column("admin_area_type", records.iter().map(|r| r.admin_area_type.as_str())),
        text_column("timezone_code", records.iter().map(|r| r.timezone_code.as_str())),
        text_column("timezone_name", records.iter().map(|r| r.timezone_name.as_str())),
        Column::new(
            COL_GMT_OFFSET.into(),
            records.iter().map(|r| r.gmt_offset).collect::<Vec<Option<f64>>>(),
        ),
        Column::new(
            "is_daylight_saving".into(),
            records.iter().map(|r| r.is_daylight_saving).collect::<Vec<Option<bool>>>(),
        ),
        Column::new(
            COL_LATITUDE.into(),
            records.iter().map(|r| r.latitude).collect::<Vec<Option<f64>>>(),
        ),
        Column::new(
            COL_LONGITUDE.into(),
            records.iter().map(|r| r.longitude).collect::<Vec<Option<f64>>>(),
        ),
        Column::new(
            "elevation_m".into(),
            records.iter().map(|r| r.elevation_m).collect::<Vec<Option<f64>>>(),
        ),
        Column::new(
            "is_alias".into(),
            records.iter().map(|r| r.is_alias).collect::<Vec<Option<bool>>>(),
        ),
        text_column(
            "supplemental_admin_areas",
            records.iter().map(|r| r.supplemental_admin_areas.as_str()),
        ),
        text_column("data_sets", records.iter().map(|r| r.data_sets.as_str())),
        text_column(COL_EXTRACTED_AT, records.iter().map(|r| r.extracted_at.as_str())),
    ])
}
