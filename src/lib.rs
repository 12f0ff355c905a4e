mod config;
mod error;
mod extract;
mod pipeline;
mod source;
mod table;
mod transform;
mod types;
mod utils;
mod watermark;

#[cfg(test)]
mod test_utils;

pub use config::*;
pub use error::EtlError;
pub use pipeline::*;

pub use extract::extractor::Extractor;
pub use extract::incremental::{ForecastState, IncrementalFilter};

pub use source::accuweather::{AccuWeatherClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use source::WeatherSource;

pub use table::frames::*;
pub use table::TableStore;

pub use transform::{
    fahrenheit_to_celsius, silver_plan, transform_to_silver, SILVER_AVG_MAX_TEMP_C,
    SILVER_AVG_MIN_TEMP_C, SILVER_CITY, SILVER_COLUMNS, SILVER_COUNTRY_ID, SILVER_COUNTRY_NAME,
    SILVER_DATE, SILVER_GEO_LAT, SILVER_GEO_LON, SILVER_GMT_OFFSET, SILVER_MAX_TEMP_C,
    SILVER_MAX_TEMP_F, SILVER_MIN_TEMP_C, SILVER_MIN_TEMP_F,
};

pub use types::city::City;
pub use types::city_detail::*;
pub use types::dataset::*;
pub use types::forecast::*;

pub use watermark::{sentinel_date, JsonWatermarkStore, WatermarkStore, Watermarks};

pub use source::error::SourceError;
pub use table::error::TableError;
pub use transform::error::TransformError;
pub use watermark::error::WatermarkError;
