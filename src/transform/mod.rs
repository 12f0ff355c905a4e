//! Bronze → silver: Celsius conversion, batch means, and the join of forecasts to
//! city details.

pub mod error;

use crate::table::frames::{
    COL_CITY, COL_COUNTRY_ID, COL_COUNTRY_NAME, COL_DATE, COL_GMT_OFFSET, COL_LATITUDE,
    COL_LONGITUDE, COL_MAX_TEMP, COL_MIN_TEMP,
};
use crate::table::TableStore;
use crate::transform::error::TransformError;
use crate::types::dataset::Dataset;
use log::{info, warn};
use polars::prelude::*;
use tokio::task;

// Silver output schema
pub const SILVER_CITY: &str = "city";
pub const SILVER_DATE: &str = "date";
pub const SILVER_MIN_TEMP_F: &str = "min_temp_f";
pub const SILVER_MIN_TEMP_C: &str = "min_temp_c";
pub const SILVER_AVG_MIN_TEMP_C: &str = "avg_min_temp_c";
pub const SILVER_MAX_TEMP_F: &str = "max_temp_f";
pub const SILVER_MAX_TEMP_C: &str = "max_temp_c";
pub const SILVER_AVG_MAX_TEMP_C: &str = "avg_max_temp_c";
pub const SILVER_COUNTRY_ID: &str = "country_id";
pub const SILVER_COUNTRY_NAME: &str = "country_name";
pub const SILVER_GEO_LAT: &str = "geo_lat";
pub const SILVER_GEO_LON: &str = "geo_lon";
pub const SILVER_GMT_OFFSET: &str = "gmt_offset";

pub const SILVER_COLUMNS: [&str; 13] = [
    SILVER_CITY,
    SILVER_DATE,
    SILVER_MIN_TEMP_F,
    SILVER_MIN_TEMP_C,
    SILVER_AVG_MIN_TEMP_C,
    SILVER_MAX_TEMP_F,
    SILVER_MAX_TEMP_C,
    SILVER_AVG_MAX_TEMP_C,
    SILVER_COUNTRY_ID,
    SILVER_COUNTRY_NAME,
    SILVER_GEO_LAT,
    SILVER_GEO_LON,
    SILVER_GMT_OFFSET,
];

/// `(°F − 32) × 5/9`, rounded to one decimal after the conversion.
pub fn fahrenheit_to_celsius(fahrenheit: Expr) -> Expr {
    ((fahrenheit - lit(32.0)) * lit(5.0) / lit(9.0)).round(1)
}

/// Detail columns carried into silver, one row per city.
fn detail_columns() -> [Expr; 6] {
    [
        col(COL_CITY),
        col(COL_COUNTRY_ID),
        col(COL_COUNTRY_NAME),
        col(COL_LATITUDE),
        col(COL_LONGITUDE),
        col(COL_GMT_OFFSET),
    ]
}

/// Builds the silver plan from the full bronze datasets.
///
/// The averages are computed once over every forecast row read and repeated on each
/// output row; they describe the whole bronze history at transform time, not the rows
/// admitted by the current run.
///
/// City details are full-refresh snapshots, so a city usually has several. Only the
/// latest snapshot per city is joined, which keeps every forecast row exactly once in the
/// output. Forecasts without details keep null detail columns, as does everything when
/// `details` is `None`.
pub fn silver_plan(forecasts: LazyFrame, details: Option<LazyFrame>) -> LazyFrame {
    let converted = forecasts
        .with_columns([
            fahrenheit_to_celsius(col(COL_MIN_TEMP)).alias(SILVER_MIN_TEMP_C),
            fahrenheit_to_celsius(col(COL_MAX_TEMP)).alias(SILVER_MAX_TEMP_C),
        ])
        .with_columns([
            col(SILVER_MIN_TEMP_C).mean().round(1).alias(SILVER_AVG_MIN_TEMP_C),
            col(SILVER_MAX_TEMP_C).mean().round(1).alias(SILVER_AVG_MAX_TEMP_C),
        ]);

    let joined = match details {
        Some(details) => {
            let latest = details
                .select(detail_columns())
                .unique_stable(Some(vec![COL_CITY.into()]), UniqueKeepStrategy::Last);
            converted.left_join(latest, col(COL_CITY), col(COL_CITY))
        }
        None => converted.with_columns([
            lit(NULL).cast(DataType::String).alias(COL_COUNTRY_ID),
            lit(NULL).cast(DataType::String).alias(COL_COUNTRY_NAME),
            lit(NULL).cast(DataType::Float64).alias(COL_LATITUDE),
            lit(NULL).cast(DataType::Float64).alias(COL_LONGITUDE),
            lit(NULL).cast(DataType::Float64).alias(COL_GMT_OFFSET),
        ]),
    };

    joined.select([
        col(COL_CITY).alias(SILVER_CITY),
        col(COL_DATE).alias(SILVER_DATE),
        col(COL_MIN_TEMP).alias(SILVER_MIN_TEMP_F),
        col(SILVER_MIN_TEMP_C),
        col(SILVER_AVG_MIN_TEMP_C),
        col(COL_MAX_TEMP).alias(SILVER_MAX_TEMP_F),
        col(SILVER_MAX_TEMP_C),
        col(SILVER_AVG_MAX_TEMP_C),
        col(COL_COUNTRY_ID).alias(SILVER_COUNTRY_ID),
        col(COL_COUNTRY_NAME).alias(SILVER_COUNTRY_NAME),
        col(COL_LATITUDE).alias(SILVER_GEO_LAT),
        col(COL_LONGITUDE).alias(SILVER_GEO_LON),
        col(COL_GMT_OFFSET).alias(SILVER_GMT_OFFSET),
    ])
}

/// Reads both bronze datasets and evaluates the silver plan.
///
/// Returns `Ok(None)` when there are no bronze forecasts yet.
pub async fn transform_to_silver(store: &TableStore) -> Result<Option<DataFrame>, TransformError> {
    let Some(forecasts) = store.read(Dataset::BronzeForecasts)? else {
        info!("No bronze forecasts yet, nothing to transform");
        return Ok(None);
    };
    let details = store.read(Dataset::BronzeCityDetails)?;
    if details.is_none() {
        warn!("No bronze city details yet, silver detail columns will be null");
    }

    let plan = silver_plan(forecasts, details);
    let df = task::spawn_blocking(move || plan.collect()).await??;
    info!("Silver transform produced {} rows", df.height());
    Ok(Some(df))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::frames::{city_detail_frame, forecast_frame};
    use crate::test_utils::{forecast_record, raw_detail};
    use tempfile::TempDir;

    fn float_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
        Ok(df.column(name)?.f64()?.into_iter().collect())
    }

    fn text_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
        Ok(df
            .column(name)?
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    #[test]
    fn test_celsius_conversion() -> Result<(), Box<dyn std::error::Error>> {
        let df = df!("f" => &[32.0, 212.0, 33.0, -40.0, 70.0])?
            .lazy()
            .select([fahrenheit_to_celsius(col("f")).alias("c")])
            .collect()?;

        assert_eq!(
            float_column(&df, "c")?,
            vec![Some(0.0), Some(100.0), Some(0.6), Some(-40.0), Some(21.1)]
        );
        Ok(())
    }

    #[test]
    fn test_plan_without_details_keeps_rows() -> Result<(), Box<dyn std::error::Error>> {
        let forecasts = forecast_frame(&[
            forecast_record("Lima", "2024-06-01", 32.0, 212.0),
            forecast_record("Quito", "2024-06-01", 50.0, 68.0),
        ])?;
        let df = silver_plan(forecasts.lazy(), None)
            .sort([SILVER_CITY], Default::default())
            .collect()?;

        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, SILVER_COLUMNS.to_vec());
        assert_eq!(df.height(), 2);
        assert_eq!(float_column(&df, SILVER_MIN_TEMP_C)?, vec![Some(0.0), Some(10.0)]);
        assert_eq!(float_column(&df, SILVER_MAX_TEMP_C)?, vec![Some(100.0), Some(20.0)]);
        assert_eq!(df.column(SILVER_COUNTRY_ID)?.null_count(), 2);
        assert_eq!(df.column(SILVER_GEO_LAT)?.null_count(), 2);
        Ok(())
    }

    #[test]
    fn test_means_are_broadcast() -> Result<(), Box<dyn std::error::Error>> {
        let forecasts = forecast_frame(&[
            forecast_record("Lima", "2024-06-01", 32.0, 212.0),
            forecast_record("Lima", "2024-06-02", 50.0, 68.0),
            forecast_record("Quito", "2024-06-01", 41.0, 59.0),
        ])?;
        let df = silver_plan(forecasts.lazy(), None).collect()?;

        // min: 0.0, 10.0, 5.0 -> 5.0; max: 100.0, 20.0, 15.0 -> 45.0
        assert_eq!(float_column(&df, SILVER_AVG_MIN_TEMP_C)?, vec![Some(5.0); 3]);
        assert_eq!(float_column(&df, SILVER_AVG_MAX_TEMP_C)?, vec![Some(45.0); 3]);
        Ok(())
    }

    #[test]
    fn test_left_join_uses_latest_snapshot_once() -> Result<(), Box<dyn std::error::Error>> {
        let forecasts = forecast_frame(&[
            forecast_record("Lima", "2024-06-01", 60.0, 70.0),
            forecast_record("Lima", "2024-06-02", 61.0, 71.0),
            forecast_record("Georgetown", "2024-06-01", 75.0, 88.0),
        ])?;
        let details = city_detail_frame(&[
            raw_detail("Lima", "PE", "Peru (old)").flatten("Lima", "t0"),
            raw_detail("Lima", "PE", "Peru").flatten("Lima", "t1"),
        ])?;

        let df = silver_plan(forecasts.lazy(), Some(details.lazy()))
            .sort([SILVER_CITY, SILVER_DATE], Default::default())
            .collect()?;

        assert_eq!(df.height(), 3);
        assert_eq!(
            text_column(&df, SILVER_CITY)?,
            vec![
                Some("Georgetown".to_string()),
                Some("Lima".to_string()),
                Some("Lima".to_string())
            ]
        );
        assert_eq!(
            text_column(&df, SILVER_COUNTRY_NAME)?,
            vec![None, Some("Peru".to_string()), Some("Peru".to_string())]
        );
        assert_eq!(float_column(&df, SILVER_GMT_OFFSET)?, vec![None, Some(-5.0), Some(-5.0)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_transform_reads_full_bronze() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let store = TableStore::new(dir.path());
        assert!(transform_to_silver(&store).await?.is_none());

        store
            .append(
                Dataset::BronzeForecasts,
                forecast_frame(&[forecast_record("Lima", "2024-06-01", 32.0, 50.0)])?,
            )
            .await?;
        store
            .append(
                Dataset::BronzeForecasts,
                forecast_frame(&[forecast_record("Lima", "2024-06-02", 50.0, 68.0)])?,
            )
            .await?;
        store
            .append(
                Dataset::BronzeCityDetails,
                city_detail_frame(&[raw_detail("Lima", "PE", "Peru").flatten("Lima", "t0")])?,
            )
            .await?;

        let df = transform_to_silver(&store).await?.unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(float_column(&df, SILVER_AVG_MIN_TEMP_C)?, vec![Some(5.0); 2]);
        assert_eq!(df.column(SILVER_COUNTRY_ID)?.null_count(), 0);
        Ok(())
    }
}
