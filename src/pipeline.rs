//! The end-to-end run: extract every configured city, append bronze, derive silver,
//! persist watermarks.

use crate::config::EtlConfig;
use crate::error::EtlError;
use crate::extract::extractor::Extractor;
use crate::extract::incremental::{ForecastState, IncrementalFilter};
use crate::source::accuweather::AccuWeatherClient;
use crate::source::WeatherSource;
use crate::table::error::TableError;
use crate::table::frames::{city_detail_frame, forecast_frame};
use crate::table::TableStore;
use crate::transform::transform_to_silver;
use crate::types::city_detail::{CityDetailRecord, CityDetailSnapshot};
use crate::types::dataset::{Dataset, Entity, ExtractionStrategy};
use crate::types::forecast::ForecastRecord;
use crate::utils::ensure_dir_exists;
use crate::watermark::{JsonWatermarkStore, WatermarkStore};
use bon::bon;
use chrono::{SecondsFormat, Utc};
use log::{error, info, warn};
use polars::prelude::{DataFrame, PolarsResult};
use std::fmt;
use std::path::PathBuf;

pub const CITY_DETAILS_SNAPSHOT_FILE: &str = "city_details.json";

/// What happened to one city during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityOutcome {
    pub city: String,
    pub forecast: ForecastState,
    pub details_fetched: bool,
}

/// Summary of a run returned by [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// RFC 3339 timestamp stamped on every row extracted by the run.
    pub extracted_at: String,
    pub cities: Vec<CityOutcome>,
    pub forecast_rows: usize,
    pub detail_rows: usize,
    pub silver_rows: usize,
    /// False when the forecast append failed and the watermarks were left as they were.
    pub watermarks_saved: bool,
}

impl RunReport {
    pub fn accepted(&self) -> usize {
        self.cities
            .iter()
            .filter(|c| c.forecast.is_accepted())
            .count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Run {}: {}/{} forecasts accepted, {} forecast rows, {} detail rows, {} silver rows",
            self.extracted_at,
            self.accepted(),
            self.cities.len(),
            self.forecast_rows,
            self.detail_rows,
            self.silver_rows
        )?;
        for outcome in &self.cities {
            writeln!(
                f,
                "  {}: {}{}",
                outcome.city,
                outcome.forecast,
                if outcome.details_fetched {
                    ""
                } else {
                    ", no details"
                }
            )?;
        }
        Ok(())
    }
}

/// Runs the extraction for a fixed list of cities against one storage root.
///
/// Only one pipeline should run per storage root at a time.
pub struct Pipeline {
    source: Box<dyn WeatherSource>,
    cities: Vec<String>,
    data_dir: PathBuf,
    metadata_dir: PathBuf,
    store: TableStore,
    watermarks: JsonWatermarkStore,
    forecast_strategy: ExtractionStrategy,
    skip_silver: bool,
}

#[bon]
impl Pipeline {
    /// Creates a pipeline.
    ///
    /// # Arguments
    ///
    /// * `.source(Box<dyn WeatherSource>)`: **Required.** Where forecasts and details come from.
    /// * `.cities(Vec<String>)`: **Required.** Processed in this order.
    /// * `.data_dir(PathBuf)`: **Required.** Root of the bronze and silver datasets.
    /// * `.metadata_dir(PathBuf)`: **Required.** Holds the watermark file and the raw
    ///   city-detail snapshot.
    /// * `.forecast_strategy(ExtractionStrategy)`: Optional. Defaults to the forecast
    ///   entity's strategy ([`ExtractionStrategy::Incremental`]). `FullRefresh` admits every
    ///   fetched forecast without moving watermarks backwards.
    /// * `.skip_silver(bool)`: Optional. Stop after the bronze stages.
    #[builder]
    pub fn new(
        source: Box<dyn WeatherSource>,
        cities: Vec<String>,
        #[builder(into)] data_dir: PathBuf,
        #[builder(into)] metadata_dir: PathBuf,
        #[builder(default = Entity::Forecast.strategy())] forecast_strategy: ExtractionStrategy,
        #[builder(default)] skip_silver: bool,
    ) -> Self {
        Self {
            source,
            cities,
            store: TableStore::new(&data_dir),
            watermarks: JsonWatermarkStore::in_dir(&metadata_dir),
            data_dir,
            metadata_dir,
            forecast_strategy,
            skip_silver,
        }
    }

    /// A pipeline reading from AccuWeather as described by `config`.
    pub fn from_config(config: &EtlConfig) -> Result<Self, EtlError> {
        let client = AccuWeatherClient::builder()
            .api_key(config.api_key.clone())
            .base_url(config.base_url.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self::builder()
            .source(Box::new(client))
            .cities(config.cities.clone())
            .data_dir(config.data_dir.clone())
            .metadata_dir(config.metadata_dir.clone())
            .forecast_strategy(config.forecast_strategy)
            .skip_silver(config.skip_silver)
            .build())
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn watermark_store(&self) -> &JsonWatermarkStore {
        &self.watermarks
    }

    /// Runs every stage once.
    ///
    /// Per-city source failures and stage failures are logged and reflected in the
    /// report. Errors are returned only for unusable storage directories, an unreadable
    /// watermark file, or a failure to save the watermarks.
    pub async fn run(&self) -> Result<RunReport, EtlError> {
        ensure_dir_exists(&self.data_dir).await?;
        ensure_dir_exists(&self.metadata_dir).await?;

        let mut watermarks = self.watermarks.load()?;
        let extracted_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false);
        info!(
            "Starting extraction of {} cities ({} watermarks loaded)",
            self.cities.len(),
            watermarks.len()
        );

        let extractor = Extractor::new(self.source.as_ref());
        let mut filter = IncrementalFilter::new(&mut watermarks, self.forecast_strategy);
        let mut outcomes = Vec::with_capacity(self.cities.len());
        let mut forecasts: Vec<ForecastRecord> = Vec::new();
        let mut snapshots: Vec<CityDetailSnapshot> = Vec::new();

        for name in &self.cities {
            let city = extractor.resolve(name).await;
            if city.location_key.is_none() {
                outcomes.push(CityOutcome {
                    city: name.clone(),
                    forecast: ForecastState::RejectedNoLocation,
                    details_fetched: false,
                });
                continue;
            }

            let state = match extractor.fetch_forecast(&city).await {
                Some(raw) => {
                    let state = filter.admit(name, &raw);
                    if let ForecastState::Accepted { date, .. } = state {
                        forecasts.push(ForecastRecord::from_raw(name, date, &raw, &extracted_at));
                    }
                    state
                }
                None => ForecastState::NotAvailable,
            };

            let detail = match Entity::CityDetail.strategy() {
                ExtractionStrategy::FullRefresh => extractor.fetch_city_detail(&city).await,
                // Details carry no date of their own, so they follow the forecast.
                ExtractionStrategy::Incremental if state.is_accepted() => {
                    extractor.fetch_city_detail(&city).await
                }
                ExtractionStrategy::Incremental => None,
            };
            let details_fetched = detail.is_some();
            if let Some(details) = detail {
                snapshots.push(CityDetailSnapshot {
                    city: name.clone(),
                    country: details.country_name(),
                    details,
                });
            }

            outcomes.push(CityOutcome {
                city: name.clone(),
                forecast: state,
                details_fetched,
            });
        }

        self.write_snapshot(&snapshots).await;
        let details: Vec<CityDetailRecord> = snapshots
            .iter()
            .map(|s| s.details.flatten(&s.city, &extracted_at))
            .collect();

        let forecast_result = self
            .append_frame(Entity::Forecast.dataset(), forecast_frame(&forecasts))
            .await;
        let forecast_rows = forecast_result.as_ref().copied().unwrap_or(0);
        let detail_rows = self
            .append_frame(Entity::CityDetail.dataset(), city_detail_frame(&details))
            .await
            .unwrap_or(0);
        let silver_rows = if self.skip_silver {
            info!("Silver stage skipped");
            0
        } else {
            self.run_silver().await
        };

        let watermarks_saved = forecast_result.is_ok();
        if watermarks_saved {
            self.watermarks.save(&watermarks)?;
        } else {
            warn!("Forecast rows were not stored, watermarks left unchanged");
        }

        Ok(RunReport {
            extracted_at,
            cities: outcomes,
            forecast_rows,
            detail_rows,
            silver_rows,
            watermarks_saved,
        })
    }

    /// Appends a bronze batch. Failures are logged and returned so the caller can decide
    /// whether to persist watermarks.
    async fn append_frame(
        &self,
        dataset: Dataset,
        frame: PolarsResult<DataFrame>,
    ) -> Result<usize, TableError> {
        let result = match frame {
            Ok(df) => self.store.append(dataset, df).await,
            Err(e) => Err(TableError::from(e)),
        };
        if let Err(e) = &result {
            error!("Failed to append to {}: {}", dataset, e);
        }
        result
    }

    async fn run_silver(&self) -> usize {
        let df = match transform_to_silver(&self.store).await {
            Ok(Some(df)) => df,
            Ok(None) => return 0,
            Err(e) => {
                error!("Silver transform failed: {}", e);
                return 0;
            }
        };
        self.append_frame(Dataset::SilverForecasts, Ok(df))
            .await
            .unwrap_or(0)
    }

    /// Writes the raw detail batch as JSON. Failures only warn.
    async fn write_snapshot(&self, snapshots: &[CityDetailSnapshot]) {
        let path = self.metadata_dir.join(CITY_DETAILS_SNAPSHOT_FILE);
        let body = match serde_json::to_vec_pretty(snapshots) {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to encode city detail snapshot: {}", e);
                return;
            }
        };
        match tokio::fs::write(&path, body).await {
            Ok(()) => info!(
                "City details for {} cities written to {}",
                snapshots.len(),
                path.display()
            ),
            Err(e) => warn!(
                "Failed to write city detail snapshot {}: {}",
                path.display(),
                e
            ),
        }
    }
}
