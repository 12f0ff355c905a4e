use crate::types::dataset::ExtractionStrategy;
use crate::types::forecast::RawForecast;
use crate::watermark::Watermarks;
use chrono::NaiveDate;
use log::{info, warn};
use std::fmt;

/// Where a city's forecast ended up in the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastState {
    /// Initial state of a fetched forecast before [`IncrementalFilter::admit`] evaluates it.
    /// `admit` always moves it to a final state, so a finished run never reports it.
    Fetched,
    /// Admitted into bronze. `previous` is the watermark before the run, if any.
    Accepted {
        date: NaiveDate,
        previous: Option<NaiveDate>,
    },
    /// Not newer than the watermark.
    RejectedStale {
        date: NaiveDate,
        watermark: NaiveDate,
    },
    /// The source's date could not be parsed. The watermark is untouched.
    RejectedMalformed { raw_date: String },
    /// No location key could be resolved, so nothing was fetched.
    RejectedNoLocation,
    /// The fetch itself failed.
    NotAvailable,
}

impl ForecastState {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ForecastState::Accepted { .. })
    }

    /// True once the forecast has left [`ForecastState::Fetched`].
    pub fn is_final(&self) -> bool {
        !matches!(self, ForecastState::Fetched)
    }
}

impl fmt::Display for ForecastState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastState::Fetched => write!(f, "fetched"),
            ForecastState::Accepted { date, .. } => write!(f, "accepted {}", date),
            ForecastState::RejectedStale { date, watermark } => {
                write!(f, "stale {} (watermark {})", date, watermark)
            }
            ForecastState::RejectedMalformed { raw_date } => {
                write!(f, "malformed date '{}'", raw_date)
            }
            ForecastState::RejectedNoLocation => write!(f, "no location"),
            ForecastState::NotAvailable => write!(f, "not available"),
        }
    }
}

/// Decides whether fetched forecasts are new, advancing the watermarks it borrows.
///
/// Only the entry of the city being evaluated is ever modified.
pub struct IncrementalFilter<'a> {
    watermarks: &'a mut Watermarks,
    strategy: ExtractionStrategy,
}

impl<'a> IncrementalFilter<'a> {
    pub fn new(watermarks: &'a mut Watermarks, strategy: ExtractionStrategy) -> Self {
        Self {
            watermarks,
            strategy,
        }
    }

    /// Evaluates a fetched forecast for `city`.
    ///
    /// With [`ExtractionStrategy::Incremental`] the forecast is accepted iff its date is
    /// strictly after the watermark. With [`ExtractionStrategy::FullRefresh`] it is always
    /// accepted. In both cases an accepted date newer than the watermark becomes the new
    /// watermark; the watermark never moves backwards.
    pub fn admit(&mut self, city: &str, forecast: &RawForecast) -> ForecastState {
        let date = match forecast.forecast_date() {
            Ok(date) => date,
            Err(e) => {
                warn!(
                    "Rejecting forecast for {}: cannot parse date '{}': {}",
                    city, forecast.date, e
                );
                return ForecastState::RejectedMalformed {
                    raw_date: forecast.date.clone(),
                };
            }
        };

        let previous = self.watermarks.last(city);
        let watermark = self.watermarks.get(city);
        let is_new = date > watermark;

        if !is_new && self.strategy == ExtractionStrategy::Incremental {
            info!("No new forecast for {} ({} <= {})", city, date, watermark);
            return ForecastState::RejectedStale { date, watermark };
        }

        if is_new {
            self.watermarks.set(city, date);
        }
        info!("New forecast extracted for {}: {}", city, date);
        ForecastState::Accepted { date, previous }
    }
}
